use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("unknown").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "CENTERDIR_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.dataset, "./data/centers.json");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.fetch_timeout_secs, 30);
    assert_eq!(cfg.fetch_user_agent, "centerdir/0.1 (center-directory)");
    assert_eq!(cfg.fetch_max_retries, 3);
    assert_eq!(cfg.fetch_retry_backoff_ms, 1000);
    assert_eq!(cfg.nearest_default_limit, 10);
    assert!(cfg.nearest_max_distance_km.is_none());
    assert_eq!(cfg.rate_limit_per_minute, 120);
}

#[test]
fn build_app_config_accepts_dataset_url() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_DATASET", "https://example.org/centers.json");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.dataset, "https://example.org/centers.json");
}

#[test]
fn build_app_config_rejects_blank_dataset() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_DATASET", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CENTERDIR_DATASET"),
        "expected InvalidEnvVar(CENTERDIR_DATASET), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CENTERDIR_BIND_ADDR"),
        "expected InvalidEnvVar(CENTERDIR_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_on_invalid_env() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_ENV", "producton");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CENTERDIR_ENV"),
        "expected InvalidEnvVar(CENTERDIR_ENV), got: {result:?}"
    );
}

#[test]
fn fetch_timeout_secs_override() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_FETCH_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.fetch_timeout_secs, 60);
}

#[test]
fn fetch_timeout_secs_invalid() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_FETCH_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CENTERDIR_FETCH_TIMEOUT_SECS"),
        "expected InvalidEnvVar(CENTERDIR_FETCH_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn fetch_user_agent_override() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_FETCH_USER_AGENT", "custom-agent/2.0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.fetch_user_agent, "custom-agent/2.0");
}

#[test]
fn fetch_max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_FETCH_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CENTERDIR_FETCH_MAX_RETRIES"),
        "expected InvalidEnvVar(CENTERDIR_FETCH_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn nearest_default_limit_override() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_NEAREST_DEFAULT_LIMIT", "25");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.nearest_default_limit, 25);
}

#[test]
fn nearest_default_limit_rejects_zero() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_NEAREST_DEFAULT_LIMIT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CENTERDIR_NEAREST_DEFAULT_LIMIT"),
        "expected InvalidEnvVar(CENTERDIR_NEAREST_DEFAULT_LIMIT), got: {result:?}"
    );
}

#[test]
fn nearest_default_limit_rejects_above_max() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_NEAREST_DEFAULT_LIMIT", "101");
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_err(), "expected Err, got: {result:?}");
}

#[test]
fn nearest_max_distance_km_override() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_NEAREST_MAX_DISTANCE_KM", "250.5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.nearest_max_distance_km, Some(250.5));
}

#[test]
fn nearest_max_distance_km_rejects_non_positive() {
    for raw in ["0", "-5", "inf", "NaN"] {
        let mut map = HashMap::new();
        map.insert("CENTERDIR_NEAREST_MAX_DISTANCE_KM", raw);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CENTERDIR_NEAREST_MAX_DISTANCE_KM"),
            "expected InvalidEnvVar for {raw}, got: {result:?}"
        );
    }
}

#[test]
fn rate_limit_per_minute_override() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_RATE_LIMIT_PER_MINUTE", "30");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.rate_limit_per_minute, 30);
}

#[test]
fn rate_limit_per_minute_rejects_zero() {
    let mut map = HashMap::new();
    map.insert("CENTERDIR_RATE_LIMIT_PER_MINUTE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CENTERDIR_RATE_LIMIT_PER_MINUTE"),
        "expected InvalidEnvVar(CENTERDIR_RATE_LIMIT_PER_MINUTE), got: {result:?}"
    );
}
