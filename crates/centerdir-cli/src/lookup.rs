//! `nearest` and `stats` command handlers.

use anyhow::Context;
use centerdir_core::{AppConfig, CenterRecord, CenterStore, Coordinates, Nearby};
use centerdir_source::{load_dataset, load_store, DatasetLocation, FetchOptions};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearestQuery {
    pub lat: f64,
    pub lng: f64,
    pub limit: usize,
    pub max_distance_km: Option<f64>,
    pub include_unlocated: bool,
}

fn location(config: &AppConfig, dataset: Option<&str>) -> DatasetLocation {
    DatasetLocation::parse(dataset.unwrap_or(&config.dataset))
}

/// Run the finder and apply the unlocated and distance filters.
pub(crate) fn select_nearest<'a>(
    store: &'a CenterStore,
    query: &NearestQuery,
) -> Vec<Nearby<'a, CenterRecord>> {
    store
        .nearest(Coordinates::new(query.lat, query.lng), query.limit)
        .into_iter()
        .filter(|n| query.include_unlocated || n.is_located())
        .filter(|n| {
            query
                .max_distance_km
                .is_none_or(|max| !n.is_located() || n.distance_km <= max)
        })
        .collect()
}

pub(crate) fn format_row(rank: usize, nearby: &Nearby<'_, CenterRecord>) -> String {
    let distance = if nearby.is_located() {
        format!("{:>9.2} km", nearby.distance_km)
    } else {
        format!("{:>12}", "-")
    };
    let center = nearby.center;
    format!(
        "{rank:>3}. {distance}  {:<14} {} ({}, {})",
        center.branch_code, center.name, center.district, center.state
    )
}

/// Print the centers nearest to a coordinate.
///
/// # Errors
///
/// Returns an error if the coordinate is out of range or the dataset cannot
/// be loaded.
pub(crate) async fn run_nearest(
    config: &AppConfig,
    dataset: Option<&str>,
    query: &NearestQuery,
    json: bool,
) -> anyhow::Result<()> {
    if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lng) {
        anyhow::bail!(
            "coordinates out of range: lat={}, lng={}",
            query.lat,
            query.lng
        );
    }

    let location = location(config, dataset);
    let store = load_store(&location, &FetchOptions::from_app_config(config))
        .await
        .with_context(|| format!("failed to load dataset from {location}"))?;
    let results = select_nearest(&store, query);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No centers found.");
        return Ok(());
    }
    for (idx, nearby) in results.iter().enumerate() {
        println!("{}", format_row(idx + 1, nearby));
    }
    Ok(())
}

/// Print dataset totals and the per-region breakdown.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded.
pub(crate) async fn run_stats(config: &AppConfig, dataset: Option<&str>) -> anyhow::Result<()> {
    let location = location(config, dataset);
    let dataset = load_dataset(&location, &FetchOptions::from_app_config(config))
        .await
        .with_context(|| format!("failed to load dataset from {location}"))?;
    let skipped = dataset.skipped;
    let store = CenterStore::from(dataset);

    println!("Dataset:   {location}");
    println!("Centers:   {}", store.len());
    println!("Located:   {}", store.located_count());
    println!("Unlocated: {}", store.len() - store.located_count());
    println!("Skipped:   {skipped}");

    let regions = store.regions();
    if !regions.is_empty() {
        println!();
        println!("{:<30} {:>7}", "Region", "Centers");
        for region in regions {
            println!("{:<30} {:>7}", region.name, region.center_count);
        }
    }
    Ok(())
}
