pub mod app_config;
pub mod centers;
pub mod config;
pub mod dataset;
pub mod diff;
pub mod geo;
pub mod store;

pub use app_config::{AppConfig, Environment};
pub use centers::{slugify, Address, CenterRecord, Coordinates, Locatable};
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{load_dataset, parse_dataset, Dataset, DatasetError};
pub use diff::{canonicalize, diff_datasets, Change, ChangeKind, DiffSummary};
pub use geo::{find_nearest, haversine_km, Nearby, EARTH_RADIUS_KM};
pub use store::{AreaSummary, CenterStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
