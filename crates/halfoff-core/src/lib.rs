pub mod app_config;
pub mod config;
pub mod products;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{ExtractionResult, Product, MIN_DISCOUNT_PCT};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
