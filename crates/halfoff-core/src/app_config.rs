use std::path::PathBuf;

/// Runtime configuration for a collection run, loaded from environment
/// variables by [`crate::config::load_app_config`]. Every field has a
/// default, so an empty environment is valid.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Directory where per-store reports are written.
    pub output_dir: PathBuf,
    /// Maximum intercepted responses retained per page load.
    pub max_captures: usize,
    /// Responses with bodies smaller than this are discarded as
    /// trivial/non-candidate payloads.
    pub min_body_bytes: usize,
    /// Responses with bodies larger than this are discarded to bound memory.
    pub max_body_bytes: usize,
}
