//! Extraction & reconciliation engine for clearance listings.
//!
//! Turns two unreliable sources collected during a store page load — the
//! rendered DOM tiles and the intercepted network responses — into one
//! normalized, deduplicated list of products discounted at least 50%.
//! The engine is synchronous logic over already-collected data; browser
//! orchestration and persistence live with its collaborators.

pub mod capture;
pub mod engine;
pub mod error;
mod pipeline;
pub mod price;
mod reconcile;
pub mod tile;

pub use capture::{CaptureBuffer, CaptureConfig, CapturedResponse};
pub use engine::run_extraction;
pub use error::EngineError;
pub use price::{compute_discount_pct, extract_prices_from_text, parse_price};
pub use tile::{extract_raw_tiles, resolve_tile_prices, RawTileData, TileSelectors};
