//! Source arbitration: the single entry point that runs DOM extraction,
//! falls back to captured payloads when the page exposed no tiles, and
//! converges both paths on the shared finalization pipeline.

use std::time::Instant;

use scraper::Html;
use url::Url;

use halfoff_core::{ExtractionResult, MIN_DISCOUNT_PCT};

use crate::capture::CapturedResponse;
use crate::error::EngineError;
use crate::pipeline::finalize_batch;
use crate::reconcile::{map_entry, select_best_candidate, DEFAULT_ALIASES};
use crate::tile::{extract_raw_tiles, tile_to_candidate, TileSelectors};

/// Extracts deep-discount products for one store page.
///
/// The DOM pass runs first. The captured-response fallback fires only when
/// zero raw tiles matched — tiles present but filtered out is a legitimate
/// "no deep discounts today" outcome, not a fallback trigger. When both
/// paths yield nothing the result is legitimately empty; the orchestration
/// layer decides whether that is worth escalating.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSelector`] when the tile selector
/// configuration is malformed. Data-shape problems never error.
pub fn run_extraction(
    page: &Html,
    captures: &[CapturedResponse],
    base_url: &Url,
    selectors: &TileSelectors,
) -> Result<ExtractionResult, EngineError> {
    let started = Instant::now();

    let tiles = extract_raw_tiles(page, selectors)?;
    let result = if tiles.is_empty() {
        tracing::debug!(store = %base_url, "no tiles matched, reconciling from captures");
        reconcile_from_captures(captures, base_url)
    } else {
        let raw_count = tiles.len();
        let candidates = tiles
            .into_iter()
            .map(|tile| tile_to_candidate(tile, base_url))
            .collect();
        finalize_batch(raw_count, candidates, MIN_DISCOUNT_PCT)
    };

    tracing::info!(
        store = %base_url,
        "{}",
        result.summary_line(started.elapsed().as_millis())
    );
    Ok(result)
}

fn reconcile_from_captures(captures: &[CapturedResponse], base_url: &Url) -> ExtractionResult {
    let Some(selected) = select_best_candidate(captures) else {
        tracing::warn!(store = %base_url, "no extractable data in DOM or captures");
        return ExtractionResult::default();
    };

    tracing::debug!(
        capture_url = selected.capture_url,
        path = %selected.path,
        entries = selected.entries.len(),
        "selected capture array"
    );

    let candidates = selected
        .entries
        .iter()
        .filter_map(|entry| map_entry(entry, base_url, &DEFAULT_ALIASES))
        .collect();
    finalize_batch(selected.entries.len(), candidates, MIN_DISCOUNT_PCT)
}
