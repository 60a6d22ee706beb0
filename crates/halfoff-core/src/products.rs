use serde::{Deserialize, Serialize};

/// Minimum discount percentage a [`Product`] must carry to be emitted.
/// The threshold is inclusive: exactly 50 is kept.
pub const MIN_DISCOUNT_PCT: u8 = 50;

/// A clearance product extracted from one store's listing page, normalized
/// so that downstream consumers never need to know whether it came from the
/// rendered DOM or an intercepted network payload.
///
/// Constructed once per unique source record, filtered immediately, never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Display name. Always non-empty for an emitted product.
    pub name: String,
    /// Absolute product-page URL. The deduplication key within a batch.
    pub url: String,
    /// Product image URL. May be empty when no source exposed one.
    pub image: String,
    /// Retailer SKU or item identifier. May be empty.
    pub sku: String,
    /// Pre-discount price, when one could be parsed.
    pub regular_price: Option<f64>,
    /// Current (sale) price, when one could be parsed.
    pub sale_price: Option<f64>,
    /// Rounded percentage off, 0–100. Emitted products always carry
    /// `Some(p)` with `p >= MIN_DISCOUNT_PCT`.
    pub discount_pct: Option<u8>,
}

impl Product {
    /// Returns `true` if this product clears the inclusive deep-discount bar.
    #[must_use]
    pub fn is_deep_discount(&self) -> bool {
        self.discount_pct.is_some_and(|p| p >= MIN_DISCOUNT_PCT)
    }

    /// Returns `true` if the record carries the fields required for emission
    /// (non-empty name and URL). Pricing is validated separately.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        !self.name.is_empty() && !self.url.is_empty()
    }
}

/// The contract handed back to the orchestration layer after one store's
/// extraction: the surviving products plus enough counts for operational
/// logging without inspecting Engine internals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Raw candidates seen (DOM tiles matched, or JSON array entries walked).
    pub raw_count: usize,
    /// Candidates that yielded both a name and a finite sale price.
    pub parsed_count: usize,
    /// Candidates surviving the discount filter and URL dedup.
    pub kept_count: usize,
    pub products: Vec<Product>,
}

impl ExtractionResult {
    /// Returns `true` when no products survived. An empty result is a
    /// legitimate outcome (no deep discounts today), not an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// One-line operational summary in the shape the collection logs expect.
    #[must_use]
    pub fn summary_line(&self, elapsed_ms: u128) -> String {
        format!(
            "tiles={} parsed={} kept50={} ms={elapsed_ms}",
            self.raw_count, self.parsed_count, self.kept_count
        )
    }
}
