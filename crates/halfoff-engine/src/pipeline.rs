//! Shared finalization pipeline: both extraction paths converge here so
//! downstream consumers never need to know which source produced a record.

use std::collections::HashSet;

use halfoff_core::{ExtractionResult, Product};

use crate::price::compute_discount_pct;

/// An intermediate record produced by either extraction path, before
/// dedup and the discount filter.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProductCandidate {
    pub name: String,
    /// Absolute URL. Empty when the source record had none or it could not
    /// be resolved; such candidates never become products.
    pub url: String,
    pub image: String,
    pub sku: String,
    pub regular_price: Option<f64>,
    pub sale_price: Option<f64>,
}

/// Turns a batch of candidates into the final [`ExtractionResult`].
///
/// - `raw_count` is the number of source records walked (tiles matched or
///   array entries), which may exceed `candidates.len()` when records were
///   dropped during mapping.
/// - a candidate counts as parsed when it has a name and a finite sale price;
/// - URLs are claimed first-occurrence-wins before the discount filter, so a
///   duplicate never resurrects a URL its first occurrence failed to keep;
/// - the discount filter keeps `discount_pct >= min_discount_pct`, inclusive.
pub(crate) fn finalize_batch(
    raw_count: usize,
    candidates: Vec<ProductCandidate>,
    min_discount_pct: u8,
) -> ExtractionResult {
    let mut parsed_count = 0;
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut products = Vec::new();

    for candidate in candidates {
        if !candidate.name.is_empty() && candidate.sale_price.is_some_and(f64::is_finite) {
            parsed_count += 1;
        }

        let discount_pct = compute_discount_pct(candidate.regular_price, candidate.sale_price);
        let product = Product {
            name: candidate.name,
            url: candidate.url,
            image: candidate.image,
            sku: candidate.sku,
            regular_price: candidate.regular_price,
            sale_price: candidate.sale_price,
            discount_pct,
        };

        if !product.has_identity() {
            continue;
        }
        if !seen_urls.insert(product.url.clone()) {
            continue;
        }
        if discount_pct.is_some_and(|p| p >= min_discount_pct) {
            products.push(product);
        }
    }

    ExtractionResult {
        raw_count,
        parsed_count,
        kept_count: products.len(),
        products,
    }
}
