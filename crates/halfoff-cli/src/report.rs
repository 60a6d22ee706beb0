//! Per-store report persistence: pretty JSON or CSV.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use halfoff_core::{ExtractionResult, Product};
use serde::Serialize;
use url::Url;

/// The persisted shape for one store's extraction run.
#[derive(Debug, Serialize)]
pub struct StoreReport<'a> {
    /// Storefront origin the run targeted.
    pub store: String,
    pub generated_at: DateTime<Utc>,
    pub tiles: usize,
    pub parsed: usize,
    pub kept: usize,
    pub products: &'a [Product],
}

impl<'a> StoreReport<'a> {
    #[must_use]
    pub fn new(base_url: &Url, result: &'a ExtractionResult) -> Self {
        Self {
            store: base_url.origin().ascii_serialization(),
            generated_at: Utc::now(),
            tiles: result.raw_count,
            parsed: result.parsed_count,
            kept: result.kept_count,
            products: &result.products,
        }
    }
}

/// Writes the report as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error when the file cannot be written or serialized.
pub fn write_json(path: &Path, report: &StoreReport<'_>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("cannot serialize report")?;
    fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))
}

/// Writes the report's product rows as CSV.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub fn write_csv(path: &Path, report: &StoreReport<'_>) -> anyhow::Result<()> {
    fs::write(path, render_csv(report.products))
        .with_context(|| format!("cannot write {}", path.display()))
}

const CSV_HEADER: &str = "name,url,image,sku,regular_price,sale_price,discount_pct";

fn render_csv(products: &[Product]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for product in products {
        let row = [
            csv_field(&product.name),
            csv_field(&product.url),
            csv_field(&product.image),
            csv_field(&product.sku),
            product.regular_price.map(|v| v.to_string()).unwrap_or_default(),
            product.sale_price.map(|v| v.to_string()).unwrap_or_default(),
            product
                .discount_pct
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Quotes a field only when it needs it (separator, quote, or newline).
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(name: &str) -> Product {
        Product {
            name: name.to_string(),
            url: "https://store.example.com/p/1".to_string(),
            image: String::new(),
            sku: "449872".to_string(),
            regular_price: Some(39.99),
            sale_price: Some(19.99),
            discount_pct: Some(50),
        }
    }

    #[test]
    fn renders_header_and_rows() {
        let csv = render_csv(&[make_product("Cast Iron Skillet")]);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("name,url,image,sku,regular_price,sale_price,discount_pct")
        );
        assert_eq!(
            lines.next(),
            Some("Cast Iron Skillet,https://store.example.com/p/1,,449872,39.99,19.99,50")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn quotes_fields_containing_separators_and_quotes() {
        let mut product = make_product("Skillet, 12\" Lodge");
        product.regular_price = None;
        product.sale_price = None;
        product.discount_pct = None;
        let csv = render_csv(&[product]);
        let row = csv.lines().nth(1).expect("one row");
        assert!(row.starts_with(r#""Skillet, 12"" Lodge","#));
        assert!(row.ends_with(",,,"));
    }

    #[test]
    fn empty_batch_renders_header_only() {
        let csv = render_csv(&[]);
        assert_eq!(csv, "name,url,image,sku,regular_price,sale_price,discount_pct\n");
    }
}
