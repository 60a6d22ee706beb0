//! DOM tile extraction from a rendered page snapshot.
//!
//! Storefront markup varies by page variant, so every field is located
//! through an ordered chain of alternatives tried in sequence — the chains
//! are policy data in [`TileSelectors`], not branching logic. Extraction is
//! a pure function of the snapshot; anything that fails to match simply
//! yields an empty field.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::EngineError;
use crate::pipeline::ProductCandidate;
use crate::price::extract_prices_from_text;

/// Ordered selector chains for every tile field, unioned across the known
/// page variants. First matching alternative wins; edit the lists, not the
/// extraction code.
#[derive(Debug, Clone)]
pub struct TileSelectors {
    /// Tile roots. Matches across all entries are unioned.
    pub tile: Vec<String>,
    /// Title-like sub-elements, before falling back to the link's own text.
    pub name: Vec<String>,
    /// Primary product anchor.
    pub link: Vec<String>,
    /// Image elements; attributes tried per element are `image_attrs`.
    pub image: Vec<String>,
    /// Attribute order for image URLs (lazy-loading variants).
    pub image_attrs: Vec<String>,
    /// Data attributes probed on the tile root, then on `sku_nested` matches.
    pub sku_attrs: Vec<String>,
    /// Nested elements probed for `sku_attrs` when the root carries none.
    pub sku_nested: Vec<String>,
    pub regular_price: Vec<String>,
    pub sale_price: Vec<String>,
    /// Last resort when neither price chain matches: every element whose
    /// class mentions "price", concatenated into one block.
    pub price_catchall: String,
}

impl Default for TileSelectors {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect();
        Self {
            tile: owned(&[
                ".product-tile",
                ".product-card",
                "[data-product-tile]",
                "li.product-grid-item",
                "div[class*='product-item']",
            ]),
            name: owned(&[
                ".product-title",
                ".product-name",
                "[data-automation-id='product-title']",
                "h2",
                "h3",
            ]),
            link: owned(&["a[href*='/p/']", "a[href*='product']", "a[href]"]),
            image: owned(&["img"]),
            image_attrs: owned(&["src", "data-src", "data-lazy"]),
            sku_attrs: owned(&["data-sku", "data-product-id", "data-item-id"]),
            sku_nested: owned(&["[data-sku]", "[data-product-id]", "[data-item-id]"]),
            regular_price: owned(&[
                ".price-was",
                ".regular-price",
                ".list-price",
                "[class*='strikethrough']",
                "del",
            ]),
            sale_price: owned(&[
                ".price-now",
                ".sale-price",
                ".special-price",
                "[class*='current-price']",
                "ins",
            ]),
            price_catchall: "[class*='price'], [class*='Price']".to_string(),
        }
    }
}

/// One tile's raw field values, locale-ambiguous price text included.
/// Ephemeral: discarded once normalized into a candidate.
#[derive(Debug, Clone, Default)]
pub struct RawTileData {
    pub name: String,
    /// Anchor `href` as found — possibly relative, resolved later.
    pub href: String,
    pub image: String,
    pub sku: String,
    pub regular_text: String,
    pub sale_text: String,
}

struct CompiledSelectors {
    tile: Vec<Selector>,
    name: Vec<Selector>,
    link: Vec<Selector>,
    image: Vec<Selector>,
    sku_nested: Vec<Selector>,
    regular_price: Vec<Selector>,
    sale_price: Vec<Selector>,
    price_catchall: Selector,
}

fn compile_one(raw: &str) -> Result<Selector, EngineError> {
    Selector::parse(raw).map_err(|e| EngineError::InvalidSelector {
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

fn compile_chain(raw: &[String]) -> Result<Vec<Selector>, EngineError> {
    raw.iter().map(|s| compile_one(s)).collect()
}

impl CompiledSelectors {
    fn compile(selectors: &TileSelectors) -> Result<Self, EngineError> {
        Ok(Self {
            tile: compile_chain(&selectors.tile)?,
            name: compile_chain(&selectors.name)?,
            link: compile_chain(&selectors.link)?,
            image: compile_chain(&selectors.image)?,
            sku_nested: compile_chain(&selectors.sku_nested)?,
            regular_price: compile_chain(&selectors.regular_price)?,
            sale_price: compile_chain(&selectors.sale_price)?,
            price_catchall: compile_one(&selectors.price_catchall)?,
        })
    }
}

/// Extracts raw field data for every tile on the page.
///
/// Returns an empty list when no tile selector matches — the caller treats
/// that as the fallback signal, not an error.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSelector`] when the selector configuration
/// itself is malformed. This is the structural-failure class: a collaborator
/// contract violation, never a data-shape outcome.
pub fn extract_raw_tiles(
    document: &Html,
    selectors: &TileSelectors,
) -> Result<Vec<RawTileData>, EngineError> {
    let compiled = CompiledSelectors::compile(selectors)?;

    // Union the tile selector strategies; the same element can match more
    // than one, so dedup by node identity while preserving discovery order.
    let mut seen = std::collections::HashSet::new();
    let mut tiles = Vec::new();
    for selector in &compiled.tile {
        for element in document.select(selector) {
            if seen.insert(element.id()) {
                tiles.push(element);
            }
        }
    }

    Ok(tiles
        .into_iter()
        .map(|tile| extract_tile_fields(tile, selectors, &compiled))
        .collect())
}

fn extract_tile_fields(
    tile: ElementRef<'_>,
    selectors: &TileSelectors,
    compiled: &CompiledSelectors,
) -> RawTileData {
    let name = first_text(tile, &compiled.name)
        .or_else(|| first_match(tile, &compiled.link).map(normalized_text))
        .unwrap_or_default();

    let href = first_match(tile, &compiled.link)
        .and_then(|el| el.value().attr("href"))
        .unwrap_or_default()
        .to_string();

    let image = first_match(tile, &compiled.image)
        .and_then(|el| first_attr(el, &selectors.image_attrs))
        .unwrap_or_default();

    let sku = first_attr(tile, &selectors.sku_attrs)
        .or_else(|| {
            compiled
                .sku_nested
                .iter()
                .filter_map(|sel| tile.select(sel).next())
                .find_map(|el| first_attr(el, &selectors.sku_attrs))
        })
        .unwrap_or_default();

    let mut regular_text = first_text(tile, &compiled.regular_price).unwrap_or_default();
    let sale_text = first_text(tile, &compiled.sale_price).unwrap_or_default();

    if regular_text.is_empty() && sale_text.is_empty() {
        // Last resort: concatenate everything price-classed under the tile
        // into one block; the was/now splitting happens in price resolution.
        regular_text = tile
            .select(&compiled.price_catchall)
            .map(normalized_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
    }

    RawTileData {
        name,
        href,
        image,
        sku,
        regular_text,
        sale_text,
    }
}

/// Per-tile price resolution, applied in order:
/// 1. first number of each text block;
/// 2. no sale price but the regular block held >= 2 numbers: the larger of
///    the first two is the regular price, the smaller the sale price
///    ("was/now" rendered in one block);
/// 3. sale price without a regular price: regular set equal to sale, which
///    yields no discount downstream rather than a guess.
#[must_use]
pub fn resolve_tile_prices(regular_text: &str, sale_text: &str) -> (Option<f64>, Option<f64>) {
    let regular_numbers = extract_prices_from_text(regular_text);
    let sale_numbers = extract_prices_from_text(sale_text);

    let mut regular = regular_numbers.first().copied();
    let mut sale = sale_numbers.first().copied();

    if sale.is_none() {
        if let (Some(&a), Some(&b)) = (regular_numbers.first(), regular_numbers.get(1)) {
            regular = Some(a.max(b));
            sale = Some(a.min(b));
        }
    }

    if regular.is_none() {
        regular = sale;
    }

    (regular, sale)
}

/// Normalizes one raw tile into a pipeline candidate, resolving the href
/// against the page's base URL. An unresolvable href leaves the URL empty,
/// and the pipeline drops the record.
pub(crate) fn tile_to_candidate(tile: RawTileData, base_url: &Url) -> ProductCandidate {
    let url = if tile.href.is_empty() {
        String::new()
    } else {
        base_url
            .join(&tile.href)
            .map(|u| u.to_string())
            .unwrap_or_default()
    };

    let (regular_price, sale_price) = resolve_tile_prices(&tile.regular_text, &tile.sale_text);

    ProductCandidate {
        name: tile.name,
        url,
        image: tile.image,
        sku: tile.sku,
        regular_price,
        sale_price,
    }
}

fn first_match<'a>(scope: ElementRef<'a>, chain: &[Selector]) -> Option<ElementRef<'a>> {
    chain.iter().find_map(|sel| scope.select(sel).next())
}

fn first_text(scope: ElementRef<'_>, chain: &[Selector]) -> Option<String> {
    chain
        .iter()
        .filter_map(|sel| scope.select(sel).next())
        .map(normalized_text)
        .find(|text| !text.is_empty())
}

fn first_attr(element: ElementRef<'_>, attrs: &[String]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|attr| element.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
