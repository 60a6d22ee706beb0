//! Reconciliation of products from captured network payloads.
//!
//! Invoked only when the DOM pass finds zero tiles — the page rendered from
//! client-side data the tile selectors cannot see, or served an empty/bot
//! state. The capture set is walked for the most plausible product array,
//! and each entry is mapped to a candidate through ordered alias paths.
//! Nothing in here raises on malformed data; absence always maps to
//! null/empty fields.

use serde_json::Value;
use url::Url;

use crate::capture::CapturedResponse;
use crate::pipeline::ProductCandidate;
use crate::price::parse_price;

/// Walk depth cap. Catalog payloads sit well under ten levels; the cap
/// bounds pathological or self-referential-looking inputs.
const MAX_WALK_DEPTH: usize = 32;

/// Container keys that mark an array as the product listing with high
/// confidence, checked before falling back to the longest generic array.
const CONTAINER_KEYS: &[&str] = &[
    "catalogEntryView",
    "products",
    "items",
    "results",
    "searchResults",
    "entries",
];

/// Ordered alias paths per product field. First present, non-null value
/// wins. Dotted paths descend objects; numeric segments index arrays
/// (`images.0.url`). Policy data — edit the lists, not the mapper.
pub(crate) struct FieldAliases {
    pub name: &'static [&'static str],
    pub url: &'static [&'static str],
    pub image: &'static [&'static str],
    pub sku: &'static [&'static str],
    pub regular_price: &'static [&'static str],
    pub sale_price: &'static [&'static str],
}

pub(crate) const DEFAULT_ALIASES: FieldAliases = FieldAliases {
    name: &[
        "name",
        "productName",
        "title",
        "shortDescription",
        "description",
        "label",
    ],
    url: &[
        "url",
        "pdpUrl",
        "productUrl",
        "seoUrl",
        "link",
        "href",
        "attributes.url",
    ],
    image: &[
        "image",
        "imageUrl",
        "thumbnailUrl",
        "images.0.url",
        "images.0",
        "media.image",
    ],
    sku: &["sku", "skuId", "itemId", "productId", "id"],
    regular_price: &[
        "regularPrice",
        "listPrice",
        "wasPrice",
        "originalPrice",
        "price.regular",
        "pricing.listPrice",
    ],
    sale_price: &[
        "salePrice",
        "currentPrice",
        "price.current",
        "pricing.salePrice",
        "nowPrice",
        "price",
    ],
};

/// A located array of object-shaped entries, tagged with the dotted path it
/// was found under.
#[derive(Debug)]
pub(crate) struct CandidateArray<'a> {
    pub path: String,
    pub entries: &'a [Value],
}

impl CandidateArray<'_> {
    /// The object key the array was registered under: the last path segment.
    fn container_key(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

/// The array chosen across all captures, with provenance for diagnostics.
#[derive(Debug)]
pub(crate) struct SelectedArray<'a> {
    pub capture_url: &'a str,
    pub path: String,
    pub entries: &'a [Value],
}

/// Finds every non-empty array of object-shaped entries in `root`,
/// registered under the object key it hangs from.
///
/// Uses an explicit worklist over `(value, path, depth)` instead of
/// recursion so arbitrarily nested payloads cannot exhaust the stack.
pub(crate) fn find_candidate_arrays(root: &Value) -> Vec<CandidateArray<'_>> {
    let mut candidates = Vec::new();
    let mut worklist = std::collections::VecDeque::new();
    worklist.push_back((root, String::new(), 0usize));

    while let Some((value, path, depth)) = worklist.pop_front() {
        if depth >= MAX_WALK_DEPTH {
            continue;
        }
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let child_path = join_path(&path, key);
                    if let Value::Array(entries) = child {
                        if !entries.is_empty() && entries.iter().all(Value::is_object) {
                            candidates.push(CandidateArray {
                                path: child_path.clone(),
                                entries,
                            });
                        }
                    }
                    worklist.push_back((child, child_path, depth + 1));
                }
            }
            Value::Array(entries) => {
                for (index, child) in entries.iter().enumerate() {
                    worklist.push_back((child, join_path(&path, &index.to_string()), depth + 1));
                }
            }
            _ => {}
        }
    }

    candidates
}

/// Picks the best candidate array across all captured responses.
///
/// Priority: the longest array under a well-known container key anywhere in
/// the capture set; failing that, the longest array the generic walk found.
/// Ties keep the first encountered, which is deterministic because the
/// buffer preserves append order. `None` is a legitimate no-data outcome.
pub(crate) fn select_best_candidate(captures: &[CapturedResponse]) -> Option<SelectedArray<'_>> {
    let mut best_known: Option<SelectedArray<'_>> = None;
    let mut best_generic: Option<SelectedArray<'_>> = None;

    for capture in captures {
        let Some(json) = &capture.json else { continue };
        for candidate in find_candidate_arrays(json) {
            let selected = SelectedArray {
                capture_url: &capture.url,
                path: candidate.path.clone(),
                entries: candidate.entries,
            };
            let slot = if CONTAINER_KEYS.contains(&candidate.container_key()) {
                &mut best_known
            } else {
                &mut best_generic
            };
            if slot
                .as_ref()
                .is_none_or(|best| selected.entries.len() > best.entries.len())
            {
                *slot = Some(selected);
            }
        }
    }

    best_known.or(best_generic)
}

/// Maps one array entry to a pipeline candidate.
///
/// Returns `None` when no name or no resolvable URL is present — the record
/// cannot survive emission anyway. Every other absent or malformed field
/// degrades to null/empty.
pub(crate) fn map_entry(
    entry: &Value,
    base_url: &Url,
    aliases: &FieldAliases,
) -> Option<ProductCandidate> {
    let name = string_field(entry, aliases.name)?;

    let url = string_field(entry, aliases.url)
        .and_then(|raw| base_url.join(&raw).ok())
        .map(|u| u.to_string())?;

    Some(ProductCandidate {
        name,
        url,
        image: string_field(entry, aliases.image).unwrap_or_default(),
        sku: id_field(entry, aliases.sku).unwrap_or_default(),
        regular_price: numeric_field(entry, aliases.regular_price),
        sale_price: numeric_field(entry, aliases.sale_price),
    })
}

/// First present, non-null value among the alias paths.
fn first_present<'a>(entry: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|path| lookup_path(entry, path))
}

/// Resolves a dotted alias path. Numeric segments index arrays. A `null`
/// leaf counts as absent so the alias chain keeps looking.
fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match segment.parse::<usize>() {
            Ok(index) => current.as_array()?.get(index)?,
            Err(_) => current.as_object()?.get(segment)?,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn string_field(entry: &Value, aliases: &[&str]) -> Option<String> {
    let value = first_present(entry, aliases)?;
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Identifiers arrive as strings or bare numbers; numbers are rendered
/// verbatim.
fn id_field(entry: &Value, aliases: &[&str]) -> Option<String> {
    let value = first_present(entry, aliases)?;
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Prices arrive as native numbers or as locale-ambiguous strings; strings
/// go through the same parser as DOM price text.
fn numeric_field(entry: &Value, aliases: &[&str]) -> Option<f64> {
    let value = first_present(entry, aliases)?;
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

fn join_path(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{base}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::capture::CapturedResponse;

    fn make_capture(url: &str, body: Value) -> CapturedResponse {
        let mut response =
            CapturedResponse::new(url, "application/json", 200, "xhr", body.to_string());
        response.json = Some(body);
        response
    }

    fn base() -> Url {
        Url::parse("https://store.example.com").expect("valid url")
    }

    // -----------------------------------------------------------------------
    // Candidate discovery
    // -----------------------------------------------------------------------

    #[test]
    fn finds_nested_object_arrays_with_paths() {
        let body = json!({
            "data": {
                "search": {
                    "products": [{"name": "a"}, {"name": "b"}]
                }
            }
        });
        let candidates = find_candidate_arrays(&body);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].path, "data.search.products");
        assert_eq!(candidates[0].entries.len(), 2);
    }

    #[test]
    fn ignores_arrays_of_scalars_and_empty_arrays() {
        let body = json!({
            "ids": [1, 2, 3],
            "empty": [],
            "mixed": [{"a": 1}, "not an object"]
        });
        assert!(find_candidate_arrays(&body).is_empty());
    }

    #[test]
    fn descends_through_arrays_to_nested_candidates() {
        let body = json!({
            "modules": [
                {"rows": [{"sku": "1"}, {"sku": "2"}, {"sku": "3"}]}
            ]
        });
        let candidates = find_candidate_arrays(&body);
        let paths: Vec<&str> = candidates.iter().map(|c| c.path.as_str()).collect();
        assert!(paths.contains(&"modules"));
        assert!(paths.contains(&"modules.0.rows"));
    }

    #[test]
    fn depth_cap_terminates_on_deep_nesting() {
        let mut body = json!({"products": [{"name": "leaf"}]});
        for _ in 0..200 {
            body = json!({ "wrap": body });
        }
        // Must terminate; the candidate sits far below the cap and is skipped.
        assert!(find_candidate_arrays(&body).is_empty());
    }

    // -----------------------------------------------------------------------
    // Best-match selection
    // -----------------------------------------------------------------------

    #[test]
    fn prefers_well_known_key_over_longer_generic_array() {
        let captures = vec![
            make_capture(
                "https://store.example.com/api/search",
                json!({"products": [
                    {"name": "a"}, {"name": "b"}, {"name": "c"}, {"name": "d"}, {"name": "e"}
                ]}),
            ),
            make_capture(
                "https://store.example.com/api/telemetry-items",
                json!({"payload": {"unrecognizedBlob": [
                    {"x": 1}, {"x": 2}, {"x": 3}, {"x": 4}, {"x": 5}, {"x": 6}, {"x": 7}
                ]}}),
            ),
        ];
        let selected = select_best_candidate(&captures).expect("a candidate");
        assert_eq!(selected.path, "products");
        assert_eq!(selected.entries.len(), 5);
        assert_eq!(selected.capture_url, "https://store.example.com/api/search");
    }

    #[test]
    fn ranks_well_known_arrays_by_length_across_captures() {
        let captures = vec![
            make_capture(
                "https://store.example.com/api/one",
                json!({"items": [{"a": 1}, {"a": 2}]}),
            ),
            make_capture(
                "https://store.example.com/api/two",
                json!({"results": [{"a": 1}, {"a": 2}, {"a": 3}]}),
            ),
        ];
        let selected = select_best_candidate(&captures).expect("a candidate");
        assert_eq!(selected.path, "results");
    }

    #[test]
    fn falls_back_to_longest_generic_array() {
        let captures = vec![make_capture(
            "https://store.example.com/api/page-data",
            json!({
                "blobA": [{"a": 1}],
                "blobB": [{"a": 1}, {"a": 2}, {"a": 3}]
            }),
        )];
        let selected = select_best_candidate(&captures).expect("a candidate");
        assert_eq!(selected.path, "blobB");
    }

    #[test]
    fn no_candidates_is_none_not_an_error() {
        let captures = vec![make_capture(
            "https://store.example.com/api/config",
            json!({"flags": {"darkMode": true}}),
        )];
        assert!(select_best_candidate(&captures).is_none());
    }

    #[test]
    fn captures_without_parsed_json_are_skipped() {
        let response = CapturedResponse::new(
            "https://store.example.com/api/search",
            "application/json",
            200,
            "xhr",
            "not json",
        );
        assert!(select_best_candidate(&[response]).is_none());
    }

    // -----------------------------------------------------------------------
    // Field mapping
    // -----------------------------------------------------------------------

    #[test]
    fn maps_entry_with_primary_aliases() {
        let entry = json!({
            "name": "Cast Iron Skillet",
            "url": "/p/cast-iron-skillet",
            "image": "https://cdn.example.com/skillet.jpg",
            "sku": "449872",
            "regularPrice": 39.99,
            "salePrice": 19.99
        });
        let candidate = map_entry(&entry, &base(), &DEFAULT_ALIASES).expect("mapped");
        assert_eq!(candidate.name, "Cast Iron Skillet");
        assert_eq!(candidate.url, "https://store.example.com/p/cast-iron-skillet");
        assert_eq!(candidate.sku, "449872");
        assert_eq!(candidate.regular_price, Some(39.99));
        assert_eq!(candidate.sale_price, Some(19.99));
    }

    #[test]
    fn maps_entry_with_fallback_aliases_and_nested_paths() {
        let entry = json!({
            "productName": "Stand Mixer",
            "pdpUrl": "https://store.example.com/p/mixer",
            "images": [{"url": "https://cdn.example.com/mixer.jpg"}],
            "productId": 88123,
            "price": {"regular": "49,99", "current": "24,99"}
        });
        let candidate = map_entry(&entry, &base(), &DEFAULT_ALIASES).expect("mapped");
        assert_eq!(candidate.name, "Stand Mixer");
        assert_eq!(candidate.image, "https://cdn.example.com/mixer.jpg");
        assert_eq!(candidate.sku, "88123");
        assert_eq!(candidate.regular_price, Some(49.99));
        assert_eq!(candidate.sale_price, Some(24.99));
    }

    #[test]
    fn null_aliases_keep_looking_down_the_chain() {
        let entry = json!({
            "name": null,
            "title": "Le Creuset Kettle",
            "url": "/p/kettle"
        });
        let candidate = map_entry(&entry, &base(), &DEFAULT_ALIASES).expect("mapped");
        assert_eq!(candidate.name, "Le Creuset Kettle");
    }

    #[test]
    fn entry_without_any_url_alias_is_dropped() {
        let entry = json!({"name": "Orphan Product", "salePrice": 5.0});
        assert!(map_entry(&entry, &base(), &DEFAULT_ALIASES).is_none());
    }

    #[test]
    fn entry_without_name_is_dropped() {
        let entry = json!({"url": "/p/nameless"});
        assert!(map_entry(&entry, &base(), &DEFAULT_ALIASES).is_none());
    }

    #[test]
    fn batch_with_some_urlless_entries_yields_the_rest() {
        let entries: Vec<Value> = (0..10)
            .map(|i| {
                if i < 3 {
                    json!({"name": format!("No URL {i}"), "salePrice": 1.0})
                } else {
                    json!({"name": format!("Product {i}"), "url": format!("/p/{i}")})
                }
            })
            .collect();
        let mapped: Vec<_> = entries
            .iter()
            .filter_map(|e| map_entry(e, &base(), &DEFAULT_ALIASES))
            .collect();
        assert_eq!(mapped.len(), 7);
    }

    #[test]
    fn malformed_price_fields_degrade_to_none() {
        let entry = json!({
            "name": "Glitch Product",
            "url": "/p/glitch",
            "regularPrice": {"amount": 10},
            "salePrice": "call for price"
        });
        let candidate = map_entry(&entry, &base(), &DEFAULT_ALIASES).expect("mapped");
        assert_eq!(candidate.regular_price, None);
        assert_eq!(candidate.sale_price, None);
    }

    #[test]
    fn lookup_path_indexes_arrays_once() {
        let value = json!({"images": [{"url": "first"}, {"url": "second"}]});
        assert_eq!(
            lookup_path(&value, "images.0.url").and_then(Value::as_str),
            Some("first")
        );
        assert_eq!(lookup_path(&value, "images.5.url"), None);
    }
}
