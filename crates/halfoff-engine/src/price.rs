//! Price text normalization and discount math.
//!
//! Storefronts render prices with mixed decimal/thousands separators and
//! arbitrary currency decoration; intercepted payloads return them as either
//! numbers or strings. Everything funnels through [`parse_price`] so both
//! extraction paths agree on numeric semantics.

use regex::Regex;

/// Parses free-form price text into a number.
///
/// Strips everything but digits, `.` and `,`, then disambiguates separators:
/// - both present: the rightmost one is the decimal point, the other is
///   thousands grouping and is stripped (`"1,234.56"` and `"1.234,56"` both
///   read 1234.56);
/// - only `,`: a single comma followed by one or two digits is the decimal
///   separator (`"19,99"`); any other shape is thousands grouping
///   (`"$1,234"`, `"1,234,567"`).
///
/// Returns `None` on empty or non-finite results. Two-digit groupings such
/// as `"12,34"` remain ambiguous and read as a decimal.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let has_dot = cleaned.contains('.');
    let has_comma = cleaned.contains(',');

    let normalized = match (has_dot, has_comma) {
        (true, true) => {
            if cleaned.rfind('.') > cleaned.rfind(',') {
                cleaned.replace(',', "")
            } else {
                cleaned.replace('.', "").replace(',', ".")
            }
        }
        (false, true) => {
            let decimal_comma = cleaned.matches(',').count() == 1
                && cleaned
                    .rsplit(',')
                    .next()
                    .is_some_and(|frac| (1..=2).contains(&frac.len()));
            if decimal_comma {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        _ => cleaned,
    };

    let value = normalized.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Finds every numeric substring in `text` and parses each independently.
///
/// Order of appearance is preserved and duplicates are retained, so callers
/// can reason about "was/now" pairs rendered in a single block.
#[must_use]
pub fn extract_prices_from_text(text: &str) -> Vec<f64> {
    let re = Regex::new(r"\d+(?:[.,]\d+)*").expect("valid regex");
    re.find_iter(text)
        .filter_map(|m| parse_price(m.as_str()))
        .collect()
}

/// Computes the rounded percentage off, or `None` when no genuine discount
/// exists (missing or non-positive prices, or sale >= regular — inverted
/// data is treated the same as no discount).
///
/// Rounding is nearest-integer half-up; the 50% threshold applied downstream
/// is inclusive.
#[must_use]
pub fn compute_discount_pct(regular: Option<f64>, sale: Option<f64>) -> Option<u8> {
    let (regular, sale) = (regular?, sale?);
    if regular <= 0.0 || sale <= 0.0 || sale >= regular {
        return None;
    }
    // sale < regular with both positive, so pct lands in (0.0, 100.0].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = (100.0 * (regular - sale) / regular).round() as u8;
    Some(pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // parse_price
    // -----------------------------------------------------------------------

    #[test]
    fn parses_plain_decimal() {
        assert_eq!(parse_price("19.99"), Some(19.99));
    }

    #[test]
    fn parses_comma_decimal() {
        assert_eq!(parse_price("19,99"), Some(19.99));
    }

    #[test]
    fn parses_us_thousands_with_cents() {
        assert_eq!(parse_price("1,234.56"), Some(1234.56));
    }

    #[test]
    fn parses_eu_thousands_with_cents() {
        assert_eq!(parse_price("1.234,56"), Some(1234.56));
    }

    #[test]
    fn parses_thousands_without_cents() {
        assert_eq!(parse_price("$1,234"), Some(1234.0));
    }

    #[test]
    fn parses_repeated_thousands_groups() {
        assert_eq!(parse_price("1,234,567"), Some(1_234_567.0));
    }

    #[test]
    fn strips_currency_decoration() {
        assert_eq!(parse_price("Now: $24.99!"), Some(24.99));
        assert_eq!(parse_price("EUR 12,50"), Some(12.5));
    }

    #[test]
    fn two_digit_grouping_reads_as_decimal() {
        // Documented ambiguity: a lone comma with a two-digit tail is
        // indistinguishable from a cents separator.
        assert_eq!(parse_price("12,34"), Some(12.34));
    }

    #[test]
    fn returns_none_for_empty_or_non_numeric() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("Call for price"), None);
        assert_eq!(parse_price("$"), None);
    }

    #[test]
    fn returns_none_for_garbled_separators() {
        assert_eq!(parse_price("1.2.3"), None);
    }

    // -----------------------------------------------------------------------
    // extract_prices_from_text
    // -----------------------------------------------------------------------

    #[test]
    fn extracts_single_price() {
        assert_eq!(extract_prices_from_text("Sale $9.99"), vec![9.99]);
    }

    #[test]
    fn extracts_was_now_pair_in_order() {
        assert_eq!(
            extract_prices_from_text("Was $39.99 Now $19.99"),
            vec![39.99, 19.99]
        );
    }

    #[test]
    fn extracts_combined_block() {
        assert_eq!(extract_prices_from_text("$10 $25"), vec![10.0, 25.0]);
    }

    #[test]
    fn retains_duplicates() {
        assert_eq!(extract_prices_from_text("$5.00 / $5.00"), vec![5.0, 5.0]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(extract_prices_from_text("Out of stock").is_empty());
    }

    // -----------------------------------------------------------------------
    // compute_discount_pct
    // -----------------------------------------------------------------------

    #[test]
    fn half_off_is_fifty() {
        assert_eq!(compute_discount_pct(Some(100.0), Some(50.0)), Some(50));
    }

    #[test]
    fn forty_percent_off() {
        assert_eq!(compute_discount_pct(Some(100.0), Some(60.0)), Some(40));
    }

    #[test]
    fn equal_prices_mean_no_discount() {
        assert_eq!(compute_discount_pct(Some(100.0), Some(100.0)), None);
    }

    #[test]
    fn inverted_prices_mean_no_discount() {
        assert_eq!(compute_discount_pct(Some(100.0), Some(120.0)), None);
    }

    #[test]
    fn missing_either_price_means_no_discount() {
        assert_eq!(compute_discount_pct(None, Some(50.0)), None);
        assert_eq!(compute_discount_pct(Some(100.0), None), None);
    }

    #[test]
    fn non_positive_prices_mean_no_discount() {
        assert_eq!(compute_discount_pct(Some(0.0), Some(0.0)), None);
        assert_eq!(compute_discount_pct(Some(-10.0), Some(-20.0)), None);
    }

    #[test]
    fn rounds_half_up() {
        // 37.5% → 38, 50.5% → 51.
        assert_eq!(compute_discount_pct(Some(8.0), Some(5.0)), Some(38));
        assert_eq!(compute_discount_pct(Some(200.0), Some(99.0)), Some(51));
        // 33.33…% → 33.
        assert_eq!(compute_discount_pct(Some(3.0), Some(2.0)), Some(33));
    }
}
