//! Clean-up of the "Covers:" text in manual listings
//!
//! Listings state coverage as `"<from> <to> <Make Model>, <Make Model>"` with
//! the years at fixed character offsets, e.g.
//! `"1964 1972 Chevrolet Chevelle, Chevrolet Camaro"`.

use indexmap::IndexMap;

/// Collapse the year pair and repeated manufacturer names
///
/// * `"1993 1993 Chevrolet Camaro"` → `"1993 Chevrolet Camaro"`
/// * `"1982 1992 Chevrolet Camaro"` → `"1982-1992 Chevrolet Camaro"`
/// * `"1964 1972 Chevrolet Chevelle, Chevrolet Camaro, Pontiac GTO"`
///   → `"1964-1972 Chevrolet Chevelle, Camaro, Pontiac GTO"`
///
/// Models without a manufacturer (no space after a non-empty prefix) are
/// dropped. Input shorter than the fixed offsets gives empty parts.
#[must_use]
pub fn fix_covered_model_text(raw: &str) -> String {
    let begin = char_range(raw, 0, Some(4));
    let end = char_range(raw, 5, Some(9));
    let models = char_range(raw, 10, None);

    let date = if begin == end {
        begin
    } else {
        format!("{begin}-{end}")
    };

    let mut makes: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for model in models.split(", ") {
        if let Some(idx) = model.find(' ').filter(|&idx| idx > 0) {
            makes
                .entry(&model[..idx])
                .or_default()
                .push(&model[idx + 1..]);
        }
    }

    let text = makes
        .iter()
        .map(|(mfr, names)| format!("{mfr} {}", names.join(", ")))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{date} {text}")
}

/// Characters `start..end` of `s` (by `char`, not byte), clamped to its length
fn char_range(s: &str, start: usize, end: Option<usize>) -> String {
    let take = end.map_or(usize::MAX, |end| end.saturating_sub(start));
    s.chars().skip(start).take(take).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_year() {
        assert_eq!(
            fix_covered_model_text("1993 1993 Chevrolet Camaro"),
            "1993 Chevrolet Camaro"
        );
    }

    #[test]
    fn test_year_range() {
        assert_eq!(
            fix_covered_model_text("1982 1992 Chevrolet Camaro"),
            "1982-1992 Chevrolet Camaro"
        );
    }

    #[test]
    fn test_repeated_manufacturer_collapsed() {
        assert_eq!(
            fix_covered_model_text(
                "1960 1969 Chevrolet Chevelle, Chevrolet Camaro, Chevrolet Corvair"
            ),
            "1960-1969 Chevrolet Chevelle, Camaro, Corvair"
        );
    }

    #[test]
    fn test_manufacturers_keep_first_seen_order() {
        assert_eq!(
            fix_covered_model_text(
                "1964 1972 Pontiac GTO, Chevrolet Chevelle, Pontiac Tempest, Chevrolet El Camino"
            ),
            "1964-1972 Pontiac GTO, Tempest, Chevrolet Chevelle, El Camino"
        );
    }

    #[test]
    fn test_model_without_manufacturer_dropped() {
        assert_eq!(
            fix_covered_model_text("1970 1970 Chevrolet Nova, Trucks"),
            "1970 Chevrolet Nova"
        );
    }

    #[test]
    fn test_short_input_does_not_panic() {
        assert_eq!(fix_covered_model_text(""), " ");
        assert_eq!(fix_covered_model_text("1960"), "1960- ");
    }

    #[test]
    fn test_offsets_count_characters() {
        assert_eq!(
            fix_covered_model_text("1955 1957 Citroën DS, Citroën 2CV"),
            "1955-1957 Citroën DS, 2CV"
        );
    }
}
