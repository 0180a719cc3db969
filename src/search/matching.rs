//! Final in-memory predicate and dedup over cascade candidates.
//!
//! The store-side strategies over-fetch on purpose; this pass is what decides
//! which candidates actually answer the query. Deterministic given its
//! inputs: dedup keeps the first occurrence per id, output order is the
//! discovery order of the cascade.

use std::collections::HashSet;

use super::dimensions::DimensionTuple;
use super::normalize::{normalize, space_separators, strip_whitespace};
use crate::models::CatalogItem;

/// Absolute tolerance for dimension comparison.
pub const DIMENSION_TOLERANCE: f64 = 0.01;

/// Per-request match context, derived once from the raw query.
#[derive(Debug, Clone)]
pub struct MatchContext {
    /// Canonical query form; also the cache key.
    normalized: String,
    /// Lower-cased query with separators rewritten to `" x "`.
    spaced: String,
    /// Same, with all whitespace stripped.
    spaced_compact: String,
    pub dimensions: Option<DimensionTuple>,
}

impl MatchContext {
    pub fn new(query: &str) -> Self {
        let spaced = space_separators(&query.to_lowercase(), false);
        Self {
            normalized: normalize(query),
            spaced_compact: strip_whitespace(&spaced),
            spaced,
            dimensions: DimensionTuple::from_query(query),
        }
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Final keep/drop decision for one candidate.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.name_matches(item) || self.dimension_matches(item)
    }

    /// Normalized item name contains the normalized query, or the raw
    /// lower-cased name contains the `" x "`-spaced query, or the same with
    /// whitespace stripped on both sides.
    pub fn name_matches(&self, item: &CatalogItem) -> bool {
        if normalize(&item.name).contains(&self.normalized) {
            return true;
        }
        let name_lower = item.name.to_lowercase();
        if name_lower.contains(&self.spaced) {
            return true;
        }
        strip_whitespace(&name_lower).contains(&self.spaced_compact)
    }

    /// Tolerance comparison against the item's numeric attributes. 3-value
    /// queries require all of height/width/length present and matching in
    /// order; 2-value queries accept any of the three field pairings. Items
    /// lacking the needed attributes simply don't dimension-match and fall
    /// through to the name predicate.
    pub fn dimension_matches(&self, item: &CatalogItem) -> bool {
        let Some(dims) = &self.dimensions else {
            return false;
        };
        let wanted = dims.values();
        match wanted.len() {
            3 => match (item.height, item.width, item.length) {
                (Some(height), Some(width), Some(length)) => {
                    approx(height, wanted[0])
                        && approx(width, wanted[1])
                        && approx(length, wanted[2])
                }
                _ => false,
            },
            2 => [
                (item.height, item.width),
                (item.height, item.length),
                (item.width, item.length),
            ]
            .iter()
            .any(|pair| match pair {
                (Some(first), Some(second)) => {
                    approx(*first, wanted[0]) && approx(*second, wanted[1])
                }
                _ => false,
            }),
            _ => false,
        }
    }
}

fn approx(actual: f64, wanted: f64) -> bool {
    (actual - wanted).abs() <= DIMENSION_TOLERANCE
}

/// Deduplicates by id (first occurrence wins), applies the final predicate
/// and truncates to `limit`, preserving accumulation order.
pub fn filter_and_dedup(
    candidates: Vec<CatalogItem>,
    ctx: &MatchContext,
    limit: usize,
) -> Vec<CatalogItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for item in candidates {
        if !seen.insert(item.id.clone()) {
            continue;
        }
        if !ctx.matches(&item) {
            continue;
        }
        out.push(item);
        if out.len() == limit {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, dims: Option<(f64, f64, f64)>) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            category: Some("Maderas".to_string()),
            height: dims.map(|d| d.0),
            width: dims.map(|d| d.1),
            length: dims.map(|d| d.2),
            unit: None,
            price: None,
            stock: None,
        }
    }

    #[test]
    fn test_name_match_variants() {
        let ctx = MatchContext::new("TABLA");
        assert!(ctx.name_matches(&item("1", "Tabla Pino", None)));

        let ctx = MatchContext::new("cañeria");
        assert!(ctx.name_matches(&item("2", "Cañería PVC", None)));

        let ctx = MatchContext::new("1x4x4");
        assert!(ctx.name_matches(&item("3", "Tabla Pino 1 x 4 x 4", None)));
        assert!(ctx.name_matches(&item("4", "Tabla Pino 1x4x4", None)));
    }

    #[test]
    fn test_dimension_match_three_values() {
        let ctx = MatchContext::new("1x4x4");
        assert!(ctx.dimension_matches(&item("1", "Tabla", Some((1.0, 4.0, 4.0)))));
        // Inside tolerance.
        assert!(ctx.dimension_matches(&item("2", "Tabla", Some((1.005, 4.0, 4.0)))));
        // Outside tolerance.
        assert!(!ctx.dimension_matches(&item("3", "Tabla", Some((2.0, 4.0, 4.0)))));
        // Missing attributes never dimension-match.
        assert!(!ctx.dimension_matches(&item("4", "Tabla", None)));
        // Ordered: swapped attributes don't count for 3-value queries.
        assert!(!ctx.dimension_matches(&item("5", "Tabla", Some((4.0, 1.0, 4.0)))));
    }

    #[test]
    fn test_dimension_match_two_value_pairings() {
        let ctx = MatchContext::new("2x6");
        // height x width
        assert!(ctx.dimension_matches(&item("1", "Tirante", Some((2.0, 6.0, 3.0)))));
        // height x length
        assert!(ctx.dimension_matches(&item("2", "Tirante", Some((2.0, 3.0, 6.0)))));
        // width x length
        assert!(ctx.dimension_matches(&item("3", "Tirante", Some((9.0, 2.0, 6.0)))));
        assert!(!ctx.dimension_matches(&item("4", "Tirante", Some((9.0, 9.0, 9.0)))));
    }

    #[test]
    fn test_filter_dedup_keeps_first_occurrence() {
        let ctx = MatchContext::new("tabla");
        let candidates = vec![
            item("a", "Tabla Pino", None),
            item("b", "Tabla Eucalipto", None),
            item("a", "Tabla Pino", None),
            item("c", "Clavos", None),
        ];
        let out = filter_and_dedup(candidates, &ctx, 10);
        let ids: Vec<&str> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_truncation_preserves_order() {
        let ctx = MatchContext::new("tabla");
        let candidates = vec![
            item("a", "Tabla 1", None),
            item("b", "Tabla 2", None),
            item("c", "Tabla 3", None),
        ];
        let out = filter_and_dedup(candidates, &ctx, 2);
        let ids: Vec<&str> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_dimensional_query_keeps_name_fallback() {
        // "1x4x4" appears in the name even though the numeric attributes
        // disagree; the name predicate keeps the item.
        let ctx = MatchContext::new("1x4x4");
        assert!(ctx.matches(&item("1", "Oferta Tabla 1x4x4", Some((9.0, 9.0, 9.0)))));
    }
}
