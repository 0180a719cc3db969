//! Dimension parsing: "1x4x4", "1/2 x 4", "2,5×4" and friends.
//!
//! A query is *dimensional* when it splits into exactly 2 or 3 numbers on
//! multiplication separators; anything else is treated as free text.

use super::normalize::SEPARATOR;

/// Parses the numeric tokens of a dimension-style query, preserving order.
/// Tokens that fail to parse (including fractions with a zero denominator)
/// are silently dropped.
pub fn parse_dimensions(text: &str) -> Vec<f64> {
    let prepared = text.to_lowercase().replace(',', ".").replace('×', "x");
    SEPARATOR
        .split(&prepared)
        .filter(|token| !token.is_empty())
        .filter_map(parse_token)
        .collect()
}

/// A single token: either a `a/b` fraction or a plain decimal.
fn parse_token(token: &str) -> Option<f64> {
    let token = token.trim();
    if let Some((numerator, denominator)) = token.split_once('/') {
        let numerator: f64 = numerator.trim().parse().ok()?;
        let denominator: f64 = denominator.trim().parse().ok()?;
        if denominator == 0.0 {
            return None;
        }
        let value = numerator / denominator;
        return value.is_finite().then_some(value);
    }
    let value: f64 = token.parse().ok()?;
    value.is_finite().then_some(value)
}

/// An ordered 2- or 3-value dimension tuple interpreted as height/width or
/// height/width/length. Values are rounded to 2 decimals; the same rounded
/// values feed both the store equality lookups and the in-memory tolerance
/// filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionTuple(Vec<f64>);

impl DimensionTuple {
    /// Classifies a query. Returns `None` for queries yielding fewer than 2
    /// or more than 3 numbers, which stay ordinary free text.
    pub fn from_query(text: &str) -> Option<Self> {
        let values = parse_dimensions(text);
        match values.len() {
            2 | 3 => Some(Self(
                values.iter().map(|v| (v * 100.0).round() / 100.0).collect(),
            )),
            _ => None,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_dimensions() {
        assert_eq!(parse_dimensions("1x4x4"), vec![1.0, 4.0, 4.0]);
        assert_eq!(parse_dimensions("2 X 6"), vec![2.0, 6.0]);
        assert_eq!(parse_dimensions("2,5×4"), vec![2.5, 4.0]);
    }

    #[test]
    fn test_fractions() {
        assert_eq!(parse_dimensions("1/2x4"), vec![0.5, 4.0]);
        assert_eq!(parse_dimensions("3/4 x 1/2"), vec![0.75, 0.5]);
        // A zero denominator drops only the broken token.
        assert_eq!(parse_dimensions("1/0x4"), vec![4.0]);
    }

    #[test]
    fn test_unparsable_tokens_dropped() {
        assert_eq!(parse_dimensions("tabla 1x4"), vec![4.0]);
        assert_eq!(parse_dimensions("tabla"), Vec::<f64>::new());
    }

    #[test]
    fn test_classification() {
        assert!(DimensionTuple::from_query("1x4x4").is_some());
        assert!(DimensionTuple::from_query("1/2x4").is_some());
        // 1 or 4+ numbers: ordinary free text.
        assert!(DimensionTuple::from_query("4").is_none());
        assert!(DimensionTuple::from_query("1x2x3x4").is_none());
        assert!(DimensionTuple::from_query("tabla pino").is_none());
        // Fraction failure can degrade the tuple below 2 elements.
        assert!(DimensionTuple::from_query("1/0x4").is_none());
    }

    #[test]
    fn test_rounding() {
        let dims = DimensionTuple::from_query("1.006x4.129").unwrap();
        assert_eq!(dims.values(), &[1.01, 4.13]);
    }

    #[test]
    fn test_fraction_query_values() {
        let dims = DimensionTuple::from_query("1/2x4").unwrap();
        assert_eq!(dims.values(), &[0.5, 4.0]);
    }
}
