//! Text normalization for catalog search.
//!
//! Catalog names mix case, accents and ad-hoc dimension spellings
//! ("Tabla Pino 1x4x4", "TABLA PINO 1 X 4 X 4", "1,5×4"). Every comparison
//! and every cache key goes through one canonical form so the rest of the
//! engine never has to care about spelling.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Multiplication separator: an `x`/`×` with optional surrounding whitespace.
pub static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[x×]\s*").expect("separator regex"));

/// Canonical form used for substring comparison and cache keys: lower-cased,
/// canonically decomposed with combining marks dropped, all whitespace
/// removed, `×` unified to `x` and decimal comma to dot.
///
/// Total over all inputs; the empty string maps to itself.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '×' => 'x',
            ',' => '.',
            other => other,
        })
        .collect()
}

/// Rewrites every multiplication separator to a uniform `" x "` (or `" X "`).
pub fn space_separators(text: &str, upper: bool) -> String {
    let spaced = if upper { " X " } else { " x " };
    SEPARATOR.replace_all(text, spaced).into_owned()
}

/// Removes all whitespace, leaving everything else untouched.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
