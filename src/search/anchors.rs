//! Prefix anchors for ordered name-index scans.
//!
//! The name index is case-sensitive and exact-prefix based, so a single query
//! spelling would miss most catalog casings. Each query expands into a small
//! bounded family of casing/spacing variants, and one range scan runs per
//! variant.

use super::normalize::{space_separators, SEPARATOR};

/// Upper bound on generated anchors per query.
pub const MAX_ANCHORS: usize = 6;

/// Builds the anchor set for a query: casing variants of the full text plus,
/// when the text contains a multiplication separator, the same variants of
/// the prefix up to and including the last separator (so "tabla 2x4" also
/// scans the "Tabla 2 x " family). Every anchor is emitted in both `" x "`
/// and `" X "` spacing. Order-preserving, deduped, capped at [`MAX_ANCHORS`].
pub fn anchors(text: &str) -> Vec<String> {
    let mut bases: Vec<String> = Vec::new();
    for variant in casing_variants(text) {
        push_unique(&mut bases, variant);
    }

    if let Some(separator) = SEPARATOR.find_iter(text).last() {
        if separator.start() > 0 {
            let prefix = &text[..separator.end()];
            for variant in casing_variants(prefix) {
                push_unique(&mut bases, variant);
            }
        }
    }

    let mut out: Vec<String> = Vec::new();
    for base in bases {
        for spaced in [space_separators(&base, false), space_separators(&base, true)] {
            if out.contains(&spaced) {
                continue;
            }
            out.push(spaced);
            if out.len() == MAX_ANCHORS {
                return out;
            }
        }
    }
    out
}

fn casing_variants(text: &str) -> [String; 5] {
    [
        text.to_string(),
        capitalize_first(text),
        title_case(text),
        text.to_uppercase(),
        text.to_lowercase(),
    ]
}

pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| capitalize_first(&word.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_unique(variants: &mut Vec<String>, candidate: String) {
    if !variants.contains(&candidate) {
        variants.push(candidate);
    }
}
