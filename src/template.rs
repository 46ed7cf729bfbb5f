use crate::event::{is_placeholder, LogEvent, PLACEHOLDER};
use ahash::AHashMap;

/// Builds a template from the representative event: placeholders stay,
/// tokens counted at least `threshold` times stay, everything else becomes
/// the placeholder.
pub fn synthesize(representative: &LogEvent, counts: &AHashMap<String, usize>, threshold: usize) -> String {
    representative
        .tokens
        .iter()
        .map(|token| {
            if is_placeholder(token) || counts.get(token).copied().unwrap_or(0) >= threshold {
                token.as_str()
            } else {
                PLACEHOLDER
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Share of placeholder tokens among all tokens; 0 for an empty template.
pub fn placeholder_ratio(template: &str) -> f64 {
    let (total, placeholders) = template
        .split_whitespace()
        .fold((0usize, 0usize), |(t, p), tok| (t + 1, p + usize::from(is_placeholder(tok))));
    if total == 0 {
        0.0
    } else {
        placeholders as f64 / total as f64
    }
}

/// Quality guard: keeps `candidate` unless it is mostly placeholders, in
/// which case the representative's content is used verbatim.
pub fn guard(candidate: String, representative: &LogEvent, max_ratio: f64) -> String {
    if placeholder_ratio(&candidate) > max_ratio {
        representative.content.clone()
    } else {
        candidate
    }
}

/// A template is worth reporting when it carries at least `min_tokens`
/// non-placeholder tokens. Empty templates never are.
pub fn is_valid(template: &str, min_tokens: usize) -> bool {
    let mut tokens = template.split_whitespace().peekable();
    if tokens.peek().is_none() {
        return false;
    }
    tokens.filter(|t| !is_placeholder(t)).count() >= min_tokens
}
