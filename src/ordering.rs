use crate::config::SortingStrategy;
use crate::event::{EventId, LogEvent};
use std::cmp::Ordering;

/// Reorders a pattern's members under `strategy`. Every strategy has a
/// tie-break, and the sort is stable, so repeated runs over the same input
/// pick the same representative. `SortingStrategy::None` leaves the order
/// untouched.
pub fn sort_members(strategy: SortingStrategy, members: &mut [EventId], arena: &[LogEvent]) {
    let cmp: fn(&LogEvent, &LogEvent) -> Ordering = match strategy {
        SortingStrategy::None => return,
        SortingStrategy::ByLength => by_length,
        SortingStrategy::Lexical => lexical,
        SortingStrategy::ByDynamicTokens => by_dynamic_tokens,
    };
    members.sort_by(|&a, &b| cmp(&arena[a], &arena[b]));
}

fn by_length(a: &LogEvent, b: &LogEvent) -> Ordering {
    a.tokens.len().cmp(&b.tokens.len()).then_with(|| a.content.cmp(&b.content))
}

fn lexical(a: &LogEvent, b: &LogEvent) -> Ordering {
    a.content.cmp(&b.content).then_with(|| a.raw.cmp(&b.raw))
}

fn by_dynamic_tokens(a: &LogEvent, b: &LogEvent) -> Ordering {
    a.dynamic_token_count()
        .cmp(&b.dynamic_token_count())
        .then_with(|| a.content.cmp(&b.content))
}
