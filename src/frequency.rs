use crate::config::FreqThresholdStrategy;
use crate::event::LogEvent;
use ahash::AHashMap;

/// Occurrences of every literal token across `events`. Placeholder tokens
/// are counted like any other string; the synthesizer keeps them regardless.
pub fn count_tokens<'a>(events: impl IntoIterator<Item = &'a LogEvent>) -> AHashMap<String, usize> {
    let mut counts: AHashMap<String, usize> = AHashMap::new();
    for event in events {
        for token in &event.tokens {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Frequency at or above which a token is considered static.
///
/// `percentile` is only read by [`FreqThresholdStrategy::Percentile`]. An empty
/// count map yields 1 for every strategy except `All`, which always answers
/// with the group size.
pub fn threshold(
    strategy: FreqThresholdStrategy,
    counts: &AHashMap<String, usize>,
    group_size: usize,
    percentile: f64,
) -> usize {
    if strategy == FreqThresholdStrategy::All {
        return group_size;
    }
    if counts.is_empty() {
        return 1;
    }
    let mut values: Vec<usize> = counts.values().copied().collect();
    values.sort_unstable();
    match strategy {
        FreqThresholdStrategy::Min => values[0],
        FreqThresholdStrategy::Median => {
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                (values[mid - 1] + values[mid]) / 2
            } else {
                values[mid]
            }
        }
        FreqThresholdStrategy::Percentile => {
            let idx = ((values.len() - 1) as f64 * percentile).floor() as usize;
            values[idx.min(values.len() - 1)]
        }
        FreqThresholdStrategy::All => group_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, usize)]) -> AHashMap<String, usize> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn counts_repeated_tokens_within_one_event() {
        let events = [LogEvent::new("r", "a a b"), LogEvent::new("r", "a <*>")];
        let c = count_tokens(&events);
        assert_eq!(c["a"], 3);
        assert_eq!(c["b"], 1);
        assert_eq!(c["<*>"], 1);
    }

    #[test]
    fn strategies_over_known_distribution() {
        // sorted counts: 1 2 3 6 6
        let c = counts(&[("debug", 1), ("alert", 2), ("error", 3), ("in", 6), ("module", 6)]);
        assert_eq!(threshold(FreqThresholdStrategy::Min, &c, 6, 0.5), 1);
        assert_eq!(threshold(FreqThresholdStrategy::Median, &c, 6, 0.5), 3);
        assert_eq!(threshold(FreqThresholdStrategy::Percentile, &c, 6, 0.5), 3);
        assert_eq!(threshold(FreqThresholdStrategy::Percentile, &c, 6, 0.9), 6);
        assert_eq!(threshold(FreqThresholdStrategy::Percentile, &c, 6, 0.0), 1);
        assert_eq!(threshold(FreqThresholdStrategy::All, &c, 6, 0.5), 6);
    }

    #[test]
    fn median_of_even_cardinality_averages_down() {
        let c = counts(&[("a", 1), ("b", 2), ("c", 4), ("d", 5)]);
        assert_eq!(threshold(FreqThresholdStrategy::Median, &c, 5, 0.5), 3);
        let c = counts(&[("a", 1), ("b", 2)]);
        assert_eq!(threshold(FreqThresholdStrategy::Median, &c, 2, 0.5), 1);
    }

    #[test]
    fn empty_counts_fall_back() {
        let c = AHashMap::new();
        assert_eq!(threshold(FreqThresholdStrategy::Min, &c, 4, 0.5), 1);
        assert_eq!(threshold(FreqThresholdStrategy::All, &c, 4, 0.5), 4);
    }
}
