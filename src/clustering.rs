use crate::event::{EventId, LogEvent};
use crate::similarity::similarity;
use ahash::AHashMap;
use std::ops::Range;
use tracing::{debug, trace};

/// A group of events judged similar enough to share one template.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    /// Creation index; stable for the lifetime of the engine.
    pub id: usize,
    /// Member events, in insertion order until the pattern is sorted.
    /// Index 0 is the representative event.
    pub events: Vec<EventId>,
    pub template: String,
    /// Token counts over the members, filled by frequency analysis.
    pub token_frequency: AHashMap<String, usize>,
}

impl Pattern {
    fn seeded(id: usize, first: EventId) -> Self {
        Self { id, events: vec![first], ..Default::default() }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn representative(&self) -> Option<EventId> {
        self.events.first().copied()
    }
}

/// First-fit assignment of the events in `batch` to `patterns`.
///
/// Each event is compared with the current first member of every pattern in
/// creation order and joins the first one scoring at least `threshold`.
/// Otherwise it seeds a new pattern whose id is the pattern count before
/// insertion.
pub fn assign(
    patterns: &mut Vec<Pattern>,
    arena: &[LogEvent],
    batch: Range<EventId>,
    threshold: f64,
    strict: bool,
) {
    for id in batch {
        let event = &arena[id];
        let target = patterns.iter().position(|p| {
            let Some(first) = p.representative() else { return false };
            let score = similarity(event, &arena[first], strict);
            trace!(pattern = p.id, score, "similarity");
            score >= threshold
        });
        match target {
            Some(idx) => patterns[idx].events.push(id),
            None => {
                let pid = patterns.len();
                debug!(pattern = pid, content = %event.content, "new pattern");
                patterns.push(Pattern::seeded(pid, id));
            }
        }
    }
}
