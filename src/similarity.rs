use crate::event::LogEvent;
use tracing::trace;

/// Letter-count similarity between two events, in `[0, 1]`.
///
/// Only alphabetical tokens contribute. The score is the smaller letter count
/// over the larger one, so it does not depend on argument order. Events with
/// no alphabetical letters never match anything. With `strict` set, the
/// ordered sequences of alphabetical tokens must also be identical.
pub fn similarity(a: &LogEvent, b: &LogEvent, strict: bool) -> f64 {
    let (la, lb) = (a.letter_count(), b.letter_count());
    if la == 0 || lb == 0 {
        return 0.0;
    }
    if strict && !a.alphabetical_tokens().eq(b.alphabetical_tokens()) {
        trace!(left = %a.content, right = %b.content, "alphabetical tokens differ");
        return 0.0;
    }
    la.min(lb) as f64 / la.max(lb) as f64
}
