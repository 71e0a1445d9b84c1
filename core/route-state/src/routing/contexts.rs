use super::HandlerInfo;

/// Number of contexts a route named `target_name` consumes.
///
/// Sums segment counts along `chain` in order and stops at the first handler
/// named `target_name`, counting that handler's own segments. When no handler
/// carries the name (a resource expanded to its default child), the whole
/// chain is counted.
pub fn compute_max_contexts(target_name: &str, chain: &[HandlerInfo]) -> usize {
    let mut total = 0;
    for handler in chain {
        total += handler.segment_count();
        if handler.name == target_name {
            break;
        }
    }
    total
}
