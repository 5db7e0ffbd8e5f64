//! Successor selection when the active member closes.

/// Index of the member that should become active after the member at
/// `last_index` is removed from a collection of `count` members.
///
/// The neighbor before the closed member wins. Closing the first member
/// hands activation to the second one, which becomes first once the
/// removal happens. Closing the sole member, or an index outside the
/// collection, selects nothing.
pub fn next_index_to_activate(last_index: usize, count: usize) -> Option<usize> {
    if last_index == 0 {
        return (count > 1).then_some(1);
    }
    (last_index < count).then_some(last_index - 1)
}
