use crate::layout::{LaidOutRect, Layout};
use crate::treemap::Point;

/// Find the most deeply nested laid-out node whose rectangle contains `point`.
///
/// The walk starts at the layout root and descends one level at a time. When
/// the point sits on a boundary shared by several children, the child whose
/// origin `(x, y)` is lexicographically smallest wins. Returns `None` when the
/// point is outside the root rectangle or the layout is empty.
pub fn resolve(layout: &Layout, point: Point) -> Option<&LaidOutRect> {
    let mut current = layout.root()?;
    if !current.rect.contains(point) {
        return None;
    }

    while let Some(next) = layout
        .children_of(current)
        .filter(|child| child.rect.contains(point))
        .min_by_key(|child| child.rect.origin())
    {
        current = next;
    }

    Some(current)
}
