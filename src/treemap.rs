use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in integer layout units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    /// True when width or height is not positive.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Closed containment: points on any edge are inside.
    pub fn contains(&self, point: Point) -> bool {
        !self.is_degenerate()
            && self.x <= point.x
            && point.x <= self.right()
            && self.y <= point.y
            && point.y <= self.bottom()
    }

    /// Origin as an `(x, y)` pair, used for boundary tie-breaks.
    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis a rectangle is cut along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    /// Children sit side by side, left to right.
    Horizontal,
    /// Children are stacked top to bottom.
    Vertical,
}

impl SplitAxis {
    /// Cut along the longer side; squares are stacked.
    pub fn for_rect(rect: Rect) -> Self {
        if rect.width > rect.height {
            SplitAxis::Horizontal
        } else {
            SplitAxis::Vertical
        }
    }
}

/// Slice-and-partition treemap: one cut per level, proportional to size.
pub struct SliceTreemap;

impl SliceTreemap {
    /// Split `container` into one rectangle per entry of `sizes`, in order.
    ///
    /// Every slice but the last gets `floor(extent * size / total)`; the last
    /// slice takes the remainder, so the slices tile `container` exactly. When
    /// all sizes are zero the extent is shared equally with the same rule.
    /// A degenerate container yields no slices.
    pub fn partition(sizes: &[u64], container: Rect) -> Vec<Rect> {
        if sizes.is_empty() || container.is_degenerate() {
            return Vec::new();
        }

        let axis = SplitAxis::for_rect(container);
        let extent = match axis {
            SplitAxis::Horizontal => container.width,
            SplitAxis::Vertical => container.height,
        };

        let total: u128 = sizes.iter().map(|&s| u128::from(s)).sum();
        let count = sizes.len();
        let mut result = Vec::with_capacity(count);
        let mut offset = 0i32;

        for (i, &size) in sizes.iter().enumerate() {
            let length = if i + 1 == count {
                extent - offset
            } else if total == 0 {
                extent / count as i32
            } else {
                (extent as u128 * u128::from(size) / total) as i32
            };

            let rect = match axis {
                SplitAxis::Horizontal => Rect::new(
                    container.x.saturating_add(offset),
                    container.y,
                    length,
                    container.height,
                ),
                SplitAxis::Vertical => Rect::new(
                    container.x,
                    container.y.saturating_add(offset),
                    container.width,
                    length,
                ),
            };

            result.push(rect);
            offset += length;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_partition_proportional_along_width() {
        let rects = SliceTreemap::partition(&[40, 60], Rect::new(0, 0, 100, 10));
        assert_eq!(rects, vec![Rect::new(0, 0, 40, 10), Rect::new(40, 0, 60, 10)]);
    }

    #[test]
    fn test_partition_near_coordinate_limit() {
        let rects = SliceTreemap::partition(&[1, 1], Rect::new(i32::MAX - 2, 0, 10, 1));
        assert_eq!(rects[0], Rect::new(i32::MAX - 2, 0, 5, 1));
        assert_eq!(rects[1].x, i32::MAX);
        assert_eq!(rects[1].width, 5);

        let rects = SliceTreemap::partition(&[1, 1], Rect::new(0, i32::MAX - 2, 1, 10));
        assert_eq!(rects[1].y, i32::MAX);
    }

    #[test]
    fn test_partition_stacks_when_taller_or_square() {
        let rects = SliceTreemap::partition(&[1, 1], Rect::new(5, 5, 10, 10));
        assert_eq!(rects, vec![Rect::new(5, 5, 10, 5), Rect::new(5, 10, 10, 5)]);
    }

    #[test]
    fn test_last_slice_absorbs_remainder() {
        let rects = SliceTreemap::partition(&[1, 1, 1], Rect::new(0, 0, 10, 1));
        let widths: Vec<i32> = rects.iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![3, 3, 4]);
        assert_eq!(rects[2].x, 6);
    }

    #[test]
    fn test_zero_sizes_share_equally() {
        let rects = SliceTreemap::partition(&[0, 0, 0, 0], Rect::new(0, 0, 80, 20));
        assert_eq!(rects.len(), 4);
        for (i, r) in rects.iter().enumerate() {
            assert_eq!(r.width, 20);
            assert_eq!(r.height, 20);
            assert_eq!(r.x, 20 * i as i32);
            assert!(!r.is_degenerate());
        }
    }

    #[test]
    fn test_degenerate_container_yields_nothing() {
        assert!(SliceTreemap::partition(&[1, 2], Rect::new(0, 0, 0, 10)).is_empty());
        assert!(SliceTreemap::partition(&[1, 2], Rect::new(0, 0, 10, -3)).is_empty());
        assert!(SliceTreemap::partition(&[], Rect::new(0, 0, 10, 10)).is_empty());
    }

    #[test]
    fn test_huge_sizes_do_not_overflow() {
        let rects = SliceTreemap::partition(&[u64::MAX, u64::MAX], Rect::new(0, 0, 1000, 1));
        assert_eq!(rects[0].width, 500);
        assert_eq!(rects[1].width, 500);
    }

    #[test]
    fn test_contains_is_closed() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(Point::new(10, 10)));
        assert!(r.contains(Point::new(15, 15)));
        assert!(!r.contains(Point::new(16, 12)));
        assert!(!Rect::new(0, 0, 0, 5).contains(Point::new(0, 1)));
    }

    proptest! {
        #[test]
        fn prop_slices_tile_container(
            sizes in prop::collection::vec(0u64..1_000_000, 1..20),
            x in -500i32..500,
            y in -500i32..500,
            width in 1i32..2000,
            height in 1i32..2000,
        ) {
            let container = Rect::new(x, y, width, height);
            let rects = SliceTreemap::partition(&sizes, container);
            prop_assert_eq!(rects.len(), sizes.len());

            let axis = SplitAxis::for_rect(container);
            let mut cursor = match axis {
                SplitAxis::Horizontal => container.x,
                SplitAxis::Vertical => container.y,
            };
            for r in &rects {
                prop_assert!(r.width >= 0 && r.height >= 0);
                match axis {
                    SplitAxis::Horizontal => {
                        prop_assert_eq!(r.x, cursor);
                        prop_assert_eq!(r.y, container.y);
                        prop_assert_eq!(r.height, container.height);
                        cursor += r.width;
                    }
                    SplitAxis::Vertical => {
                        prop_assert_eq!(r.y, cursor);
                        prop_assert_eq!(r.x, container.x);
                        prop_assert_eq!(r.width, container.width);
                        cursor += r.height;
                    }
                }
            }
            let end = match axis {
                SplitAxis::Horizontal => container.right(),
                SplitAxis::Vertical => container.bottom(),
            };
            prop_assert_eq!(cursor, end);

            let area: i64 = rects.iter().map(Rect::area).sum();
            prop_assert_eq!(area, container.area());
        }
    }
}
