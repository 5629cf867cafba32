// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use super::{ItemGeometry, LayoutContext, LayoutStrategy, narrow, wide};

/// Per-item sizes packed across rows, backed by a forward-extended geometry cache.
///
/// Items flow along the cross axis until the next one would overflow the viewport's
/// cross extent, which closes the row. A row is as tall as the item that opened it.
#[derive(Clone, Debug, Default)]
pub struct DynamicGrid {
    cache: Vec<ItemGeometry>,
    row_pos: u64,
    row_size: u32,
    row_len: usize,
    cursor: u32,
}

impl DynamicGrid {
    fn extend_to<T>(&mut self, cx: &LayoutContext<'_, T>, index: usize) {
        let target = index.min(cx.last_index());
        while self.cache.len() <= target {
            let i = self.cache.len();
            let item = &cx.items[i];
            let primary_size = cx.primary.size_of(i, item);
            let secondary_size = cx.secondary.size_of(i, item);
            if self.row_len > 0 && self.cursor.saturating_add(secondary_size) > cx.cross_extent {
                self.row_pos += u64::from(self.row_size);
                self.row_len = 0;
                self.cursor = 0;
            }
            if self.row_len == 0 {
                self.row_size = primary_size;
            }
            self.cache.push(ItemGeometry {
                primary_pos: self.row_pos,
                secondary_pos: self.cursor,
                primary_size,
                secondary_size,
            });
            self.row_len += 1;
            self.cursor = self.cursor.saturating_add(secondary_size);
        }
    }

    /// End of the last cached row.
    fn known_end(&self) -> u64 {
        if self.cache.is_empty() {
            0
        } else {
            self.row_pos + u64::from(self.row_size)
        }
    }

    fn across_estimate<T>(cx: &LayoutContext<'_, T>) -> usize {
        match cx.secondary.first_size(cx.items) {
            0 => 1,
            cross => narrow(u64::from(cx.cross_extent / cross)).max(1),
        }
    }
}

impl<T> LayoutStrategy<T> for DynamicGrid {
    fn geometry_at(&mut self, cx: &LayoutContext<'_, T>, index: usize) -> ItemGeometry {
        if cx.is_empty() {
            return ItemGeometry::default();
        }
        debug_assert!(index < cx.len(), "index {index} out of bounds");
        self.extend_to(cx, index);
        self.cache[index.min(self.cache.len() - 1)]
    }

    fn estimate_index_at_offset(&mut self, cx: &LayoutContext<'_, T>, offset: u64) -> usize {
        if cx.is_empty() {
            return 0;
        }
        let known_end = self.known_end();
        let index = if offset < known_end {
            self.cache
                .partition_point(|g| g.primary_pos <= offset)
                .saturating_sub(1)
        } else {
            let base = self.cache.len();
            match u64::from(cx.primary.first_size(cx.items)) {
                0 => base,
                size => {
                    let rows = narrow((offset - known_end) / size);
                    base.saturating_add(rows.saturating_mul(Self::across_estimate(cx)))
                }
            }
        };
        index.min(cx.last_index())
    }

    fn total_extent(&mut self, cx: &LayoutContext<'_, T>) -> u64 {
        let remaining = cx.len().saturating_sub(self.cache.len());
        let rows = remaining.div_ceil(Self::across_estimate(cx));
        self.known_end() + wide(rows) * u64::from(cx.primary.first_size(cx.items))
    }

    fn items_across(&self, cx: &LayoutContext<'_, T>) -> usize {
        Self::across_estimate(cx)
    }

    fn invalidate(&mut self) {
        *self = Self::default();
    }

    fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::DynamicGrid;
    use crate::config::SizeSpec;
    use crate::layout::test_util::{Lcg, from_item, resolved};
    use crate::layout::{LayoutContext, LayoutStrategy};

    #[test]
    fn rows_close_on_overflow() {
        // Widths in a 300px viewport, fixed 50px height.
        let items: Vec<u32> = [100, 150, 100, 200, 100, 300, 50].into();
        let primary = resolved(SizeSpec::Pixels(50.0), 500.0);
        let secondary = resolved(from_item(), 300.0);
        let cx = LayoutContext {
            items: &items,
            primary: &primary,
            secondary: &secondary,
            cross_extent: 300,
        };
        let mut layout = DynamicGrid::default();
        let rows: Vec<(u64, u32)> = (0..items.len())
            .map(|i| {
                let g = layout.geometry_at(&cx, i);
                (g.primary_pos, g.secondary_pos)
            })
            .collect();
        assert_eq!(
            rows,
            [(0, 0), (0, 100), (50, 0), (50, 100), (100, 0), (150, 0), (200, 0)]
        );
        assert_eq!(layout.total_extent(&cx), 250);
    }

    #[test]
    fn row_height_comes_from_opener() {
        // Items are (width, height) packed into a single u32: height * 1000 + width.
        let items: Vec<u32> = [40_100, 90_100, 10_100, 30_200].into();
        let primary = resolved(SizeSpec::dynamic(|_, v: &u32| f64::from(*v / 1000)), 500.0);
        let secondary = resolved(SizeSpec::dynamic(|_, v: &u32| f64::from(*v % 1000)), 300.0);
        let cx = LayoutContext {
            items: &items,
            primary: &primary,
            secondary: &secondary,
            cross_extent: 300,
        };
        let mut layout = DynamicGrid::default();
        assert_eq!(layout.geometry_at(&cx, 2).primary_pos, 0);
        let g = layout.geometry_at(&cx, 3);
        assert_eq!(g.primary_pos, 40);
        assert_eq!(g.primary_size, 30);
    }

    #[test]
    fn cached_rows_never_overflow_and_are_monotonic() {
        let mut rng = Lcg::new(99);
        for _ in 0..20 {
            let cross = rng.range(50, 600);
            let items: Vec<u32> = (0..200).map(|_| rng.range(0, 250)).collect();
            let primary = resolved(SizeSpec::Pixels(30.0), 500.0);
            let secondary = resolved(from_item(), f64::from(cross));
            let cx = LayoutContext {
                items: &items,
                primary: &primary,
                secondary: &secondary,
                cross_extent: cross,
            };
            let mut layout = DynamicGrid::default();
            let mut prev = layout.geometry_at(&cx, 0);
            assert_eq!(prev.primary_pos, 0);
            for i in 1..items.len() {
                let g = layout.geometry_at(&cx, i);
                if g.primary_pos == prev.primary_pos {
                    assert_eq!(g.secondary_pos, prev.secondary_pos + prev.secondary_size);
                    assert!(g.secondary_pos + g.secondary_size <= cross);
                } else {
                    assert_eq!(g.primary_pos, prev.primary_pos + 30);
                    assert_eq!(g.secondary_pos, 0);
                }
                prev = g;
            }
            assert_eq!(layout.geometry_at(&cx, 57), layout.geometry_at(&cx, 57));
            assert_eq!(LayoutStrategy::<u32>::cached_len(&layout), items.len());
        }
    }

    #[test]
    fn estimate_lands_in_row() {
        let items: Vec<u32> = (0..90).map(|_| 100).collect();
        let primary = resolved(SizeSpec::Pixels(50.0), 500.0);
        let secondary = resolved(from_item(), 300.0);
        let cx = LayoutContext {
            items: &items,
            primary: &primary,
            secondary: &secondary,
            cross_extent: 300,
        };
        let mut layout = DynamicGrid::default();
        // Uncached: 3 across estimated from the first item.
        assert_eq!(layout.estimate_index_at_offset(&cx, 120), 6);
        assert_eq!(layout.total_extent(&cx), 30 * 50);
        layout.geometry_at(&cx, 20);
        assert_eq!(layout.estimate_index_at_offset(&cx, 120), 8);
        assert_eq!(layout.estimate_index_at_offset(&cx, 160), 11);
    }
}
