// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{ItemGeometry, LayoutContext, LayoutStrategy, narrow, wide};

/// Fixed-size items packed `floor(cross / item_cross)` across.
///
/// Item `i` sits in row `i / across` and column `i % across`. At least one item is
/// placed per row even when an item is wider than the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StaticGrid;

impl StaticGrid {
    fn across<T>(cx: &LayoutContext<'_, T>) -> usize {
        match cx.secondary.resolved() {
            0 => 1,
            cross => narrow(u64::from(cx.cross_extent / cross)).max(1),
        }
    }
}

impl<T> LayoutStrategy<T> for StaticGrid {
    fn geometry_at(&mut self, cx: &LayoutContext<'_, T>, index: usize) -> ItemGeometry {
        let across = Self::across(cx);
        let primary_size = cx.primary.resolved();
        let secondary_size = cx.secondary.resolved();
        let row = wide(index / across);
        let col = u32::try_from(index % across).unwrap_or(u32::MAX);
        ItemGeometry {
            primary_pos: row * u64::from(primary_size),
            secondary_pos: col.saturating_mul(secondary_size),
            primary_size,
            secondary_size,
        }
    }

    fn estimate_index_at_offset(&mut self, cx: &LayoutContext<'_, T>, offset: u64) -> usize {
        let size = u64::from(cx.primary.resolved());
        if size == 0 {
            return 0;
        }
        narrow(offset / size)
            .saturating_mul(Self::across(cx))
            .min(cx.last_index())
    }

    fn total_extent(&mut self, cx: &LayoutContext<'_, T>) -> u64 {
        let rows = cx.len().div_ceil(Self::across(cx));
        wide(rows) * u64::from(cx.primary.resolved())
    }

    fn items_across(&self, cx: &LayoutContext<'_, T>) -> usize {
        Self::across(cx)
    }
}
