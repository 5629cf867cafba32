// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{ItemGeometry, LayoutContext, LayoutStrategy, narrow, wide};

/// Fixed-size items, one per row: `pos(i) = i * size`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StaticList;

impl<T> LayoutStrategy<T> for StaticList {
    fn geometry_at(&mut self, cx: &LayoutContext<'_, T>, index: usize) -> ItemGeometry {
        let size = cx.primary.resolved();
        ItemGeometry {
            primary_pos: wide(index) * u64::from(size),
            secondary_pos: 0,
            primary_size: size,
            secondary_size: cx.cross_extent,
        }
    }

    fn estimate_index_at_offset(&mut self, cx: &LayoutContext<'_, T>, offset: u64) -> usize {
        let size = u64::from(cx.primary.resolved());
        if size == 0 {
            return 0;
        }
        narrow(offset / size).min(cx.last_index())
    }

    fn total_extent(&mut self, cx: &LayoutContext<'_, T>) -> u64 {
        wide(cx.len()) * u64::from(cx.primary.resolved())
    }

    fn items_across(&self, _cx: &LayoutContext<'_, T>) -> usize {
        1
    }
}
