// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use super::{ItemGeometry, LayoutContext, LayoutStrategy, narrow, wide};

/// Per-item sizes, one per row, backed by a forward-extended geometry cache.
///
/// `pos(i) = pos(i - 1) + size(i - 1)`. Entries are appended in index order and stay
/// untouched until [`LayoutStrategy::invalidate`]; the last cached index is the
/// high-water mark. Offsets past it are estimated from the first item's size.
#[derive(Clone, Debug, Default)]
pub struct DynamicList {
    cache: Vec<ItemGeometry>,
}

impl DynamicList {
    fn extend_to<T>(&mut self, cx: &LayoutContext<'_, T>, index: usize) {
        let target = index.min(cx.last_index());
        while self.cache.len() <= target {
            let i = self.cache.len();
            let primary_pos = self.known_end();
            self.cache.push(ItemGeometry {
                primary_pos,
                secondary_pos: 0,
                primary_size: cx.primary.size_of(i, &cx.items[i]),
                secondary_size: cx.cross_extent,
            });
        }
    }

    fn known_end(&self) -> u64 {
        self.cache.last().map_or(0, ItemGeometry::primary_end)
    }
}

impl<T> LayoutStrategy<T> for DynamicList {
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
            self.cache.partition_point(|g| g.primary_end() <= offset)
        } else {
            let base = self.cache.len();
            match u64::from(cx.primary.first_size(cx.items)) {
                0 => base,
                size => base.saturating_add(narrow((offset - known_end) / size)),
            }
        };
        index.min(cx.last_index())
    }

    fn total_extent(&mut self, cx: &LayoutContext<'_, T>) -> u64 {
        let remaining = cx.len().saturating_sub(self.cache.len());
        self.known_end() + wide(remaining) * u64::from(cx.primary.first_size(cx.items))
    }

    fn items_across(&self, _cx: &LayoutContext<'_, T>) -> usize {
        1
    }

    fn invalidate(&mut self) {
        self.cache.clear();
    }

    fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
