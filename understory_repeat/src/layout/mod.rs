// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout strategies: index to geometry, offset to index.
//!
//! A repeater picks one of four strategies at construction, from two independent
//! choices:
//!
//! - [`Shape`]: a list spans the whole cross axis with one item per row; a grid packs
//!   several items across.
//! - determinism: static strategies compute geometry in O(1) from the index, dynamic
//!   strategies evaluate per-item sizes and keep a forward-extended geometry cache.
//!
//! Orientation is orthogonal and handled by [`ItemGeometry::to_rect`]; strategies only
//! see primary and secondary coordinates.

use kurbo::Rect;

use crate::config::SizeSpec;
use crate::dimension::DimensionResolver;
use crate::viewport::Orientation;

mod dynamic_grid;
mod dynamic_list;
mod static_grid;
mod static_list;

pub use dynamic_grid::DynamicGrid;
pub use dynamic_list::DynamicList;
pub use static_grid::StaticGrid;
pub use static_list::StaticList;

/// Position and size of one item, in primary/secondary axis coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemGeometry {
    /// Start along the scroll axis.
    pub primary_pos: u64,
    /// Start across the scroll axis.
    pub secondary_pos: u32,
    /// Size along the scroll axis.
    pub primary_size: u32,
    /// Size across the scroll axis.
    pub secondary_size: u32,
}

impl ItemGeometry {
    /// End along the scroll axis.
    #[must_use]
    pub const fn primary_end(&self) -> u64 {
        self.primary_pos + self.primary_size as u64
    }

    /// Converts to a rectangle in viewport content coordinates.
    #[must_use]
    pub fn to_rect(&self, orientation: Orientation) -> Rect {
        #[allow(
            clippy::cast_precision_loss,
            reason = "positions beyond 2^53 pixels are not meaningful"
        )]
        let primary_pos = self.primary_pos as f64;
        orientation.rect(
            primary_pos,
            f64::from(self.secondary_pos),
            f64::from(self.primary_size),
            f64::from(self.secondary_size),
        )
    }
}

/// Whether items are laid out one per row or packed across.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// One item per row, spanning the cross axis.
    List,
    /// Several items per row.
    Grid,
}

impl Shape {
    /// Classifies from the resolved cross-axis size and the viewport's cross extent.
    ///
    /// Items that span exactly the cross extent, or `100%` of it, form a list; any
    /// other size, and any per-item size, packs into a grid. A computed size that has
    /// not been measured yet, or measured as zero, spans the row.
    ///
    /// A repeater classifies once and keeps the result: a dynamic cross size that
    /// happens to always span the viewport still lays out as a grid.
    #[must_use]
    pub fn classify<T>(secondary: &DimensionResolver<T>, cross_extent: u32) -> Self {
        let spans = match secondary.spec() {
            SizeSpec::Dynamic(_) => false,
            spec @ SizeSpec::Percent(_) => spec.is_full_extent(),
            SizeSpec::Computed if secondary.resolved() == 0 => true,
            SizeSpec::Computed | SizeSpec::Pixels(_) => secondary.resolved() == cross_extent,
        };
        if spans { Self::List } else { Self::Grid }
    }
}

/// Inputs a strategy needs to compute geometry.
#[derive(Debug)]
pub struct LayoutContext<'a, T> {
    /// The data, in display order.
    pub items: &'a [T],
    /// Sizing along the scroll axis.
    pub primary: &'a DimensionResolver<T>,
    /// Sizing across the scroll axis.
    pub secondary: &'a DimensionResolver<T>,
    /// Viewport size across the scroll axis.
    pub cross_extent: u32,
}

impl<T> LayoutContext<'_, T> {
    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the last item, or `0` when empty.
    pub(crate) fn last_index(&self) -> usize {
        self.items.len().saturating_sub(1)
    }
}

/// Index/geometry/offset conversions for one layout shape.
///
/// Methods that may extend a cache take `&mut self`.
pub trait LayoutStrategy<T> {
    /// Geometry of the item at `index`, which must be below `cx.len()`.
    ///
    /// Repeated calls without [`invalidate`](Self::invalidate) return identical values.
    fn geometry_at(&mut self, cx: &LayoutContext<'_, T>, index: usize) -> ItemGeometry;

    /// An index at or near the item covering `offset`, clamped to valid indices.
    ///
    /// Exact for static strategies. Dynamic strategies extrapolate past their cache
    /// using the first item's size.
    fn estimate_index_at_offset(&mut self, cx: &LayoutContext<'_, T>, offset: u64) -> usize;

    /// Total extent along the scroll axis; estimated for the uncached tail of dynamic layouts.
    fn total_extent(&mut self, cx: &LayoutContext<'_, T>) -> u64;

    /// Number of items across one row. Estimated for dynamic grids.
    fn items_across(&self, cx: &LayoutContext<'_, T>) -> usize;

    /// Drops cached geometry.
    fn invalidate(&mut self) {}

    /// Number of items with cached geometry.
    fn cached_len(&self) -> usize {
        0
    }
}

/// One of the four layout strategies, picked once per repeater.
#[derive(Clone, Debug)]
pub enum Layout {
    /// Fixed-size items, one per row.
    StaticList(StaticList),
    /// Fixed-size items packed across.
    StaticGrid(StaticGrid),
    /// Per-item sizes, one per row.
    DynamicList(DynamicList),
    /// Per-item sizes packed across.
    DynamicGrid(DynamicGrid),
}

impl Layout {
    /// Selects the strategy for `shape` and determinism.
    #[must_use]
    pub fn select(shape: Shape, is_static: bool) -> Self {
        match (shape, is_static) {
            (Shape::List, true) => Self::StaticList(StaticList),
            (Shape::Grid, true) => Self::StaticGrid(StaticGrid),
            (Shape::List, false) => Self::DynamicList(DynamicList::default()),
            (Shape::Grid, false) => Self::DynamicGrid(DynamicGrid::default()),
        }
    }

    /// Shape of the selected strategy.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Self::StaticList(_) | Self::DynamicList(_) => Shape::List,
            Self::StaticGrid(_) | Self::DynamicGrid(_) => Shape::Grid,
        }
    }

    /// Returns `true` for the O(1) strategies.
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self, Self::StaticList(_) | Self::StaticGrid(_))
    }
}

impl<T> LayoutStrategy<T> for Layout {
    fn geometry_at(&mut self, cx: &LayoutContext<'_, T>, index: usize) -> ItemGeometry {
        match self {
            Self::StaticList(s) => s.geometry_at(cx, index),
            Self::StaticGrid(s) => s.geometry_at(cx, index),
            Self::DynamicList(s) => s.geometry_at(cx, index),
            Self::DynamicGrid(s) => s.geometry_at(cx, index),
        }
    }

    fn estimate_index_at_offset(&mut self, cx: &LayoutContext<'_, T>, offset: u64) -> usize {
        match self {
            Self::StaticList(s) => s.estimate_index_at_offset(cx, offset),
            Self::StaticGrid(s) => s.estimate_index_at_offset(cx, offset),
            Self::DynamicList(s) => s.estimate_index_at_offset(cx, offset),
            Self::DynamicGrid(s) => s.estimate_index_at_offset(cx, offset),
        }
    }

    fn total_extent(&mut self, cx: &LayoutContext<'_, T>) -> u64 {
        match self {
            Self::StaticList(s) => s.total_extent(cx),
            Self::StaticGrid(s) => s.total_extent(cx),
            Self::DynamicList(s) => s.total_extent(cx),
            Self::DynamicGrid(s) => s.total_extent(cx),
        }
    }

    fn items_across(&self, cx: &LayoutContext<'_, T>) -> usize {
        match self {
            Self::StaticList(s) => s.items_across(cx),
            Self::StaticGrid(s) => s.items_across(cx),
            Self::DynamicList(s) => s.items_across(cx),
            Self::DynamicGrid(s) => s.items_across(cx),
        }
    }

    fn invalidate(&mut self) {
        match self {
            Self::StaticList(s) => LayoutStrategy::<T>::invalidate(s),
            Self::StaticGrid(s) => LayoutStrategy::<T>::invalidate(s),
            Self::DynamicList(s) => LayoutStrategy::<T>::invalidate(s),
            Self::DynamicGrid(s) => LayoutStrategy::<T>::invalidate(s),
        }
    }

    fn cached_len(&self) -> usize {
        match self {
            Self::StaticList(s) => LayoutStrategy::<T>::cached_len(s),
            Self::StaticGrid(s) => LayoutStrategy::<T>::cached_len(s),
            Self::DynamicList(s) => LayoutStrategy::<T>::cached_len(s),
            Self::DynamicGrid(s) => LayoutStrategy::<T>::cached_len(s),
        }
    }
}

/// Widens a `usize` count to `u64`.
pub(crate) fn wide(n: usize) -> u64 {
    n as u64
}

/// Narrows a `u64` index back to `usize`, saturating.
pub(crate) fn narrow(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::config::SizeSpec;
    use crate::dimension::DimensionResolver;

    /// Minimal LCG for deterministic randomized tests.
    #[derive(Clone, Copy, Debug)]
    pub(crate) struct Lcg(u64);

    impl Lcg {
        pub(crate) fn new(seed: u64) -> Self {
            Self(seed)
        }

        #[allow(clippy::cast_possible_truncation, reason = "keeps the high bits")]
        pub(crate) fn next_u32(&mut self) -> u32 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 32) as u32
        }

        /// Uniform in `lo..hi`.
        pub(crate) fn range(&mut self, lo: u32, hi: u32) -> u32 {
            lo + self.next_u32() % (hi - lo)
        }
    }

    /// Resolver already resolved against a viewport extent.
    pub(crate) fn resolved<T>(spec: SizeSpec<T>, extent: f64) -> DimensionResolver<T> {
        let mut r = DimensionResolver::new(spec);
        r.resolve(extent, None);
        r
    }

    /// Per-item size read straight from the item.
    pub(crate) fn from_item() -> SizeSpec<u32> {
        SizeSpec::dynamic(|_, v: &u32| f64::from(*v))
    }
}
