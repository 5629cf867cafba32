// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render range computation with hysteresis.

use core::ops::Range;

use crate::layout::{ItemGeometry, LayoutContext, LayoutStrategy};

/// Which indices to materialize, and when to recompute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderRange {
    /// First materialized index (inclusive).
    pub start: usize,
    /// One past the last materialized index (exclusive).
    pub end: usize,
    /// First visible index (inclusive).
    pub visible_start: usize,
    /// One past the last visible index (exclusive).
    pub visible_end: usize,
    /// Scrolling to an offset below this brings a new item into view.
    pub before_boundary: u64,
    /// Scrolling to an offset above this brings a new item into view.
    pub after_boundary: u64,
}

impl RenderRange {
    /// A range with nothing to render.
    pub const EMPTY: Self = Self {
        start: 0,
        end: 0,
        visible_start: 0,
        visible_end: 0,
        before_boundary: 0,
        after_boundary: u64::MAX,
    };

    /// Returns `true` if nothing is materialized.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Number of materialized indices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if `index` is materialized.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// Last materialized index.
    #[must_use]
    pub const fn last(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.end - 1)
        }
    }

    /// Materialized indices.
    #[must_use]
    pub const fn indices(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of visible indices.
    #[must_use]
    pub const fn visible_len(&self) -> usize {
        self.visible_end.saturating_sub(self.visible_start)
    }
}

impl Default for RenderRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Derives a [`RenderRange`] from a scroll offset and a layout.
///
/// The visible range is found by estimating an index for the offset and walking to
/// the exact first row that covers it, then walking forward to the last row that
/// starts before the viewport's far edge. Items without extent at either edge are
/// not visible; only the render buffer reaches them. Both ends are widened by the
/// render buffer and the far end further to the end of its row, so grid rows are
/// never split.
///
/// When scrolling forward the search resumes from the previous first visible index
/// instead of the estimate if that is further along.
///
/// While the offset stays within the last range's boundaries no new item can become
/// visible, so [`RangeCalculator::needs_update`] is an O(1) check.
#[derive(Clone, Debug)]
pub struct RangeCalculator {
    render_buffer: usize,
    range: RenderRange,
    dirty: bool,
}

impl RangeCalculator {
    /// Creates a calculator that materializes `render_buffer` extra items per side.
    #[must_use]
    pub fn new(render_buffer: usize) -> Self {
        Self {
            render_buffer,
            range: RenderRange::EMPTY,
            dirty: true,
        }
    }

    /// Extra items materialized per side.
    #[must_use]
    pub fn render_buffer(&self) -> usize {
        self.render_buffer
    }

    /// The most recently computed range.
    #[must_use]
    pub fn current(&self) -> RenderRange {
        self.range
    }

    /// Forgets the last range, forcing the next check to recompute.
    pub fn invalidate(&mut self) {
        self.range = RenderRange::EMPTY;
        self.dirty = true;
    }

    /// Returns `true` if scrolling to `offset` may change the visible items.
    #[must_use]
    pub fn needs_update(&self, offset: u64) -> bool {
        self.dirty || offset < self.range.before_boundary || offset > self.range.after_boundary
    }

    /// Computes the range for `offset` and a viewport `extent` along the scroll axis.
    pub fn compute<T, L>(
        &mut self,
        layout: &mut L,
        cx: &LayoutContext<'_, T>,
        offset: u64,
        extent: u32,
    ) -> RenderRange
    where
        L: LayoutStrategy<T> + ?Sized,
    {
        let len = cx.len();
        if len == 0 {
            self.range = RenderRange::EMPTY;
            self.dirty = false;
            return self.range;
        }
        let last = len - 1;
        let estimate = layout.estimate_index_at_offset(cx, offset);
        let mut first = if offset == 0 {
            0
        } else if !self.dirty && offset >= self.range.before_boundary {
            estimate.max(self.range.visible_start)
        } else {
            estimate
        }
        .min(last);

        while first > 0 && primary_pos(layout, cx, first) > offset {
            first -= 1;
        }
        while first < last && primary_pos(layout, cx, first + 1) <= offset {
            first += 1;
        }
        first = row_start(layout, cx, first);
        let first_pos = primary_pos(layout, cx, first);

        let far_edge = offset.saturating_add(u64::from(extent));
        let mut visible_last = first;
        while visible_last < last && primary_pos(layout, cx, visible_last + 1) < far_edge {
            visible_last += 1;
        }
        // Trailing items without extent take no space in the viewport.
        while visible_last > first && layout.geometry_at(cx, visible_last).primary_size == 0 {
            visible_last -= 1;
        }
        visible_last = row_end(layout, cx, visible_last);

        let start = first.saturating_sub(self.render_buffer);
        let end = row_end(
            layout,
            cx,
            visible_last.saturating_add(self.render_buffer).min(last),
        );

        let after_boundary = if visible_last < last {
            primary_pos(layout, cx, visible_last + 1).saturating_sub(u64::from(extent))
        } else {
            u64::MAX
        };

        self.range = RenderRange {
            start,
            end: end + 1,
            visible_start: first,
            visible_end: visible_last + 1,
            before_boundary: first_pos,
            after_boundary,
        };
        self.dirty = false;
        rtrace!(
            offset,
            extent,
            start = self.range.start,
            end = self.range.end,
            before = self.range.before_boundary,
            after = self.range.after_boundary,
            "render range"
        );
        self.range
    }
}

fn primary_pos<T, L>(layout: &mut L, cx: &LayoutContext<'_, T>, index: usize) -> u64
where
    L: LayoutStrategy<T> + ?Sized,
{
    layout.geometry_at(cx, index).primary_pos
}

/// Returns `true` if `next` directly follows `prev` within one grid row.
///
/// Items sharing a position but not packed side by side, such as zero-extent list
/// items, are separate rows.
fn same_row(prev: &ItemGeometry, next: &ItemGeometry) -> bool {
    prev.primary_pos == next.primary_pos
        && prev.secondary_pos.saturating_add(prev.secondary_size) == next.secondary_pos
}

fn row_start<T, L>(layout: &mut L, cx: &LayoutContext<'_, T>, mut index: usize) -> usize
where
    L: LayoutStrategy<T> + ?Sized,
{
    let mut next = layout.geometry_at(cx, index);
    while index > 0 {
        let prev = layout.geometry_at(cx, index - 1);
        if !same_row(&prev, &next) {
            break;
        }
        index -= 1;
        next = prev;
    }
    index
}

fn row_end<T, L>(layout: &mut L, cx: &LayoutContext<'_, T>, mut index: usize) -> usize
where
    L: LayoutStrategy<T> + ?Sized,
{
    let last = cx.last_index();
    let mut prev = layout.geometry_at(cx, index);
    while index < last {
        let next = layout.geometry_at(cx, index + 1);
        if !same_row(&prev, &next) {
            break;
        }
        index += 1;
        prev = next;
    }
    index
}
