// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scroll container collaborator and its primary/secondary axis adapter.

use kurbo::{Rect, Size, Vec2};

use crate::{Error, Result};

bitflags::bitflags! {
    /// Axes on which a viewport scrolls.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ScrollAxes: u8 {
        /// Scrolls left/right.
        const HORIZONTAL = 1 << 0;
        /// Scrolls up/down.
        const VERTICAL = 1 << 1;
    }
}

/// A scroll container hosting a repeater.
///
/// All values are in logical pixels. The repeater reads geometry from the viewport
/// and pushes back a single value: the total scrollable extent of its content.
pub trait Viewport {
    /// Axes the viewport scrolls on. Exactly one must be set.
    fn scroll_axes(&self) -> ScrollAxes;

    /// Current scroll offset of the viewport.
    fn scroll_offset(&self) -> Vec2;

    /// Current scrollable extent (content size) of the viewport.
    fn scroll_extent(&self) -> Size;

    /// Size of the visible area.
    fn viewport_size(&self) -> Size;

    /// Extent of any content laid out before the repeated items.
    ///
    /// The repeater subtracts it from the scroll offset and adds it to the pushed
    /// total extent.
    fn leading_extent(&self) -> Size {
        Size::ZERO
    }

    /// Sets the total scrollable extent along the scroll axis.
    fn set_content_extent(&mut self, extent: f64);

    /// Positions content that follows the repeated items at `position` along the scroll axis.
    ///
    /// `position` is relative to the start of the repeated items.
    fn place_after_content(&mut self, position: f64) {
        let _ = position;
    }
}

/// Scroll direction of a repeater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Primary axis is `y`.
    Vertical,
    /// Primary axis is `x`.
    Horizontal,
}

impl Orientation {
    /// Derives the orientation from the axes a viewport scrolls on.
    ///
    /// Both axes, or none, is a configuration error.
    pub fn from_axes(axes: ScrollAxes) -> Result<Self> {
        if axes.contains(ScrollAxes::HORIZONTAL | ScrollAxes::VERTICAL) {
            Err(Error::AmbiguousScrollAxes)
        } else if axes.contains(ScrollAxes::VERTICAL) {
            Ok(Self::Vertical)
        } else if axes.contains(ScrollAxes::HORIZONTAL) {
            Ok(Self::Horizontal)
        } else {
            Err(Error::NoScrollAxis)
        }
    }

    /// Component of `v` along the primary axis.
    #[must_use]
    pub fn primary(self, v: Vec2) -> f64 {
        match self {
            Self::Vertical => v.y,
            Self::Horizontal => v.x,
        }
    }

    /// Extent of `size` along the primary axis.
    #[must_use]
    pub fn primary_of(self, size: Size) -> f64 {
        match self {
            Self::Vertical => size.height,
            Self::Horizontal => size.width,
        }
    }

    /// Extent of `size` along the secondary axis.
    #[must_use]
    pub fn secondary_of(self, size: Size) -> f64 {
        match self {
            Self::Vertical => size.width,
            Self::Horizontal => size.height,
        }
    }

    /// Builds a rectangle from primary/secondary position and size.
    #[must_use]
    pub fn rect(self, primary_pos: f64, secondary_pos: f64, primary: f64, secondary: f64) -> Rect {
        match self {
            Self::Vertical => Rect::new(
                secondary_pos,
                primary_pos,
                secondary_pos + secondary,
                primary_pos + primary,
            ),
            Self::Horizontal => Rect::new(
                primary_pos,
                secondary_pos,
                primary_pos + primary,
                secondary_pos + secondary,
            ),
        }
    }
}

/// Reads a [`Viewport`] in terms of the repeater's primary and secondary axes.
#[derive(Debug)]
pub struct ViewportGeometry<V> {
    viewport: V,
    orientation: Orientation,
}

impl<V: Viewport> ViewportGeometry<V> {
    /// Wraps `viewport`, failing unless it scrolls on exactly one axis.
    pub fn new(viewport: V) -> Result<Self> {
        let orientation = Orientation::from_axes(viewport.scroll_axes())?;
        Ok(Self {
            viewport,
            orientation,
        })
    }

    /// Scroll orientation.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Scroll offset into the repeated items, clamped to the scrollable range.
    #[must_use]
    pub fn primary_offset(&self) -> u64 {
        let o = self.orientation;
        let leading = o.primary_of(self.viewport.leading_extent());
        let offset = o.primary(self.viewport.scroll_offset()) - leading;
        let limit = o.primary_of(self.viewport.scroll_extent()) - leading;
        let offset = if offset.is_finite() && limit.is_finite() {
            offset.min(limit)
        } else {
            offset
        };
        px_to_u64(offset)
    }

    /// Visible size along the scroll axis.
    #[must_use]
    pub fn primary_extent(&self) -> u32 {
        crate::clamp_px(self.orientation.primary_of(self.viewport.viewport_size()))
    }

    /// Visible size across the scroll axis.
    #[must_use]
    pub fn secondary_extent(&self) -> u32 {
        crate::clamp_px(self.orientation.secondary_of(self.viewport.viewport_size()))
    }

    /// Viewport size in raw logical pixels.
    #[must_use]
    pub fn size(&self) -> Size {
        self.viewport.viewport_size()
    }

    /// Pushes the total scrollable extent for `items_extent` worth of repeated items.
    pub fn push_total_extent(&mut self, items_extent: u64) {
        let leading = self.orientation.primary_of(self.viewport.leading_extent());
        let leading = if leading.is_finite() { leading.max(0.0) } else { 0.0 };
        #[allow(
            clippy::cast_precision_loss,
            reason = "extents beyond 2^53 pixels are not meaningful"
        )]
        let items = items_extent as f64;
        self.viewport.set_content_extent(leading + items);
    }

    /// Places the after-content marker at `position` along the scroll axis.
    pub fn place_after_content(&mut self, position: u64) {
        #[allow(
            clippy::cast_precision_loss,
            reason = "extents beyond 2^53 pixels are not meaningful"
        )]
        let position = position as f64;
        self.viewport.place_after_content(position);
    }

    /// Borrows the wrapped viewport.
    #[must_use]
    pub fn get(&self) -> &V {
        &self.viewport
    }

    /// Mutably borrows the wrapped viewport.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.viewport
    }
}

fn px_to_u64(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is finite and positive; float-to-int casts saturate"
    )]
    let px = value as u64;
    px
}
