// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_repeat --heading-base-level=0

//! Understory Repeat: viewport windowing and render-slot recycling.
//!
//! This crate renders huge ordered collections inside a scrollable viewport by
//! materializing only the items near the visible area, recycling a small pool of
//! render slots as the viewport moves.
//!
//! The core concepts are:
//!
//! - [`SizeSpec`] and [`DimensionResolver`]: how wide and tall each item is: measured
//!   from the first item, a fixed pixel size, a percentage of the viewport, or a
//!   per-item function.
//! - [`Layout`]: one of four [`LayoutStrategy`] variants (list or grid, static or
//!   dynamic) that map indices to [`ItemGeometry`] and offsets back to indices.
//!   Dynamic strategies keep a forward-extended geometry cache.
//! - [`RangeCalculator`]: derives the [`RenderRange`] to materialize for a scroll
//!   offset, widened by a render buffer, with hysteresis boundaries so most scroll
//!   events cost a single comparison.
//! - [`Recycler`]: binds pooled [`Slot`]s to indices entering the range, reusing slots
//!   vacated by indices that left it before creating new ones.
//! - [`BindingSynchronizer`]: spreads expensive content synchronization over several
//!   frames after a scroll.
//! - [`Repeater`]: the engine tying these together behind a [`Viewport`] and a
//!   [`ContentHost`].
//!
//! The crate does not create content itself or listen to any events. Host frameworks
//! are responsible for:
//!
//! - Instantiating, binding, placing, and tearing down content via [`ContentHost`].
//! - Reporting scroll offset and size via [`Viewport`] and applying the total
//!   content extent the repeater pushes back.
//! - Calling [`Repeater::on_scroll`], [`Repeater::validate_resize`], and
//!   [`Repeater::set_data`] when the corresponding things change.
//! - Calling [`Repeater::tick`] once per frame while [`Repeater::wants_frame`] holds.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Size, Vec2};
//! use understory_repeat::{
//!     ContentHost, DataValue, RepeatConfig, RepeatExpression, Repeater, ScrollAxes,
//!     SizeSpec, SlotFlags, Viewport,
//! };
//!
//! struct Scroller {
//!     offset: f64,
//!     content: f64,
//! }
//!
//! impl Viewport for Scroller {
//!     fn scroll_axes(&self) -> ScrollAxes {
//!         ScrollAxes::VERTICAL
//!     }
//!     fn scroll_offset(&self) -> Vec2 {
//!         Vec2::new(0.0, self.offset)
//!     }
//!     fn scroll_extent(&self) -> Size {
//!         Size::new(320.0, self.content)
//!     }
//!     fn viewport_size(&self) -> Size {
//!         Size::new(320.0, 480.0)
//!     }
//!     fn set_content_extent(&mut self, extent: f64) {
//!         self.content = extent;
//!     }
//! }
//!
//! /// Each slot is just a label and a rectangle.
//! struct Labels;
//!
//! impl ContentHost<String> for Labels {
//!     type Content = (String, Rect);
//!
//!     fn instantiate(&mut self) -> Self::Content {
//!         (String::new(), Rect::ZERO)
//!     }
//!     fn bind(&mut self, content: &mut Self::Content, _: usize, item: &String, _: SlotFlags) {
//!         content.0.clone_from(item);
//!     }
//!     fn place(&mut self, content: &mut Self::Content, rect: Rect) {
//!         content.1 = rect;
//!     }
//!     fn synchronize(&mut self, _: &mut Self::Content) {}
//!     fn set_active(&mut self, _: &mut Self::Content, _: bool) {}
//!     fn natural_size(&self, _: &Self::Content) -> Size {
//!         Size::ZERO
//!     }
//! }
//!
//! let config = RepeatConfig::new(RepeatExpression::parse("row in rows").unwrap())
//!     .with_height(SizeSpec::Pixels(48.0))
//!     .with_render_buffer(4);
//! let scroller = Scroller { offset: 0.0, content: 0.0 };
//! let mut repeater = Repeater::new(config, scroller, Labels).unwrap();
//!
//! let rows: Vec<String> = (0..10_000).map(|i| format!("row {i}")).collect();
//! repeater.set_data(DataValue::Items(rows)).unwrap();
//! assert_eq!(repeater.viewport().content, 480_000.0);
//!
//! // Ten rows are visible, plus four buffered below.
//! let range = repeater.render_range();
//! assert_eq!(range.indices(), 0..14);
//!
//! repeater.viewport_mut().offset = 4_800.0;
//! assert!(repeater.on_scroll());
//! while repeater.wants_frame() {
//!     repeater.tick();
//! }
//! let slot = repeater.slot_for_index(100).unwrap();
//! assert_eq!(slot.content().0, "row 100");
//! assert_eq!(slot.placement(), Some(Rect::new(0.0, 4_800.0, 320.0, 4_848.0)));
//! ```
//!
//! Hosts that read sizes from markup attributes can validate them up front with
//! [`RepeatConfig::from_attributes`], supplying an [`ExpressionCompiler`] for
//! anything beyond literal pixel and percentage sizes.
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std`.
//! - `libm`: forwards to `kurbo/libm` for `no_std` builds.
//! - `tracing`: structured logs of layout passes, pool growth, and synchronization
//!   under the `understory_repeat` target.
//! - `serde`: `Serialize`/`Deserialize` for plain value types such as [`RenderRange`]
//!   and [`RepeatStats`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[macro_use]
mod macros;

mod config;
mod dimension;
mod error;
mod layout;
mod range;
mod recycler;
mod repeater;
mod slot;
mod sync;
mod viewport;

pub use config::{
    Attributes, CompiledSize, DEFAULT_RENDER_BUFFER, DimensionMode, ExpressionCompiler,
    NoExpressions, RepeatConfig, RepeatExpression, SizeFn, SizeSpec,
};
pub use dimension::{DimensionResolver, clamp_px};
pub use error::{Error, Result};
pub use layout::{
    DynamicGrid, DynamicList, ItemGeometry, Layout, LayoutContext, LayoutStrategy, Shape,
    StaticGrid, StaticList,
};
pub use range::{RangeCalculator, RenderRange};
pub use recycler::{ContentHost, Recycler};
pub use repeater::{DataValue, RepeatStats, Repeater};
pub use slot::{Slot, SlotFlags, SlotId, SlotPool, SlotState};
pub use sync::BindingSynchronizer;
pub use viewport::{Orientation, ScrollAxes, Viewport, ViewportGeometry};
