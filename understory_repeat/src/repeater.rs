// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The repeater: ties dimensions, layout, range, recycling, and synchronization together.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Size;

use crate::config::{RepeatConfig, RepeatExpression};
use crate::dimension::DimensionResolver;
use crate::layout::{ItemGeometry, Layout, LayoutContext, LayoutStrategy, Shape};
use crate::range::{RangeCalculator, RenderRange};
use crate::recycler::{ContentHost, Recycler};
use crate::slot::{Slot, SlotId};
use crate::sync::BindingSynchronizer;
use crate::viewport::{Orientation, Viewport, ViewportGeometry};
use crate::{Error, Result};

/// A value produced by evaluating the collection expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataValue<T> {
    /// An ordered sequence.
    Items(Vec<T>),
    /// No value yet; rendered as an empty collection.
    Absent,
    /// Anything that is not a sequence, described for error reporting.
    Other(String),
}

impl<T> From<Vec<T>> for DataValue<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Items(items)
    }
}

/// Point-in-time counters for a repeater.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepeatStats {
    /// Number of items.
    pub len: usize,
    /// Number of indices bound to a slot.
    pub shown: usize,
    /// Number of instantiated slots.
    pub pooled: usize,
    /// Number of free slots.
    pub free: usize,
    /// Steady-state pool bound.
    pub pool_capacity: usize,
    /// Slots waiting for synchronization.
    pub pending_sync: usize,
    /// Items with cached geometry (dynamic layouts only).
    pub cached_geometry: usize,
}

/// Renders a large ordered collection inside a [`Viewport`] through a small pool of
/// recycled slots.
///
/// The host drives it:
///
/// - [`set_data`](Self::set_data) whenever the collection is replaced,
/// - [`on_scroll`](Self::on_scroll) on every scroll event,
/// - [`validate_resize`](Self::validate_resize) when the viewport may have changed size,
/// - [`tick`](Self::tick) once per frame while [`wants_frame`](Self::wants_frame) is `true`,
/// - [`destroy`](Self::destroy) when the repeater goes away.
///
/// All calls are synchronous and must not overlap.
pub struct Repeater<T, V, H>
where
    V: Viewport,
    H: ContentHost<T>,
{
    repeat: RepeatExpression,
    viewport: ViewportGeometry<V>,
    host: H,
    items: Vec<T>,
    primary: DimensionResolver<T>,
    secondary: DimensionResolver<T>,
    layout: Layout,
    ranges: RangeCalculator,
    recycler: Recycler<T, H::Content>,
    sync: BindingSynchronizer,
    entering: Vec<(SlotId, usize)>,
    viewport_size: Size,
    measured: bool,
    destroyed: bool,
}

impl<T, V, H> core::fmt::Debug for Repeater<T, V, H>
where
    V: Viewport,
    H: ContentHost<T>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Repeater")
            .field("repeat", &self.repeat)
            .field("orientation", &self.viewport.orientation())
            .field("layout", &self.layout)
            .field("len", &self.items.len())
            .field("range", &self.ranges.current())
            .field("recycler", &self.recycler)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<T, V, H> Repeater<T, V, H>
where
    V: Viewport,
    H: ContentHost<T>,
{
    /// Creates a repeater over an empty collection.
    ///
    /// Fails if the viewport does not scroll on exactly one axis.
    pub fn new(config: RepeatConfig<T>, viewport: V, host: H) -> Result<Self> {
        let viewport = ViewportGeometry::new(viewport)?;
        let orientation = viewport.orientation();
        let (primary, secondary) = match orientation {
            Orientation::Vertical => (config.height, config.width),
            Orientation::Horizontal => (config.width, config.height),
        };
        let viewport_size = viewport.size();

        let mut primary = DimensionResolver::new(primary);
        let mut secondary = DimensionResolver::new(secondary);
        primary.resolve(orientation.primary_of(viewport_size), None);
        secondary.resolve(orientation.secondary_of(viewport_size), None);
        // A computed cross size is classified again once the first item is measured.
        let shape = Shape::classify(&secondary, viewport.secondary_extent());
        let is_static = primary.is_static() && secondary.is_static();

        rdebug!(
            ?orientation,
            ?shape,
            is_static,
            render_buffer = config.render_buffer,
            collection = %config.repeat.collection,
            "repeater created"
        );

        Ok(Self {
            repeat: config.repeat,
            viewport,
            host,
            items: Vec::new(),
            primary,
            secondary,
            layout: Layout::select(shape, is_static),
            ranges: RangeCalculator::new(config.render_buffer),
            recycler: Recycler::new(config.force_refresh_media),
            sync: BindingSynchronizer::new(),
            entering: Vec::new(),
            viewport_size,
            measured: false,
            destroyed: false,
        })
    }

    /// Replaces the whole collection and re-renders.
    ///
    /// [`DataValue::Absent`] renders nothing. Anything other than a sequence is an
    /// error and leaves the current rendering untouched.
    pub fn set_data(&mut self, value: DataValue<T>) -> Result<()> {
        let items = match value {
            DataValue::Items(items) => items,
            DataValue::Absent => Vec::new(),
            DataValue::Other(found) => {
                return Err(Error::NotASequence {
                    expression: self.repeat.collection.clone(),
                    found,
                });
            }
        };
        if self.destroyed {
            return Ok(());
        }
        self.items = items;
        if !self.measured && !self.items.is_empty() {
            self.resolve_dimensions();
        }
        self.refresh_layout();
        Ok(())
    }

    /// Handles a scroll event. Returns `true` if the rendered range changed.
    ///
    /// While the scroll offset stays between the current range's boundaries this is
    /// a constant-time check.
    pub fn on_scroll(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        if !self.ranges.needs_update(self.viewport.primary_offset()) {
            return false;
        }
        self.layout_pass(false);
        true
    }

    /// Runs one synchronization batch. Returns `true` if another tick is wanted.
    pub fn tick(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.sync.tick(&mut self.recycler, &mut self.host)
    }

    /// Returns `true` while queued synchronization work remains.
    #[must_use]
    pub fn wants_frame(&self) -> bool {
        !self.destroyed && self.sync.has_pending()
    }

    /// Re-resolves sizes and re-renders if the viewport size changed.
    ///
    /// Percentage sizes follow the viewport and computed sizes are measured again.
    /// Any size change re-renders, since the cross extent alone moves list widths and
    /// grid packing. Returns `true` if anything was done.
    pub fn validate_resize(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        let size = self.viewport.size();
        if size == self.viewport_size {
            return false;
        }
        rdebug!(from = ?self.viewport_size, to = ?size, "viewport resized");
        self.viewport_size = size;
        self.resolve_dimensions();
        self.refresh_layout();
        true
    }

    /// Drops cached geometry and re-renders every shown index.
    pub fn refresh_layout(&mut self) {
        if self.destroyed {
            return;
        }
        LayoutStrategy::<T>::invalidate(&mut self.layout);
        self.ranges.invalidate();
        self.update_capacity();
        self.layout_pass(true);
    }

    /// Stops all work and releases every slot.
    ///
    /// Afterwards the repeater ignores all calls; queued synchronization never runs.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.sync.cancel();
        self.recycler.release_all(&mut self.host);
        rdebug!("repeater destroyed");
    }

    /// Returns `true` once [`destroy`](Self::destroy) has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The most recently rendered range.
    #[must_use]
    pub fn render_range(&self) -> RenderRange {
        self.ranges.current()
    }

    /// Geometry of the item at `index`, or `None` if out of bounds.
    pub fn geometry_at(&mut self, index: usize) -> Option<ItemGeometry> {
        if index >= self.items.len() {
            return None;
        }
        let cx = LayoutContext {
            items: &self.items,
            primary: &self.primary,
            secondary: &self.secondary,
            cross_extent: self.viewport.secondary_extent(),
        };
        Some(self.layout.geometry_at(&cx, index))
    }

    /// Scroll offset, in viewport coordinates, at which the item at `index` starts.
    pub fn offset_of_index(&mut self, index: usize) -> Option<f64> {
        let geometry = self.geometry_at(index)?;
        let leading = self
            .viewport
            .orientation()
            .primary_of(self.viewport.get().leading_extent());
        #[allow(
            clippy::cast_precision_loss,
            reason = "positions beyond 2^53 pixels are not meaningful"
        )]
        let pos = geometry.primary_pos as f64;
        Some(leading + pos)
    }

    /// Total extent of the items along the scroll axis.
    pub fn total_extent(&mut self) -> u64 {
        let cx = LayoutContext {
            items: &self.items,
            primary: &self.primary,
            secondary: &self.secondary,
            cross_extent: self.viewport.secondary_extent(),
        };
        self.layout.total_extent(&cx)
    }

    /// Scroll orientation.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.viewport.orientation()
    }

    /// Layout shape.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.layout.shape()
    }

    /// Returns `true` if neither axis is sized per item.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.layout.is_static()
    }

    /// The parsed repeat expression.
    #[must_use]
    pub fn repeat_expression(&self) -> &RepeatExpression {
        &self.repeat
    }

    /// Slot currently showing `index`.
    #[must_use]
    pub fn slot_for_index(&self, index: usize) -> Option<&Slot<H::Content>> {
        self.recycler.slot(self.recycler.slot_for_index(index)?)
    }

    /// Point-in-time counters.
    #[must_use]
    pub fn stats(&self) -> RepeatStats {
        let pool = self.recycler.pool();
        RepeatStats {
            len: self.items.len(),
            shown: self.recycler.shown_len(),
            pooled: pool.len(),
            free: pool.free_len(),
            pool_capacity: pool.capacity(),
            pending_sync: self.sync.pending(),
            cached_geometry: LayoutStrategy::<T>::cached_len(&self.layout),
        }
    }

    /// The current collection.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.items
    }

    /// The content host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The content host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The viewport.
    #[must_use]
    pub fn viewport(&self) -> &V {
        self.viewport.get()
    }

    /// The viewport, mutably. Follow scroll changes with [`on_scroll`](Self::on_scroll)
    /// and size changes with [`validate_resize`](Self::validate_resize).
    pub fn viewport_mut(&mut self) -> &mut V {
        self.viewport.get_mut()
    }

    fn resolve_dimensions(&mut self) {
        let o = self.viewport.orientation();
        let size = self.viewport.size();
        let first_measurement = !self.measured;
        let needs_measurement =
            self.primary.needs_measurement() || self.secondary.needs_measurement();
        let measured = if needs_measurement {
            let natural = self.recycler.measure_first(&mut self.host, &self.items);
            if natural.is_some() {
                self.measured = true;
            }
            natural
        } else {
            self.measured = true;
            None
        };
        self.primary
            .resolve(o.primary_of(size), measured.map(|m| o.primary_of(m)));
        self.secondary
            .resolve(o.secondary_of(size), measured.map(|m| o.secondary_of(m)));

        // The shape is settled by the first measurement and kept from then on.
        if first_measurement && measured.is_some() && self.secondary.needs_measurement() {
            let shape = Shape::classify(&self.secondary, self.viewport.secondary_extent());
            if shape != self.layout.shape() {
                self.layout = Layout::select(shape, self.layout.is_static());
                rdebug!(?shape, "shape settled by measurement");
            }
        }
        rdebug!(
            primary = self.primary.resolved(),
            secondary = self.secondary.resolved(),
            ?measured,
            "dimensions resolved"
        );
    }

    /// `2 * ceil(extent / estimated_size) * across + 2 * buffer`.
    fn update_capacity(&mut self) {
        let cx = LayoutContext {
            items: &self.items,
            primary: &self.primary,
            secondary: &self.secondary,
            cross_extent: self.viewport.secondary_extent(),
        };
        let estimate = self.primary.first_size(&self.items).max(1);
        let visible = self.viewport.primary_extent().div_ceil(estimate);
        let visible = usize::try_from(visible).unwrap_or(usize::MAX);
        let across = self.layout.items_across(&cx);
        let buffer = self.ranges.render_buffer();
        let capacity = visible
            .saturating_mul(across)
            .saturating_mul(2)
            .saturating_add(buffer.saturating_mul(2));
        self.recycler.set_capacity(capacity);
    }

    fn layout_pass(&mut self, full_refresh: bool) {
        let orientation = self.viewport.orientation();
        let offset = self.viewport.primary_offset();
        let extent = self.viewport.primary_extent();
        let cx = LayoutContext {
            items: &self.items,
            primary: &self.primary,
            secondary: &self.secondary,
            cross_extent: self.viewport.secondary_extent(),
        };

        // Zero-height fixed items would all sit at offset 0.
        let collapsed = self.layout.is_static() && self.primary.resolved() == 0;
        let range = if collapsed {
            self.ranges.invalidate();
            RenderRange::EMPTY
        } else {
            self.ranges.compute(&mut self.layout, &cx, offset, extent)
        };

        self.entering.clear();
        self.recycler.reconcile(
            &mut self.host,
            &mut self.layout,
            &cx,
            range,
            orientation,
            full_refresh,
            &mut self.entering,
        );

        let total = self.layout.total_extent(&cx);
        self.viewport.push_total_extent(total);
        self.viewport.place_after_content(total);

        if full_refresh {
            self.sync
                .flush_now(&mut self.recycler, &mut self.host, self.entering.drain(..));
        } else {
            self.sync.enqueue(self.entering.drain(..));
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec::Vec;

    use kurbo::{Size, Vec2};

    use super::{DataValue, Repeater};
    use crate::config::{RepeatConfig, RepeatExpression, SizeSpec};
    use crate::layout::Shape;
    use crate::layout::test_util::{Lcg, from_item};
    use crate::recycler::test_host::RecordingHost;
    use crate::viewport::{Orientation, ScrollAxes, Viewport};
    use crate::Error;

    #[derive(Debug)]
    struct TestViewport {
        axes: ScrollAxes,
        offset: Vec2,
        size: Size,
        leading: Size,
        content: f64,
        after: Option<f64>,
    }

    impl TestViewport {
        fn vertical(width: f64, height: f64) -> Self {
            Self {
                axes: ScrollAxes::VERTICAL,
                offset: Vec2::ZERO,
                size: Size::new(width, height),
                leading: Size::ZERO,
                content: 0.0,
                after: None,
            }
        }
    }

    impl Viewport for TestViewport {
        fn scroll_axes(&self) -> ScrollAxes {
            self.axes
        }
        fn scroll_offset(&self) -> Vec2 {
            self.offset
        }
        fn scroll_extent(&self) -> Size {
            if self.axes == ScrollAxes::HORIZONTAL {
                Size::new(self.content, self.size.height)
            } else {
                Size::new(self.size.width, self.content)
            }
        }
        fn viewport_size(&self) -> Size {
            self.size
        }
        fn leading_extent(&self) -> Size {
            self.leading
        }
        fn set_content_extent(&mut self, extent: f64) {
            self.content = extent;
        }
        fn place_after_content(&mut self, position: f64) {
            self.after = Some(position);
        }
    }

    type TestRepeater = Repeater<u32, TestViewport, RecordingHost>;

    fn config() -> RepeatConfig<u32> {
        RepeatConfig::new(RepeatExpression::parse("item in items").unwrap())
    }

    fn repeater(config: RepeatConfig<u32>, viewport: TestViewport) -> TestRepeater {
        Repeater::new(config, viewport, RecordingHost::default()).unwrap()
    }

    fn scroll_to(r: &mut TestRepeater, y: f64) -> bool {
        r.viewport_mut().offset = Vec2::new(0.0, y);
        r.on_scroll()
    }

    fn drain(r: &mut TestRepeater) {
        while r.tick() {}
    }

    #[test]
    fn thousand_item_list() {
        let mut r = repeater(
            config().with_height(SizeSpec::Pixels(50.0)),
            TestViewport::vertical(300.0, 500.0),
        );
        assert_eq!(r.shape(), Shape::List);
        assert!(r.is_static());
        r.set_data((0..1000).collect::<Vec<u32>>().into()).unwrap();

        let range = r.render_range();
        assert_eq!((range.start, range.last()), (0, Some(19)));
        assert_eq!(r.viewport().content, 50_000.0);
        assert_eq!(r.viewport().after, Some(50_000.0));
        // Data changes synchronize immediately; one more sync measured the unset width.
        assert!(!r.wants_frame());
        assert_eq!(r.host().syncs, 21);

        assert!(scroll_to(&mut r, 1000.0));
        let range = r.render_range();
        assert_eq!((range.start, range.last()), (10, Some(39)));
        assert!(r.wants_frame());
        drain(&mut r);
        assert_eq!(r.host().syncs, 41);

        // Within the hysteresis window nothing happens.
        assert!(!scroll_to(&mut r, 1000.0));
        let slot = r.slot_for_index(25).unwrap();
        assert_eq!(slot.content().synced, Some(25));
    }

    fn grid_scenario(width: SizeSpec<u32>) {
        let mut r = repeater(
            config()
                .with_height(SizeSpec::Pixels(50.0))
                .with_width(width),
            TestViewport::vertical(300.0, 200.0),
        );
        assert_eq!(r.shape(), Shape::Grid);
        r.set_data(DataValue::Items((0..100).map(|_| 100).collect()))
            .unwrap();

        // 34 rows; the last holds only item 99.
        scroll_to(&mut r, 1500.0);
        drain(&mut r);
        let range = r.render_range();
        assert_eq!(range.last(), Some(99));
        assert_eq!(range.visible_start, 90);
        for i in 90..100 {
            assert!(r.slot_for_index(i).is_some());
        }
        let last = r.geometry_at(99).unwrap();
        assert_eq!(last.primary_pos, 33 * 50);
        assert_eq!(last.secondary_pos, 0);
        assert_eq!(r.viewport().after, Some(1700.0));
        assert_eq!(r.viewport().content, 1700.0);
        assert_eq!(r.total_extent(), last.primary_end());
    }

    #[test]
    fn static_grid_renders_last_row() {
        grid_scenario(SizeSpec::Pixels(100.0));
    }

    #[test]
    fn dynamic_grid_renders_last_row() {
        grid_scenario(from_item());
    }

    #[test]
    fn destroy_mid_scroll() {
        let mut r = repeater(
            config().with_height(SizeSpec::Pixels(50.0)),
            TestViewport::vertical(300.0, 500.0),
        );
        r.set_data((0..1000).collect::<Vec<u32>>().into()).unwrap();
        assert!(scroll_to(&mut r, 5000.0));
        assert!(r.tick());
        let syncs = r.host().syncs;
        assert!(r.stats().pending_sync > 0);

        r.destroy();
        assert!(!r.wants_frame());
        assert!(!r.tick());
        assert!(!scroll_to(&mut r, 9000.0));
        assert_eq!(r.host().syncs, syncs);
        let stats = r.stats();
        assert_eq!(stats.pooled, 0);
        assert_eq!(stats.shown, 0);
        assert_eq!(stats.pending_sync, 0);
        assert_eq!(r.host().destroyed.len(), r.host().instantiated);
        assert!(r.is_destroyed());
    }

    #[test]
    fn pool_stays_within_bound() {
        for (width, height) in [(None, 50.0), (Some(100.0), 50.0), (Some(60.0), 35.0)] {
            let mut cfg = config().with_height(SizeSpec::Pixels(height));
            if let Some(w) = width {
                cfg = cfg.with_width(SizeSpec::Pixels(w));
            }
            let mut r = repeater(cfg, TestViewport::vertical(300.0, 500.0));
            r.set_data((0..5000).collect::<Vec<u32>>().into()).unwrap();
            let capacity = r.stats().pool_capacity;
            let mut rng = Lcg::new(11);
            for _ in 0..200 {
                let y = f64::from(rng.range(0, 200_000));
                scroll_to(&mut r, y);
                if rng.range(0, 3) == 0 {
                    drain(&mut r);
                }
                let stats = r.stats();
                assert!(
                    stats.pooled <= capacity,
                    "{stats:?} exceeds {capacity} at {y}"
                );
            }
        }
    }

    #[test]
    fn bad_input_fails_fast() {
        let mut viewport = TestViewport::vertical(300.0, 500.0);
        viewport.axes = ScrollAxes::all();
        assert_eq!(
            Repeater::new(config(), viewport, RecordingHost::default()).unwrap_err(),
            Error::AmbiguousScrollAxes
        );

        let mut r = repeater(
            config().with_height(SizeSpec::Pixels(50.0)),
            TestViewport::vertical(300.0, 500.0),
        );
        r.set_data(vec_data(10)).unwrap();
        let err = r.set_data(DataValue::Other("object".to_string())).unwrap_err();
        assert_eq!(
            err,
            Error::NotASequence {
                expression: "items".to_string(),
                found: "object".to_string(),
            }
        );
        // Nothing was torn down.
        assert_eq!(r.stats().shown, 10);

        r.set_data(DataValue::Absent).unwrap();
        assert!(r.render_range().is_empty());
        assert_eq!(r.stats().shown, 0);
        assert_eq!(r.viewport().content, 0.0);
    }

    fn vec_data(len: u32) -> DataValue<u32> {
        DataValue::Items((0..len).collect())
    }

    fn measuring_repeater() -> TestRepeater {
        Repeater::new(
            config(),
            TestViewport::vertical(300.0, 500.0),
            RecordingHost {
                natural: true,
                ..RecordingHost::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn computed_size_is_measured_from_first_item() {
        let mut r = measuring_repeater();
        assert_eq!(r.shape(), Shape::List);
        // Natural size of item `v` is `v` by `v / 2`: 80px wide packs 3 across.
        r.set_data(DataValue::Items(alloc::vec![80; 100])).unwrap();
        assert_eq!(r.shape(), Shape::Grid);
        assert!(r.is_static());
        let g = r.geometry_at(1).unwrap();
        assert_eq!((g.primary_pos, g.secondary_pos), (0, 80));
        assert_eq!((g.primary_size, g.secondary_size), (40, 80));
        assert_eq!(r.geometry_at(3).unwrap().primary_pos, 40);
        // 13 rows start inside the viewport.
        assert_eq!(r.render_range().visible_end, 39);
        assert_eq!(r.offset_of_index(10), Some(120.0));

        // The shape stays fixed once measured.
        r.set_data(DataValue::Items(alloc::vec![300; 100])).unwrap();
        assert_eq!(r.shape(), Shape::Grid);
    }

    #[test]
    fn full_width_items_form_a_list() {
        let mut r = measuring_repeater();
        r.set_data(DataValue::Items(alloc::vec![300; 100])).unwrap();
        assert_eq!(r.shape(), Shape::List);
        assert_eq!(r.geometry_at(2).unwrap().primary_pos, 300);

        let r = repeater(
            config()
                .with_height(SizeSpec::Pixels(50.0))
                .with_width(SizeSpec::Pixels(300.0)),
            TestViewport::vertical(300.0, 500.0),
        );
        assert_eq!(r.shape(), Shape::List);
    }

    #[test]
    fn percent_follows_resize() {
        let mut r = repeater(
            config().with_height(SizeSpec::Percent(10.0)),
            TestViewport::vertical(300.0, 500.0),
        );
        r.set_data(vec_data(100)).unwrap();
        assert_eq!(r.geometry_at(1).unwrap().primary_size, 50);
        assert!(!r.validate_resize());

        r.viewport_mut().size = Size::new(300.0, 1000.0);
        assert!(r.validate_resize());
        assert_eq!(r.geometry_at(1).unwrap().primary_size, 100);
        assert_eq!(r.viewport().content, 10_000.0);
        let slot = r.slot_for_index(1).unwrap();
        assert_eq!(slot.placement().unwrap().y0, 100.0);
    }

    #[test]
    fn cross_resize_refreshes_fixed_sizes() {
        let mut r = repeater(
            config().with_height(SizeSpec::Pixels(50.0)),
            TestViewport::vertical(300.0, 500.0),
        );
        r.set_data(vec_data(100)).unwrap();
        let before = r.slot_for_index(0).unwrap().placement().unwrap();
        assert_eq!(before.width(), 300.0);

        r.viewport_mut().size = Size::new(420.0, 500.0);
        assert!(r.validate_resize());
        let after = r.slot_for_index(0).unwrap().placement().unwrap();
        assert_eq!(after.width(), 420.0);
        assert_eq!(r.geometry_at(1).unwrap().primary_pos, 50);
    }

    #[test]
    fn dynamic_list_syncs_incrementally() {
        let mut r = repeater(
            config().with_height(from_item()),
            TestViewport::vertical(300.0, 500.0),
        );
        assert!(!r.is_static());
        let items: Vec<u32> = (0..2000).map(|i| 20 + (i % 5) * 10).collect();
        r.set_data(items.into()).unwrap();
        assert_eq!(r.stats().pending_sync, 0);

        assert!(scroll_to(&mut r, 20_000.0));
        let pending = r.stats().pending_sync;
        assert!(pending > 0);
        assert!(r.tick());
        assert!(r.stats().pending_sync < pending);
        drain(&mut r);
        assert!(!r.wants_frame());

        let range = r.render_range();
        for i in range.visible_start..range.visible_end {
            let slot = r.slot_for_index(i).unwrap();
            assert_eq!(slot.content().synced, Some(r.data()[i]));
        }
        assert!(r.stats().cached_geometry >= range.end);
    }

    #[test]
    fn hidden_items_are_not_materialized() {
        let mut r = repeater(
            config().with_height(from_item()),
            TestViewport::vertical(300.0, 500.0),
        );
        let items: Vec<u32> = (0..10_000)
            .map(|i| if i < 5000 { 0 } else { 50 })
            .collect();
        r.set_data(items.into()).unwrap();
        let range = r.render_range();
        assert_eq!(range.visible_start..range.visible_end, 5000..5010);
        let stats = r.stats();
        assert_eq!(stats.shown, 30);
        assert!(stats.pooled <= 31, "{stats:?}");
    }

    #[test]
    fn leading_content_and_horizontal_scroll() {
        let mut viewport = TestViewport::vertical(400.0, 300.0);
        viewport.axes = ScrollAxes::HORIZONTAL;
        viewport.leading = Size::new(120.0, 0.0);
        let mut r = repeater(config().with_width(SizeSpec::Pixels(80.0)), viewport);
        assert_eq!(r.orientation(), Orientation::Horizontal);
        r.set_data(vec_data(50)).unwrap();
        assert_eq!(r.viewport().content, 120.0 + 4000.0);
        assert_eq!(r.offset_of_index(2), Some(280.0));
        let slot = r.slot_for_index(2).unwrap();
        let rect = slot.placement().unwrap();
        assert_eq!((rect.x0, rect.y0, rect.height()), (160.0, 0.0, 300.0));

        r.viewport_mut().offset = Vec2::new(120.0 + 800.0, 0.0);
        assert!(r.on_scroll());
        assert_eq!(r.render_range().visible_start, 10);
    }
}
