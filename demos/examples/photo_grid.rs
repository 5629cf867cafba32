// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A photo grid: per-item widths, recycled cells, frame-amortized synchronization.
//!
//! This example drives a `Repeater` through a simulated scroll session against an
//! in-memory host and prints what the pool did.
//!
//! Run:
//! - `RUST_LOG=understory_repeat=debug cargo run -p understory_demos --example photo_grid`

use kurbo::{Rect, Size, Vec2};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use understory_repeat::{
    ContentHost, DataValue, RepeatConfig, RepeatExpression, Repeater, ScrollAxes, SizeSpec,
    SlotFlags, Viewport,
};

#[derive(Clone, Debug)]
struct Photo {
    id: u32,
    aspect: f64,
}

/// A vertical scroll container of fixed size.
#[derive(Debug)]
struct Scroller {
    offset: f64,
    size: Size,
    content: f64,
    footer: f64,
}

impl Viewport for Scroller {
    fn scroll_axes(&self) -> ScrollAxes {
        ScrollAxes::VERTICAL
    }

    fn scroll_offset(&self) -> Vec2 {
        Vec2::new(0.0, self.offset)
    }

    fn scroll_extent(&self) -> Size {
        Size::new(self.size.width, self.content)
    }

    fn viewport_size(&self) -> Size {
        self.size
    }

    fn set_content_extent(&mut self, extent: f64) {
        self.content = extent;
    }

    fn place_after_content(&mut self, position: f64) {
        self.footer = position;
    }
}

/// One on-screen thumbnail.
#[derive(Debug, Default)]
struct Thumb {
    photo: Option<u32>,
    rect: Rect,
    decoded: Option<u32>,
    live: bool,
}

#[derive(Debug, Default)]
struct Gallery {
    created: usize,
    decodes: usize,
    destroyed: usize,
}

impl ContentHost<Photo> for Gallery {
    type Content = Thumb;

    fn instantiate(&mut self) -> Thumb {
        self.created += 1;
        Thumb {
            live: true,
            ..Thumb::default()
        }
    }

    fn bind(&mut self, content: &mut Thumb, _index: usize, item: &Photo, _flags: SlotFlags) {
        content.photo = Some(item.id);
    }

    fn place(&mut self, content: &mut Thumb, rect: Rect) {
        content.rect = rect;
    }

    fn synchronize(&mut self, content: &mut Thumb) {
        if content.decoded != content.photo {
            self.decodes += 1;
            content.decoded = content.photo;
        }
    }

    fn set_active(&mut self, content: &mut Thumb, active: bool) {
        content.live = active;
    }

    fn natural_size(&self, _content: &Thumb) -> Size {
        Size::new(120.0, 120.0)
    }

    fn destroy(&mut self, _content: Thumb) {
        self.destroyed += 1;
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RepeatConfig::new(
        RepeatExpression::parse("photo in album.photos track by photo.id")
            .expect("static expression"),
    )
    .with_height(SizeSpec::Pixels(120.0))
    .with_width(SizeSpec::dynamic(|_, photo: &Photo| 120.0 * photo.aspect))
    .with_render_buffer(6);

    let scroller = Scroller {
        offset: 0.0,
        size: Size::new(640.0, 480.0),
        content: 0.0,
        footer: 0.0,
    };
    let mut repeater =
        Repeater::new(config, scroller, Gallery::default()).expect("one scroll axis");

    let photos: Vec<Photo> = (0..20_000)
        .map(|id| Photo {
            id,
            aspect: [1.0, 1.5, 0.75, 1.33][id as usize % 4],
        })
        .collect();
    repeater
        .set_data(DataValue::Items(photos))
        .expect("photos are a sequence");
    tracing::info!(
        shape = ?repeater.shape(),
        is_static = repeater.is_static(),
        content = repeater.viewport().content,
        "loaded"
    );

    // Fling down, one frame at a time.
    let mut frames = 0;
    for step in 1..=240 {
        repeater.viewport_mut().offset = f64::from(step) * 90.0;
        repeater.on_scroll();
        repeater.tick();
        frames += 1;
    }
    while repeater.wants_frame() {
        repeater.tick();
        frames += 1;
    }

    let range = repeater.render_range();
    let stats = repeater.stats();
    tracing::info!(?range, ?stats, frames, "after fling");
    let visible = (range.visible_start..range.visible_end)
        .filter_map(|i| repeater.slot_for_index(i))
        .filter(|slot| slot.is_active() && slot.content().decoded.is_some())
        .count();
    println!(
        "visible {} items ({} decoded), pool {} / {}, {} cells created, {} decodes",
        range.visible_len(),
        visible,
        stats.pooled,
        stats.pool_capacity,
        repeater.host().created,
        repeater.host().decodes,
    );
    println!(
        "content extent {:.0}px, footer at {:.0}px",
        repeater.viewport().content,
        repeater.viewport().footer,
    );

    // Rotate the device: the cross extent shrinks and rows reflow.
    repeater.viewport_mut().size = Size::new(360.0, 760.0);
    repeater.validate_resize();
    let first = repeater.render_range().visible_start;
    if let Some(slot) = repeater.slot_for_index(first) {
        println!("after rotation the first visible thumb sits at {:?}", slot.placement());
    }

    repeater.destroy();
    println!(
        "destroyed: {} of {} cells torn down",
        repeater.host().destroyed,
        repeater.host().created,
    );
}
