// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciliation of render ranges against the slot pool.

use alloc::vec::Vec;
use core::marker::PhantomData;

use hashbrown::HashMap;
use kurbo::{Rect, Size};
use smallvec::SmallVec;

use crate::layout::{LayoutContext, LayoutStrategy};
use crate::range::RenderRange;
use crate::slot::{Slot, SlotFlags, SlotId, SlotPool, SlotState};
use crate::viewport::Orientation;

/// The host's templating system, as seen by the repeater.
///
/// The repeater never creates content itself: it asks the host for a fresh instance
/// when the pool has no free slot, and hands instances back for teardown.
pub trait ContentHost<T> {
    /// Per-slot content handle.
    type Content;

    /// Creates a new, unbound content instance.
    fn instantiate(&mut self) -> Self::Content;

    /// Binds `content` to the item at `index`.
    ///
    /// Cheap: expensive work belongs in [`ContentHost::synchronize`].
    fn bind(&mut self, content: &mut Self::Content, index: usize, item: &T, flags: SlotFlags);

    /// Writes the position and size of `content` in viewport content coordinates.
    fn place(&mut self, content: &mut Self::Content, rect: Rect);

    /// Brings bound content up to date with its item.
    fn synchronize(&mut self, content: &mut Self::Content);

    /// Attaches or detaches `content` from the host's live update graph.
    fn set_active(&mut self, content: &mut Self::Content, active: bool);

    /// Natural size of synchronized content. Only read for computed item sizes.
    fn natural_size(&self, content: &Self::Content) -> Size;

    /// Forces embedded media to reload. Only called when media refresh is enabled.
    fn reload_media(&mut self, content: &mut Self::Content) {
        let _ = content;
    }

    /// Tears down content that the repeater no longer needs.
    fn destroy(&mut self, content: Self::Content) {
        drop(content);
    }
}

/// Maps shown indices to slots and rebinds slots as the range moves.
pub struct Recycler<T, C> {
    pool: SlotPool<C>,
    shown: HashMap<usize, SlotId>,
    force_refresh_media: bool,
    _items: PhantomData<fn(&T)>,
}

impl<T, C> core::fmt::Debug for Recycler<T, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Recycler")
            .field("pool", &self.pool)
            .field("shown", &self.shown.len())
            .field("force_refresh_media", &self.force_refresh_media)
            .finish()
    }
}

impl<T, C> Recycler<T, C> {
    /// Creates a recycler with an empty pool.
    #[must_use]
    pub fn new(force_refresh_media: bool) -> Self {
        Self {
            pool: SlotPool::new(),
            shown: HashMap::new(),
            force_refresh_media,
            _items: PhantomData,
        }
    }

    /// The slot pool.
    #[must_use]
    pub fn pool(&self) -> &SlotPool<C> {
        &self.pool
    }

    /// Sets the pool's steady-state size bound.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.pool.set_capacity(capacity);
    }

    /// Number of shown indices.
    #[must_use]
    pub fn shown_len(&self) -> usize {
        self.shown.len()
    }

    /// Slot currently bound to `index`.
    #[must_use]
    pub fn slot_for_index(&self, index: usize) -> Option<SlotId> {
        self.shown.get(&index).copied()
    }

    /// Looks up a slot.
    #[must_use]
    pub fn slot(&self, id: SlotId) -> Option<&Slot<C>> {
        self.pool.get(id)
    }

    /// Reconciles shown slots against `range`.
    ///
    /// Indices that left the range give up their slots; indices that entered it
    /// take a slot, preferring one just vacated, then a pooled free slot, then a new
    /// instance. With `full_refresh` every index in range is rebound. Each bound slot
    /// is appended to `entering` for synchronization.
    pub fn reconcile<H, L>(
        &mut self,
        host: &mut H,
        layout: &mut L,
        cx: &LayoutContext<'_, T>,
        range: RenderRange,
        orientation: Orientation,
        full_refresh: bool,
        entering: &mut Vec<(SlotId, usize)>,
    ) where
        H: ContentHost<T, Content = C>,
        L: LayoutStrategy<T> + ?Sized,
    {
        let range = RenderRange {
            end: range.end.min(cx.len()),
            ..range
        };

        let mut vacated: SmallVec<[SlotId; 16]> = SmallVec::new();
        self.shown.retain(|index, id| {
            let keep = range.contains(*index);
            if !keep {
                vacated.push(*id);
            }
            keep
        });

        for index in range.indices() {
            let id = match self.shown.get(&index) {
                Some(_) if !full_refresh => continue,
                Some(id) => *id,
                None => {
                    if let Some(id) = vacated.pop().or_else(|| self.pool.acquire_free()) {
                        id
                    } else {
                        if self.pool.is_exhausted() {
                            rwarn!(
                                index,
                                pool = self.pool.len(),
                                capacity = self.pool.capacity(),
                                "slot pool exhausted, growing"
                            );
                        }
                        self.pool.insert(host.instantiate())
                    }
                }
            };

            let rect = layout.geometry_at(cx, index).to_rect(orientation);
            let Some(slot) = self.pool.get_mut(id) else {
                continue;
            };
            let flags = SlotFlags::for_index(index, cx.len());
            slot.state = SlotState::Bound(index);
            slot.flags = flags;
            if !slot.active {
                host.set_active(&mut slot.content, true);
                slot.active = true;
            }
            host.bind(&mut slot.content, index, &cx.items[index], flags);
            if self.force_refresh_media {
                host.reload_media(&mut slot.content);
            }
            if slot.placement != Some(rect) {
                host.place(&mut slot.content, rect);
                slot.placement = Some(rect);
            }
            self.shown.insert(index, id);
            entering.push((id, index));
        }

        for id in vacated {
            if let Some(slot) = self.pool.get_mut(id) {
                if slot.active {
                    host.set_active(&mut slot.content, false);
                    slot.active = false;
                }
            }
            self.pool.release(id);
        }

        while let Some(content) = self.pool.take_excess() {
            host.destroy(content);
        }

        rdebug!(
            start = range.start,
            end = range.end,
            entering = entering.len(),
            pool = self.pool.len(),
            free = self.pool.free_len(),
            full_refresh,
            "reconciled"
        );
    }

    /// Measures the natural size of the first item.
    ///
    /// Uses the slot already showing index `0` when there is one, otherwise binds a
    /// temporary slot and returns it to the pool afterwards.
    pub fn measure_first<H>(&mut self, host: &mut H, items: &[T]) -> Option<Size>
    where
        H: ContentHost<T, Content = C>,
    {
        let item = items.first()?;
        if let Some(id) = self.slot_for_index(0) {
            let slot = self.pool.get_mut(id)?;
            host.synchronize(&mut slot.content);
            return Some(host.natural_size(&slot.content));
        }

        let id = match self.pool.acquire_free() {
            Some(id) => id,
            None => self.pool.insert(host.instantiate()),
        };
        let slot = self.pool.get_mut(id)?;
        slot.state = SlotState::Bound(0);
        if !slot.active {
            host.set_active(&mut slot.content, true);
        }
        host.bind(&mut slot.content, 0, item, SlotFlags::for_index(0, items.len()));
        host.synchronize(&mut slot.content);
        let size = host.natural_size(&slot.content);
        host.set_active(&mut slot.content, false);
        slot.active = false;
        slot.placement = None;
        self.pool.release(id);
        Some(size)
    }

    /// Synchronizes the slot `id` if it is still showing `index`.
    ///
    /// Returns `false` if the slot moved on or was released since it was queued.
    pub fn synchronize<H>(&mut self, host: &mut H, id: SlotId, index: usize) -> bool
    where
        H: ContentHost<T, Content = C>,
    {
        if self.shown.get(&index) != Some(&id) {
            return false;
        }
        match self.pool.get_mut(id) {
            Some(slot) if slot.state == SlotState::Bound(index) => {
                host.synchronize(&mut slot.content);
                true
            }
            _ => false,
        }
    }

    /// Releases every slot and tears down its content.
    pub fn release_all<H>(&mut self, host: &mut H)
    where
        H: ContentHost<T, Content = C>,
    {
        self.shown.clear();
        for content in self.pool.drain() {
            host.destroy(content);
        }
    }
}


#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::{Rect, Size};

    use super::Recycler;
    use super::test_host::{Cell, RecordingHost};
    use crate::config::SizeSpec;
    use crate::layout::test_util::resolved;
    use crate::layout::{Layout, LayoutContext, Shape};
    use crate::range::RenderRange;
    use crate::slot::{SlotFlags, SlotId};
    use crate::viewport::Orientation;

    fn range(start: usize, end: usize) -> RenderRange {
        RenderRange {
            start,
            end,
            visible_start: start,
            visible_end: end,
            ..RenderRange::EMPTY
        }
    }

    fn reconcile(
        recycler: &mut Recycler<u32, Cell>,
        host: &mut RecordingHost,
        items: &[u32],
        r: RenderRange,
        full_refresh: bool,
    ) -> Vec<(SlotId, usize)> {
        let primary = resolved(SizeSpec::Pixels(10.0), 100.0);
        let secondary = resolved(SizeSpec::Computed, 200.0);
        let cx = LayoutContext {
            items,
            primary: &primary,
            secondary: &secondary,
            cross_extent: 200,
        };
        let mut layout = Layout::select(Shape::List, true);
        let mut entering = Vec::new();
        recycler.reconcile(
            host,
            &mut layout,
            &cx,
            r,
            Orientation::Vertical,
            full_refresh,
            &mut entering,
        );
        entering
    }

    #[test]
    fn one_slot_per_shown_index() {
        let items: Vec<u32> = (0..100).collect();
        let mut host = RecordingHost::default();
        let mut recycler = Recycler::new(false);
        recycler.set_capacity(8);

        let entering = reconcile(&mut recycler, &mut host, &items, range(0, 5), true);
        assert_eq!(entering.len(), 5);
        assert_eq!(host.instantiated, 5);
        let slot = recycler.slot(recycler.slot_for_index(4).unwrap()).unwrap();
        assert_eq!(slot.content().value, Some(4));
        assert_eq!(slot.placement(), Some(Rect::new(0.0, 40.0, 200.0, 50.0)));
        assert_eq!(slot.flags(), SlotFlags::EVEN);

        // Shift by two: two vacated slots are reused, nothing new is created.
        let entering = reconcile(&mut recycler, &mut host, &items, range(2, 7), false);
        let mut indices: Vec<usize> = entering.iter().map(|(_, i)| *i).collect();
        indices.sort_unstable();
        assert_eq!(indices, [5, 6]);
        assert_eq!(host.instantiated, 5);
        assert_eq!(recycler.shown_len(), 5);
        assert!(recycler.slot_for_index(0).is_none());
        let mut cells: Vec<usize> = (2..7)
            .map(|i| {
                let id = recycler.slot_for_index(i).unwrap();
                recycler.slot(id).unwrap().content().id
            })
            .collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn vacated_slots_are_deactivated_and_reactivated() {
        let items: Vec<u32> = (0..100).collect();
        let mut host = RecordingHost::default();
        let mut recycler = Recycler::new(false);
        recycler.set_capacity(10);

        reconcile(&mut recycler, &mut host, &items, range(0, 6), true);
        reconcile(&mut recycler, &mut host, &items, range(0, 3), false);
        assert_eq!(recycler.pool().free_len(), 3);
        assert_eq!(recycler.pool().len(), 6);

        reconcile(&mut recycler, &mut host, &items, range(50, 53), false);
        assert_eq!(host.instantiated, 6);
        for i in 50..53 {
            let slot = recycler.slot(recycler.slot_for_index(i).unwrap()).unwrap();
            assert!(slot.is_active());
            assert_eq!(slot.content().value, Some(i as u32));
        }
        assert_eq!(recycler.pool().free_len(), 3);
    }

    #[test]
    fn unchanged_placement_is_not_rewritten() {
        let items: Vec<u32> = (0..20).collect();
        let mut host = RecordingHost::default();
        let mut recycler = Recycler::new(true);
        recycler.set_capacity(4);

        reconcile(&mut recycler, &mut host, &items, range(0, 4), true);
        assert_eq!(host.places, 4);
        reconcile(&mut recycler, &mut host, &items, range(0, 4), true);
        assert_eq!(host.binds, 8);
        assert_eq!(host.places, 4);
        let slot = recycler.slot(recycler.slot_for_index(0).unwrap()).unwrap();
        assert_eq!(slot.content().media_reloads, 2);
    }

    #[test]
    fn pool_trims_back_to_capacity() {
        let items: Vec<u32> = (0..100).collect();
        let mut host = RecordingHost::default();
        let mut recycler = Recycler::new(false);
        recycler.set_capacity(4);

        reconcile(&mut recycler, &mut host, &items, range(0, 8), true);
        assert_eq!(recycler.pool().len(), 8);
        reconcile(&mut recycler, &mut host, &items, range(0, 2), false);
        assert_eq!(recycler.pool().len(), 4);
        assert_eq!(host.destroyed.len(), 4);
    }

    #[test]
    fn synchronize_skips_moved_slots() {
        let items: Vec<u32> = (0..100).collect();
        let mut host = RecordingHost::default();
        let mut recycler = Recycler::new(false);
        recycler.set_capacity(4);

        let entering = reconcile(&mut recycler, &mut host, &items, range(0, 2), false);
        let (id, index) = entering[0];
        reconcile(&mut recycler, &mut host, &items, range(10, 12), false);
        assert!(!recycler.synchronize(&mut host, id, index));
        assert_eq!(host.syncs, 0);
        let id = recycler.slot_for_index(10).unwrap();
        assert!(recycler.synchronize(&mut host, id, 10));
        assert_eq!(recycler.slot(id).unwrap().content().synced, Some(10));
    }

    #[test]
    fn measure_and_release_all() {
        let items: Vec<u32> = [80, 10, 10].into();
        let mut host = RecordingHost {
            natural: true,
            ..RecordingHost::default()
        };
        let mut recycler = Recycler::new(false);
        assert_eq!(
            recycler.measure_first(&mut host, &items),
            Some(Size::new(80.0, 40.0))
        );
        assert_eq!(recycler.pool().len(), 1);
        assert_eq!(recycler.pool().free_len(), 1);
        assert_eq!(recycler.measure_first(&mut host, &[] as &[u32]), None);

        reconcile(&mut recycler, &mut host, &items, range(0, 3), false);
        assert_eq!(host.instantiated, 3);
        recycler.release_all(&mut host);
        assert!(recycler.pool().is_empty());
        assert_eq!(recycler.shown_len(), 0);
        assert_eq!(host.destroyed.len(), 3);
    }
}
