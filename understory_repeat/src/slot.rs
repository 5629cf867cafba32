// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render slots and the pool that recycles them.

use alloc::vec::Vec;

use kurbo::Rect;

/// Identifier for a slot in a [`SlotPool`] (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SlotId(u32, u32);

impl SlotId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Positional flags stamped on a slot when it is bound.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SlotFlags: u8 {
        /// Bound to index `0`.
        const FIRST = 0b0000_0001;
        /// Bound to the last index.
        const LAST  = 0b0000_0010;
        /// Bound to an odd index.
        const ODD   = 0b0000_0100;
        /// Bound to an even index.
        const EVEN  = 0b0000_1000;
    }
}

impl SlotFlags {
    /// Flags for `index` in a collection of `len` items.
    #[must_use]
    pub fn for_index(index: usize, len: usize) -> Self {
        let mut flags = if index % 2 == 1 { Self::ODD } else { Self::EVEN };
        flags.set(Self::FIRST, index == 0);
        flags.set(Self::LAST, index + 1 == len);
        flags
    }
}

/// Binding state of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Not bound; available for reuse.
    Free,
    /// Bound to the item at this index.
    Bound(usize),
}

/// A reusable render unit wrapping host content.
#[derive(Debug)]
pub struct Slot<C> {
    pub(crate) content: C,
    pub(crate) state: SlotState,
    pub(crate) flags: SlotFlags,
    pub(crate) placement: Option<Rect>,
    pub(crate) active: bool,
}

impl<C> Slot<C> {
    fn new(content: C) -> Self {
        Self {
            content,
            state: SlotState::Free,
            flags: SlotFlags::empty(),
            placement: None,
            active: true,
        }
    }

    /// Host content.
    #[must_use]
    pub fn content(&self) -> &C {
        &self.content
    }

    /// Binding state.
    #[must_use]
    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Index this slot is bound to, if any.
    #[must_use]
    pub fn bound_index(&self) -> Option<usize> {
        match self.state {
            SlotState::Bound(index) => Some(index),
            SlotState::Free => None,
        }
    }

    /// Flags stamped at the last bind.
    #[must_use]
    pub fn flags(&self) -> SlotFlags {
        self.flags
    }

    /// Rectangle written at the last placement.
    #[must_use]
    pub fn placement(&self) -> Option<Rect> {
        self.placement
    }

    /// Whether the slot participates in the host's live updates.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Pool of render slots.
///
/// Slots are created lazily and reused through a free list. `capacity` is the
/// steady-state size the pool is expected to stay within; growth beyond it is
/// allowed but free slots above it are handed back by [`SlotPool::take_excess`].
pub struct SlotPool<C> {
    slots: Vec<Option<Slot<C>>>,
    /// Last generation per cell (persists across removals).
    generations: Vec<u32>,
    vacant: Vec<usize>,
    free: Vec<SlotId>,
    live: usize,
    capacity: usize,
}

impl<C> core::fmt::Debug for SlotPool<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlotPool")
            .field("live", &self.live)
            .field("free", &self.free.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<C> Default for SlotPool<C> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            vacant: Vec::new(),
            free: Vec::new(),
            live: 0,
            capacity: 0,
        }
    }
}

impl<C> SlotPool<C> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instantiated slots, bound or free.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no slots are instantiated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of free slots.
    #[must_use]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Steady-state size bound.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sets the steady-state size bound.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Returns `true` if creating another slot would exceed the capacity.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.live >= self.capacity
    }

    /// Adds a free slot wrapping `content`.
    pub fn insert(&mut self, content: C) -> SlotId {
        let (idx, generation) = if let Some(idx) = self.vacant.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Slot::new(content));
            (idx, generation)
        } else {
            self.slots.push(Some(Slot::new(content)));
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };
        self.live += 1;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "SlotId uses 32-bit indices; pools never approach that size."
        )]
        let id = SlotId::new(idx as u32, generation);
        id
    }

    /// Takes a free slot out of the free list, if any.
    pub fn acquire_free(&mut self) -> Option<SlotId> {
        while let Some(id) = self.free.pop() {
            if self.get(id).is_some() {
                return Some(id);
            }
        }
        None
    }

    /// Marks `id` free and returns it to the free list.
    pub fn release(&mut self, id: SlotId) {
        if let Some(slot) = self.get_mut(id) {
            if slot.state != SlotState::Free {
                slot.state = SlotState::Free;
                self.free.push(id);
            }
        }
    }

    /// Removes a slot from the pool, returning its content.
    pub fn remove(&mut self, id: SlotId) -> Option<C> {
        self.get(id)?;
        let slot = self.slots[id.idx()].take()?;
        self.vacant.push(id.idx());
        self.free.retain(|f| *f != id);
        self.live -= 1;
        Some(slot.content)
    }

    /// Removes one free slot if the pool is above capacity.
    pub fn take_excess(&mut self) -> Option<C> {
        if self.live <= self.capacity {
            return None;
        }
        let id = self.acquire_free()?;
        self.remove(id)
    }

    /// Looks up a live slot.
    #[must_use]
    pub fn get(&self, id: SlotId) -> Option<&Slot<C>> {
        if self.generations.get(id.idx()) != Some(&id.1) {
            return None;
        }
        self.slots.get(id.idx())?.as_ref()
    }

    /// Looks up a live slot mutably.
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut Slot<C>> {
        if self.generations.get(id.idx()) != Some(&id.1) {
            return None;
        }
        self.slots.get_mut(id.idx())?.as_mut()
    }

    /// Removes every slot, yielding their contents.
    pub fn drain(&mut self) -> impl Iterator<Item = C> + '_ {
        self.free.clear();
        self.live = 0;
        for (idx, slot) in self.slots.iter().enumerate() {
            if slot.is_some() {
                self.vacant.push(idx);
            }
        }
        self.slots
            .iter_mut()
            .filter_map(Option::take)
            .map(|slot| slot.content)
    }
}
