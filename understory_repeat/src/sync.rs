// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-amortized synchronization of newly bound slots.

use alloc::vec::Vec;

use crate::recycler::{ContentHost, Recycler};
use crate::slot::SlotId;

/// Work queue of slots waiting for [`ContentHost::synchronize`].
///
/// Each [`tick`](Self::tick) drains `ceil(remaining / 1.5)` entries, at least one, so
/// a batch of `n` converges in `O(log n)` ticks while no single tick does all of it.
/// Entries whose slot was rebound or released since queuing are skipped.
#[derive(Clone, Debug, Default)]
pub struct BindingSynchronizer {
    queue: Vec<(SlotId, usize)>,
    cursor: usize,
    cancelled: bool,
}

impl BindingSynchronizer {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries not yet processed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len() - self.cursor
    }

    /// Returns `true` while a tick would do work.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.cancelled && self.pending() > 0
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Queues slots for later ticks.
    pub fn enqueue(&mut self, entries: impl IntoIterator<Item = (SlotId, usize)>) {
        if self.cancelled {
            return;
        }
        self.queue.drain(..self.cursor);
        self.cursor = 0;
        self.queue.extend(entries);
    }

    /// Synchronizes `entries` immediately and drops anything queued.
    ///
    /// Used when data or layout changed: every entering slot must be correct this frame.
    /// Returns the number of slots synchronized.
    pub fn flush_now<T, H>(
        &mut self,
        recycler: &mut Recycler<T, H::Content>,
        host: &mut H,
        entries: impl IntoIterator<Item = (SlotId, usize)>,
    ) -> usize
    where
        H: ContentHost<T>,
    {
        self.queue.clear();
        self.cursor = 0;
        if self.cancelled {
            return 0;
        }
        entries
            .into_iter()
            .filter(|&(id, index)| recycler.synchronize(host, id, index))
            .count()
    }

    /// Processes one batch. Returns `true` if work remains for another tick.
    pub fn tick<T, H>(&mut self, recycler: &mut Recycler<T, H::Content>, host: &mut H) -> bool
    where
        H: ContentHost<T>,
    {
        if self.cancelled {
            return false;
        }
        let remaining = self.pending();
        if remaining == 0 {
            return false;
        }
        let batch = batch_size(remaining);
        let end = self.cursor + batch;
        for &(id, index) in &self.queue[self.cursor..end] {
            recycler.synchronize(host, id, index);
        }
        self.cursor = end;
        rtrace!(batch, remaining = self.pending(), "sync tick");
        if self.cursor == self.queue.len() {
            self.queue.clear();
            self.cursor = 0;
            false
        } else {
            true
        }
    }

    /// Drops all queued work; later ticks do nothing.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.queue.clear();
        self.cursor = 0;
    }
}

/// `ceil(remaining / 1.5)`, at least one.
fn batch_size(remaining: usize) -> usize {
    (remaining * 2).div_ceil(3).max(1)
}
