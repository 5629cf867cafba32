// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution of [`SizeSpec`]s into integer pixel sizes.

use crate::config::{DimensionMode, SizeSpec};

/// Converts a logical size to a non-negative integer pixel size.
///
/// Non-finite and negative inputs become `0`; fractional parts are floored.
#[must_use]
pub fn clamp_px(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    if value >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is finite and within 0..u32::MAX; truncation is the floor we want"
    )]
    let px = value as u32;
    px
}

/// One axis of item sizing, bound to its spec.
///
/// Static modes cache a single resolved size which is refreshed by
/// [`DimensionResolver::resolve`] whenever the viewport size or the measured
/// natural size changes. Dynamic mode evaluates the size function on every request.
pub struct DimensionResolver<T> {
    spec: SizeSpec<T>,
    resolved: u32,
}

impl<T> DimensionResolver<T> {
    /// Creates a resolver; static sizes are `0` until the first [`resolve`](Self::resolve).
    #[must_use]
    pub fn new(spec: SizeSpec<T>) -> Self {
        let resolved = match &spec {
            SizeSpec::Pixels(px) => clamp_px(*px),
            _ => 0,
        };
        Self { spec, resolved }
    }

    /// Returns the resolution mode.
    #[must_use]
    pub fn mode(&self) -> DimensionMode {
        self.spec.mode()
    }

    /// Returns the underlying spec.
    #[must_use]
    pub fn spec(&self) -> &SizeSpec<T> {
        &self.spec
    }

    /// Returns `true` unless the size is evaluated per item.
    #[must_use]
    pub fn is_static(&self) -> bool {
        !self.spec.is_dynamic()
    }

    /// Returns `true` if the size must be measured from materialized content.
    #[must_use]
    pub fn needs_measurement(&self) -> bool {
        matches!(self.spec, SizeSpec::Computed)
    }

    /// Recomputes the cached static size.
    ///
    /// `viewport_extent` is the viewport size along this axis and `measured` the
    /// natural size of a representative item along this axis, when one is known.
    /// Returns `true` if the cached size changed.
    pub fn resolve(&mut self, viewport_extent: f64, measured: Option<f64>) -> bool {
        let next = match &self.spec {
            SizeSpec::Pixels(px) => clamp_px(*px),
            SizeSpec::Percent(pct) => clamp_px(pct / 100.0 * viewport_extent),
            SizeSpec::Computed => match measured {
                Some(m) => clamp_px(m),
                None => self.resolved,
            },
            SizeSpec::Dynamic(_) => 0,
        };
        let changed = next != self.resolved;
        self.resolved = next;
        changed
    }

    /// Returns the cached static size. Meaningless in dynamic mode.
    #[must_use]
    pub fn resolved(&self) -> u32 {
        self.resolved
    }

    /// Returns the size of the item at `index`.
    pub fn size_of(&self, index: usize, item: &T) -> u32 {
        match &self.spec {
            SizeSpec::Dynamic(f) => clamp_px(f(index, item)),
            _ => self.resolved,
        }
    }

    /// Returns the size of the first item, or the static size when `items` is empty.
    ///
    /// Used as the estimate for items that have not been laid out yet.
    pub fn first_size(&self, items: &[T]) -> u32 {
        match items.first() {
            Some(item) => self.size_of(0, item),
            None => self.resolved,
        }
    }
}

impl<T> core::fmt::Debug for DimensionResolver<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DimensionResolver")
            .field("spec", &self.spec)
            .field("resolved", &self.resolved)
            .finish()
    }
}
