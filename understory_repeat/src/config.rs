// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host configuration: size specs, the repeat expression, and attribute validation.
//!
//! Hosts either build a [`RepeatConfig`] directly or hand raw attribute strings to
//! [`RepeatConfig::from_attributes`], which validates them up front. Anything that
//! cannot be understood fails here, before any content is materialized.

use alloc::string::{String, ToString};
use alloc::sync::Arc;

use crate::{Error, Result};

/// Per-item size function: `(index, item) -> size` in logical pixels.
///
/// Results are clamped to non-negative integers before use.
pub type SizeFn<T> = Arc<dyn Fn(usize, &T) -> f64 + Send + Sync>;

/// How one axis of an item is sized.
pub enum SizeSpec<T> {
    /// Measure the natural size of a materialized first item and apply it to all items.
    Computed,
    /// A constant number of pixels.
    Pixels(f64),
    /// A percentage of the viewport size along the same axis.
    Percent(f64),
    /// Evaluated per item, on demand.
    Dynamic(SizeFn<T>),
}

/// The four resolution modes of a [`SizeSpec`], without payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DimensionMode {
    /// See [`SizeSpec::Computed`].
    Computed,
    /// See [`SizeSpec::Pixels`].
    StaticPixel,
    /// See [`SizeSpec::Percent`].
    StaticPercent,
    /// See [`SizeSpec::Dynamic`].
    Dynamic,
}

impl<T> SizeSpec<T> {
    /// Wraps a per-item size function.
    pub fn dynamic(f: impl Fn(usize, &T) -> f64 + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(f))
    }

    /// Returns the resolution mode of this spec.
    #[must_use]
    pub const fn mode(&self) -> DimensionMode {
        match self {
            Self::Computed => DimensionMode::Computed,
            Self::Pixels(_) => DimensionMode::StaticPixel,
            Self::Percent(_) => DimensionMode::StaticPercent,
            Self::Dynamic(_) => DimensionMode::Dynamic,
        }
    }

    /// Returns `true` for [`SizeSpec::Dynamic`].
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }

    /// Returns `true` if this spec always spans the whole viewport on its axis.
    #[must_use]
    pub fn is_full_extent(&self) -> bool {
        matches!(self, Self::Percent(p) if *p == 100.0)
    }

    /// Parses a size attribute.
    ///
    /// - missing or blank: [`SizeSpec::Computed`]
    /// - `"<number>%"`: [`SizeSpec::Percent`]
    /// - `"<number>"` or `"<number>px"`: [`SizeSpec::Pixels`]
    /// - anything else is handed to `compiler`; constant expressions become
    ///   [`SizeSpec::Pixels`], the rest [`SizeSpec::Dynamic`].
    ///
    /// Fails with [`Error::InvalidSizeExpression`] when the compiler rejects the text.
    pub fn parse(
        attribute: &'static str,
        text: Option<&str>,
        compiler: &dyn ExpressionCompiler<T>,
    ) -> Result<Self> {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(Self::Computed);
        };

        if let Some(number) = text.strip_suffix('%') {
            if let Some(pct) = parse_finite(number) {
                return Ok(Self::Percent(pct));
            }
        }
        let number = text.strip_suffix("px").unwrap_or(text);
        if let Some(px) = parse_finite(number) {
            return Ok(Self::Pixels(px));
        }

        match compiler.compile(text) {
            Some(CompiledSize::Constant(px)) => Ok(Self::Pixels(px)),
            Some(CompiledSize::PerItem(f)) => Ok(Self::Dynamic(f)),
            None => Err(Error::InvalidSizeExpression {
                attribute,
                expression: text.to_string(),
            }),
        }
    }
}

impl<T> Clone for SizeSpec<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Computed => Self::Computed,
            Self::Pixels(px) => Self::Pixels(*px),
            Self::Percent(pct) => Self::Percent(*pct),
            Self::Dynamic(f) => Self::Dynamic(Arc::clone(f)),
        }
    }
}

impl<T> core::fmt::Debug for SizeSpec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Computed => f.write_str("Computed"),
            Self::Pixels(px) => f.debug_tuple("Pixels").field(px).finish(),
            Self::Percent(pct) => f.debug_tuple("Percent").field(pct).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Output of an [`ExpressionCompiler`].
pub enum CompiledSize<T> {
    /// The expression does not depend on the item.
    Constant(f64),
    /// The expression must be evaluated per item.
    PerItem(SizeFn<T>),
}

impl<T> core::fmt::Debug for CompiledSize<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Constant(px) => f.debug_tuple("Constant").field(px).finish(),
            Self::PerItem(_) => f.write_str("PerItem(..)"),
        }
    }
}

/// Host hook that turns a size expression into something evaluable.
///
/// Expression languages are the host's business; this crate only needs to know
/// whether an expression compiled and whether it is constant.
pub trait ExpressionCompiler<T> {
    /// Compiles `source`, returning `None` if it is not a valid expression.
    fn compile(&self, source: &str) -> Option<CompiledSize<T>>;
}

/// A compiler that accepts nothing. Useful when only literal sizes are allowed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExpressions;

impl<T> ExpressionCompiler<T> for NoExpressions {
    fn compile(&self, _source: &str) -> Option<CompiledSize<T>> {
        None
    }
}

/// A parsed `item in collection [track by key]` expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepeatExpression {
    /// Name each item is exposed under.
    pub item: String,
    /// Expression producing the collection.
    pub collection: String,
    /// Optional identity expression. Kept for hosts; not interpreted here.
    pub track_by: Option<String>,
}

impl RepeatExpression {
    /// Parses `item in collection [track by key]`.
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = || Error::InvalidRepeatExpression(source.to_string());
        let (item, rest) = split_keyword(source.trim(), "in").ok_or_else(invalid)?;
        let (collection, track_by) = match split_keyword(rest, "track") {
            Some((collection, tail)) => {
                let key = tail
                    .strip_prefix("by")
                    .filter(|k| k.starts_with(char::is_whitespace))
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .ok_or_else(invalid)?;
                (collection, Some(key.to_string()))
            }
            None => (rest, None),
        };
        if collection.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            item: item.to_string(),
            collection: collection.to_string(),
            track_by,
        })
    }
}

/// Splits at the first whitespace-delimited `keyword` that has text before it.
fn split_keyword<'a>(s: &'a str, keyword: &str) -> Option<(&'a str, &'a str)> {
    let mut search = 0;
    while let Some(pos) = s[search..].find(keyword) {
        let start = search + pos;
        let end = start + keyword.len();
        let head = &s[..start];
        let tail = &s[end..];
        if head.ends_with(char::is_whitespace)
            && tail.starts_with(char::is_whitespace)
            && !head.trim().is_empty()
        {
            return Some((head.trim(), tail.trim()));
        }
        search = end;
    }
    None
}

/// Default number of extra items materialized on each side of the viewport.
pub const DEFAULT_RENDER_BUFFER: usize = 10;

/// Raw attribute strings as the host found them.
#[derive(Clone, Copy, Debug, Default)]
pub struct Attributes<'a> {
    /// `item in collection [track by key]`.
    pub collection_repeat: &'a str,
    /// Item width spec.
    pub item_width: Option<&'a str>,
    /// Item height spec.
    pub item_height: Option<&'a str>,
    /// Render buffer, a non-negative integer.
    pub item_render_buffer: Option<&'a str>,
    /// Whether embedded media is reloaded on rebind. Present and not `"false"` means on.
    pub force_refresh_images: Option<&'a str>,
}

/// Validated repeater configuration.
///
/// Scroll orientation is not part of this type: it comes from the viewport,
/// which must scroll on exactly one axis.
pub struct RepeatConfig<T> {
    /// The repeat expression.
    pub repeat: RepeatExpression,
    /// Item width.
    pub width: SizeSpec<T>,
    /// Item height.
    pub height: SizeSpec<T>,
    /// Extra items materialized on each side of the visible range.
    pub render_buffer: usize,
    /// Reload embedded media whenever a slot is rebound.
    pub force_refresh_media: bool,
}

impl<T> RepeatConfig<T> {
    /// Creates a config with computed sizes, the default render buffer, and no media refresh.
    #[must_use]
    pub fn new(repeat: RepeatExpression) -> Self {
        Self {
            repeat,
            width: SizeSpec::Computed,
            height: SizeSpec::Computed,
            render_buffer: DEFAULT_RENDER_BUFFER,
            force_refresh_media: false,
        }
    }

    /// Validates raw host attributes.
    pub fn from_attributes(
        attrs: &Attributes<'_>,
        compiler: &dyn ExpressionCompiler<T>,
    ) -> Result<Self> {
        let repeat = RepeatExpression::parse(attrs.collection_repeat)?;
        let width = SizeSpec::parse("item-width", attrs.item_width, compiler)?;
        let height = SizeSpec::parse("item-height", attrs.item_height, compiler)?;
        let render_buffer = match attrs.item_render_buffer.map(str::trim) {
            None | Some("") => DEFAULT_RENDER_BUFFER,
            Some(text) => text
                .parse::<usize>()
                .map_err(|_| Error::InvalidRenderBuffer(text.to_string()))?,
        };
        let force_refresh_media = attrs
            .force_refresh_images
            .is_some_and(|v| v.trim() != "false");
        Ok(Self {
            repeat,
            width,
            height,
            render_buffer,
            force_refresh_media,
        })
    }

    /// Sets the item width spec.
    #[must_use]
    pub fn with_width(mut self, width: SizeSpec<T>) -> Self {
        self.width = width;
        self
    }

    /// Sets the item height spec.
    #[must_use]
    pub fn with_height(mut self, height: SizeSpec<T>) -> Self {
        self.height = height;
        self
    }

    /// Sets the render buffer.
    #[must_use]
    pub fn with_render_buffer(mut self, render_buffer: usize) -> Self {
        self.render_buffer = render_buffer;
        self
    }

    /// Enables or disables media reloading on rebind.
    #[must_use]
    pub fn with_force_refresh_media(mut self, force: bool) -> Self {
        self.force_refresh_media = force;
        self
    }
}

impl<T> Clone for RepeatConfig<T> {
    fn clone(&self) -> Self {
        Self {
            repeat: self.repeat.clone(),
            width: self.width.clone(),
            height: self.height.clone(),
            render_buffer: self.render_buffer,
            force_refresh_media: self.force_refresh_media,
        }
    }
}

impl<T> core::fmt::Debug for RepeatConfig<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RepeatConfig")
            .field("repeat", &self.repeat)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("render_buffer", &self.render_buffer)
            .field("force_refresh_media", &self.force_refresh_media)
            .finish()
    }
}
