// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors.
//!
//! Every error is raised while building or feeding a [`Repeater`](crate::Repeater).
//! Layout itself never fails: sizes that cannot be used are clamped to zero instead.

use alloc::string::String;

use thiserror::Error;

/// Errors reported while configuring a repeater or feeding it data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The collection expression evaluated to something that is not a sequence.
    #[error("expected `{expression}` to evaluate to a sequence, got {found}")]
    NotASequence {
        /// The collection expression, as written by the host.
        expression: String,
        /// A description of the value that was received instead.
        found: String,
    },

    /// The viewport scrolls on both axes.
    #[error("expected a viewport scrolling on exactly one axis, not both")]
    AmbiguousScrollAxes,

    /// The viewport scrolls on neither axis.
    #[error("expected a viewport scrolling on exactly one axis, found none")]
    NoScrollAxis,

    /// The repeat expression is not of the form `item in collection [track by key]`.
    #[error("expected an expression of the form `item in collection [track by key]`, got `{0}`")]
    InvalidRepeatExpression(String),

    /// A size attribute is neither pixels, a percentage, nor a compilable expression.
    #[error(
        "expected `{attribute}` to be a number of pixels, a percentage, or an expression returning a number; got `{expression}`"
    )]
    InvalidSizeExpression {
        /// Name of the offending attribute.
        attribute: &'static str,
        /// The expression text that failed to parse.
        expression: String,
    },

    /// The render buffer is not a non-negative integer.
    #[error("expected the render buffer to be a non-negative integer, got `{0}`")]
    InvalidRenderBuffer(String),
}

/// Result alias used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::Error;

    #[test]
    fn messages_echo_the_offending_expression() {
        let err = Error::InvalidSizeExpression {
            attribute: "item-height",
            expression: "item.(".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("item-height"), "missing attribute: {msg}");
        assert!(msg.contains("item.("), "missing expression: {msg}");

        let err = Error::InvalidRepeatExpression("items".to_string());
        assert!(err.to_string().contains("`items`"));
    }
}
