//! Configuration errors.
//!
//! Overlay operations themselves never fail: a missing measurement renders
//! the trigger only, and a registry miss is healed in place. The only thing
//! that can be rejected is a nonsensical configuration.

use thiserror::Error;

/// Errors reported by [`OverlayConfig::validate`](crate::config::OverlayConfig::validate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A length that must be finite and `>= 0` was not.
    #[error("'{field}' must be a finite, non-negative length (got {value})")]
    InvalidLength {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A threshold that must be strictly positive was not.
    #[error("'{field}' must be greater than zero (got {value})")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A ratio outside `(0, 1]`.
    #[error("'{field}' must be in (0, 1] (got {value})")]
    InvalidRatio {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
}
