//! Error types for release-related input values.
//!
//! Each variant names the rejected input and the values that would have been
//! accepted.

use thiserror::Error;

/// Errors arising from invalid release inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReleaseError {
    /// The channel name is not one of the published deployment tracks.
    #[error("unsupported channel \"{value}\"; expected one of: {expected}")]
    InvalidChannel {
        /// The rejected channel string.
        value: String,
        /// Comma-separated list of accepted channels.
        expected: String,
    },

    /// The platform name does not have a release manifest.
    #[error("unsupported platform \"{value}\"; expected one of: {expected}")]
    InvalidPlatform {
        /// The rejected platform string.
        value: String,
        /// Comma-separated list of accepted platforms.
        expected: String,
    },
}

/// Result type alias using [`ReleaseError`].
pub type Result<T> = std::result::Result<T, ReleaseError>;
