//! Flutter release channels.
//!
//! A channel is the deployment track a release was published on. Only the
//! tracks that carry an entry in the manifest's `current_release` table are
//! accepted as input.

use super::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// A Flutter deployment track.
///
/// # Examples
///
/// ```
/// use flutter_installer::release::channel::Channel;
///
/// let channel: Channel = "beta".parse().expect("valid channel");
/// assert_eq!(channel, Channel::Beta);
/// assert_eq!(channel.as_str(), "beta");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Channel {
    /// The stable track.
    #[default]
    Stable,
    /// The beta track.
    Beta,
    /// The dev track.
    Dev,
}

impl Channel {
    /// Every accepted channel, in the order they are listed to users.
    pub const ALL: [Self; 3] = [Self::Stable, Self::Beta, Self::Dev];

    /// Return the channel name as it appears in the release manifest.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Beta => "beta",
            Self::Dev => "dev",
        }
    }

    fn expected_list() -> String {
        Self::ALL
            .iter()
            .map(|channel| channel.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Channel {
    type Err = ReleaseError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == trimmed)
            .ok_or_else(|| ReleaseError::InvalidChannel {
                value: value.to_owned(),
                expected: Self::expected_list(),
            })
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
