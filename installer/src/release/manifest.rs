//! Release manifest schema.
//!
//! The storage bucket publishes one JSON manifest per platform listing every
//! released SDK build together with the current release of each channel:
//!
//! ```json
//! {
//!   "base_url": "https://storage.googleapis.com/flutter_infra/releases",
//!   "current_release": { "stable": "abc123", "beta": "def456", "dev": "789abc" },
//!   "releases": [
//!     {
//!       "hash": "abc123",
//!       "channel": "stable",
//!       "version": "2.5.0",
//!       "archive": "stable/macos/flutter_macos_2.5.0-stable.zip"
//!     }
//!   ]
//! }
//! ```
//!
//! Fields the installer does not consume are ignored during deserialization.

use super::channel::Channel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One published SDK build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    hash: String,
    channel: String,
    version: String,
    archive: String,
}

impl ReleaseRecord {
    /// Create a release record.
    ///
    /// # Examples
    ///
    /// ```
    /// use flutter_installer::release::manifest::ReleaseRecord;
    ///
    /// let record = ReleaseRecord::new("abc", "stable", "2.5.0", "flutter_2.5.0.zip");
    /// assert_eq!(record.version(), "2.5.0");
    /// ```
    #[must_use]
    pub fn new(
        hash: impl Into<String>,
        channel: impl Into<String>,
        version: impl Into<String>,
        archive: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            channel: channel.into(),
            version: version.into(),
            archive: archive.into(),
        }
    }

    /// The commit hash the release was built from.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The channel the release was published on.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The release version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The archive path relative to the storage root.
    #[must_use]
    pub fn archive(&self) -> &str {
        &self.archive
    }

    /// Return true when the record was published on `channel`.
    #[must_use]
    pub fn is_on(&self, channel: Channel) -> bool {
        self.channel == channel.as_str()
    }
}

/// The release manifest for one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    current_release: BTreeMap<String, String>,
    releases: Vec<ReleaseRecord>,
}

impl ReleaseManifest {
    /// Create a manifest from its channel table and release list.
    #[must_use]
    pub const fn new(
        current_release: BTreeMap<String, String>,
        releases: Vec<ReleaseRecord>,
    ) -> Self {
        Self {
            current_release,
            releases,
        }
    }

    /// The hash of the current release on `channel`, if the manifest names one.
    #[must_use]
    pub fn current_hash(&self, channel: Channel) -> Option<&str> {
        self.current_release
            .get(channel.as_str())
            .map(String::as_str)
    }

    /// Every release record, in manifest order.
    #[must_use]
    pub fn releases(&self) -> &[ReleaseRecord] {
        &self.releases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> ReleaseManifest {
        ReleaseManifest::new(
            BTreeMap::from([("stable".to_owned(), "abc".to_owned())]),
            vec![ReleaseRecord::new(
                "abc",
                "stable",
                "2.5.0",
                "flutter_2.5.0.tar.xz",
            )],
        )
    }

    #[test]
    fn current_hash_reads_channel_table() {
        assert_eq!(manifest().current_hash(Channel::Stable), Some("abc"));
    }

    #[test]
    fn current_hash_is_none_for_missing_channel() {
        assert_eq!(manifest().current_hash(Channel::Beta), None);
    }

    #[test]
    fn record_matches_its_own_channel_only() {
        let record = ReleaseRecord::new("abc", "beta", "2.6.0-5.1.pre", "beta.zip");
        assert!(record.is_on(Channel::Beta));
        assert!(!record.is_on(Channel::Stable));
    }
}
