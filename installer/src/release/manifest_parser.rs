//! Manifest deserialization.
//!
//! Parses the `releases_{platform}.json` body fetched from the storage bucket
//! into a [`ReleaseManifest`].

use super::manifest::ReleaseManifest;

/// Errors arising from manifest parsing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestParseError {
    /// The response body was empty or contained only whitespace.
    #[error("manifest body is empty")]
    Empty,

    /// JSON deserialization failed.
    #[error("manifest parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a JSON string into a [`ReleaseManifest`].
///
/// # Errors
///
/// Returns [`ManifestParseError::Empty`] for a blank body and
/// [`ManifestParseError::Json`] when the JSON is malformed or a required
/// field is missing.
///
/// # Examples
///
/// ```
/// use flutter_installer::release::manifest_parser::parse_manifest;
///
/// let json = concat!(
///     r#"{"current_release":{"stable":"abc"},"#,
///     r#""releases":[{"hash":"abc","channel":"stable","#,
///     r#""version":"2.5.0","archive":"flutter_2.5.0.tar.xz"}]}"#,
/// );
/// let manifest = parse_manifest(json).expect("valid manifest");
/// assert_eq!(manifest.releases().len(), 1);
/// ```
pub fn parse_manifest(json: &str) -> Result<ReleaseManifest, ManifestParseError> {
    if json.trim().is_empty() {
        return Err(ManifestParseError::Empty);
    }
    Ok(serde_json::from_str(json)?)
}
