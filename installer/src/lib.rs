//! Flutter SDK installer library.
//!
//! This crate resolves a Flutter release from the published release
//! manifest, installs it into a tool cache, and exposes it to later build
//! steps through `FLUTTER_ROOT` and the search path. It is used by the
//! `flutter-installer` CLI binary and can be consumed programmatically for
//! testing or custom installation workflows.
//!
//! # Modules
//!
//! - [`archive`] - Archive kind selection, validation, and extraction
//! - [`cache`] - Tool cache keyed by tool name and version
//! - [`cli`] - Command-line argument definitions
//! - [`dirs`] - Runner directories and command files from the environment
//! - [`error`] - Installer error types
//! - [`install`] - Installation orchestration
//! - [`output`] - Shell snippet and dry-run formatting
//! - [`publish`] - Exporting `FLUTTER_ROOT` and search path entries
//! - [`release`] - Release manifest, channels, and version resolution
//! - [`reporter`] - Install progress events
//! - [`scratch`] - Scratch directories for extraction

pub mod archive;
pub mod cache;
pub mod cli;
pub mod dirs;
pub mod error;
pub mod install;
pub mod output;
pub mod publish;
pub mod release;
pub mod reporter;
pub mod scratch;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
