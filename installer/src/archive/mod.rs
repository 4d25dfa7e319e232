//! Downloaded SDK archive handling.
//!
//! # Sub-modules
//!
//! - [`extraction`] - Extraction trait and tar.xz / zip implementation.
//! - [`kind`] - Archive format selection by file name (`ArchiveKind`).
//! - [`validation`] - Pre-extraction file checks.

pub mod extraction;
pub mod kind;
pub mod validation;
