//! Release manifest model, retrieval, and resolution.
//!
//! # Sub-modules
//!
//! - [`channel`] - Deployment track (`Channel`).
//! - [`download`] - Storage download trait and HTTP implementation.
//! - [`error`] - Error types for rejected channel and platform inputs.
//! - [`manifest`] - Manifest schema (`ReleaseManifest`, `ReleaseRecord`).
//! - [`manifest_parser`] - Manifest JSON deserialization.
//! - [`platform`] - Manifest platform selection (`Platform`).
//! - [`resolver`] - Version resolution (`Resolver`, `ResolvedRelease`).
//! - [`storage`] - Storage root URL construction (`StorageRoot`).

pub mod channel;
pub mod download;
pub mod error;
pub mod manifest;
pub mod manifest_parser;
pub mod platform;
pub mod resolver;
pub mod storage;
