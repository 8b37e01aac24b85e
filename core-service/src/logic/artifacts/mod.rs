//! Artifacts Module - fitted objects produced by offline training
//!
//! - paths.rs: where each artifact lives
//! - manifest.rs: optional SHA-256 integrity check
//! - store.rs: load-once cache shared by every request

pub mod manifest;
pub mod paths;
pub mod store;


pub use manifest::{sha256_hex, Manifest};
pub use paths::ArtifactPaths;
pub use store::{ArtifactStore, LoadedArtifacts};
