//! Fingerprint storage for mdpack.
//!
//! Persists a mapping from [`ArtifactPath`](mdpack_types::ArtifactPath) to
//! [`Fingerprint`](mdpack_types::Fingerprint) across runs using two
//! generations:
//!
//! - **committed** -- the authoritative baseline from the last successful commit
//! - **staged** -- the result of the most recent detection pass
//!
//! The staged generation behaves like a single-record write-ahead log: it is
//! written in full by every detection pass and promoted wholesale by
//! [`FingerprintStore::commit`]. A package run that fails before commit never
//! advances the committed baseline.
//!
//! # Backends
//!
//! - [`JsonFingerprintStore`] -- two JSON files under the output directory
//! - [`InMemoryFingerprintStore`] -- for tests and embedding

pub mod error;
pub mod json;
pub mod memory;
pub mod traits;

use std::collections::BTreeMap;

use mdpack_types::{ArtifactPath, Fingerprint};

pub use error::{StoreError, StoreResult};
pub use json::{JsonFingerprintStore, COMMITTED_FILE_NAME, STAGED_FILE_NAME};
pub use memory::InMemoryFingerprintStore;
pub use traits::FingerprintStore;

/// A full fingerprint generation, sorted by artifact path.
pub type FingerprintMap = BTreeMap<ArtifactPath, Fingerprint>;
