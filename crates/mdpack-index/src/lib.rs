//! Change detection for mdpack.
//!
//! Walks the project tree, fingerprints every artifact, compares the result
//! against the committed baseline and stages the full current state.
//!
//! # Key Types
//!
//! - [`ChangeDetector`] -- Walks a project root against a fingerprint store
//! - [`ChangeSet`] -- Artifacts selected for the current packaging run
//! - [`Detection`] -- Change set plus the per-artifact failure report

pub mod change;
pub mod detector;
pub mod error;

pub use change::{ChangeMode, ChangeSet, Detection, DetectionFailure};
pub use detector::ChangeDetector;
pub use error::{IndexError, IndexResult};
