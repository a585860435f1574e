//! High-level SDK for mdpack.
//!
//! [`Packager`] ties the fingerprint store, change detector, planner,
//! assembler and archiver into the entry points an outer scheduler drives:
//! `reset_all`, `detect_and_plan`, `assemble`, `write_archive`, `commit`
//! and `mock_resource`.

pub mod config;
pub mod error;
pub mod packager;

pub use config::{PackagerConfig, CONFIG_KEY};
pub use error::{SdkError, SdkResult};
pub use packager::{Packager, PlanOutcome, RunOutcome, RunSummary};

// Re-export key types
pub use mdpack_classify::{PackagePlan, PlanReport, SkipReason, SkippedArtifact};
pub use mdpack_index::{ChangeMode, ChangeSet, Detection, DetectionFailure};
pub use mdpack_pack::{ArchiveSummary, AssemblyReport};
pub use mdpack_types::{ArtifactPath, Fingerprint};
