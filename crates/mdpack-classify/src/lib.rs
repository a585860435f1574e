//! Artifact classification for mdpack.
//!
//! Maps each changed artifact to a destination folder in the target package
//! layout and pulls in the siblings of multi-file bundles.
//!
//! # Architecture
//!
//! - **Classifier**: static extension table plus a content sniff for `.app`
//! - **BundleResolver**: one-pass sibling expansion for bundle directories
//! - **Planner**: turns a change set into a [`PackagePlan`] and a skip report

pub mod bundle;
pub mod classifier;
pub mod error;
pub mod plan;
pub mod rule;

pub use bundle::BundleResolver;
pub use classifier::Classifier;
pub use error::{ClassifyError, ClassifyResult};
pub use plan::{PackagePlan, PlanEntry, PlanReport, Planner, SkipReason, SkippedArtifact};
pub use rule::{Classification, ClassificationRule};
