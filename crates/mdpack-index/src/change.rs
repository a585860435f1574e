//! Change set types.
//!
//! These types represent the result of comparing the current project tree
//! against the committed fingerprint baseline.

use std::collections::BTreeSet;

use mdpack_types::ArtifactPath;

/// How the change set was selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeMode {
    /// Every visited artifact is selected.
    Full,
    /// Only new or modified artifacts are selected.
    Incremental,
}

/// Artifacts selected for the current packaging run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeSet {
    pub mode: ChangeMode,
    pub artifacts: BTreeSet<ArtifactPath>,
}

impl ChangeSet {
    pub fn new(mode: ChangeMode) -> Self {
        Self {
            mode,
            artifacts: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, artifact: ArtifactPath) -> bool {
        self.artifacts.insert(artifact)
    }

    pub fn contains(&self, artifact: &ArtifactPath) -> bool {
        self.artifacts.contains(artifact)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// An empty change set is the "nothing to package" terminal state.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtifactPath> {
        self.artifacts.iter()
    }
}

/// An artifact that could not be fingerprinted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectionFailure {
    /// Artifact path, or the raw filesystem path when no artifact path
    /// could be derived.
    pub path: String,
    pub reason: String,
}

/// Outcome of one detection pass.
#[derive(Clone, Debug)]
pub struct Detection {
    pub change_set: ChangeSet,
    /// Number of artifacts fingerprinted and staged.
    pub visited: usize,
    /// Artifacts skipped because they could not be read.
    pub failures: Vec<DetectionFailure>,
}
