//! The change detector.
//!
//! Walks every subdirectory of the project root, fingerprints each artifact
//! on a bounded worker pool, and compares the result with the committed
//! generation of the fingerprint store. The full set of fresh fingerprints is
//! staged once at the end of the walk, whether or not each artifact ended up
//! in the change set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdpack_store::{FingerprintMap, FingerprintStore};
use mdpack_types::{ArtifactPath, Fingerprint};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::change::{ChangeMode, ChangeSet, Detection, DetectionFailure};
use crate::error::{IndexError, IndexResult};

/// Detects changed artifacts under a project root.
pub struct ChangeDetector {
    store: Arc<dyn FingerprintStore>,
    /// Fingerprint worker count; `0` lets the pool pick one per CPU.
    workers: usize,
}

impl std::fmt::Debug for ChangeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeDetector")
            .field("workers", &self.workers)
            .finish()
    }
}

impl ChangeDetector {
    /// Create a detector backed by the given store.
    pub fn new(store: Arc<dyn FingerprintStore>) -> Self {
        Self { store, workers: 0 }
    }

    /// Bound the fingerprint worker pool.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Run one detection pass.
    ///
    /// With `force_all` every visited artifact is selected; otherwise only
    /// artifacts whose fingerprint is absent from, or differs from, the
    /// committed generation. In both modes the staged generation is replaced
    /// by the fingerprints of every artifact visited in this pass.
    pub fn detect(&self, project_root: &Path, force_all: bool) -> IndexResult<Detection> {
        if !project_root.is_dir() {
            return Err(IndexError::ProjectRootMissing(project_root.to_path_buf()));
        }

        let committed = self.store.load()?;
        let (candidates, mut failures) = collect_artifacts(project_root);
        let fingerprints = self.fingerprint_all(candidates)?;

        let mode = if force_all {
            ChangeMode::Full
        } else {
            ChangeMode::Incremental
        };
        let mut change_set = ChangeSet::new(mode);
        let mut staged = FingerprintMap::new();

        for (artifact, result) in fingerprints {
            let current = match result {
                Ok(fp) => fp,
                Err(reason) => {
                    warn!(artifact = %artifact, %reason, "cannot fingerprint artifact");
                    failures.push(DetectionFailure {
                        path: artifact.to_string(),
                        reason,
                    });
                    continue;
                }
            };

            let changed = match committed.get(&artifact) {
                Some(previous) => *previous != current,
                None => true,
            };

            if force_all {
                debug!(artifact = %artifact, "include");
                change_set.insert(artifact.clone());
            } else if changed {
                debug!(artifact = %artifact, fingerprint = %current.short_hex(), "change");
                change_set.insert(artifact.clone());
            }

            staged.insert(artifact, current);
        }

        self.store.stage(&staged)?;

        info!(
            visited = staged.len(),
            selected = change_set.len(),
            failed = failures.len(),
            full = force_all,
            "detection complete"
        );

        Ok(Detection {
            change_set,
            visited: staged.len(),
            failures,
        })
    }

    fn fingerprint_all(
        &self,
        candidates: Vec<(ArtifactPath, PathBuf)>,
    ) -> IndexResult<Vec<(ArtifactPath, Result<Fingerprint, String>)>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| IndexError::WorkerPool(e.to_string()))?;

        Ok(pool.install(|| {
            candidates
                .into_par_iter()
                .map(|(artifact, fs_path)| {
                    let fp = Fingerprint::of_file(&fs_path).map_err(|e| e.to_string());
                    (artifact, fp)
                })
                .collect()
        }))
    }
}

/// Gather every fingerprintable artifact below `root`.
///
/// Files directly in `root`, hidden entries, per-directory rule files and
/// companion descriptors are not artifacts.
fn collect_artifacts(root: &Path) -> (Vec<(ArtifactPath, PathBuf)>, Vec<DetectionFailure>) {
    let mut artifacts = Vec::new();
    let mut failures = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                failures.push(DetectionFailure {
                    path: e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string()),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() || entry.depth() < 2 {
            continue;
        }

        let artifact = match ArtifactPath::from_fs(root, entry.path()) {
            Ok(artifact) => artifact,
            Err(e) => {
                failures.push(DetectionFailure {
                    path: entry.path().display().to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if artifact.is_rule_file() || artifact.is_companion() {
            continue;
        }

        artifacts.push((artifact, entry.into_path()));
    }

    (artifacts, failures)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}
