//! Package plans built from a change set.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use mdpack_types::ArtifactPath;
use tracing::{debug, info, warn};

use crate::bundle::BundleResolver;
use crate::classifier::Classifier;
use crate::rule::{Classification, ClassificationRule};

/// Placement of one artifact in the assembled package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanEntry {
    pub folder: String,
    pub companion: bool,
}

impl From<&ClassificationRule> for PlanEntry {
    fn from(rule: &ClassificationRule) -> Self {
        Self {
            folder: rule.folder.clone(),
            companion: rule.companion,
        }
    }
}

/// Artifact placements for a single run. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackagePlan {
    entries: BTreeMap<ArtifactPath, PlanEntry>,
}

impl PackagePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, artifact: ArtifactPath, entry: PlanEntry) {
        self.entries.insert(artifact, entry);
    }

    pub fn get(&self, artifact: &ArtifactPath) -> Option<&PlanEntry> {
        self.entries.get(artifact)
    }

    pub fn contains(&self, artifact: &ArtifactPath) -> bool {
        self.entries.contains_key(artifact)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArtifactPath, &PlanEntry)> {
        self.entries.iter()
    }
}

/// Why an artifact was left out of the plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No rule for the extension, or sniffed content matched no profile.
    ClassificationMissing { extension: Option<String> },
    /// A file in a bundle directory that is not itself a bundle member.
    BundleSiblingRejected { extension: Option<String> },
    /// Reading the artifact (or its bundle directory) failed.
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClassificationMissing { extension } => match extension {
                Some(ext) => write!(f, "missing extension support (.{ext})"),
                None => write!(f, "missing extension support (no extension)"),
            },
            Self::BundleSiblingRejected { .. } => write!(f, "not a bundle item"),
            Self::Unreadable(reason) => write!(f, "unreadable: {reason}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedArtifact {
    pub artifact: ArtifactPath,
    pub reason: SkipReason,
}

/// Plan plus everything that was reported and skipped along the way.
#[derive(Clone, Debug, Default)]
pub struct PlanReport {
    pub plan: PackagePlan,
    pub skipped: Vec<SkippedArtifact>,
}

/// Classifies a change set into a [`PackagePlan`].
///
/// Classification failures never abort planning: each one becomes a
/// [`SkippedArtifact`] and the remaining artifacts are still planned.
#[derive(Debug)]
pub struct Planner<'a> {
    classifier: Classifier,
    project_root: &'a Path,
}

impl<'a> Planner<'a> {
    pub fn new(project_root: &'a Path) -> Self {
        Self {
            classifier: Classifier::new(),
            project_root,
        }
    }

    pub fn plan<'b>(&self, artifacts: impl IntoIterator<Item = &'b ArtifactPath>) -> PlanReport {
        let changed: BTreeSet<ArtifactPath> = artifacts.into_iter().cloned().collect();
        let mut report = PlanReport::default();
        let mut considered = BTreeSet::new();
        let mut resolver = BundleResolver::new(&self.classifier, self.project_root);

        for artifact in &changed {
            if !considered.insert(artifact.clone()) {
                continue;
            }

            match classify_artifact(&self.classifier, self.project_root, artifact) {
                Ok(Classification::Rule(rule)) => {
                    debug!(artifact = %artifact, folder = %rule.folder, "planned");
                    report.plan.insert(artifact.clone(), PlanEntry::from(&rule));
                    if rule.bundle {
                        resolver.include_siblings(artifact, &changed, &mut report, &mut considered);
                    }
                }
                Ok(Classification::NoRule) => {
                    let reason = SkipReason::ClassificationMissing {
                        extension: artifact.extension().map(str::to_owned),
                    };
                    warn!(artifact = %artifact, %reason, "skipping file");
                    report.skipped.push(SkippedArtifact {
                        artifact: artifact.clone(),
                        reason,
                    });
                }
                Err(e) => {
                    warn!(artifact = %artifact, error = %e, "skipping file");
                    report.skipped.push(SkippedArtifact {
                        artifact: artifact.clone(),
                        reason: SkipReason::Unreadable(e.to_string()),
                    });
                }
            }
        }

        info!(
            planned = report.plan.len(),
            skipped = report.skipped.len(),
            "package plan built"
        );
        report
    }
}

/// Classify using the artifact's own directory and extension.
pub(crate) fn classify_artifact(
    classifier: &Classifier,
    project_root: &Path,
    artifact: &ArtifactPath,
) -> crate::ClassifyResult<Classification> {
    match artifact.extension() {
        Some(ext) => classifier.classify(
            artifact.parent_name().unwrap_or_default(),
            ext,
            &artifact.to_fs(project_root),
        ),
        None => Ok(Classification::NoRule),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, data: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn artifact(path: &str) -> ArtifactPath {
        ArtifactPath::new(path).unwrap()
    }

    #[test]
    fn plans_single_file_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "classes/Foo.cls", "public class Foo {}");
        write(dir.path(), "objects/Account.object", "<CustomObject/>");

        let changes = [artifact("classes/Foo.cls"), artifact("objects/Account.object")];
        let report = Planner::new(dir.path()).plan(&changes);

        assert!(report.skipped.is_empty());
        assert_eq!(
            report.plan.get(&artifact("classes/Foo.cls")),
            Some(&PlanEntry {
                folder: "classes".into(),
                companion: true
            })
        );
        assert_eq!(
            report.plan.get(&artifact("objects/Account.object")),
            Some(&PlanEntry {
                folder: "objects".into(),
                companion: false
            })
        );
    }

    #[test]
    fn unknown_extension_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "docs/notes.txt", "hello");
        write(dir.path(), "docs/LICENSE", "MIT");
        write(dir.path(), "classes/Foo.cls", "public class Foo {}");

        let changes = [
            artifact("classes/Foo.cls"),
            artifact("docs/LICENSE"),
            artifact("docs/notes.txt"),
        ];
        let report = Planner::new(dir.path()).plan(&changes);

        assert_eq!(report.plan.len(), 1);
        assert_eq!(
            report.skipped,
            vec![
                SkippedArtifact {
                    artifact: artifact("docs/LICENSE"),
                    reason: SkipReason::ClassificationMissing { extension: None },
                },
                SkippedArtifact {
                    artifact: artifact("docs/notes.txt"),
                    reason: SkipReason::ClassificationMissing {
                        extension: Some("txt".into())
                    },
                },
            ]
        );
    }

    #[test]
    fn unreadable_app_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let changes = [artifact("applications/Gone.app")];
        let report = Planner::new(dir.path()).plan(&changes);

        assert!(report.plan.is_empty());
        assert!(matches!(report.skipped[0].reason, SkipReason::Unreadable(_)));
    }

    #[test]
    fn skip_reason_display() {
        let reason = SkipReason::ClassificationMissing {
            extension: Some("txt".into()),
        };
        assert_eq!(reason.to_string(), "missing extension support (.txt)");
    }
}
