//! Bundle sibling resolution.
//!
//! A bundle is a directory whose members must always ship together. When any
//! member is planned, every other file in the same directory that also
//! classifies as a bundle member is planned too. Only the member's own
//! directory is listed; nested directories are never expanded.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use mdpack_types::{is_companion_name, ArtifactPath, RULE_FILE_NAME};
use tracing::{debug, warn};

use crate::classifier::Classifier;
use crate::plan::{classify_artifact, PlanEntry, PlanReport, SkipReason, SkippedArtifact};
use crate::rule::Classification;

pub struct BundleResolver<'a> {
    classifier: &'a Classifier,
    project_root: &'a Path,
    /// Bundle directories already listed in this run.
    resolved: BTreeSet<PathBuf>,
}

impl<'a> BundleResolver<'a> {
    pub fn new(classifier: &'a Classifier, project_root: &'a Path) -> Self {
        Self {
            classifier,
            project_root,
            resolved: BTreeSet::new(),
        }
    }

    /// Plan every bundle sibling of `member` not already considered.
    ///
    /// Only siblings planned as bundle members are added to `considered`.
    /// A sibling that is itself in `changed` but is not a bundle member is
    /// left for the planner to classify on its own; any other non-member is
    /// reported in `report.skipped`. Companion descriptors and rule files are
    /// not candidates and are passed over silently.
    pub fn include_siblings(
        &mut self,
        member: &ArtifactPath,
        changed: &BTreeSet<ArtifactPath>,
        report: &mut PlanReport,
        considered: &mut BTreeSet<ArtifactPath>,
    ) {
        let member_path = member.to_fs(self.project_root);
        let Some(bundle_dir) = member_path.parent().map(Path::to_path_buf) else {
            return;
        };
        if !self.resolved.insert(bundle_dir.clone()) {
            return;
        }

        let listing = match fs::read_dir(&bundle_dir) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(dir = %bundle_dir.display(), error = %e, "cannot list bundle directory");
                report.skipped.push(SkippedArtifact {
                    artifact: member.clone(),
                    reason: SkipReason::Unreadable(e.to_string()),
                });
                return;
            }
        };

        let mut siblings: Vec<PathBuf> = listing
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect();
        siblings.sort();

        for path in siblings {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') || name == RULE_FILE_NAME || is_companion_name(name) {
                continue;
            }
            let Ok(sibling) = ArtifactPath::from_fs(self.project_root, &path) else {
                continue;
            };
            if considered.contains(&sibling) {
                continue;
            }

            match classify_artifact(self.classifier, self.project_root, &sibling) {
                Ok(Classification::Rule(rule)) if rule.bundle => {
                    debug!(artifact = %sibling, bundle = %rule.folder, "include bundle sibling");
                    considered.insert(sibling.clone());
                    report.plan.insert(sibling, PlanEntry::from(&rule));
                }
                _ if changed.contains(&sibling) => {
                    debug!(artifact = %sibling, "changed sibling left to the planner");
                }
                Ok(_) => {
                    warn!(artifact = %sibling, "skipping file (not a bundle item)");
                    report.skipped.push(SkippedArtifact {
                        reason: SkipReason::BundleSiblingRejected {
                            extension: sibling.extension().map(str::to_owned),
                        },
                        artifact: sibling,
                    });
                }
                Err(e) => {
                    warn!(artifact = %sibling, error = %e, "skipping bundle sibling");
                    report.skipped.push(SkippedArtifact {
                        artifact: sibling,
                        reason: SkipReason::Unreadable(e.to_string()),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use mdpack_types::ArtifactPath;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str, data: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn artifact(path: &str) -> ArtifactPath {
        ArtifactPath::new(path).unwrap()
    }

    fn bundle_project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "aura/A/A.cmp", "<aura:component/>");
        write(dir.path(), "aura/A/A.js", "({})");
        write(dir.path(), "aura/A/A.css", ".THIS {}");
        write(dir.path(), "aura/A/B.txt", "notes");
        write(dir.path(), "aura/A/A.cmp-meta.xml", "<AuraDefinitionBundle/>");
        write(dir.path(), "aura/A/force.config", "{}");
        write(dir.path(), "aura/A/nested/Deep.js", "({})");
        dir
    }

    #[test]
    fn change_to_one_member_pulls_in_the_bundle() {
        let dir = bundle_project();
        let report = Planner::new(dir.path()).plan(&[artifact("aura/A/A.cmp")]);

        let planned: Vec<_> = report.plan.iter().map(|(a, _)| a.as_str()).collect();
        assert_eq!(planned, vec!["aura/A/A.cmp", "aura/A/A.css", "aura/A/A.js"]);
        for (_, entry) in report.plan.iter() {
            assert_eq!(entry.folder, "aura/A");
        }
        assert!(report.plan.get(&artifact("aura/A/A.cmp")).unwrap().companion);
        assert!(!report.plan.get(&artifact("aura/A/A.js")).unwrap().companion);
    }

    #[test]
    fn non_member_sibling_is_rejected_and_reported() {
        let dir = bundle_project();
        let report = Planner::new(dir.path()).plan(&[artifact("aura/A/A.js")]);

        assert!(!report.plan.contains(&artifact("aura/A/B.txt")));
        assert_eq!(
            report.skipped,
            vec![SkippedArtifact {
                artifact: artifact("aura/A/B.txt"),
                reason: SkipReason::BundleSiblingRejected {
                    extension: Some("txt".into())
                },
            }]
        );
    }

    #[test]
    fn nested_directories_are_not_expanded() {
        let dir = bundle_project();
        let report = Planner::new(dir.path()).plan(&[artifact("aura/A/A.cmp")]);
        assert!(!report.plan.contains(&artifact("aura/A/nested/Deep.js")));
    }

    #[test]
    fn bundle_directory_is_listed_once() {
        let dir = bundle_project();
        let changes = [artifact("aura/A/A.cmp"), artifact("aura/A/A.js")];
        let report = Planner::new(dir.path()).plan(&changes);

        assert_eq!(report.plan.len(), 3);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn changed_non_member_is_reported_once() {
        let dir = bundle_project();
        let changes = [artifact("aura/A/A.cmp"), artifact("aura/A/B.txt")];
        let report = Planner::new(dir.path()).plan(&changes);

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].artifact, artifact("aura/A/B.txt"));
    }

    fn mixed_directory() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pages/app.js", "({})");
        write(dir.path(), "pages/aHome.page", "<apex:page/>");
        write(dir.path(), "pages/zHome.page", "<apex:page/>");
        write(dir.path(), "pages/Other.page", "<apex:page/>");
        dir
    }

    #[test]
    fn changed_sibling_listed_after_the_member_keeps_its_own_rule() {
        let dir = mixed_directory();
        let changes = [artifact("pages/app.js"), artifact("pages/zHome.page")];
        let report = Planner::new(dir.path()).plan(&changes);

        assert_eq!(
            report.plan.get(&artifact("pages/app.js")).map(|e| e.folder.as_str()),
            Some("aura/pages")
        );
        assert_eq!(
            report.plan.get(&artifact("pages/zHome.page")),
            Some(&PlanEntry {
                folder: "pages".into(),
                companion: true
            })
        );
        assert!(report
            .skipped
            .iter()
            .all(|s| s.artifact != artifact("pages/zHome.page")));
    }

    #[test]
    fn changed_sibling_listed_before_the_member_keeps_its_own_rule() {
        let dir = mixed_directory();
        let changes = [artifact("pages/aHome.page"), artifact("pages/app.js")];
        let report = Planner::new(dir.path()).plan(&changes);

        assert_eq!(
            report.plan.get(&artifact("pages/aHome.page")).map(|e| e.folder.as_str()),
            Some("pages")
        );
        assert!(report.plan.contains(&artifact("pages/app.js")));
        assert!(report
            .skipped
            .iter()
            .all(|s| s.artifact != artifact("pages/aHome.page")));
    }

    #[test]
    fn unchanged_non_member_next_to_a_member_is_still_rejected() {
        let dir = mixed_directory();
        let changes = [artifact("pages/app.js"), artifact("pages/zHome.page")];
        let report = Planner::new(dir.path()).plan(&changes);

        assert!(!report.plan.contains(&artifact("pages/Other.page")));
        assert!(!report.plan.contains(&artifact("pages/aHome.page")));
        let rejected: Vec<_> = report
            .skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::BundleSiblingRejected { .. }))
            .map(|s| s.artifact.as_str())
            .collect();
        assert_eq!(rejected, vec!["pages/Other.page", "pages/aHome.page"]);
    }

    #[test]
    fn non_bundle_artifacts_do_not_pull_siblings() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "classes/Foo.cls", "a");
        write(dir.path(), "classes/Bar.cls", "b");

        let report = Planner::new(dir.path()).plan(&[artifact("classes/Foo.cls")]);
        assert_eq!(report.plan.len(), 1);
        assert!(report.skipped.is_empty());
    }
}
