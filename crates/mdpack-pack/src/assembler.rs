//! Staging tree assembly.
//!
//! Every planned artifact is copied to `<staging>/<folder>/<file name>`.
//! Artifacts that require a companion get the hand-authored descriptor when
//! one exists, otherwise a synthesized one. `package.xml` is written last,
//! so a staging tree without a manifest is never a finished package.

use std::fs;
use std::path::{Path, PathBuf};

use mdpack_classify::PackagePlan;
use mdpack_meta::{Manifest, MetadataSynthesizer, MANIFEST_FILE_NAME};
use mdpack_types::ArtifactPath;
use tracing::{debug, info};

use crate::companion::CompanionIndex;
use crate::error::{PackError, PackResult};

/// Counts from a finished assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyReport {
    pub artifacts: usize,
    pub companions_copied: usize,
    pub companions_synthesized: usize,
    pub manifest: PathBuf,
}

enum CompanionSource {
    HandAuthored(PathBuf),
    Synthesized(String),
}

/// Lays a [`PackagePlan`] out under a staging root.
#[derive(Clone, Debug)]
pub struct Assembler {
    project_root: PathBuf,
    staging_root: PathBuf,
    fallback_dir: Option<PathBuf>,
    synthesizer: MetadataSynthesizer,
}

impl Assembler {
    pub fn new(
        project_root: impl Into<PathBuf>,
        staging_root: impl Into<PathBuf>,
        synthesizer: MetadataSynthesizer,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            staging_root: staging_root.into(),
            fallback_dir: None,
            synthesizer,
        }
    }

    /// Directory searched for hand-authored descriptors that do not sit
    /// beside their artifact.
    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = Some(dir.into());
        self
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.staging_root.join(MANIFEST_FILE_NAME)
    }

    /// Assemble `plan` into the staging root.
    ///
    /// Companion sources are resolved for the whole plan before anything is
    /// written, so a missing descriptor fails without touching the staging
    /// tree. Any later I/O failure aborts the assembly before the manifest
    /// is written.
    pub fn assemble(&self, plan: &PackagePlan) -> PackResult<AssemblyReport> {
        let companions = CompanionIndex::scan(&self.project_root, self.fallback_dir.as_deref());

        let mut placements = Vec::with_capacity(plan.len());
        for (artifact, entry) in plan.iter() {
            let companion = if entry.companion {
                Some(self.resolve_companion(&companions, artifact)?)
            } else {
                None
            };
            placements.push((artifact, entry.folder.as_str(), companion));
        }

        let mut report = AssemblyReport {
            artifacts: 0,
            companions_copied: 0,
            companions_synthesized: 0,
            manifest: self.manifest_path(),
        };

        for (artifact, folder, companion) in placements {
            let target_dir = self.staging_root.join(folder);
            let place_err = |source| PackError::Copy {
                artifact: artifact.clone(),
                source,
            };

            fs::create_dir_all(&target_dir).map_err(place_err)?;
            fs::copy(
                artifact.to_fs(&self.project_root),
                target_dir.join(artifact.file_name()),
            )
            .map_err(place_err)?;
            report.artifacts += 1;

            let descriptor = target_dir.join(artifact.companion_name());
            match companion {
                Some(CompanionSource::HandAuthored(source)) => {
                    fs::copy(&source, &descriptor).map_err(place_err)?;
                    report.companions_copied += 1;
                    debug!(artifact = %artifact, from = %source.display(), "companion copied");
                }
                Some(CompanionSource::Synthesized(xml)) => {
                    fs::write(&descriptor, xml).map_err(place_err)?;
                    report.companions_synthesized += 1;
                    debug!(artifact = %artifact, "companion synthesized");
                }
                None => {}
            }
            debug!(artifact = %artifact, folder, "placed");
        }

        let manifest = Manifest::new(self.synthesizer.api_version());
        fs::create_dir_all(&self.staging_root)?;
        fs::write(&report.manifest, manifest.render())?;

        info!(
            artifacts = report.artifacts,
            copied = report.companions_copied,
            synthesized = report.companions_synthesized,
            staging = %self.staging_root.display(),
            "package assembled"
        );
        Ok(report)
    }

    fn resolve_companion(
        &self,
        companions: &CompanionIndex,
        artifact: &ArtifactPath,
    ) -> PackResult<CompanionSource> {
        if let Some(path) = companions.find(artifact) {
            return Ok(CompanionSource::HandAuthored(path));
        }
        self.synthesizer
            .synthesize_for(artifact, false)
            .map(CompanionSource::Synthesized)
            .ok_or_else(|| PackError::MetadataUnavailable {
                artifact: artifact.clone(),
                extension: artifact.extension().unwrap_or_default().to_string(),
            })
    }
}

/// Remove a previous staging tree (and the manifest inside it).
///
/// A missing staging root is not an error.
pub fn clear_staging(staging_root: &Path) -> PackResult<()> {
    match fs::remove_dir_all(staging_root) {
        Ok(()) => {
            debug!(staging = %staging_root.display(), "previous staging tree removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpack_classify::PlanEntry;

    fn write(root: &Path, rel: &str, data: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn entry(folder: &str, companion: bool) -> PlanEntry {
        PlanEntry {
            folder: folder.into(),
            companion,
        }
    }

    fn artifact(path: &str) -> ArtifactPath {
        ArtifactPath::new(path).unwrap()
    }

    #[test]
    fn places_artifact_and_synthesized_companion() {
        let project = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(project.path(), "classes/Foo.cls", "public class Foo {}");

        let mut plan = PackagePlan::new();
        plan.insert(artifact("classes/Foo.cls"), entry("classes", true));

        let staging = out.path().join("src");
        let report = Assembler::new(project.path(), &staging, MetadataSynthesizer::new(34))
            .assemble(&plan)
            .unwrap();

        assert_eq!(report.artifacts, 1);
        assert_eq!(report.companions_synthesized, 1);
        assert_eq!(
            fs::read_to_string(staging.join("classes/Foo.cls")).unwrap(),
            "public class Foo {}"
        );
        let meta = fs::read_to_string(staging.join("classes/Foo.cls-meta.xml")).unwrap();
        assert!(meta.contains("<apiVersion>34.0</apiVersion>"));
        let manifest = fs::read_to_string(staging.join("package.xml")).unwrap();
        assert!(manifest.contains("<version>34</version>"));
    }

    #[test]
    fn hand_authored_companion_wins() {
        let project = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(project.path(), "classes/Foo.cls", "x");
        write(project.path(), "classes/Foo.cls-meta.xml", "<custom/>");

        let mut plan = PackagePlan::new();
        plan.insert(artifact("classes/Foo.cls"), entry("classes", true));

        let report = Assembler::new(project.path(), out.path(), MetadataSynthesizer::new(34))
            .assemble(&plan)
            .unwrap();

        assert_eq!(report.companions_copied, 1);
        assert_eq!(report.companions_synthesized, 0);
        assert_eq!(
            fs::read_to_string(out.path().join("classes/Foo.cls-meta.xml")).unwrap(),
            "<custom/>"
        );
    }

    #[test]
    fn companion_from_fallback_directory() {
        let project = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(project.path(), "classes/Foo.cls", "x");
        write(project.path(), "app-metadata/Foo.cls-meta.xml", "<fallback/>");

        let mut plan = PackagePlan::new();
        plan.insert(artifact("classes/Foo.cls"), entry("classes", true));

        Assembler::new(project.path(), out.path(), MetadataSynthesizer::new(34))
            .with_fallback_dir(project.path().join("app-metadata"))
            .assemble(&plan)
            .unwrap();

        assert_eq!(
            fs::read_to_string(out.path().join("classes/Foo.cls-meta.xml")).unwrap(),
            "<fallback/>"
        );
    }

    #[test]
    fn no_companion_for_plain_artifacts() {
        let project = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(project.path(), "objects/Account.object", "<CustomObject/>");

        let mut plan = PackagePlan::new();
        plan.insert(artifact("objects/Account.object"), entry("objects", false));

        Assembler::new(project.path(), out.path(), MetadataSynthesizer::new(34))
            .assemble(&plan)
            .unwrap();

        assert!(out.path().join("objects/Account.object").is_file());
        assert!(!out.path().join("objects/Account.object-meta.xml").exists());
    }

    #[test]
    fn missing_descriptor_without_template_fails_before_writing() {
        let project = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(project.path(), "classes/Foo.cls", "x");
        write(project.path(), "documents/Logo.png", "png");

        let mut plan = PackagePlan::new();
        plan.insert(artifact("classes/Foo.cls"), entry("classes", true));
        plan.insert(artifact("documents/Logo.png"), entry("documents", true));

        let staging = out.path().join("src");
        let err = Assembler::new(project.path(), &staging, MetadataSynthesizer::new(34))
            .assemble(&plan)
            .unwrap_err();

        assert!(matches!(err, PackError::MetadataUnavailable { ref extension, .. } if extension == "png"));
        assert!(!staging.exists());
    }

    #[test]
    fn missing_source_aborts_without_manifest() {
        let project = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let mut plan = PackagePlan::new();
        plan.insert(artifact("objects/Gone.object"), entry("objects", false));

        let assembler = Assembler::new(project.path(), out.path(), MetadataSynthesizer::new(34));
        let err = assembler.assemble(&plan).unwrap_err();

        assert!(matches!(err, PackError::Copy { .. }));
        assert!(!assembler.manifest_path().exists());
    }

    #[test]
    fn bundle_members_share_a_folder() {
        let project = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(project.path(), "aura/Widget/Widget.cmp", "<aura:component/>");
        write(project.path(), "aura/Widget/WidgetController.js", "({})");

        let mut plan = PackagePlan::new();
        plan.insert(artifact("aura/Widget/Widget.cmp"), entry("aura/Widget", true));
        plan.insert(
            artifact("aura/Widget/WidgetController.js"),
            entry("aura/Widget", false),
        );

        Assembler::new(project.path(), out.path(), MetadataSynthesizer::new(34))
            .assemble(&plan)
            .unwrap();

        let bundle = out.path().join("aura/Widget");
        assert!(bundle.join("Widget.cmp").is_file());
        assert!(bundle.join("WidgetController.js").is_file());
        let meta = fs::read_to_string(bundle.join("Widget.cmp-meta.xml")).unwrap();
        assert!(meta.contains("<description>Widget</description>"));
    }

    #[test]
    fn clear_staging_tolerates_missing_root() {
        let out = tempfile::tempdir().unwrap();
        let staging = out.path().join("src");
        clear_staging(&staging).unwrap();

        write(&staging, "classes/Foo.cls", "x");
        write(&staging, "package.xml", "<Package/>");
        clear_staging(&staging).unwrap();
        assert!(!staging.exists());
        assert!(out.path().exists());
    }
}
