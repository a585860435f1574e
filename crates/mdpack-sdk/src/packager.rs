use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdpack_classify::{PackagePlan, PlanReport, Planner};
use mdpack_index::{ChangeDetector, Detection};
use mdpack_meta::{MetadataSynthesizer, MANIFEST_FILE_NAME};
use mdpack_pack::{
    clear_staging, mock_resource, ArchiveSummary, ArchiveWriter, Assembler, AssemblyReport,
};
use mdpack_store::{FingerprintStore, JsonFingerprintStore};
use tracing::{debug, info};

use crate::config::PackagerConfig;
use crate::error::{SdkError, SdkResult};

/// Result of [`Packager::detect_and_plan`].
#[derive(Clone, Debug)]
pub enum PlanOutcome {
    /// Nothing changed since the last commit. The staged generation was
    /// still refreshed; the staging tree and archive were not touched.
    NoChanges(Detection),
    Planned {
        detection: Detection,
        report: PlanReport,
    },
}

/// What a full [`Packager::run`] produced.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub detection: Detection,
    pub report: PlanReport,
    pub assembly: AssemblyReport,
    pub mocked: Vec<PathBuf>,
    pub archive: ArchiveSummary,
    pub committed: bool,
}

#[derive(Clone, Debug)]
pub enum RunOutcome {
    NoChanges(Detection),
    Packaged(RunSummary),
}

/// Incremental packaging pipeline for one project.
///
/// Runs against the same output directory must be serialized by the caller.
pub struct Packager {
    config: PackagerConfig,
    project_root: PathBuf,
    output_root: PathBuf,
    staging_root: PathBuf,
    archive_path: PathBuf,
    metadata_dir: PathBuf,
    store: Arc<dyn FingerprintStore>,
    synthesizer: MetadataSynthesizer,
}

impl std::fmt::Debug for Packager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packager")
            .field("project_root", &self.project_root)
            .field("output_root", &self.output_root)
            .field("api_version", &self.config.api_version)
            .finish_non_exhaustive()
    }
}

impl Packager {
    /// Packager with fingerprints persisted as JSON under the output
    /// directory.
    pub fn new(config: PackagerConfig, base_dir: &Path) -> SdkResult<Self> {
        let store = Arc::new(JsonFingerprintStore::new(&config.output_root(base_dir)));
        Self::with_store(config, base_dir, store)
    }

    pub fn with_store(
        config: PackagerConfig,
        base_dir: &Path,
        store: Arc<dyn FingerprintStore>,
    ) -> SdkResult<Self> {
        config.validate()?;
        let project_root = config.project_root(base_dir);
        let output_root = config.output_root(base_dir);
        if project_root.starts_with(&output_root) {
            return Err(SdkError::Config(format!(
                "output directory {} contains the project {}",
                output_root.display(),
                project_root.display()
            )));
        }
        Ok(Self {
            project_root,
            output_root,
            staging_root: config.staging_root(base_dir),
            archive_path: config.archive_path(base_dir),
            metadata_dir: config.metadata_dir(base_dir),
            synthesizer: MetadataSynthesizer::new(config.api_version),
            store,
            config,
        })
    }

    pub fn config(&self) -> &PackagerConfig {
        &self.config
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.staging_root.join(MANIFEST_FILE_NAME)
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Forget every fingerprint and remove the whole output directory, so
    /// the next run packages everything.
    pub fn reset_all(&self) -> SdkResult<()> {
        self.store.reset(true)?;
        match std::fs::remove_dir_all(&self.output_root) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!(output = %self.output_root.display(), "output reset");
        Ok(())
    }

    /// Detect changed artifacts and classify them into a plan.
    pub fn detect_and_plan(&self, force_all: bool) -> SdkResult<PlanOutcome> {
        let detector = ChangeDetector::new(Arc::clone(&self.store))
            .with_workers(self.config.fingerprint_workers);
        let detection = detector.detect(&self.project_root, force_all)?;

        if detection.change_set.is_empty() {
            info!("no changes detected");
            return Ok(PlanOutcome::NoChanges(detection));
        }

        let report = Planner::new(&self.project_root).plan(detection.change_set.iter());
        Ok(PlanOutcome::Planned { detection, report })
    }

    /// Replace the staging tree with `plan` and write the manifest.
    pub fn assemble(&self, plan: &PackagePlan) -> SdkResult<AssemblyReport> {
        clear_staging(&self.staging_root)?;
        let assembler = Assembler::new(&self.project_root, &self.staging_root, self.synthesizer)
            .with_fallback_dir(&self.metadata_dir);
        Ok(assembler.assemble(plan)?)
    }

    /// Archive the current staging tree.
    pub async fn write_archive(&self) -> SdkResult<ArchiveSummary> {
        let writer = ArchiveWriter::new(&self.staging_root, self.manifest_path());
        Ok(writer.write_to(&self.archive_path).await?)
    }

    /// Promote the staged fingerprints to the committed baseline.
    pub fn commit(&self) -> SdkResult<()> {
        self.store.commit()?;
        Ok(())
    }

    /// Write a placeholder static resource into the staging tree.
    pub fn mock_resource(&self, name: &str) -> SdkResult<PathBuf> {
        Ok(mock_resource(&self.staging_root, name, &self.synthesizer)?)
    }

    /// [`Self::mock_resource`] for every configured name.
    pub fn mock_resources(&self) -> SdkResult<Vec<PathBuf>> {
        self.config
            .mock_resources
            .iter()
            .map(|name| self.mock_resource(name))
            .collect()
    }

    /// Detect, plan, assemble, mock and archive in one pass, then commit if
    /// asked to.
    ///
    /// Nothing is committed unless every earlier step succeeded.
    pub async fn run(&self, force_all: bool, commit: bool) -> SdkResult<RunOutcome> {
        let (detection, report) = match self.detect_and_plan(force_all)? {
            PlanOutcome::NoChanges(detection) => return Ok(RunOutcome::NoChanges(detection)),
            PlanOutcome::Planned { detection, report } => (detection, report),
        };

        let assembly = self.assemble(&report.plan)?;
        let mocked = self.mock_resources()?;
        let archive = self.write_archive().await?;
        if commit {
            self.commit()?;
            debug!("fingerprints committed");
        }

        Ok(RunOutcome::Packaged(RunSummary {
            detection,
            report,
            assembly,
            mocked,
            archive,
            committed: commit,
        }))
    }
}
