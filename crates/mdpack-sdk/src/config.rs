use std::path::{Component, Path, PathBuf};

use mdpack_meta::DEFAULT_API_VERSION;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SdkError, SdkResult};

/// Key of the packager settings inside a project's `package.json`.
pub const CONFIG_KEY: &str = "forceDeveloperConfig";

/// Packager settings.
///
/// Relative paths are resolved against a base directory supplied by the
/// caller, usually the directory the configuration was loaded from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackagerConfig {
    pub api_version: u32,
    pub project_base_directory: PathBuf,
    pub output_directory: PathBuf,
    /// Staging tree, relative to the output directory.
    pub output_temp_directory: PathBuf,
    pub output_package_zip: PathBuf,
    /// Fallback directory for hand-authored descriptors, relative to the
    /// project directory.
    pub metadata_source_directory: PathBuf,
    pub force_package_continue_silent: bool,
    pub mock_resources: Vec<String>,
    /// Fingerprinting threads. 0 means one per available CPU.
    pub fingerprint_workers: usize,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION,
            project_base_directory: PathBuf::from("project"),
            output_directory: PathBuf::from(".package"),
            output_temp_directory: PathBuf::from("src"),
            output_package_zip: PathBuf::from(".package/package.zip"),
            metadata_source_directory: PathBuf::from("app-metadata"),
            force_package_continue_silent: false,
            mock_resources: Vec::new(),
            fingerprint_workers: 0,
        }
    }
}

impl PackagerConfig {
    /// Load settings from the [`CONFIG_KEY`] object of a JSON document.
    ///
    /// A missing file or a missing key yields the defaults. Keys absent from
    /// the object keep their default values.
    pub fn from_package_json(path: &Path) -> SdkResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Self::from_json_str(&text)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse a JSON document holding a [`CONFIG_KEY`] object.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let document: Value = serde_json::from_str(text)?;
        match document.get(CONFIG_KEY) {
            Some(section) => serde_json::from_value(section.clone()),
            None => Ok(Self::default()),
        }
    }

    /// Reject settings that would make the run unsafe.
    ///
    /// The output directory is deleted by a full reset, so it must name a
    /// real directory below the base, or an absolute directory, never the
    /// base itself or a parent of it. The staging tree is deleted before
    /// every assembly, so it must be a strict subdirectory of the output
    /// directory, never the output directory itself (which holds the
    /// fingerprint files).
    pub fn validate(&self) -> SdkResult<()> {
        if self.api_version == 0 {
            return Err(SdkError::Config("apiVersion must be positive".into()));
        }
        let output = &self.output_directory;
        let output_is_safe = output
            .components()
            .any(|c| matches!(c, Component::Normal(_)))
            && output
                .components()
                .all(|c| !matches!(c, Component::CurDir | Component::ParentDir));
        if !output_is_safe {
            return Err(SdkError::Config(format!(
                "outputDirectory must name a directory below the base, got {:?}",
                output.display().to_string()
            )));
        }
        let temp = &self.output_temp_directory;
        let is_strict_subdir = !temp.as_os_str().is_empty()
            && temp
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_strict_subdir {
            return Err(SdkError::Config(format!(
                "outputTempDirectory must be a relative subdirectory, got {:?}",
                temp.display().to_string()
            )));
        }
        if self.output_package_zip.as_os_str().is_empty() {
            return Err(SdkError::Config("outputPackageZip must not be empty".into()));
        }
        Ok(())
    }

    pub fn project_root(&self, base: &Path) -> PathBuf {
        base.join(&self.project_base_directory)
    }

    pub fn output_root(&self, base: &Path) -> PathBuf {
        base.join(&self.output_directory)
    }

    pub fn staging_root(&self, base: &Path) -> PathBuf {
        self.output_root(base).join(&self.output_temp_directory)
    }

    pub fn archive_path(&self, base: &Path) -> PathBuf {
        base.join(&self.output_package_zip)
    }

    pub fn metadata_dir(&self, base: &Path) -> PathBuf {
        self.project_root(base).join(&self.metadata_source_directory)
    }
}
