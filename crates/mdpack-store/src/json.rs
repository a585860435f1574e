use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::FingerprintStore;
use crate::FingerprintMap;

/// File name of the committed generation inside the output directory.
pub const COMMITTED_FILE_NAME: &str = ".mdpack.filehash.json";

/// File name of the staged generation inside the output directory.
pub const STAGED_FILE_NAME: &str = ".mdpack.filehash.staging.json";

/// Fingerprint store backed by two flat JSON objects on disk.
///
/// On-disk format (both generations):
/// ```text
/// {
///   "classes/Foo.cls": "<64 hex chars>",
///   ...
/// }
/// ```
///
/// Every write goes to a temporary file in the same directory which is then
/// renamed over the target, so a crash mid-write leaves the previous
/// generation intact.
#[derive(Clone, Debug)]
pub struct JsonFingerprintStore {
    committed: PathBuf,
    staged: PathBuf,
}

impl JsonFingerprintStore {
    /// Store rooted at `output_dir`, using the default file names.
    pub fn new(output_dir: &Path) -> Self {
        Self::with_paths(
            output_dir.join(COMMITTED_FILE_NAME),
            output_dir.join(STAGED_FILE_NAME),
        )
    }

    /// Store with explicit generation paths.
    pub fn with_paths(committed: PathBuf, staged: PathBuf) -> Self {
        Self { committed, staged }
    }

    pub fn committed_path(&self) -> &Path {
        &self.committed
    }

    pub fn staged_path(&self) -> &Path {
        &self.staged
    }

    fn read_generation(path: &Path) -> StoreResult<Option<FingerprintMap>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Unavailable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Unavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn write_generation(path: &Path, mapping: &FingerprintMap) -> StoreResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, mapping)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    fn remove_if_exists(path: &Path) -> StoreResult<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl FingerprintStore for JsonFingerprintStore {
    fn load(&self) -> StoreResult<FingerprintMap> {
        let mapping = Self::read_generation(&self.committed)?.unwrap_or_default();
        debug!(path = %self.committed.display(), entries = mapping.len(), "loaded committed fingerprints");
        Ok(mapping)
    }

    fn load_staged(&self) -> StoreResult<Option<FingerprintMap>> {
        Self::read_generation(&self.staged)
    }

    fn stage(&self, mapping: &FingerprintMap) -> StoreResult<()> {
        Self::write_generation(&self.staged, mapping)?;
        debug!(path = %self.staged.display(), entries = mapping.len(), "staged fingerprints");
        Ok(())
    }

    fn commit(&self) -> StoreResult<()> {
        let staged = match Self::read_generation(&self.staged) {
            Ok(Some(mapping)) => mapping,
            Ok(None) => {
                return Err(StoreError::CommitFailed(format!(
                    "nothing staged at {}",
                    self.staged.display()
                )))
            }
            Err(e) => return Err(StoreError::CommitFailed(e.to_string())),
        };

        Self::write_generation(&self.committed, &staged)
            .map_err(|e| StoreError::CommitFailed(e.to_string()))?;

        info!(entries = staged.len(), "committed fingerprint baseline");
        Ok(())
    }

    fn reset(&self, including_committed: bool) -> StoreResult<()> {
        let staged = Self::remove_if_exists(&self.staged)?;
        let committed = if including_committed {
            Self::remove_if_exists(&self.committed)?
        } else {
            false
        };
        debug!(staged, committed, "reset fingerprint store");
        Ok(())
    }
}
