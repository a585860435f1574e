//! ZIP archiving of an assembled staging tree.
//!
//! Every entry is stored under a single [`ARCHIVE_ROOT`] directory. The
//! archive is encoded on a blocking task into a temporary file next to the
//! destination and only renamed into place once fully written and synced.
//! Dropping the [`ArchiveWriter::write_to`] future before it completes
//! abandons the blocking task: it stops at the next entry and never renames
//! its temporary file into place.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mdpack_meta::MANIFEST_FILE_NAME;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackError, PackResult};

/// Top-level directory of every archive entry.
pub const ARCHIVE_ROOT: &str = "unpackaged";

/// Result of writing an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    /// File entries written, manifest included.
    pub files: usize,
    pub bytes: u64,
}

/// Builds the deployable archive from a staging tree and its manifest.
#[derive(Clone, Debug)]
pub struct ArchiveWriter {
    source_root: PathBuf,
    manifest: PathBuf,
}

impl ArchiveWriter {
    pub fn new(source_root: impl Into<PathBuf>, manifest: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            manifest: manifest.into(),
        }
    }

    /// Write the archive to `destination`.
    ///
    /// Any pre-existing file at `destination` is removed first. On failure or
    /// cancellation no file is left at `destination`.
    pub async fn write_to(&self, destination: &Path) -> PackResult<ArchiveSummary> {
        let guard = AbandonOnDrop::new();
        match tokio::fs::remove_file(destination).await {
            Ok(()) => debug!(path = %destination.display(), "previous archive removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(archive_err(e)),
        }

        let source_root = self.source_root.clone();
        let manifest = self.manifest.clone();
        let dest = destination.to_path_buf();
        let abandoned = Arc::clone(&guard.flag);
        let summary = tokio::task::spawn_blocking(move || {
            write_blocking(&source_root, &manifest, &dest, &abandoned)
        })
        .await
        .map_err(|e| PackError::ArchiveWriteFailed(format!("archive task failed: {e}")))??;
        guard.disarm();

        info!(
            path = %summary.path.display(),
            files = summary.files,
            bytes = summary.bytes,
            "archive written"
        );
        Ok(summary)
    }
}

/// Raises its flag when dropped unless disarmed.
struct AbandonOnDrop {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl AbandonOnDrop {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

fn archive_err(e: impl std::fmt::Display) -> PackError {
    PackError::ArchiveWriteFailed(e.to_string())
}

fn check_abandoned(abandoned: &AtomicBool) -> PackResult<()> {
    if abandoned.load(Ordering::SeqCst) {
        return Err(PackError::ArchiveWriteFailed(
            "archive abandoned before completion".into(),
        ));
    }
    Ok(())
}

fn write_blocking(
    source_root: &Path,
    manifest: &Path,
    destination: &Path,
    abandoned: &AtomicBool,
) -> PackResult<ArchiveSummary> {
    if !manifest.is_file() {
        return Err(PackError::ArchiveWriteFailed(format!(
            "manifest not found at {}",
            manifest.display()
        )));
    }

    let dest_dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dest_dir).map_err(archive_err)?;
    let tmp = NamedTempFile::new_in(dest_dir).map_err(archive_err)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut files = 0;
    {
        let mut zip = ZipWriter::new(BufWriter::new(tmp.as_file()));

        for entry in WalkDir::new(source_root).min_depth(1).sort_by_file_name() {
            check_abandoned(abandoned)?;
            let entry = entry.map_err(archive_err)?;
            let path = entry.path();
            if path == manifest || path == tmp.path() || path == destination {
                continue;
            }
            let name = format!("{ARCHIVE_ROOT}/{}", entry_name(source_root, path)?);

            if entry.file_type().is_dir() {
                zip.add_directory(format!("{name}/"), options)
                    .map_err(archive_err)?;
            } else {
                zip.start_file(name.as_str(), options).map_err(archive_err)?;
                let mut source = File::open(path).map_err(archive_err)?;
                io::copy(&mut source, &mut zip).map_err(archive_err)?;
                files += 1;
                debug!(entry = %name, "archived");
            }
        }

        zip.start_file(format!("{ARCHIVE_ROOT}/{MANIFEST_FILE_NAME}"), options)
            .map_err(archive_err)?;
        let mut source = File::open(manifest).map_err(archive_err)?;
        io::copy(&mut source, &mut zip).map_err(archive_err)?;
        files += 1;

        let mut out = zip.finish().map_err(archive_err)?;
        out.flush().map_err(archive_err)?;
    }

    tmp.as_file().sync_all().map_err(archive_err)?;
    let bytes = tmp.as_file().metadata().map_err(archive_err)?.len();
    check_abandoned(abandoned)?;
    tmp.persist(destination).map_err(|e| archive_err(e.error))?;

    Ok(ArchiveSummary {
        path: destination.to_path_buf(),
        files,
        bytes,
    })
}

/// `/`-joined path of `path` relative to `root`.
fn entry_name(root: &Path, path: &Path) -> PackResult<String> {
    let relative = path.strip_prefix(root).map_err(archive_err)?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            _ => {
                return Err(PackError::ArchiveWriteFailed(format!(
                    "unexpected path component in {}",
                    relative.display()
                )))
            }
        }
    }
    Ok(parts.join("/"))
}
