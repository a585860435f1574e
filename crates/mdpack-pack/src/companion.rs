//! Lookup of hand-authored companion descriptors.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mdpack_types::{is_companion_name, ArtifactPath};
use walkdir::WalkDir;

/// Every companion descriptor in a project tree, keyed by file name.
///
/// Lookup order for an artifact:
/// 1. next to the artifact in its own source directory
/// 2. the metadata fallback directory, if configured
/// 3. anywhere else in the tree (first match in sorted walk order)
#[derive(Debug)]
pub struct CompanionIndex {
    project_root: PathBuf,
    fallback_dir: Option<PathBuf>,
    by_name: HashMap<String, PathBuf>,
}

impl CompanionIndex {
    /// Scan `project_root` once. Hidden entries are ignored.
    pub fn scan(project_root: &Path, fallback_dir: Option<&Path>) -> Self {
        let mut by_name = HashMap::new();
        let walker = WalkDir::new(project_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e
                        .file_name()
                        .to_str()
                        .map(|n| n.starts_with('.'))
                        .unwrap_or(false)
            })
            .filter_map(Result::ok);

        for entry in walker {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if is_companion_name(name) {
                by_name
                    .entry(name.to_string())
                    .or_insert_with(|| entry.path().to_path_buf());
            }
        }

        Self {
            project_root: project_root.to_path_buf(),
            fallback_dir: fallback_dir.map(Path::to_path_buf),
            by_name,
        }
    }

    /// Number of descriptors found in the tree.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Find the hand-authored descriptor for `artifact`.
    pub fn find(&self, artifact: &ArtifactPath) -> Option<PathBuf> {
        let name = artifact.companion_name();

        let beside = artifact
            .to_fs(&self.project_root)
            .with_file_name(&name);
        if beside.is_file() {
            return Some(beside);
        }

        if let Some(fallback) = &self.fallback_dir {
            let candidate = fallback.join(&name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        self.by_name.get(&name).cloned()
    }
}
