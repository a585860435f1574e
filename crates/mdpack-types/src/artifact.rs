use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Suffix identifying a companion descriptor: `Foo.cls` is described by
/// `Foo.cls-meta.xml`.
pub const COMPANION_SUFFIX: &str = "-meta.xml";

/// Per-directory rule file. Never fingerprinted and never packaged.
pub const RULE_FILE_NAME: &str = "force.config";

/// A source file identified by its path relative to the project root.
///
/// Components are always joined with `/` regardless of platform, so the same
/// tree produces the same keys in the fingerprint files on every OS.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactPath(String);

impl ArtifactPath {
    /// Parse an already-relative, `/`-separated path.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        if path.is_empty()
            || path.starts_with('/')
            || path.split('/').any(|c| c.is_empty() || c == "." || c == "..")
        {
            return Err(TypeError::InvalidPath(path));
        }
        Ok(Self(path))
    }

    /// Build an artifact path from an absolute (or root-prefixed) filesystem path.
    pub fn from_fs(root: &Path, path: &Path) -> Result<Self, TypeError> {
        let relative = path.strip_prefix(root).map_err(|_| TypeError::OutsideRoot {
            path: path.display().to_string(),
            root: root.display().to_string(),
        })?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(part) => parts.push(part),
                    None => {
                        return Err(TypeError::InvalidPath(
                            relative.to_string_lossy().into_owned(),
                        ))
                    }
                },
                _ => return Err(TypeError::InvalidPath(relative.display().to_string())),
            }
        }
        Self::new(parts.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match self.extension() {
            Some(ext) => &name[..name.len() - ext.len() - 1],
            None => name,
        }
    }

    /// Extension without the leading dot. Dot-files have no extension.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// Name of the directory that directly contains the artifact, or `None`
    /// for files sitting at the project root.
    pub fn parent_name(&self) -> Option<&str> {
        let mut parts = self.0.rsplit('/');
        parts.next();
        parts.next()
    }

    /// Returns `true` if this file is a companion descriptor for another artifact.
    pub fn is_companion(&self) -> bool {
        is_companion_name(self.file_name())
    }

    /// Returns `true` if this is a per-directory rule file.
    pub fn is_rule_file(&self) -> bool {
        self.file_name() == RULE_FILE_NAME
    }

    /// File name of this artifact's companion descriptor.
    pub fn companion_name(&self) -> String {
        format!("{}{COMPANION_SUFFIX}", self.file_name())
    }

    /// Number of path components.
    pub fn depth(&self) -> usize {
        self.0.split('/').count()
    }

    /// Resolve against a project root.
    pub fn to_fs(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}

/// Returns `true` if `file_name` follows the companion descriptor convention.
pub fn is_companion_name(file_name: &str) -> bool {
    file_name.len() > COMPANION_SUFFIX.len() && file_name.ends_with(COMPANION_SUFFIX)
}

impl fmt::Debug for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactPath({})", self.0)
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
