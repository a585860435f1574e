//! Placeholder static resources.

use std::fs;
use std::path::{Path, PathBuf};

use mdpack_meta::MetadataSynthesizer;
use mdpack_types::{ArtifactPath, COMPANION_SUFFIX};
use tracing::info;

use crate::error::{PackError, PackResult};

/// Folder of static resources inside the staging tree.
pub const STATIC_RESOURCE_FOLDER: &str = "staticresources";

/// Write an empty `<name>.resource` and its `text/plain` descriptor into the
/// staging tree. Returns the resource path.
pub fn mock_resource(
    staging_root: &Path,
    name: &str,
    synthesizer: &MetadataSynthesizer,
) -> PackResult<PathBuf> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(PackError::InvalidResourceName(name.to_string()));
    }

    let file_name = format!("{name}.resource");
    let artifact = ArtifactPath::new(format!("{STATIC_RESOURCE_FOLDER}/{file_name}"))
        .map_err(|_| PackError::InvalidResourceName(name.to_string()))?;
    let descriptor = synthesizer
        .synthesize(name, "resource", true)
        .ok_or_else(|| PackError::MetadataUnavailable {
            artifact,
            extension: "resource".into(),
        })?;

    let dir = staging_root.join(STATIC_RESOURCE_FOLDER);
    fs::create_dir_all(&dir)?;
    let resource = dir.join(&file_name);
    fs::write(&resource, b"")?;
    fs::write(dir.join(format!("{file_name}{COMPANION_SUFFIX}")), descriptor)?;

    info!(resource = name, "mock resource written");
    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_empty_resource_and_text_descriptor() {
        let out = tempfile::tempdir().unwrap();
        let path = mock_resource(out.path(), "jQuery", &MetadataSynthesizer::new(34)).unwrap();

        assert_eq!(path, out.path().join("staticresources/jQuery.resource"));
        assert_eq!(fs::read(&path).unwrap(), b"");
        let meta =
            fs::read_to_string(out.path().join("staticresources/jQuery.resource-meta.xml")).unwrap();
        assert!(meta.contains("<contentType>text/plain</contentType>"));
        assert!(meta.contains("<StaticResource "));
    }

    #[test]
    fn overwrites_existing_resource() {
        let out = tempfile::tempdir().unwrap();
        let dir = out.path().join("staticresources");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Lib.resource"), b"real bytes").unwrap();

        mock_resource(out.path(), "Lib", &MetadataSynthesizer::new(34)).unwrap();
        assert_eq!(fs::read(dir.join("Lib.resource")).unwrap(), b"");
    }

    #[test]
    fn rejects_path_like_names() {
        let out = tempfile::tempdir().unwrap();
        let synth = MetadataSynthesizer::new(34);
        for name in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                mock_resource(out.path(), name, &synth),
                Err(PackError::InvalidResourceName(_))
            ));
        }
        assert!(!out.path().join("staticresources").exists());
    }
}
