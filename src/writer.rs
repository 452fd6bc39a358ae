use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::TemplateError;

/// Write `contents` to `path` all at once.
///
/// The bytes go to a temp file next to `path`, are synced, then the temp
/// file is renamed over the target. On any failure the temp file is removed
/// and the target keeps its previous content.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), TemplateError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
        TemplateError::Serialization(format!(
            "failed to create temp file in '{}': {e}",
            dir.display()
        ))
    })?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path)?;

    info!(
        event = "Write",
        phase = "Persisted",
        path = %path.display(),
        bytes = contents.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.yml");
        write_atomic(&path, "Resources: {}\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Resources: {}\n");
    }

    #[test]
    fn test_write_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.yml");
        fs::write(&path, "old content that is longer than the new one").unwrap();
        write_atomic(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.yml");
        write_atomic(&path, "a").unwrap();
        write_atomic(&path, "b").unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("template.yml");
        let err = write_atomic(&path, "a").unwrap_err();
        assert!(matches!(err, TemplateError::Serialization(_)));
        assert!(!path.exists());
    }
}
