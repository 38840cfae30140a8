//! Locating the markdown documents to check.

use std::path::{Path, PathBuf};

use crate::error::{CorecheckError, Result};

/// File extension of documents that may carry snippets.
pub const DOCUMENT_EXTENSION: &str = "md";

/// List the `.md` files directly inside `dir`, sorted by file name.
///
/// The walk is not recursive and directories are skipped even when their
/// name ends in `.md`.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_err = |source| CorecheckError::ReadDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();

        if path.is_dir() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
            continue;
        }
        documents.push(path);
    }

    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discovers_only_top_level_markdown() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.md")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.md"), "").unwrap();

        let docs = discover_documents(dir.path()).unwrap();
        let names: Vec<_> = docs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_missing_directory_errors() {
        let err = discover_documents(Path::new("/no/such/corecheck/dir")).unwrap_err();
        assert!(matches!(err, CorecheckError::ReadDirectory { .. }));
    }
}
