//! Document content access.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::document::{ContainerId, Document};
use crate::error::{Result, SymdexError};

/// Supplies the raw text of a document.
pub trait DocumentSource: Send + Sync + Debug {
    /// Read the content of `document` owned by `container`.
    fn read(&self, container: &ContainerId, document: &Document) -> Result<String>;
}

/// Reads documents from the file system.
///
/// A container id is interpreted as a directory under `root` (leading
/// slashes stripped), and a document id as a path inside that directory.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        FsDocumentSource {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve the on-disk path of a document.
    pub fn path_of(&self, container: &ContainerId, document: &Document) -> PathBuf {
        self.root
            .join(container.as_str().trim_start_matches('/'))
            .join(document.id.as_str())
    }
}

impl DocumentSource for FsDocumentSource {
    fn read(&self, container: &ContainerId, document: &Document) -> Result<String> {
        let path = self.path_of(container, document);
        let bytes = fs::read(&path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Keeps document contents in memory.
#[derive(Debug, Default)]
pub struct MemoryDocumentSource {
    contents: RwLock<AHashMap<(ContainerId, String), String>>,
}

impl MemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the content of a document.
    pub fn insert<C, D, T>(&self, container: C, document: D, content: T)
    where
        C: Into<ContainerId>,
        D: Into<String>,
        T: Into<String>,
    {
        self.contents
            .write()
            .insert((container.into(), document.into()), content.into());
    }

    /// Forget a document.
    pub fn remove(&self, container: &ContainerId, document: &str) -> Option<String> {
        self.contents
            .write()
            .remove(&(container.clone(), document.to_string()))
    }
}

impl DocumentSource for MemoryDocumentSource {
    fn read(&self, container: &ContainerId, document: &Document) -> Result<String> {
        self.contents
            .read()
            .get(&(container.clone(), document.id.as_str().to_string()))
            .cloned()
            .ok_or_else(|| {
                SymdexError::other(format!("No content for {}:{}", container, document.id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_source() {
        let source = MemoryDocumentSource::new();
        source.insert("/p1", "A.java", "class A {}");

        let container = ContainerId::new("/p1");
        let doc = Document::new("A.java", 1);
        assert_eq!(source.read(&container, &doc).unwrap(), "class A {}");

        let missing = Document::new("B.java", 1);
        assert!(source.read(&container, &missing).is_err());

        source.remove(&container, "A.java");
        assert!(source.read(&container, &doc).is_err());
    }

    #[test]
    fn test_fs_source() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("p1").join("src");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("A.java"), "class A {}").unwrap();

        let source = FsDocumentSource::new(temp_dir.path());
        let container = ContainerId::new("/p1");
        let doc = Document::new("src/A.java", 0);
        assert_eq!(source.read(&container, &doc).unwrap(), "class A {}");

        let missing = Document::new("src/B.java", 0);
        assert!(matches!(
            source.read(&container, &missing),
            Err(SymdexError::Io(_))
        ));
    }
}
