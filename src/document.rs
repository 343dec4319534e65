//! Documents, containers, and the collaborators that supply them.
//!
//! The indexer never discovers containers or reads storage on its own: a
//! [`ContainerProvider`] enumerates containers and their documents, and a
//! [`DocumentSource`] returns the text of one document.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod provider;
pub mod source;

pub use provider::{ContainerProvider, DirectoryContainerProvider, MemoryContainerProvider};
pub use source::{DocumentSource, FsDocumentSource, MemoryDocumentSource};

/// Identifier of a container (a project or workspace root), usually a path
/// such as `/org.example.core`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        ContainerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this container belongs to the family rooted at `prefix`.
    /// The empty prefix matches every container.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        ContainerId::new(id)
    }
}

impl From<String> for ContainerId {
    fn from(id: String) -> Self {
        ContainerId(id)
    }
}

/// Identifier of a document, its path relative to the owning container.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        DocumentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File extension of the document path, without the dot.
    pub fn extension(&self) -> Option<&str> {
        let name = self.0.rsplit(['/', '\\']).next()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() { None } else { Some(ext) }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        DocumentId::new(id)
    }
}

/// An identifiable content unit: a path plus the revision of its content.
///
/// The revision is the change-detection signal handed in by the container
/// provider; the indexer compares it with the revision recorded in the
/// stored segment to decide whether a container needs re-indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub revision: u64,
}

impl Document {
    pub fn new<S: Into<String>>(path: S, revision: u64) -> Self {
        Document {
            id: DocumentId::new(path),
            revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_prefix() {
        let id = ContainerId::new("/org.example.core");
        assert!(id.has_prefix(""));
        assert!(id.has_prefix("/org.example"));
        assert!(!id.has_prefix("/com"));
    }

    #[test]
    fn test_document_extension() {
        assert_eq!(DocumentId::new("src/a/Foo.java").extension(), Some("java"));
        assert_eq!(DocumentId::new("src\\Foo.cs").extension(), Some("cs"));
        assert_eq!(DocumentId::new("src/.hidden").extension(), None);
        assert_eq!(DocumentId::new("Makefile").extension(), None);
    }
}
