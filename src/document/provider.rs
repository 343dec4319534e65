//! Container enumeration.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use ignore::WalkBuilder;
use parking_lot::RwLock;

use crate::document::{ContainerId, Document};
use crate::error::{Result, SymdexError};

/// Supplies the containers to index and, per container, its documents.
pub trait ContainerProvider: Send + Sync + Debug {
    /// All known containers, in a stable order.
    fn containers(&self) -> Result<Vec<ContainerId>>;

    /// Documents of one container with their current revisions.
    fn documents(&self, container: &ContainerId) -> Result<Vec<Document>>;
}

/// A provider backed by an in-memory table.
#[derive(Debug, Default)]
pub struct MemoryContainerProvider {
    containers: RwLock<BTreeMap<ContainerId, Vec<Document>>>,
}

impl MemoryContainerProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container with its documents, replacing any previous entry.
    pub fn insert<C: Into<ContainerId>>(&self, container: C, documents: Vec<Document>) {
        self.containers.write().insert(container.into(), documents);
    }

    pub fn remove(&self, container: &ContainerId) -> Option<Vec<Document>> {
        self.containers.write().remove(container)
    }
}

impl ContainerProvider for MemoryContainerProvider {
    fn containers(&self) -> Result<Vec<ContainerId>> {
        Ok(self.containers.read().keys().cloned().collect())
    }

    fn documents(&self, container: &ContainerId) -> Result<Vec<Document>> {
        self.containers
            .read()
            .get(container)
            .cloned()
            .ok_or_else(|| SymdexError::container_unavailable(container.to_string()))
    }
}

/// Treats each top-level sub-directory of `root` as a container named
/// `/<dir-name>`, and every file below it with an accepted extension as a
/// document. Hidden entries and paths matched by `.gitignore` files are
/// skipped. The revision of a document is derived from its modification
/// time and size.
#[derive(Debug, Clone)]
pub struct DirectoryContainerProvider {
    root: PathBuf,
    extensions: Vec<String>,
    include_hidden: bool,
}

impl DirectoryContainerProvider {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirectoryContainerProvider {
            root: root.as_ref().to_path_buf(),
            extensions: vec!["java".to_string()],
            include_hidden: false,
        }
    }

    /// Accept documents with the given extensions (without the dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Also walk hidden files and directories. Off by default.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    fn walker(&self, path: &Path) -> WalkBuilder {
        let mut builder = WalkBuilder::new(path);
        builder
            .hidden(!self.include_hidden)
            .git_ignore(true)
            .require_git(false)
            .follow_links(false);
        builder
    }

    fn walk(&self, base: &Path) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for entry in self.walker(base).build() {
            let entry = entry.map_err(|e| {
                SymdexError::other(format!("Failed to walk {}: {e}", base.display()))
            })?;
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) || !self.accepts(path) {
                continue;
            }

            let relative = path.strip_prefix(base).map_err(|e| {
                SymdexError::other(format!("{} outside {}: {e}", path.display(), base.display()))
            })?;
            let id = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            documents.push(Document::new(id, revision_of(&fs::metadata(path)?)));
        }
        Ok(documents)
    }
}

fn revision_of(metadata: &fs::Metadata) -> u64 {
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    modified ^ metadata.len().rotate_left(48)
}

impl ContainerProvider for DirectoryContainerProvider {
    fn containers(&self) -> Result<Vec<ContainerId>> {
        if !self.root.is_dir() {
            return Err(SymdexError::container_unavailable(self.root.display().to_string()));
        }

        let mut containers = Vec::new();
        for entry in self.walker(&self.root).max_depth(Some(1)).build() {
            let entry = entry.map_err(|e| {
                SymdexError::other(format!("Failed to list {}: {e}", self.root.display()))
            })?;
            if entry.depth() == 1 && entry.file_type().is_some_and(|t| t.is_dir()) {
                let name = entry.file_name().to_string_lossy().into_owned();
                containers.push(ContainerId::new(format!("/{name}")));
            }
        }
        containers.sort();
        Ok(containers)
    }

    fn documents(&self, container: &ContainerId) -> Result<Vec<Document>> {
        let base = self.root.join(container.as_str().trim_start_matches('/'));
        if !base.is_dir() {
            return Err(SymdexError::container_unavailable(container.to_string()));
        }

        let mut documents = self.walk(&base)?;
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }
}
