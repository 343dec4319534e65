//! Indexing and housekeeping jobs.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::document::{ContainerId, Document, DocumentSource};
use crate::error::Result;
use crate::index::{IndexSegment, SharedIndexStore};
use crate::indexer::extract::ExtractorRegistry;
use crate::job::{Job, ProgressMonitor};

/// Builds the full segment of one container and stores it with a single
/// `put`.
///
/// The job belongs to every family that is a prefix of its container id.
pub struct IndexContainerJob {
    container: ContainerId,
    documents: Vec<Document>,
    store: SharedIndexStore,
    source: Arc<dyn DocumentSource>,
    extractors: Arc<ExtractorRegistry>,
    cancelled: AtomicBool,
}

impl IndexContainerJob {
    pub fn new(
        container: ContainerId,
        documents: Vec<Document>,
        store: SharedIndexStore,
        source: Arc<dyn DocumentSource>,
        extractors: Arc<ExtractorRegistry>,
    ) -> Self {
        IndexContainerJob {
            container,
            documents,
            store,
            source,
            extractors,
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn container(&self) -> &ContainerId {
        &self.container
    }

    fn is_cancelled(&self, progress: &dyn ProgressMonitor) -> bool {
        self.cancelled.load(Ordering::Acquire) || progress.is_canceled()
    }

    /// Build the segment, or `None` if cancelled part way.
    fn build_segment(&self, progress: &dyn ProgressMonitor) -> Option<IndexSegment> {
        let mut builder = IndexSegment::builder(self.container.clone());

        for document in &self.documents {
            if self.is_cancelled(progress) {
                return None;
            }

            let Some(extractor) = self.extractors.get(&document.id) else {
                // Nothing to extract, but the document is still part of the
                // container as of this revision.
                builder.add_document(document);
                progress.worked(1);
                continue;
            };

            let content = match self.source.read(&self.container, document) {
                Ok(content) => content,
                Err(e) => {
                    warn!(
                        "Skipping unreadable document {} in {}: {e}",
                        document.id, self.container
                    );
                    progress.worked(1);
                    continue;
                }
            };

            match extractor.extract(&document.id, &content) {
                Ok(occurrences) => {
                    builder.add_document(document);
                    for occurrence in occurrences {
                        builder.add_occurrence(occurrence);
                    }
                }
                Err(e) => warn!(
                    "Extractor {} failed on {} in {}: {e}",
                    extractor.name(),
                    document.id,
                    self.container
                ),
            }
            progress.worked(1);
        }

        Some(builder.build())
    }
}

impl fmt::Debug for IndexContainerJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexContainerJob")
            .field("container", &self.container)
            .field("documents", &self.documents.len())
            .finish()
    }
}

impl Job for IndexContainerJob {
    fn belongs_to(&self, family: &str) -> bool {
        self.container.has_prefix(family)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    fn is_ready_to_run(&self) -> bool {
        true
    }

    fn execute(&self, progress: &dyn ProgressMonitor) -> Result<bool> {
        if self.is_cancelled(progress) {
            return Ok(false);
        }

        let unchanged = self
            .store
            .read()
            .get(&self.container)
            .is_some_and(|current| current.is_built_from(&self.documents));
        if unchanged {
            debug!("Index of {} is up to date", self.container);
            return Ok(true);
        }

        progress.begin_task(
            &format!("Indexing {}", self.container),
            self.documents.len(),
        );
        let Some(segment) = self.build_segment(progress) else {
            info!("Indexing of {} was cancelled", self.container);
            progress.done();
            return Ok(false);
        };

        let (keys, occurrences) = (segment.key_count(), segment.occurrence_count());
        let stored = self.store.write().put(self.container.clone(), segment);
        progress.done();
        stored?;

        info!(
            "Indexed {}: {} documents, {keys} keys, {occurrences} occurrences",
            self.container,
            self.documents.len()
        );
        Ok(true)
    }
}

/// Deletes every segment whose container id starts with a prefix.
pub struct RemoveFamilyJob {
    prefix: String,
    store: SharedIndexStore,
    cancelled: AtomicBool,
}

impl RemoveFamilyJob {
    pub fn new(prefix: impl Into<String>, store: SharedIndexStore) -> Self {
        RemoveFamilyJob {
            prefix: prefix.into(),
            store,
            cancelled: AtomicBool::new(false),
        }
    }
}

impl fmt::Debug for RemoveFamilyJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveFamilyJob")
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl Job for RemoveFamilyJob {
    /// A removal of `/org.a` belongs to the family `/org`, since removing
    /// `/org` makes it redundant. The converse does not hold.
    fn belongs_to(&self, family: &str) -> bool {
        self.prefix.starts_with(family)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    fn is_ready_to_run(&self) -> bool {
        true
    }

    fn execute(&self, _progress: &dyn ProgressMonitor) -> Result<bool> {
        if self.cancelled.load(Ordering::Acquire) {
            return Ok(false);
        }
        let removed = self.store.write().remove_family(&self.prefix)?;
        info!("Removed {removed} indexes under {:?}", self.prefix);
        Ok(true)
    }
}

/// Drops every segment in the store.
pub struct ResetJob {
    store: SharedIndexStore,
    cancelled: AtomicBool,
}

impl ResetJob {
    pub fn new(store: SharedIndexStore) -> Self {
        ResetJob {
            store,
            cancelled: AtomicBool::new(false),
        }
    }
}

impl fmt::Debug for ResetJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetJob")
    }
}

impl Job for ResetJob {
    fn belongs_to(&self, family: &str) -> bool {
        family.is_empty()
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    fn is_ready_to_run(&self) -> bool {
        true
    }

    fn execute(&self, _progress: &dyn ProgressMonitor) -> Result<bool> {
        if self.cancelled.load(Ordering::Acquire) {
            return Ok(false);
        }
        self.store.write().reset()?;
        info!("Index store reset");
        Ok(true)
    }
}
