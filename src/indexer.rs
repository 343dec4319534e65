//! Turns documents into index segments through the job scheduler.
//!
//! Every mutation of the index store is wrapped in a [`Job`] and requested
//! on the shared [`Scheduler`], so indexing, family removal and reset all
//! run sequentially on the scheduler thread.
//!
//! [`Job`]: crate::job::Job

use std::sync::Arc;

use log::{debug, warn};

use crate::document::{ContainerId, ContainerProvider, Document, DocumentSource};
use crate::error::Result;
use crate::index::SharedIndexStore;
use crate::job::{JobTicket, Scheduler};

pub mod brace;
pub mod extract;
pub mod jobs;

pub use brace::BraceSourceExtractor;
pub use extract::{ExtractorRegistry, SymbolExtractor};
pub use jobs::{IndexContainerJob, RemoveFamilyJob, ResetJob};

/// Requests indexing and housekeeping jobs against one index store.
#[derive(Debug, Clone)]
pub struct Indexer {
    store: SharedIndexStore,
    scheduler: Arc<Scheduler>,
    source: Arc<dyn DocumentSource>,
    extractors: Arc<ExtractorRegistry>,
}

impl Indexer {
    /// Create an indexer using the default extractor registry.
    pub fn new(
        store: SharedIndexStore,
        scheduler: Arc<Scheduler>,
        source: Arc<dyn DocumentSource>,
    ) -> Self {
        Indexer {
            store,
            scheduler,
            source,
            extractors: Arc::new(ExtractorRegistry::default()),
        }
    }

    /// Replace the extractor registry.
    pub fn with_extractors(mut self, extractors: ExtractorRegistry) -> Self {
        self.extractors = Arc::new(extractors);
        self
    }

    /// Request a job that rebuilds the whole segment of `container` from
    /// `documents`.
    pub fn index_container(
        &self,
        container: ContainerId,
        documents: Vec<Document>,
    ) -> Result<JobTicket> {
        debug!(
            "Requesting index of {container} ({} documents)",
            documents.len()
        );
        let job = IndexContainerJob::new(
            container,
            documents,
            self.store.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.extractors),
        );
        self.scheduler.request(Arc::new(job))
    }

    /// Request one indexing job per container known to `provider`.
    ///
    /// Containers whose documents cannot be listed are logged and skipped.
    pub fn index_all(&self, provider: &dyn ContainerProvider) -> Result<Vec<JobTicket>> {
        let mut tickets = Vec::new();
        for container in provider.containers()? {
            match provider.documents(&container) {
                Ok(documents) => tickets.push(self.index_container(container, documents)?),
                Err(e) => warn!("Not indexing {container}: {e}"),
            }
        }
        Ok(tickets)
    }

    /// Drop queued jobs of the family rooted at `prefix`, then request a
    /// job deleting the matching segments. The empty prefix means all.
    pub fn remove_index_family(&self, prefix: &str) -> Result<JobTicket> {
        self.scheduler.remove_family(prefix);
        self.scheduler
            .request(Arc::new(RemoveFamilyJob::new(prefix, self.store.clone())))
    }

    /// Drop every queued job and request a job discarding all segments.
    pub fn reset(&self) -> Result<JobTicket> {
        self.scheduler.remove_family("");
        self.scheduler
            .request(Arc::new(ResetJob::new(self.store.clone())))
    }

    pub fn store(&self) -> &SharedIndexStore {
        &self.store
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub fn extractors(&self) -> &ExtractorRegistry {
        &self.extractors
    }
}
