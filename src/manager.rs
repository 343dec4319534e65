//! Entry point wiring the store, the scheduler, the indexer and the search
//! engine together.

use std::sync::Arc;

use log::info;

use crate::config::SymdexConfig;
use crate::document::DocumentSource;
use crate::error::Result;
use crate::index::{IndexStore, SharedIndexStore};
use crate::indexer::Indexer;
use crate::job::{NullProgressMonitor, ProgressMonitor, Scheduler, SchedulerStats};
use crate::search::SearchEngine;
use crate::storage::Storage;
use crate::storage::file::FileStorage;
use crate::storage::memory::MemoryStorage;

/// Owns one index store and the scheduler that mutates it.
///
/// ```
/// use std::sync::Arc;
/// use symdex::config::SymdexConfig;
/// use symdex::document::{ContainerId, Document, MemoryDocumentSource};
/// use symdex::manager::IndexManager;
/// use symdex::search::{CountingCollector, LimitTo, QueryPattern, SearchFor, SearchScope};
///
/// let manager = IndexManager::open(SymdexConfig::in_memory()).unwrap();
/// let source = Arc::new(MemoryDocumentSource::new());
/// source.insert("/p", "Foo.java", "class Foo {}");
///
/// manager
///     .indexer(source)
///     .index_container(ContainerId::new("/p"), vec![Document::new("Foo.java", 1)])
///     .unwrap();
///
/// let mut collector = CountingCollector::new();
/// let pattern = QueryPattern::new("Foo", SearchFor::Type, LimitTo::Declarations);
/// manager
///     .search_engine()
///     .search(&pattern, &SearchScope::workspace(), &mut collector)
///     .unwrap();
/// assert_eq!(collector.count(), 1);
/// ```
#[derive(Debug)]
pub struct IndexManager {
    config: SymdexConfig,
    store: SharedIndexStore,
    scheduler: Arc<Scheduler>,
}

impl IndexManager {
    /// Open the store described by `config` and start the scheduler.
    pub fn open(config: SymdexConfig) -> Result<Self> {
        Self::open_with_progress(config, Arc::new(NullProgressMonitor))
    }

    /// Like [`IndexManager::open`], handing `progress` to every job.
    pub fn open_with_progress(
        config: SymdexConfig,
        progress: Arc<dyn ProgressMonitor>,
    ) -> Result<Self> {
        config.validate()?;

        let storage: Arc<dyn Storage> = match &config.store.directory {
            Some(directory) => {
                info!("Opening index store in {}", directory.display());
                Arc::new(FileStorage::new(directory, config.store.sync_writes)?)
            }
            None => {
                info!("Opening in-memory index store");
                Arc::new(MemoryStorage::new())
            }
        };
        let store = IndexStore::open(storage)?.into_shared();
        let scheduler = Arc::new(Scheduler::new(&config.scheduler, progress)?);

        Ok(IndexManager {
            config,
            store,
            scheduler,
        })
    }

    /// An indexer reading document contents from `source`.
    pub fn indexer(&self, source: Arc<dyn DocumentSource>) -> Indexer {
        Indexer::new(self.store.clone(), Arc::clone(&self.scheduler), source)
    }

    /// A search engine using the configured wait policy.
    pub fn search_engine(&self) -> SearchEngine {
        SearchEngine::new(self.store.clone(), Arc::clone(&self.scheduler))
            .with_wait_policy(self.config.search.wait_policy)
    }

    /// Block until every requested job has run.
    pub fn wait_until_idle(&self) -> Result<()> {
        self.scheduler.wait_until_idle()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    /// Run the queued jobs and stop the scheduler. Further requests fail.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    pub fn config(&self) -> &SymdexConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedIndexStore {
        &self.store
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }
}
