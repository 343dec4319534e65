//! The per-container index store.
//!
//! Mutations are expected to run on the scheduler thread only (see
//! [`crate::job::scheduler`]); the store itself does no locking. Callers on
//! other threads go through [`SharedIndexStore`] and only read after waiting
//! for the scheduler to go idle.

use std::io::{Read, Write};
use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, info, warn};
use parking_lot::RwLock;

use crate::document::ContainerId;
use crate::error::{Result, SymdexError};
use crate::index::codec;
use crate::index::segment::IndexSegment;
use crate::storage::Storage;

/// Shared handle on an index store.
pub type SharedIndexStore = Arc<RwLock<IndexStore>>;

const SEGMENT_EXTENSION: &str = ".seg";
const TEMP_EXTENSION: &str = ".tmp";

/// Durable mapping from container id to its current segment.
#[derive(Debug)]
pub struct IndexStore {
    storage: Arc<dyn Storage>,
    segments: AHashMap<ContainerId, Arc<IndexSegment>>,
}

impl IndexStore {
    /// Open a store over `storage`, loading every segment file found.
    ///
    /// Leftover temporary files are removed. Segment files that fail to
    /// decode are logged and skipped; their container is simply absent.
    pub fn open(storage: Arc<dyn Storage>) -> Result<Self> {
        let mut segments = AHashMap::new();

        for name in storage.list_files()? {
            if name.ends_with(TEMP_EXTENSION) {
                debug!("Removing stale temporary segment file {name}");
                storage.delete_file(&name)?;
                continue;
            }
            if !name.ends_with(SEGMENT_EXTENSION) {
                continue;
            }

            match Self::load_segment(storage.as_ref(), &name) {
                Ok(segment) => {
                    if segment_file_name(segment.container()) != name {
                        warn!(
                            "Segment file {name} holds container {}, skipping",
                            segment.container()
                        );
                        continue;
                    }
                    segments.insert(segment.container().clone(), Arc::new(segment));
                }
                Err(e) => warn!("Skipping unreadable segment file {name}: {e}"),
            }
        }

        info!("Opened index store with {} segments", segments.len());
        Ok(IndexStore { storage, segments })
    }

    fn load_segment(storage: &dyn Storage, name: &str) -> Result<IndexSegment> {
        let mut input = storage.open_input(name)?;
        let mut bytes = Vec::with_capacity(input.size()? as usize);
        input.read_to_end(&mut bytes)?;
        codec::decode(&bytes)
    }

    /// Wrap this store for sharing with the scheduler and searchers.
    pub fn into_shared(self) -> SharedIndexStore {
        Arc::new(RwLock::new(self))
    }

    /// Atomically replace the segment of `container`.
    ///
    /// The segment is written to a temporary file and renamed into place. On
    /// failure a [`SymdexError::StoreIo`] is returned and the in-memory
    /// state is untouched.
    pub fn put(&mut self, container: ContainerId, segment: IndexSegment) -> Result<()> {
        if segment.container() != &container {
            return Err(SymdexError::invalid_operation(format!(
                "Segment for {} cannot be stored under {container}",
                segment.container()
            )));
        }

        let name = segment_file_name(&container);
        let temp_name = format!("{name}{TEMP_EXTENSION}");
        if let Err(e) = self.write_file(&segment, &temp_name, &name) {
            let _ = self.storage.delete_file(&temp_name);
            return Err(into_store_io(e));
        }

        debug!(
            "Stored segment for {container}: {} keys, {} occurrences",
            segment.key_count(),
            segment.occurrence_count()
        );
        self.segments.insert(container, Arc::new(segment));
        Ok(())
    }

    fn write_file(&self, segment: &IndexSegment, temp_name: &str, name: &str) -> Result<()> {
        let bytes = codec::encode(segment)?;
        let mut output = self.storage.create_output(temp_name)?;
        output.write_all(&bytes)?;
        output.flush_and_sync()?;
        output.close()?;
        self.storage.rename_file(temp_name, name)
    }

    /// Current segment of `container`, or `None` if it was never indexed.
    pub fn get(&self, container: &ContainerId) -> Option<Arc<IndexSegment>> {
        self.segments.get(container).cloned()
    }

    /// Like [`IndexStore::get`], reporting an absent container as
    /// [`SymdexError::ContainerUnavailable`].
    pub fn get_checked(&self, container: &ContainerId) -> Result<Arc<IndexSegment>> {
        self.get(container)
            .ok_or_else(|| SymdexError::container_unavailable(container.to_string()))
    }

    /// Delete every segment whose container id starts with `prefix`. The
    /// empty prefix deletes all segments. Returns the number removed.
    ///
    /// Segments are deleted in container order. If a delete fails, the
    /// segments before it are already gone and the rest are kept; the
    /// in-memory view matches what is on storage either way.
    pub fn remove_family(&mut self, prefix: &str) -> Result<usize> {
        let mut family: Vec<ContainerId> = self
            .segments
            .keys()
            .filter(|id| id.has_prefix(prefix))
            .cloned()
            .collect();
        family.sort();

        for container in &family {
            self.storage
                .delete_file(&segment_file_name(container))
                .map_err(into_store_io)?;
            self.segments.remove(container);
        }

        debug!("Removed {} segments with prefix {prefix:?}", family.len());
        Ok(family.len())
    }

    /// Drop all segments.
    pub fn reset(&mut self) -> Result<()> {
        self.remove_family("")?;
        Ok(())
    }

    /// Ids of all indexed containers, sorted.
    pub fn containers(&self) -> Vec<ContainerId> {
        let mut containers: Vec<ContainerId> = self.segments.keys().cloned().collect();
        containers.sort();
        containers
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

/// Container ids up to this many bytes are hex encoded whole.
const FULL_NAME_BYTES: usize = 96;
/// Longer ids keep this many leading bytes and gain a checksum suffix.
const PREFIX_BYTES: usize = 64;

/// File name of the segment of `container`.
///
/// Short ids map to their hex encoding plus `.seg`. Longer ids map to the hex
/// of their first bytes followed by the CRC32 and length of the whole id, so
/// the name stays well under common file name limits. The container id stored
/// inside the segment is authoritative; [`IndexStore::open`] only accepts a
/// file whose segment maps back to its name.
pub fn segment_file_name(container: &ContainerId) -> String {
    let id = container.as_str().as_bytes();
    let head = if id.len() <= FULL_NAME_BYTES {
        id
    } else {
        &id[..PREFIX_BYTES]
    };

    let mut name = String::with_capacity(head.len() * 2 + 32);
    for byte in head {
        name.push_str(&format!("{byte:02x}"));
    }
    if id.len() > FULL_NAME_BYTES {
        name.push_str(&format!("-{:08x}-{:x}", crc32fast::hash(id), id.len()));
    }
    name.push_str(SEGMENT_EXTENSION);
    name
}

fn into_store_io(err: SymdexError) -> SymdexError {
    match err {
        SymdexError::StoreIo(_) => err,
        other => SymdexError::store_io(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentId};
    use crate::storage::file::FileStorage;
    use crate::storage::memory::MemoryStorage;
    use crate::symbol::{Role, SourceSpan, SymbolKind, SymbolOccurrence};
    use tempfile::TempDir;

    fn segment(container: &str, name: &str) -> IndexSegment {
        let mut builder = IndexSegment::builder(ContainerId::new(container));
        builder
            .add_document(&Document::new("A.java", 1))
            .add_occurrence(SymbolOccurrence {
                kind: SymbolKind::Type,
                role: Role::Declaration,
                simple_name: name.to_string(),
                qualified_container_path: String::new(),
                declaring_entity: None,
                enclosing_names: Vec::new(),
                span: SourceSpan::new(6, 6 + name.len()),
                document: DocumentId::new("A.java"),
            });
        builder.build()
    }

    #[test]
    fn test_put_get_replace() {
        let mut store = IndexStore::open(Arc::new(MemoryStorage::new())).unwrap();
        let container = ContainerId::new("/p1");
        assert!(store.get(&container).is_none());
        assert!(matches!(
            store.get_checked(&container),
            Err(SymdexError::ContainerUnavailable(_))
        ));

        store.put(container.clone(), segment("/p1", "Foo")).unwrap();
        assert_eq!(store.get(&container).unwrap().get("Foo").len(), 1);

        store.put(container.clone(), segment("/p1", "Bar")).unwrap();
        let current = store.get(&container).unwrap();
        assert!(current.get("Foo").is_empty());
        assert_eq!(current.get("Bar").len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_put_rejects_mismatched_container() {
        let mut store = IndexStore::open(Arc::new(MemoryStorage::new())).unwrap();
        let result = store.put(ContainerId::new("/p2"), segment("/p1", "Foo"));
        assert!(matches!(result, Err(SymdexError::InvalidOperation(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_failure_leaves_state_unchanged() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = IndexStore::open(storage.clone()).unwrap();
        let container = ContainerId::new("/p1");
        store.put(container.clone(), segment("/p1", "Foo")).unwrap();

        storage.set_fail_writes(true);
        let err = store
            .put(container.clone(), segment("/p1", "Bar"))
            .unwrap_err();
        assert!(err.is_store_io());

        let current = store.get(&container).unwrap();
        assert_eq!(current.get("Foo").len(), 1);
        assert!(current.get("Bar").is_empty());
        assert_eq!(storage.list_files().unwrap(), vec![segment_file_name(&container)]);
    }

    #[test]
    fn test_remove_family_and_reset() {
        let mut store = IndexStore::open(Arc::new(MemoryStorage::new())).unwrap();
        for id in ["/org.a", "/org.b", "/com.c"] {
            store.put(ContainerId::new(id), segment(id, "Foo")).unwrap();
        }

        assert_eq!(store.remove_family("/org").unwrap(), 2);
        assert_eq!(store.containers(), vec![ContainerId::new("/com.c")]);
        assert_eq!(store.storage().list_files().unwrap().len(), 1);

        store.put(ContainerId::new("/org.a"), segment("/org.a", "Foo")).unwrap();
        assert_eq!(store.remove_family("").unwrap(), 2);
        assert!(store.is_empty());

        store.put(ContainerId::new("/x"), segment("/x", "Foo")).unwrap();
        store.reset().unwrap();
        assert!(store.is_empty());
        assert!(store.storage().list_files().unwrap().is_empty());
    }

    #[test]
    fn test_reopen_loads_segments() {
        let temp_dir = TempDir::new().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(temp_dir.path(), false).unwrap());

        {
            let mut store = IndexStore::open(storage.clone()).unwrap();
            store.put(ContainerId::new("/p1"), segment("/p1", "Foo")).unwrap();
            store.put(ContainerId::new("/p2"), segment("/p2", "Bar")).unwrap();
        }

        std::fs::write(temp_dir.path().join("garbage.seg"), b"not a segment").unwrap();
        std::fs::write(temp_dir.path().join("left.seg.tmp"), b"partial").unwrap();

        let store = IndexStore::open(storage.clone()).unwrap();
        assert_eq!(
            store.containers(),
            vec![ContainerId::new("/p1"), ContainerId::new("/p2")]
        );
        assert_eq!(store.get(&ContainerId::new("/p2")).unwrap().get("Bar").len(), 1);
        assert!(!storage.file_exists("left.seg.tmp"));
    }

    #[test]
    fn test_segment_file_name() {
        assert_eq!(segment_file_name(&ContainerId::new("/a")), "2f61.seg");

        let base = format!("/home/dev/workspace/{}", "org.example.module.".repeat(12));
        let first = segment_file_name(&ContainerId::new(format!("{base}alpha")));
        let second = segment_file_name(&ContainerId::new(format!("{base}beta")));
        assert!(first.len() < 255);
        assert!(first.ends_with(SEGMENT_EXTENSION));
        assert_ne!(first, second);
    }

    #[test]
    fn test_long_container_id_round_trips_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(temp_dir.path(), false).unwrap());
        let id = format!("/home/dev/workspace/{}core", "org.example.module.".repeat(6));
        assert!(id.len() > 125);

        {
            let mut store = IndexStore::open(storage.clone()).unwrap();
            store.put(ContainerId::new(id.as_str()), segment(&id, "Foo")).unwrap();
        }

        let store = IndexStore::open(storage).unwrap();
        assert_eq!(store.containers(), vec![ContainerId::new(id.as_str())]);
        assert_eq!(store.get(&ContainerId::new(id.as_str())).unwrap().get("Foo").len(), 1);
    }

    #[test]
    fn test_remove_family_failure_keeps_segments() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = IndexStore::open(storage.clone()).unwrap();
        for id in ["/org.a", "/org.b"] {
            store.put(ContainerId::new(id), segment(id, "Foo")).unwrap();
        }

        storage.set_fail_writes(true);
        let err = store.remove_family("/org").unwrap_err();
        assert!(err.is_store_io());
        assert_eq!(store.len(), 2);
        assert_eq!(storage.file_count(), 2);
    }
}
