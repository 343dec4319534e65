//! In-memory storage implementation for testing and ephemeral indexes.

use std::io::{Cursor, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::error::Result;
use crate::storage::{Storage, StorageError, StorageInput, StorageOutput};

type FileTable = Arc<Mutex<AHashMap<String, Box<[u8]>>>>;

/// An in-memory storage implementation.
///
/// Writes can be made to fail on demand with [`MemoryStorage::set_fail_writes`],
/// which is how store-level error handling is exercised in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: FileTable,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write, rename and delete fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    /// Get the number of files stored.
    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }

    /// Raw content of a file, if present.
    pub fn file_bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().get(name).map(|data| data.to_vec())
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::Acquire) {
            Err(StorageError::IoError("injected write failure".to_string()).into())
        } else {
            Ok(())
        }
    }
}

impl Storage for MemoryStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let files = self.files.lock();
        let data = files
            .get(name)
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))?;

        Ok(Box::new(MemoryInput::new(data.to_vec())))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        self.check_writable()?;

        Ok(Box::new(MemoryOutput {
            name: name.to_string(),
            buffer: Vec::new(),
            files: Arc::clone(&self.files),
            fail_writes: Arc::clone(&self.fail_writes),
            closed: false,
        }))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.lock().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.check_writable()?;
        self.files.lock().remove(name);
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.files.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.check_writable()?;

        let mut files = self.files.lock();
        let data = files
            .remove(old_name)
            .ok_or_else(|| StorageError::FileNotFound(old_name.to_string()))?;
        files.insert(new_name.to_string(), data);
        Ok(())
    }
}

/// A memory-based input implementation.
#[derive(Debug)]
pub struct MemoryInput {
    cursor: Cursor<Vec<u8>>,
    size: u64,
}

impl MemoryInput {
    fn new(data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        MemoryInput {
            cursor: Cursor::new(data),
            size,
        }
    }
}

impl Read for MemoryInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl StorageInput for MemoryInput {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }
}

/// A memory-based output. The buffer is published on `close`; an output
/// dropped without closing leaves no file behind.
#[derive(Debug)]
pub struct MemoryOutput {
    name: String,
    buffer: Vec<u8>,
    files: FileTable,
    fail_writes: Arc<AtomicBool>,
    closed: bool,
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.closed {
            return Err(std::io::Error::other("Output is closed"));
        }
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(std::io::Error::other("injected write failure"));
        }

        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl StorageOutput for MemoryOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            if self.fail_writes.load(Ordering::Acquire) {
                return Err(StorageError::IoError("injected write failure".to_string()).into());
            }
            let data = std::mem::take(&mut self.buffer).into_boxed_slice();
            self.files.lock().insert(self.name.clone(), data);
            self.closed = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();

        let mut output = storage.create_output("a.tmp").unwrap();
        output.write_all(b"data").unwrap();
        assert!(!storage.file_exists("a.tmp"));
        output.close().unwrap();
        assert!(storage.file_exists("a.tmp"));

        storage.rename_file("a.tmp", "a.seg").unwrap();
        assert_eq!(storage.list_files().unwrap(), vec!["a.seg".to_string()]);
        assert_eq!(storage.file_bytes("a.seg").unwrap(), b"data");

        let mut input = storage.open_input("a.seg").unwrap();
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer).unwrap();
        assert_eq!(buffer, b"data");
    }

    #[test]
    fn test_memory_storage_injected_failure() {
        let storage = MemoryStorage::new();
        storage.set_fail_writes(true);

        let err = storage.create_output("a.seg").unwrap_err();
        assert!(err.is_store_io());
        assert_eq!(storage.file_count(), 0);

        storage.set_fail_writes(false);
        let mut output = storage.create_output("a.seg").unwrap();
        storage.set_fail_writes(true);
        assert!(output.write_all(b"x").is_err());
        assert!(output.close().is_err());
        assert_eq!(storage.file_count(), 0);
    }
}
