//! Storage abstraction for segment files.
//!
//! The index store writes each segment as a single named file through the
//! [`Storage`] trait, so the same store logic runs over a directory on disk
//! ([`file::FileStorage`]) or purely in memory ([`memory::MemoryStorage`]).
//!
//! # Example
//!
//! ```
//! use std::io::{Read, Write};
//! use symdex::storage::Storage;
//! use symdex::storage::memory::MemoryStorage;
//!
//! # fn main() -> symdex::error::Result<()> {
//! let storage = MemoryStorage::new();
//!
//! let mut output = storage.create_output("a.seg")?;
//! output.write_all(b"segment")?;
//! output.close()?;
//!
//! let mut input = storage.open_input("a.seg")?;
//! let mut buffer = Vec::new();
//! input.read_to_end(&mut buffer)?;
//! assert_eq!(buffer, b"segment");
//! # Ok(())
//! # }
//! ```

use std::fmt::Debug;
use std::io::{Read, Write};

use thiserror::Error;

use crate::error::SymdexError;

pub mod file;
pub mod memory;

/// Errors raised by storage backends.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<StorageError> for SymdexError {
    fn from(err: StorageError) -> Self {
        SymdexError::StoreIo(err.to_string())
    }
}

/// A backend that stores named blobs.
pub trait Storage: Send + Sync + Debug {
    /// Open an existing file for reading.
    fn open_input(&self, name: &str) -> crate::error::Result<Box<dyn StorageInput>>;

    /// Create a file for writing, truncating any previous content. The content
    /// becomes visible once the output is closed.
    fn create_output(&self, name: &str) -> crate::error::Result<Box<dyn StorageOutput>>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file succeeds.
    fn delete_file(&self, name: &str) -> crate::error::Result<()>;

    /// List all file names, sorted.
    fn list_files(&self) -> crate::error::Result<Vec<String>>;

    /// Rename a file, replacing `new_name` if it exists. Readers never
    /// observe a partially written `new_name`.
    fn rename_file(&self, old_name: &str, new_name: &str) -> crate::error::Result<()>;
}

/// Readable handle on a stored file.
pub trait StorageInput: Read + Send + Debug {
    /// Size of the file in bytes.
    fn size(&self) -> crate::error::Result<u64>;
}

/// Writable handle on a stored file.
pub trait StorageOutput: Write + Send + Debug {
    /// Flush buffers and, where supported, sync to the device.
    fn flush_and_sync(&mut self) -> crate::error::Result<()>;

    /// Finish writing and publish the content.
    fn close(&mut self) -> crate::error::Result<()>;
}
