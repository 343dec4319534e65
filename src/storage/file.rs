//! File-based storage implementation.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::storage::{Storage, StorageError, StorageInput, StorageOutput};

/// Stores files in a single directory.
#[derive(Debug)]
pub struct FileStorage {
    /// The root directory for storage.
    directory: PathBuf,
    /// Sync file contents to disk on close.
    sync_writes: bool,
}

impl FileStorage {
    /// Create a new file storage in the given directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(directory: P, sync_writes: bool) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            fs::create_dir_all(&directory).map_err(|e| {
                StorageError::IoError(format!("Failed to create directory: {e}"))
            })?;
        }

        if !directory.is_dir() {
            return Err(StorageError::IoError(format!(
                "Path is not a directory: {}",
                directory.display()
            ))
            .into());
        }

        Ok(FileStorage {
            directory,
            sync_writes,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let path = self.file_path(name);
        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::FileNotFound(name.to_string())
            } else {
                StorageError::IoError(e.to_string())
            }
        })?;

        Ok(Box::new(FileInput::new(file)?))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        let path = self.file_path(name);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(Box::new(FileOutput::new(file, self.sync_writes)))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.file_path(name).exists()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.file_path(name);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StorageError::IoError(format!("Failed to delete file: {e}")))?;
        }

        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.directory).map_err(|e| StorageError::IoError(e.to_string()))?
        {
            let entry = entry.map_err(|e| StorageError::IoError(e.to_string()))?;
            let path = entry.path();

            if path.is_file() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_path = self.file_path(old_name);
        let new_path = self.file_path(new_name);

        fs::rename(&old_path, &new_path)
            .map_err(|e| StorageError::IoError(format!("Failed to rename file: {e}")))?;

        Ok(())
    }
}

/// A file input implementation.
#[derive(Debug)]
pub struct FileInput {
    reader: BufReader<File>,
    size: u64,
}

impl FileInput {
    fn new(file: File) -> Result<Self> {
        let metadata = file
            .metadata()
            .map_err(|e| StorageError::IoError(format!("Failed to get file metadata: {e}")))?;

        Ok(FileInput {
            size: metadata.len(),
            reader: BufReader::new(file),
        })
    }
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl StorageInput for FileInput {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }
}

/// A file output implementation.
#[derive(Debug)]
pub struct FileOutput {
    writer: BufWriter<File>,
    sync_writes: bool,
}

impl FileOutput {
    fn new(file: File, sync_writes: bool) -> Self {
        FileOutput {
            writer: BufWriter::new(file),
            sync_writes,
        }
    }
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl StorageOutput for FileOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| StorageError::IoError(format!("Failed to flush: {e}")))?;

        if self.sync_writes {
            self.writer
                .get_ref()
                .sync_all()
                .map_err(|e| StorageError::IoError(format!("Failed to sync: {e}")))?;
        }

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush_and_sync()
    }
}
