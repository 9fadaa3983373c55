//! Document persistence behind a small trait.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{NotesError, Result};
use crate::format::FormatRegistry;
use crate::model::Segmentation;

/// Where documents are read from and written to.
pub trait DocumentStore {
    /// Whether a document exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read the document at `path`.
    fn load(&self, path: &Path) -> Result<Segmentation>;

    /// Write `doc` to `path`, replacing any existing file.
    fn export(&self, doc: &Segmentation, path: &Path) -> Result<()>;

    /// Copy the stored document unchanged from `from` to `to`.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete the document at `path`.
    fn remove(&self, path: &Path) -> Result<()>;
}

/// Files on disk, encoded by extension through a [`FormatRegistry`].
pub struct FileStore {
    formats: FormatRegistry,
}

impl FileStore {
    /// Create a store using the built-in formats.
    pub fn new() -> Self {
        Self {
            formats: FormatRegistry::new(),
        }
    }

    /// Format registry used to pick encodings.
    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for FileStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load(&self, path: &Path) -> Result<Segmentation> {
        let format = self
            .formats
            .for_path(path)
            .map_err(|e| NotesError::document(path, e))?;
        let doc = format
            .import(path)
            .map_err(|e| NotesError::document(path, e))?;

        log::info!(
            "Loaded {:?} ({}, {} segments)",
            path,
            format.display_name(),
            doc.segments.len()
        );
        Ok(doc)
    }

    /// Encode first, then write through a temporary sibling and rename so a
    /// failed write never leaves a truncated document behind.
    fn export(&self, doc: &Segmentation, path: &Path) -> Result<()> {
        let format = self
            .formats
            .for_path(path)
            .map_err(|e| NotesError::document(path, e))?;
        let bytes = format
            .export_to_bytes(doc)
            .map_err(|e| NotesError::document(path, e))?;

        let tmp = temporary_sibling(path);
        std::fs::write(&tmp, &bytes).map_err(|e| NotesError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| NotesError::io(path, e))?;

        log::info!("Wrote {:?} ({} bytes)", path, bytes.len());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::copy(from, to).map_err(|e| NotesError::io(from, e))?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).map_err(|e| NotesError::io(path, e))
    }
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Documents held in memory, keyed by path.
#[derive(Default)]
pub struct MemoryStore {
    docs: RefCell<BTreeMap<PathBuf, Segmentation>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a document.
    pub fn with_document(self, path: impl Into<PathBuf>, doc: Segmentation) -> Self {
        self.docs.borrow_mut().insert(path.into(), doc);
        self
    }

    /// Snapshot of the document at `path`.
    pub fn get(&self, path: &Path) -> Option<Segmentation> {
        self.docs.borrow().get(path).cloned()
    }

    /// Paths currently stored.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.docs.borrow().keys().cloned().collect()
    }
}

fn not_found(path: &Path) -> NotesError {
    NotesError::io(
        path,
        std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
    )
}

impl DocumentStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.docs.borrow().contains_key(path)
    }

    fn load(&self, path: &Path) -> Result<Segmentation> {
        self.get(path).ok_or_else(|| not_found(path))
    }

    fn export(&self, doc: &Segmentation, path: &Path) -> Result<()> {
        self.docs
            .borrow_mut()
            .insert(path.to_path_buf(), doc.clone());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let doc = self.load(from)?;
        self.export(&doc, to)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.docs
            .borrow_mut()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }
}
