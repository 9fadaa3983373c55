//! Staged editing of segmentation documents.
//!
//! Edits never touch the canonical document directly. The first mutating
//! command writes its result to a side file next to the canonical one
//! (`dir/<prefix>name.ext`); later commands read and rewrite that file.
//! `save` copies it over the canonical document and removes it, `trash`
//! just removes it.
//!
//! The staging file is written once per command, after the whole mutation
//! has succeeded in memory.

mod session;
mod store;

use std::path::{Path, PathBuf};

pub use session::Session;
pub use store::{DocumentStore, FileStore, MemoryStore};

use crate::error::{NotesError, Result};
use crate::model::Segmentation;

/// Staging lifecycle over a [`DocumentStore`].
pub struct Staging<S> {
    store: S,
    prefix: String,
}

impl<S: DocumentStore> Staging<S> {
    /// Stage documents in `store`, naming side files with `prefix`.
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Side file path for `canonical`.
    pub fn staging_path(&self, canonical: &Path) -> Result<PathBuf> {
        let name = canonical.file_name().ok_or_else(|| {
            NotesError::usage(format!("{:?} does not name a file", canonical))
        })?;
        let mut staged = std::ffi::OsString::from(&self.prefix);
        staged.push(name);
        Ok(canonical.with_file_name(staged))
    }

    /// Whether edits to `canonical` are pending.
    pub fn is_staged(&self, canonical: &Path) -> Result<bool> {
        Ok(self.store.exists(&self.staging_path(canonical)?))
    }

    /// The document as edits see it: the staged copy if present, otherwise
    /// the canonical document. Never creates the staging file.
    pub fn load_or_create(&self, canonical: &Path) -> Result<Segmentation> {
        let staged = self.staging_path(canonical)?;
        if self.store.exists(&staged) {
            log::debug!("Reading staged copy {:?}", staged);
            return self.store.load(&staged);
        }
        self.store.load(canonical)
    }

    /// Replace the staged copy of `canonical` with `doc`.
    pub fn write(&self, canonical: &Path, doc: &Segmentation) -> Result<PathBuf> {
        let staged = self.staging_path(canonical)?;
        self.store.export(doc, &staged)?;
        Ok(staged)
    }

    /// Load, apply `edit`, and write the result back to the staging file.
    ///
    /// Nothing is written if `edit` fails.
    pub fn edit<T>(
        &self,
        canonical: &Path,
        edit: impl FnOnce(&mut Segmentation) -> Result<T>,
    ) -> Result<T> {
        let mut doc = self.load_or_create(canonical)?;
        let outcome = edit(&mut doc)?;
        self.write(canonical, &doc)?;
        Ok(outcome)
    }

    /// Copy the staged document over `canonical` and remove the staging file.
    ///
    /// Returns `false` without doing anything when nothing is staged.
    pub fn commit(&self, canonical: &Path) -> Result<bool> {
        let staged = self.staging_path(canonical)?;
        if !self.store.exists(&staged) {
            log::info!("Nothing staged for {:?}; nothing to save", canonical);
            return Ok(false);
        }
        self.store.copy(&staged, canonical)?;
        self.store.remove(&staged)?;
        log::info!("Saved staged edits to {:?}", canonical);
        Ok(true)
    }

    /// Remove the staging file, leaving `canonical` untouched.
    ///
    /// Returns `false` without doing anything when nothing is staged.
    pub fn discard(&self, canonical: &Path) -> Result<bool> {
        let staged = self.staging_path(canonical)?;
        if !self.store.exists(&staged) {
            log::info!("Nothing staged for {:?}; nothing to trash", canonical);
            return Ok(false);
        }
        self.store.remove(&staged)?;
        log::info!("Discarded staged edits for {:?}", canonical);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_STAGING_PREFIX;
    use crate::error::ErrorKind;
    use crate::model::{BiologicalAnnotation, ModelError, Segment};

    fn document() -> Segmentation {
        Segmentation::new()
            .with_segment(Segment::new(1))
            .with_segment(Segment::new(2))
    }

    fn memory_staging() -> Staging<MemoryStore> {
        let store = MemoryStore::new().with_document("data/emd_1014.json", document());
        Staging::new(store, DEFAULT_STAGING_PREFIX)
    }

    fn rename(doc: &mut Segmentation, name: &str) -> Result<()> {
        doc.segment_mut(1)?.biological_annotation = Some(BiologicalAnnotation::named(name));
        Ok(())
    }

    #[test]
    fn test_staging_path() {
        let staging = memory_staging();
        assert_eq!(
            staging.staging_path(Path::new("data/emd_1014.json")).unwrap(),
            PathBuf::from("data/.temp-annotated.emd_1014.json")
        );
        assert_eq!(
            staging.staging_path(Path::new("x.sff")).unwrap(),
            PathBuf::from(".temp-annotated.x.sff")
        );
        assert_eq!(
            staging.staging_path(Path::new("..")).unwrap_err().kind(),
            ErrorKind::Usage
        );
    }

    #[test]
    fn test_edit_writes_staging_only() {
        let staging = memory_staging();
        let canonical = Path::new("data/emd_1014.json");

        staging.edit(canonical, |doc| rename(doc, "first")).unwrap();
        staging.edit(canonical, |doc| rename(doc, "second")).unwrap();

        assert!(staging.is_staged(canonical).unwrap());
        assert_eq!(staging.store().get(canonical).unwrap(), document());

        let staged = staging.load_or_create(canonical).unwrap();
        assert_eq!(staged.segment(1).unwrap().name(), Some("second"));
    }

    #[test]
    fn test_failed_edit_writes_nothing() {
        let staging = memory_staging();
        let canonical = Path::new("data/emd_1014.json");

        let err = staging
            .edit(canonical, |doc| {
                rename(doc, "partial")?;
                doc.segment(99)?;
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(
            err,
            NotesError::Model(ModelError::SegmentNotFound { id: 99 })
        ));
        assert!(!staging.is_staged(canonical).unwrap());
    }

    #[test]
    fn test_commit_replaces_canonical() {
        let staging = memory_staging();
        let canonical = Path::new("data/emd_1014.json");

        staging.edit(canonical, |doc| rename(doc, "saved")).unwrap();
        let staged = staging.load_or_create(canonical).unwrap();

        assert!(staging.commit(canonical).unwrap());
        assert!(!staging.is_staged(canonical).unwrap());
        assert_eq!(staging.store().get(canonical).unwrap(), staged);
    }

    #[test]
    fn test_discard_keeps_canonical() {
        let staging = memory_staging();
        let canonical = Path::new("data/emd_1014.json");

        staging.edit(canonical, |doc| rename(doc, "dropped")).unwrap();
        assert!(staging.discard(canonical).unwrap());

        assert!(!staging.is_staged(canonical).unwrap());
        assert_eq!(staging.store().get(canonical).unwrap(), document());
    }

    #[test]
    fn test_save_and_trash_without_staging_are_noops() {
        let staging = memory_staging();
        let canonical = Path::new("data/emd_1014.json");

        assert!(!staging.commit(canonical).unwrap());
        assert!(!staging.discard(canonical).unwrap());
        assert_eq!(staging.store().paths().len(), 1);
    }

    #[test]
    fn test_file_commit_is_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().join("cell.json");
        let staging = Staging::new(FileStore::new(), DEFAULT_STAGING_PREFIX);
        staging.store().export(&document(), &canonical).unwrap();

        staging.edit(&canonical, |doc| rename(doc, "one")).unwrap();
        staging.edit(&canonical, |doc| rename(doc, "two")).unwrap();

        let staged_path = staging.staging_path(&canonical).unwrap();
        let staged_bytes = std::fs::read(&staged_path).unwrap();

        assert!(staging.commit(&canonical).unwrap());
        assert_eq!(std::fs::read(&canonical).unwrap(), staged_bytes);
        assert!(!staged_path.exists());
    }

    #[test]
    fn test_file_trash_restores_original_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().join("cell.sff");
        let staging = Staging::new(FileStore::new(), DEFAULT_STAGING_PREFIX);
        staging.store().export(&document(), &canonical).unwrap();
        let original = std::fs::read(&canonical).unwrap();

        staging.edit(&canonical, |doc| rename(doc, "gone")).unwrap();
        assert!(staging.discard(&canonical).unwrap());

        assert_eq!(std::fs::read(&canonical).unwrap(), original);
    }
}
