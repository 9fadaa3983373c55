//! Trait definitions for segmentation format implementations.

use std::path::Path;

use crate::format::error::FormatError;
use crate::model::Segmentation;

/// Trait for segmentation file encodings.
///
/// Implementations convert between bytes and [`Segmentation`]. The provided
/// [`export`](SegmentationFormat::export) and
/// [`import`](SegmentationFormat::import) methods add file I/O on top.
pub trait SegmentationFormat: Send + Sync {
    /// Unique identifier for this format (e.g., "json", "sff").
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn display_name(&self) -> &'static str;

    /// File extensions this format handles, without the leading dot.
    fn extensions(&self) -> &[&'static str];

    /// Serialize a document.
    fn export_to_bytes(&self, doc: &Segmentation) -> Result<Vec<u8>, FormatError>;

    /// Parse a document. Implementations must reject unreadable versions
    /// and documents that break model invariants.
    fn import_from_bytes(&self, bytes: &[u8]) -> Result<Segmentation, FormatError>;

    /// Write a document to `path`.
    fn export(&self, doc: &Segmentation, path: &Path) -> Result<(), FormatError> {
        log::debug!("Exporting {} document to {:?}", self.id(), path);
        let bytes = self.export_to_bytes(doc)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a document from `path`.
    fn import(&self, path: &Path) -> Result<Segmentation, FormatError> {
        log::debug!("Importing {} document from {:?}", self.id(), path);
        let bytes = std::fs::read(path)?;
        self.import_from_bytes(&bytes)
    }
}
