//! Format registry for picking an encoding from a file name.

use std::collections::HashMap;
use std::path::Path;

use crate::format::error::FormatError;
use crate::format::formats::{JsonFormat, SffXmlFormat};
use crate::format::traits::SegmentationFormat;

/// Registry of available segmentation formats.
///
/// All built-in formats are registered on creation.
pub struct FormatRegistry {
    formats: HashMap<&'static str, Box<dyn SegmentationFormat>>,
}

impl FormatRegistry {
    /// Create a new registry with all built-in formats registered.
    pub fn new() -> Self {
        let mut registry = Self {
            formats: HashMap::new(),
        };

        registry.register(Box::new(JsonFormat));
        registry.register(Box::new(SffXmlFormat));

        registry
    }

    /// Register a format implementation.
    pub fn register(&mut self, format: Box<dyn SegmentationFormat>) {
        self.formats.insert(format.id(), format);
    }

    /// Get a format by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn SegmentationFormat> {
        self.formats.get(id).map(|f| f.as_ref())
    }

    /// Find the format handling a file extension (case-insensitive).
    pub fn by_extension(&self, ext: &str) -> Option<&dyn SegmentationFormat> {
        let ext = ext.to_ascii_lowercase();
        self.formats
            .values()
            .find(|f| f.extensions().iter().any(|e| *e == ext))
            .map(|f| f.as_ref())
    }

    /// Find the format for a path from its extension.
    pub fn for_path(&self, path: &Path) -> Result<&dyn SegmentationFormat, FormatError> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.by_extension(e))
            .ok_or_else(|| FormatError::UnsupportedExtension {
                path: path.to_path_buf(),
            })
    }

    /// Get all format IDs, sorted.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.formats.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
