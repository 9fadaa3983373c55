//! JSON encoding of segmentation documents.

use crate::format::error::FormatError;
use crate::format::formats::check_document;
use crate::format::traits::SegmentationFormat;
use crate::model::Segmentation;

/// Pretty-printed JSON.
///
/// Everything outside the annotation model is kept in the document's
/// `extra` maps and written back unchanged.
pub struct JsonFormat;

impl SegmentationFormat for JsonFormat {
    fn id(&self) -> &'static str {
        "json"
    }

    fn display_name(&self) -> &'static str {
        "Segmentation (JSON)"
    }

    fn extensions(&self) -> &[&'static str] {
        &["json"]
    }

    fn export_to_bytes(&self, doc: &Segmentation) -> Result<Vec<u8>, FormatError> {
        let mut json = serde_json::to_string_pretty(doc)?;
        json.push('\n');
        Ok(json.into_bytes())
    }

    fn import_from_bytes(&self, bytes: &[u8]) -> Result<Segmentation, FormatError> {
        let doc: Segmentation = serde_json::from_slice(bytes)?;
        check_document(&doc)?;

        log::debug!(
            "Read JSON document with {} segments (format version {})",
            doc.segments.len(),
            doc.version
        );
        Ok(doc)
    }
}
