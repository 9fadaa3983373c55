//! Segmentation format implementations.

mod json;
mod sff_xml;

#[cfg(test)]
mod tests;

pub use json::JsonFormat;
pub use sff_xml::SffXmlFormat;

use crate::format::error::FormatError;
use crate::model::Segmentation;

/// Reject documents this build cannot read and warn on minor version drift.
pub(crate) fn check_document(doc: &Segmentation) -> Result<(), FormatError> {
    if !Segmentation::is_version_readable(&doc.version) {
        return Err(FormatError::VersionMismatch {
            expected: Segmentation::CURRENT_VERSION.to_string(),
            found: doc.version.clone(),
        });
    }

    if !Segmentation::is_version_compatible(&doc.version) {
        log::warn!(
            "Document version {} may not be fully compatible with current version {}",
            doc.version,
            Segmentation::CURRENT_VERSION
        );
    }

    doc.validate()?;
    Ok(())
}
