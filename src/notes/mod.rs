//! Note editors.
//!
//! Each editor takes a loaded [`Segmentation`](crate::model::Segmentation)
//! and a validated selector, checks every addressed segment and index
//! first, and only then mutates the document. Callers persist the result
//! through [`Staging`](crate::staging::Staging), which writes nothing when
//! an editor fails.
//!
//! External references are resolved one by one, in the order given. A
//! failed lookup keeps the reference unresolved and adds a warning to the
//! returned [`EditReport`].

mod add;
mod clear;
mod copy;
mod delete;
mod edit;
mod merge;
mod payload;

pub use add::add_note;
pub use clear::{ClearSpec, clear_notes};
pub use copy::{CopySource, CopySpec, CopyTarget, copy_notes};
pub use delete::{GlobalDeletion, NoteDeletion, SegmentDeletion, SoftwareDeletion, delete_note};
pub use edit::{NoteEdit, edit_note};
pub use merge::{MergeOutcome, merge_notes};
pub use payload::{
    GlobalNote, NoteChange, ReferenceSpec, SegmentNote, SoftwareFields, parse_id_list,
    parse_index_list,
};

use crate::model::{ExternalReference, SegmentId};
use crate::resolver::Resolver;

/// Outcome of an editor that succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditReport {
    /// Non-fatal problems, such as lookups that could not be completed.
    pub warnings: Vec<String>,
    /// Segments whose note changed, in the order they were processed.
    pub touched_segments: Vec<SegmentId>,
    /// Whether the global note changed.
    pub touched_global: bool,
}

impl EditReport {
    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    fn touch(&mut self, id: SegmentId) {
        if !self.touched_segments.contains(&id) {
            self.touched_segments.push(id);
        }
    }
}

/// Resolve `specs` in order. Failed lookups leave the reference unresolved.
fn resolve_references(
    resolver: &Resolver,
    specs: &[ReferenceSpec],
    report: &mut EditReport,
) -> Vec<ExternalReference> {
    specs
        .iter()
        .map(|spec| {
            let mut reference = spec.to_reference();
            if let Err(e) = resolver.annotate(&mut reference) {
                report.warn(format!("{e}; keeping reference without label"));
            }
            reference
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::{BiologicalAnnotation, ExternalReference, Segment, Segmentation, Software};
    use crate::resolver::Resolver;
    use crate::resolver::testing::CannedClient;

    pub const EMDB_BODY: &str = r#"{"response": {"numFound": 1, "docs": [{"emdb_id": "EMD-8654", "title": "Zika virus-infected Vero E6 cell at 48 hpi"}]}}"#;

    /// Segments 1, 2 and 3; segment 1 annotated, plus a software entry and
    /// one global reference.
    pub fn document() -> Segmentation {
        let mut doc = Segmentation::new()
            .with_segment(Segment::new(1).with_annotation(
                BiologicalAnnotation::named("ribosome")
                    .with_description("large subunit")
                    .with_reference(ExternalReference::new(
                        "go",
                        "http://purl.obolibrary.org/obo/GO_0005840",
                        "GO_0005840",
                    )),
            ))
            .with_segment(Segment::new(2))
            .with_segment(Segment::new(3));
        doc.name = Some("emd_1014".into());
        doc.details = Some("Segmented with Segger".into());
        doc.software_list.push(Software::new("Segger", "1.9", "threshold 0.5"));
        doc.global_external_references.push(ExternalReference::new(
            "ncbitaxon",
            "http://purl.obolibrary.org/obo/NCBITaxon_559292",
            "NCBITaxon_559292",
        ));
        doc
    }

    /// Resolver that answers EMDB queries and fails everything else.
    pub fn emdb_resolver() -> Resolver {
        Resolver::new(Box::new(CannedClient::new().ok("emdb/api/search", EMDB_BODY)))
    }
}
