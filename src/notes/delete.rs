use super::{EditReport, NoteChange};
use crate::error::{NotesError, Result};
use crate::model::{
    ListKind, SegmentId, Segmentation, default_instances, ensure_indices, remove_entries,
};

/// Software entries to delete, or fields of them to clear.
///
/// With none of the field flags set the whole entries are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoftwareDeletion {
    pub indices: Vec<usize>,
    pub name: bool,
    pub version: bool,
    pub processing_details: bool,
}

impl SoftwareDeletion {
    fn narrows_fields(&self) -> bool {
        self.name || self.version || self.processing_details
    }

    fn is_empty(&self) -> bool {
        self.indices.is_empty() && !self.narrows_fields()
    }
}

/// Parts of the global note to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalDeletion {
    pub name: bool,
    pub details: bool,
    pub software: SoftwareDeletion,
    pub external_ref_ids: Vec<usize>,
}

/// Parts of segment notes to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentDeletion {
    pub name: bool,
    pub description: bool,
    /// Reset the instance count to 1.
    pub number_of_instances: bool,
    pub external_ref_ids: Vec<usize>,
}

impl SegmentDeletion {
    /// Delete every field, given how many references to drop.
    pub fn everything(reference_count: usize) -> Self {
        Self {
            name: true,
            description: true,
            number_of_instances: true,
            external_ref_ids: (0..reference_count).collect(),
        }
    }

    fn is_empty(&self) -> bool {
        !self.name && !self.description && !self.number_of_instances && self.external_ref_ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteDeletion {
    Global(GlobalDeletion),
    Segments {
        ids: Vec<SegmentId>,
        fields: SegmentDeletion,
    },
}

/// Delete fields, software entries or external references.
///
/// All indices are checked against the lists as they are now; the entries
/// at exactly those positions are removed.
pub fn delete_note(doc: &mut Segmentation, deletion: &NoteDeletion) -> Result<EditReport> {
    let mut report = EditReport::default();
    match deletion {
        NoteDeletion::Global(fields) => {
            if !fields.name
                && !fields.details
                && fields.software.is_empty()
                && fields.external_ref_ids.is_empty()
            {
                return Err(NotesError::MissingPayload { action: "delete" });
            }
            let software = &fields.software;
            if software.narrows_fields() && software.indices.is_empty() {
                return Err(NotesError::usage(
                    "software field flags need the software ids they apply to",
                ));
            }
            ensure_indices(&doc.software_list, &software.indices, ListKind::Software)?;
            ensure_indices(
                &doc.global_external_references,
                &fields.external_ref_ids,
                ListKind::GlobalReferences,
            )?;

            if fields.name {
                doc.name = None;
            }
            if fields.details {
                doc.details = None;
            }
            if software.narrows_fields() {
                for index in &software.indices {
                    let entry = doc.software_mut(*index)?;
                    if software.name {
                        entry.name = None;
                    }
                    if software.version {
                        entry.version = None;
                    }
                    if software.processing_details {
                        entry.processing_details = None;
                    }
                }
            } else {
                remove_entries(&mut doc.software_list, &software.indices, ListKind::Software)?;
            }
            remove_entries(
                &mut doc.global_external_references,
                &fields.external_ref_ids,
                ListKind::GlobalReferences,
            )?;
            report.touched_global = true;
        }
        NoteDeletion::Segments { ids, fields } => {
            if fields.is_empty() {
                return Err(NotesError::MissingPayload { action: "delete" });
            }
            NoteChange::check_segment_ids(ids)?;
            doc.ensure_segments(ids)?;
            for id in ids {
                ensure_indices(
                    doc.segment(*id)?.external_references(),
                    &fields.external_ref_ids,
                    ListKind::SegmentReferences(*id),
                )?;
            }

            for id in ids {
                let annotation = doc.segment_mut(*id)?.annotation_mut();
                if fields.name {
                    annotation.name = None;
                }
                if fields.description {
                    annotation.description = None;
                }
                if fields.number_of_instances {
                    annotation.number_of_instances = default_instances();
                }
                let removed = remove_entries(
                    &mut annotation.external_references,
                    &fields.external_ref_ids,
                    ListKind::SegmentReferences(*id),
                )?;
                log::debug!("Segment {}: removed {} reference(s)", id, removed.len());
                report.touch(*id);
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{BiologicalAnnotation, ExternalReference, ModelError, Software};
    use crate::notes::fixtures::document;

    #[test]
    fn test_delete_everything_yields_default_note() {
        let mut doc = document();
        let count = doc.segment(1).unwrap().external_references().len();
        doc.segment_mut(1).unwrap().annotation_mut().number_of_instances = 5;

        let deletion = NoteDeletion::Segments {
            ids: vec![1],
            fields: SegmentDeletion::everything(count),
        };
        delete_note(&mut doc, &deletion).unwrap();

        assert_eq!(
            doc.segment(1).unwrap().biological_annotation,
            Some(BiologicalAnnotation::default())
        );
    }

    #[test]
    fn test_delete_references_by_position() {
        let mut doc = document();
        {
            let annotation = doc.segment_mut(1).unwrap().annotation_mut();
            for accession in ["a", "b", "c"] {
                annotation
                    .external_references
                    .push(ExternalReference::new("go", "", accession));
            }
        }

        let deletion = NoteDeletion::Segments {
            ids: vec![1],
            fields: SegmentDeletion {
                external_ref_ids: vec![1, 3],
                ..SegmentDeletion::default()
            },
        };
        delete_note(&mut doc, &deletion).unwrap();

        let accessions: Vec<_> = doc
            .segment(1)
            .unwrap()
            .external_references()
            .iter()
            .map(|r| r.accession.as_str())
            .collect();
        assert_eq!(accessions, ["GO_0005840", "b"]);
    }

    #[test]
    fn test_delete_bad_index_changes_nothing() {
        let mut doc = document();
        let deletion = NoteDeletion::Segments {
            ids: vec![1],
            fields: SegmentDeletion {
                name: true,
                external_ref_ids: vec![0, 4],
                ..SegmentDeletion::default()
            },
        };

        let err = delete_note(&mut doc, &deletion).unwrap_err();

        assert!(matches!(
            err,
            NotesError::Model(ModelError::IndexOutOfRange { index: 4, .. })
        ));
        assert_eq!(doc, document());
    }

    #[test]
    fn test_delete_global() {
        let mut doc = document();
        doc.software_list.push(Software::new("IMOD", "4.11", "manual"));
        doc.global_external_references
            .push(ExternalReference::new("pdb", "", "4gzw"));

        let deletion = NoteDeletion::Global(GlobalDeletion {
            details: true,
            software: SoftwareDeletion {
                indices: vec![1],
                ..SoftwareDeletion::default()
            },
            external_ref_ids: vec![0, 1],
            ..GlobalDeletion::default()
        });
        let report = delete_note(&mut doc, &deletion).unwrap();

        assert!(report.touched_global);
        assert_eq!(doc.details, None);
        assert_eq!(doc.name.as_deref(), Some("emd_1014"));
        assert_eq!(doc.software_list.len(), 1);
        assert_eq!(doc.software_list[0].name.as_deref(), Some("Segger"));
        assert!(doc.global_external_references.is_empty());
    }

    #[test]
    fn test_delete_software_fields_only() {
        let mut doc = document();
        let deletion = NoteDeletion::Global(GlobalDeletion {
            software: SoftwareDeletion {
                indices: vec![0],
                version: true,
                processing_details: true,
                ..SoftwareDeletion::default()
            },
            ..GlobalDeletion::default()
        });
        delete_note(&mut doc, &deletion).unwrap();

        assert_eq!(doc.software_list.len(), 1);
        assert_eq!(doc.software_list[0].name.as_deref(), Some("Segger"));
        assert_eq!(doc.software_list[0].version, None);
        assert_eq!(doc.software_list[0].processing_details, None);
    }

    #[test]
    fn test_delete_usage_errors() {
        let mut doc = document();
        let cases = [
            NoteDeletion::Global(GlobalDeletion::default()),
            NoteDeletion::Segments {
                ids: vec![1],
                fields: SegmentDeletion::default(),
            },
            NoteDeletion::Global(GlobalDeletion {
                software: SoftwareDeletion {
                    name: true,
                    ..SoftwareDeletion::default()
                },
                ..GlobalDeletion::default()
            }),
        ];
        for deletion in cases {
            let err = delete_note(&mut doc, &deletion).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Usage, "{deletion:?}");
        }
        assert_eq!(doc, document());
    }
}
