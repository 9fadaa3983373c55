use super::{EditReport, NoteChange, resolve_references};
use crate::error::{NotesError, Result};
use crate::model::{ListKind, Segmentation, entry_at, replace_and_insert};
use crate::resolver::Resolver;

/// An edit: the new values plus the list positions they replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEdit {
    pub change: NoteChange,
    /// Software entry whose supplied fields are replaced (global only).
    pub software_id: Option<usize>,
    /// External reference replaced by the first supplied reference; the
    /// rest are inserted right after it.
    pub external_ref_id: Option<usize>,
}

impl NoteEdit {
    fn check(&self) -> Result<()> {
        if self.change.is_empty() {
            return Err(NotesError::MissingPayload { action: "edit" });
        }

        match (self.external_ref_id, self.change.references().is_empty()) {
            (None, false) => {
                return Err(NotesError::usage(
                    "replacing external references needs an external reference id; use add to append",
                ));
            }
            (Some(_), true) => {
                return Err(NotesError::usage(
                    "an external reference id was given without any external reference",
                ));
            }
            _ => {}
        }

        match &self.change {
            NoteChange::Global(note) => match (self.software_id, note.software.is_empty()) {
                (None, false) => Err(NotesError::usage(
                    "editing software fields needs a software id; use add to append",
                )),
                (Some(_), true) => Err(NotesError::usage(
                    "a software id was given without any software field",
                )),
                _ => Ok(()),
            },
            NoteChange::Segments { ids, note } => {
                if self.software_id.is_some() {
                    return Err(NotesError::usage("segments have no software entries"));
                }
                NoteChange::check_segment_ids(ids)?;
                note.check_instances()
            }
        }
    }
}

/// Replace fields of the global note or of segment notes.
///
/// Every addressed segment and index is checked before anything changes.
pub fn edit_note(doc: &mut Segmentation, edit: &NoteEdit, resolver: &Resolver) -> Result<EditReport> {
    edit.check()?;

    let mut report = EditReport::default();
    match &edit.change {
        NoteChange::Global(note) => {
            if let Some(index) = edit.software_id {
                doc.software(index)?;
            }
            if let Some(index) = edit.external_ref_id {
                entry_at(
                    &doc.global_external_references,
                    index,
                    ListKind::GlobalReferences,
                )?;
            }

            let references = resolve_references(resolver, &note.references, &mut report);

            if let Some(name) = &note.name {
                doc.name = Some(name.clone());
            }
            if let Some(details) = &note.details {
                doc.details = Some(details.clone());
            }
            if let Some(index) = edit.software_id {
                note.software.apply_to(doc.software_mut(index)?);
            }
            if let Some(index) = edit.external_ref_id {
                replace_and_insert(
                    &mut doc.global_external_references,
                    index,
                    references,
                    ListKind::GlobalReferences,
                )?;
            }
            report.touched_global = true;
        }
        NoteChange::Segments { ids, note } => {
            doc.ensure_segments(ids)?;
            if let Some(index) = edit.external_ref_id {
                for id in ids {
                    let segment = doc.segment(*id)?;
                    entry_at(
                        segment.external_references(),
                        index,
                        ListKind::SegmentReferences(*id),
                    )?;
                }
            }

            let references = resolve_references(resolver, &note.references, &mut report);

            for id in ids {
                let annotation = doc.segment_mut(*id)?.annotation_mut();
                if let Some(name) = &note.name {
                    annotation.name = Some(name.clone());
                }
                if let Some(description) = &note.description {
                    annotation.description = Some(description.clone());
                }
                if let Some(count) = note.number_of_instances {
                    annotation.number_of_instances = count;
                }
                if let Some(index) = edit.external_ref_id {
                    replace_and_insert(
                        &mut annotation.external_references,
                        index,
                        references.clone(),
                        ListKind::SegmentReferences(*id),
                    )?;
                }
                report.touch(*id);
            }
            log::debug!("Edited notes of segments {:?}", report.touched_segments);
        }
    }
    Ok(report)
}
