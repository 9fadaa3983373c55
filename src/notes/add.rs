use super::{EditReport, NoteChange, resolve_references};
use crate::error::{NotesError, Result};
use crate::model::Segmentation;
use crate::resolver::Resolver;

/// Add notes to the document or to segments.
///
/// Scalar fields overwrite the current value; software entries and external
/// references are appended.
pub fn add_note(
    doc: &mut Segmentation,
    change: &NoteChange,
    resolver: &Resolver,
) -> Result<EditReport> {
    if change.is_empty() {
        return Err(NotesError::MissingPayload { action: "add" });
    }

    let mut report = EditReport::default();
    match change {
        NoteChange::Global(note) => {
            let references = resolve_references(resolver, &note.references, &mut report);

            if let Some(name) = &note.name {
                doc.name = Some(name.clone());
            }
            if let Some(details) = &note.details {
                doc.details = Some(details.clone());
            }
            if !note.software.is_empty() {
                doc.software_list.push(note.software.to_software());
            }
            doc.global_external_references.extend(references);
            report.touched_global = true;
        }
        NoteChange::Segments { ids, note } => {
            NoteChange::check_segment_ids(ids)?;
            note.check_instances()?;
            doc.ensure_segments(ids)?;

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
                annotation
                    .external_references
                    .extend(references.iter().cloned());
                report.touch(*id);
            }
            log::debug!("Added notes to segments {:?}", report.touched_segments);
        }
    }
    Ok(report)
}
