use super::EditReport;
use crate::error::{NotesError, Result};
use crate::model::{BiologicalAnnotation, SegmentId, Segmentation};

/// Which notes to clear, and how much of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearSpec {
    pub segment_ids: Vec<SegmentId>,
    pub all_segments: bool,
    pub global: bool,
    /// Reset whole annotations instead of only their external references.
    pub whole_annotation: bool,
}

impl ClearSpec {
    /// Clear the external references of `ids`.
    pub fn segments(ids: Vec<SegmentId>) -> Self {
        Self {
            segment_ids: ids,
            ..Self::default()
        }
    }

    /// Build from command-line style selectors; `all` implies every segment
    /// and the global note.
    pub fn from_selectors(
        segment_ids: &[SegmentId],
        from_all_segments: bool,
        from_global: bool,
        all: bool,
        whole_annotation: bool,
    ) -> Result<Self> {
        let spec = Self {
            segment_ids: segment_ids.to_vec(),
            all_segments: from_all_segments || all,
            global: from_global || all,
            whole_annotation,
        };
        if spec.segment_ids.is_empty() && !spec.all_segments && !spec.global {
            return Err(NotesError::MissingPayload { action: "clear" });
        }
        Ok(spec)
    }
}

/// Remove external references, or whole annotations, from the selected scopes.
pub fn clear_notes(doc: &mut Segmentation, spec: &ClearSpec) -> Result<EditReport> {
    let targets = if spec.all_segments {
        doc.segment_ids()
    } else {
        doc.ensure_segments(&spec.segment_ids)?;
        spec.segment_ids.clone()
    };
    if targets.is_empty() && !spec.global && !spec.all_segments {
        return Err(NotesError::MissingPayload { action: "clear" });
    }

    let mut report = EditReport::default();
    for id in targets {
        let segment = doc.segment_mut(id)?;
        if spec.whole_annotation {
            if segment.biological_annotation.is_some() {
                segment.biological_annotation = Some(BiologicalAnnotation::default());
            }
        } else if let Some(annotation) = segment.biological_annotation.as_mut() {
            annotation.external_references.clear();
        }
        report.touch(id);
    }

    if spec.global {
        doc.global_external_references.clear();
        if spec.whole_annotation {
            doc.name = None;
            doc.details = None;
            doc.software_list.clear();
        }
        report.touched_global = true;
    }
    log::debug!(
        "Cleared notes of {} segment(s){}",
        report.touched_segments.len(),
        if report.touched_global { " and the global note" } else { "" }
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{ExternalReference, ModelError};
    use crate::notes::fixtures::document;

    #[test]
    fn test_clear_segment_references_only() {
        let mut doc = document();
        clear_notes(&mut doc, &ClearSpec::segments(vec![1])).unwrap();

        let segment = doc.segment(1).unwrap();
        assert!(segment.external_references().is_empty());
        assert_eq!(segment.name(), Some("ribosome"));
        assert_eq!(doc.global_external_references.len(), 1);
    }

    #[test]
    fn test_clear_all() {
        let mut doc = document();
        doc.segment_mut(3)
            .unwrap()
            .annotation_mut()
            .external_references
            .push(ExternalReference::new("pdb", "", "4gzw"));
        let spec = ClearSpec::from_selectors(&[], false, false, true, false).unwrap();

        let report = clear_notes(&mut doc, &spec).unwrap();

        assert_eq!(report.touched_segments, vec![1, 2, 3]);
        assert!(report.touched_global);
        assert!(doc.segments.iter().all(|s| s.external_references().is_empty()));
        assert!(doc.global_external_references.is_empty());
        assert_eq!(doc.name.as_deref(), Some("emd_1014"));
        assert_eq!(doc.segment(2).unwrap().biological_annotation, None);
    }

    #[test]
    fn test_clear_whole_annotation() {
        let mut doc = document();
        let spec = ClearSpec::from_selectors(&[1], false, true, false, true).unwrap();

        clear_notes(&mut doc, &spec).unwrap();

        assert_eq!(
            doc.segment(1).unwrap().biological_annotation,
            Some(BiologicalAnnotation::default())
        );
        assert_eq!(doc.name, None);
        assert_eq!(doc.details, None);
        assert!(doc.software_list.is_empty());
        assert!(doc.global_external_references.is_empty());
    }

    #[test]
    fn test_clear_needs_a_scope() {
        let err = ClearSpec::from_selectors(&[], false, false, false, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);

        let mut doc = document();
        let err = clear_notes(&mut doc, &ClearSpec::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_clear_missing_segment() {
        let mut doc = document();
        let err = clear_notes(&mut doc, &ClearSpec::segments(vec![1, 8])).unwrap_err();
        assert!(matches!(
            err,
            NotesError::Model(ModelError::SegmentNotFound { id: 8 })
        ));
        assert_eq!(doc, document());
    }
}
