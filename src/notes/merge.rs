use crate::model::{BiologicalAnnotation, SegmentId, Segmentation, default_instances};

/// Result of merging notes from one document into another.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The other document carrying the merged notes.
    pub document: Segmentation,
    /// Segments that received notes from the source.
    pub merged_segments: Vec<SegmentId>,
    /// Annotated source segments with no counterpart in the other document.
    pub unmatched_segments: Vec<SegmentId>,
}

fn overwrite(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
        *target = Some(value.clone());
    }
}

fn merge_annotation(target: &mut BiologicalAnnotation, source: &BiologicalAnnotation) {
    overwrite(&mut target.name, &source.name);
    overwrite(&mut target.description, &source.description);
    if source.number_of_instances != default_instances() {
        target.number_of_instances = source.number_of_instances;
    }
    if !source.external_references.is_empty() {
        target.external_references = source.external_references.clone();
    }
}

/// Merge the notes of `source` into a copy of `other`.
///
/// Segments are matched by id. Wherever the source has a non-empty value it
/// replaces the other document's value; everything else in `other` is kept.
/// Neither input is modified.
pub fn merge_notes(source: &Segmentation, other: &Segmentation) -> MergeOutcome {
    let mut document = other.clone();

    overwrite(&mut document.name, &source.name);
    overwrite(&mut document.details, &source.details);
    if !source.software_list.is_empty() {
        document.software_list = source.software_list.clone();
    }
    if !source.global_external_references.is_empty() {
        document.global_external_references = source.global_external_references.clone();
    }

    let mut merged_segments = Vec::new();
    let mut unmatched_segments = Vec::new();
    for segment in &source.segments {
        let Some(annotation) = segment.biological_annotation.as_ref() else {
            continue;
        };
        match document.segment_mut(segment.id) {
            Ok(target) => {
                merge_annotation(target.annotation_mut(), annotation);
                merged_segments.push(segment.id);
            }
            Err(_) => unmatched_segments.push(segment.id),
        }
    }

    if !unmatched_segments.is_empty() {
        log::warn!(
            "Source segments {:?} have no counterpart; their notes were not merged",
            unmatched_segments
        );
    }
    log::info!("Merged notes of {} segment(s)", merged_segments.len());

    MergeOutcome {
        document,
        merged_segments,
        unmatched_segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExternalReference, Segment, Software};
    use crate::notes::fixtures::document;

    fn bare() -> Segmentation {
        let mut doc = Segmentation::new()
            .with_segment(Segment::new(1))
            .with_segment(Segment::new(2))
            .with_segment(Segment::new(3))
            .with_segment(Segment::new(4));
        doc.name = Some("unannotated".into());
        doc
    }

    #[test]
    fn test_merge_into_empty_document() {
        let source = document();
        let other = bare();

        let outcome = merge_notes(&source, &other);

        assert_eq!(outcome.merged_segments, vec![1]);
        assert!(outcome.unmatched_segments.is_empty());
        let merged = &outcome.document;
        assert_eq!(merged.name.as_deref(), Some("emd_1014"));
        assert_eq!(merged.details.as_deref(), Some("Segmented with Segger"));
        assert_eq!(merged.software_list, source.software_list);
        assert_eq!(
            merged.global_external_references,
            source.global_external_references
        );
        assert_eq!(
            merged.segment(1).unwrap().biological_annotation,
            source.segment(1).unwrap().biological_annotation
        );
        assert_eq!(merged.segment(4).unwrap().biological_annotation, None);
        assert_eq!(other, bare());
    }

    #[test]
    fn test_source_wins_on_conflict() {
        let source = document();
        let mut other = bare();
        other.software_list.push(Software::new("IMOD", "4.11", "manual"));
        other.segment_mut(1).unwrap().biological_annotation = Some(
            BiologicalAnnotation::named("other name")
                .with_reference(ExternalReference::new("pdb", "", "4gzw")),
        );
        other.segment_mut(1).unwrap().annotation_mut().number_of_instances = 3;

        let outcome = merge_notes(&source, &other);

        let annotation = outcome
            .document
            .segment(1)
            .unwrap()
            .biological_annotation
            .clone()
            .unwrap();
        assert_eq!(annotation.name.as_deref(), Some("ribosome"));
        assert_eq!(annotation.number_of_instances, 3);
        assert_eq!(annotation.external_references[0].accession, "GO_0005840");
        assert_eq!(outcome.document.software_list[0].name.as_deref(), Some("Segger"));
    }

    #[test]
    fn test_empty_source_values_keep_destination() {
        let mut source = document();
        source.name = None;
        source.details = Some(String::new());
        source.global_external_references.clear();
        let mut other = bare();
        other.details = Some("kept".into());
        other
            .global_external_references
            .push(ExternalReference::new("emdb", "", "EMD-1014"));

        let outcome = merge_notes(&source, &other);

        assert_eq!(outcome.document.name.as_deref(), Some("unannotated"));
        assert_eq!(outcome.document.details.as_deref(), Some("kept"));
        assert_eq!(outcome.document.global_external_references.len(), 1);
    }

    #[test]
    fn test_unmatched_segments_are_reported() {
        let source = document().with_segment(
            Segment::new(9).with_annotation(BiologicalAnnotation::named("orphan")),
        );
        let outcome = merge_notes(&source, &bare());

        assert_eq!(outcome.unmatched_segments, vec![9]);
        assert!(outcome.document.segment(9).is_err());
    }
}
