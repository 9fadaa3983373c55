use super::EditReport;
use crate::error::{NotesError, Result};
use crate::model::{BiologicalAnnotation, SegmentId, Segmentation};

/// Where a copy reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopySource {
    Global,
    /// One or more segments; several sources are combined in order.
    Segments(Vec<SegmentId>),
}

/// Where a copy writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyTarget {
    Global,
    Segments(Vec<SegmentId>),
    /// Every segment except the sources.
    AllOtherSegments,
}

/// A validated copy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
    pub source: CopySource,
    pub target: CopyTarget,
}

impl CopySpec {
    /// Build a copy request from command-line style selectors.
    pub fn from_selectors(
        source_ids: &[SegmentId],
        from_global: bool,
        to_segments: &[SegmentId],
        to_global: bool,
        to_all: bool,
    ) -> Result<Self> {
        let source = match (source_ids.is_empty(), from_global) {
            (false, false) => CopySource::Segments(source_ids.to_vec()),
            (true, true) => CopySource::Global,
            (false, true) => {
                return Err(NotesError::usage(
                    "copy from either segments or the global note, not both",
                ));
            }
            (true, false) => return Err(NotesError::usage("copy needs a source")),
        };

        if !to_segments.is_empty() && to_all {
            return Err(NotesError::usage(
                "--to-segment and --to-all cannot be used together",
            ));
        }
        let target = match (!to_segments.is_empty(), to_global, to_all) {
            (true, false, false) => CopyTarget::Segments(to_segments.to_vec()),
            (false, true, false) => CopyTarget::Global,
            (false, false, true) => CopyTarget::AllOtherSegments,
            (false, false, false) => return Err(NotesError::usage("copy needs a destination")),
            _ => {
                return Err(NotesError::usage(
                    "copy to segments or to the global note, not both",
                ));
            }
        };

        let spec = Self { source, target };
        spec.check()?;
        Ok(spec)
    }

    fn check(&self) -> Result<()> {
        match (&self.source, &self.target) {
            (CopySource::Global, CopyTarget::Global) => Err(NotesError::usage(
                "cannot copy the global note onto itself",
            )),
            (CopySource::Segments(sources), CopyTarget::Segments(targets)) => {
                match targets.iter().find(|id| sources.contains(id)) {
                    Some(id) => Err(NotesError::usage(format!(
                        "segment {id} is both source and destination of the copy"
                    ))),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}

/// Annotation the sources contribute.
///
/// The first source supplying a scalar wins; references are concatenated.
fn gather(doc: &Segmentation, source: &CopySource) -> Result<(BiologicalAnnotation, bool)> {
    match source {
        CopySource::Global => {
            let annotation = BiologicalAnnotation {
                name: doc.name.clone(),
                description: doc.details.clone(),
                external_references: doc.global_external_references.clone(),
                ..BiologicalAnnotation::default()
            };
            Ok((annotation, false))
        }
        CopySource::Segments(ids) => {
            let mut gathered: Option<BiologicalAnnotation> = None;
            for id in ids {
                let annotation = doc
                    .segment(*id)?
                    .biological_annotation
                    .clone()
                    .unwrap_or_default();
                match gathered.as_mut() {
                    None => gathered = Some(annotation),
                    Some(combined) => {
                        if combined.name.is_none() {
                            combined.name = annotation.name;
                        }
                        if combined.description.is_none() {
                            combined.description = annotation.description;
                        }
                        combined
                            .external_references
                            .extend(annotation.external_references);
                    }
                }
            }
            Ok((gathered.unwrap_or_default(), true))
        }
    }
}

/// Copy whole annotations between scopes.
///
/// The destination note is replaced, not merged. Copying to the global note
/// maps the description onto the document details and leaves the software
/// list alone; copying from it keeps each destination's instance count.
pub fn copy_notes(doc: &mut Segmentation, spec: &CopySpec) -> Result<EditReport> {
    spec.check()?;
    if let CopySource::Segments(ids) = &spec.source {
        doc.ensure_segments(ids)?;
    }

    let targets = match &spec.target {
        CopyTarget::Global => Vec::new(),
        CopyTarget::Segments(ids) => {
            doc.ensure_segments(ids)?;
            ids.clone()
        }
        CopyTarget::AllOtherSegments => {
            let sources: &[SegmentId] = match &spec.source {
                CopySource::Segments(ids) => ids.as_slice(),
                CopySource::Global => &[],
            };
            doc.segment_ids()
                .into_iter()
                .filter(|id| !sources.contains(id))
                .collect()
        }
    };

    let (annotation, carries_instances) = gather(doc, &spec.source)?;
    let mut report = EditReport::default();

    if spec.target == CopyTarget::Global {
        doc.name = annotation.name;
        doc.details = annotation.description;
        doc.global_external_references = annotation.external_references;
        report.touched_global = true;
        return Ok(report);
    }

    for id in targets {
        let segment = doc.segment_mut(id)?;
        let mut copied = annotation.clone();
        if !carries_instances {
            copied.number_of_instances = segment
                .biological_annotation
                .as_ref()
                .map_or(copied.number_of_instances, |a| a.number_of_instances);
        }
        segment.biological_annotation = Some(copied);
        report.touch(id);
    }
    log::debug!(
        "Copied {:?} onto segments {:?}",
        spec.source,
        report.touched_segments
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::ModelError;
    use crate::notes::fixtures::document;
    use crate::notes::{ClearSpec, NoteChange, SegmentNote, add_note, clear_notes};
    use crate::resolver::Resolver;

    fn copy(source: &[SegmentId], to: &[SegmentId]) -> CopySpec {
        CopySpec::from_selectors(source, false, to, false, false).unwrap()
    }

    #[test]
    fn test_add_then_copy_scenario() {
        let mut doc = Segmentation::new()
            .with_segment(crate::model::Segment::new(1))
            .with_segment(crate::model::Segment::new(2));
        let change = NoteChange::Segments {
            ids: vec![1],
            note: SegmentNote {
                name: Some("Mito A".into()),
                ..SegmentNote::default()
            },
        };
        add_note(&mut doc, &change, &Resolver::offline()).unwrap();

        copy_notes(&mut doc, &copy(&[1], &[2])).unwrap();

        assert_eq!(doc.segment(2).unwrap().name(), Some("Mito A"));
    }

    #[test]
    fn test_copy_replaces_whole_annotation() {
        let mut doc = document();
        doc.segment_mut(2).unwrap().biological_annotation =
            Some(BiologicalAnnotation::named("old").with_description("stale"));

        let report = copy_notes(&mut doc, &copy(&[1], &[2, 3])).unwrap();

        let source = doc.segment(1).unwrap().biological_annotation.clone();
        assert_eq!(doc.segment(2).unwrap().biological_annotation, source);
        assert_eq!(doc.segment(3).unwrap().biological_annotation, source);
        assert_eq!(report.touched_segments, vec![2, 3]);
    }

    #[test]
    fn test_copy_to_all_skips_source() {
        let mut doc = document();
        let spec = CopySpec::from_selectors(&[1], false, &[], false, true).unwrap();

        let report = copy_notes(&mut doc, &spec).unwrap();

        assert_eq!(report.touched_segments, vec![2, 3]);
        assert_eq!(doc.segment(3).unwrap().name(), Some("ribosome"));
    }

    #[test]
    fn test_copy_segment_to_global() {
        let mut doc = document();
        let spec = CopySpec::from_selectors(&[1], false, &[], true, false).unwrap();

        copy_notes(&mut doc, &spec).unwrap();

        assert_eq!(doc.name.as_deref(), Some("ribosome"));
        assert_eq!(doc.details.as_deref(), Some("large subunit"));
        assert_eq!(doc.global_external_references.len(), 1);
        assert_eq!(doc.global_external_references[0].accession, "GO_0005840");
        assert_eq!(doc.software_list.len(), 1);
    }

    #[test]
    fn test_copy_global_to_segment_keeps_instances() {
        let mut doc = document();
        doc.segment_mut(2).unwrap().annotation_mut().number_of_instances = 6;
        let spec = CopySpec::from_selectors(&[], true, &[2], false, false).unwrap();

        copy_notes(&mut doc, &spec).unwrap();

        let annotation = doc.segment(2).unwrap().biological_annotation.as_ref().unwrap();
        assert_eq!(annotation.name.as_deref(), Some("emd_1014"));
        assert_eq!(annotation.description.as_deref(), Some("Segmented with Segger"));
        assert_eq!(annotation.number_of_instances, 6);
        assert_eq!(annotation.external_references[0].resource, "ncbitaxon");
    }

    #[test]
    fn test_copy_many_sources() {
        let mut doc = document();
        doc.segment_mut(2).unwrap().biological_annotation = Some(
            BiologicalAnnotation::named("second").with_reference(
                crate::model::ExternalReference::new("pdb", "", "4gzw"),
            ),
        );

        copy_notes(&mut doc, &copy(&[1, 2], &[3])).unwrap();

        let annotation = doc.segment(3).unwrap().biological_annotation.as_ref().unwrap();
        assert_eq!(annotation.name.as_deref(), Some("ribosome"));
        let accessions: Vec<_> = annotation
            .external_references
            .iter()
            .map(|r| r.accession.as_str())
            .collect();
        assert_eq!(accessions, ["GO_0005840", "4gzw"]);
    }

    #[test]
    fn test_copy_onto_source_is_rejected() {
        for (source, to) in [(vec![1], vec![1]), (vec![1, 2], vec![3, 2])] {
            let err = CopySpec::from_selectors(&source, false, &to, false, false).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Usage);
        }
        let spec = CopySpec {
            source: CopySource::Segments(vec![2]),
            target: CopyTarget::Segments(vec![2]),
        };
        let mut doc = document();
        assert_eq!(copy_notes(&mut doc, &spec).unwrap_err().kind(), ErrorKind::Usage);
        assert_eq!(doc, document());
    }

    #[test]
    fn test_conflicting_selectors() {
        let cases: [(&[SegmentId], bool, &[SegmentId], bool, bool); 6] = [
            (&[1], false, &[2], false, true),
            (&[1], true, &[2], false, false),
            (&[], false, &[2], false, false),
            (&[1], false, &[], false, false),
            (&[1], false, &[2], true, false),
            (&[], true, &[], true, false),
        ];
        for (source, from_global, to, to_global, to_all) in cases {
            let err = CopySpec::from_selectors(source, from_global, to, to_global, to_all)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Usage);
        }
    }

    #[test]
    fn test_copy_missing_segment() {
        let mut doc = document();
        let err = copy_notes(&mut doc, &copy(&[1], &[2, 42])).unwrap_err();
        assert!(matches!(
            err,
            NotesError::Model(ModelError::SegmentNotFound { id: 42 })
        ));
        assert_eq!(doc, document());
    }

    #[test]
    fn test_copy_clear_copy_matches_single_copy() {
        let mut once = document();
        copy_notes(&mut once, &copy(&[1], &[2])).unwrap();

        let mut twice = document();
        copy_notes(&mut twice, &copy(&[1], &[2])).unwrap();
        clear_notes(&mut twice, &ClearSpec::segments(vec![2])).unwrap();
        copy_notes(&mut twice, &copy(&[1], &[2])).unwrap();

        assert_eq!(once, twice);
    }
}
