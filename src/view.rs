//! Read-only projections of a document for `list` and `show`.

use std::fmt;

use serde::Serialize;

use crate::model::{
    BiologicalAnnotation, Colour, ExternalReference, ModelError, Segment, SegmentId, Segmentation,
    Software,
};

/// Options for [`list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Order by segment name instead of id; unnamed segments go last.
    pub sort_by_name: bool,
    pub reverse: bool,
    /// Only report segment ids.
    pub ids_only: bool,
}

/// One line of a segment listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub id: SegmentId,
    pub parent_id: SegmentId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub number_of_instances: u32,
    pub external_reference_count: usize,
    pub colour: Option<Colour>,
}

impl SegmentSummary {
    fn of(segment: &Segment) -> Self {
        let annotation = segment.biological_annotation.clone().unwrap_or_default();
        Self {
            id: segment.id,
            parent_id: segment.parent_id,
            name: annotation.name,
            description: annotation.description,
            number_of_instances: annotation.number_of_instances,
            external_reference_count: annotation.external_references.len(),
            colour: segment.colour,
        }
    }
}

/// Document header shown above a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSummary {
    pub name: Option<String>,
    pub version: String,
    pub details: Option<String>,
    pub software_list: Vec<Software>,
    pub external_references: Vec<ExternalReference>,
    pub segment_count: usize,
    pub annotated_segment_count: usize,
}

impl GlobalSummary {
    pub fn of(doc: &Segmentation) -> Self {
        Self {
            name: doc.name.clone(),
            version: doc.version.clone(),
            details: doc.details.clone(),
            software_list: doc.software_list.clone(),
            external_references: doc.global_external_references.clone(),
            segment_count: doc.segments.len(),
            annotated_segment_count: doc.annotated_segment_count(),
        }
    }
}

/// Result of [`list`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SegmentListing {
    Ids(Vec<SegmentId>),
    Summaries {
        global: GlobalSummary,
        segments: Vec<SegmentSummary>,
    },
}

/// Full annotation of one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentDetail {
    pub id: SegmentId,
    pub parent_id: SegmentId,
    pub colour: Option<Colour>,
    pub annotation: BiologicalAnnotation,
}

/// Summaries of all segments, ordered per `options`.
pub fn list(doc: &Segmentation, options: ListOptions) -> SegmentListing {
    let mut segments: Vec<SegmentSummary> = doc.segments.iter().map(SegmentSummary::of).collect();

    if options.sort_by_name {
        segments.sort_by(|a, b| {
            let key = |s: &SegmentSummary| (s.name.is_none(), s.name.clone(), s.id);
            key(a).cmp(&key(b))
        });
    } else {
        segments.sort_by_key(|s| s.id);
    }
    if options.reverse {
        segments.reverse();
    }

    if options.ids_only {
        return SegmentListing::Ids(segments.into_iter().map(|s| s.id).collect());
    }
    SegmentListing::Summaries {
        global: GlobalSummary::of(doc),
        segments,
    }
}

/// Annotation details of `ids`, in the order given.
pub fn show(doc: &Segmentation, ids: &[SegmentId]) -> Result<Vec<SegmentDetail>, ModelError> {
    ids.iter()
        .map(|id| {
            let segment = doc.segment(*id)?;
            Ok(SegmentDetail {
                id: segment.id,
                parent_id: segment.parent_id,
                colour: segment.colour,
                annotation: segment.biological_annotation.clone().unwrap_or_default(),
            })
        })
        .collect()
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn write_reference(f: &mut fmt::Formatter<'_>, index: usize, r: &ExternalReference) -> fmt::Result {
    write!(f, "    {index}: {} {} {}", r.resource, r.url, r.accession)?;
    if let Some(label) = &r.label {
        write!(f, " [{label}]")?;
    }
    if let Some(description) = &r.description {
        write!(f, " {description}")?;
    }
    writeln!(f)
}

impl fmt::Display for GlobalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", or_dash(&self.name))?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Details: {}", or_dash(&self.details))?;
        writeln!(f, "Software:")?;
        for (index, software) in self.software_list.iter().enumerate() {
            writeln!(
                f,
                "    {index}: {} {} ({})",
                or_dash(&software.name),
                or_dash(&software.version),
                or_dash(&software.processing_details)
            )?;
        }
        writeln!(f, "External references:")?;
        for (index, reference) in self.external_references.iter().enumerate() {
            write_reference(f, index, reference)?;
        }
        write!(
            f,
            "Segments: {} ({} annotated)",
            self.segment_count, self.annotated_segment_count
        )
    }
}

impl fmt::Display for SegmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{} ref(s)",
            self.id,
            self.parent_id,
            or_dash(&self.name),
            self.number_of_instances,
            self.external_reference_count
        )
    }
}

impl fmt::Display for SegmentListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentListing::Ids(ids) => {
                for id in ids {
                    writeln!(f, "{id}")?;
                }
                Ok(())
            }
            SegmentListing::Summaries { global, segments } => {
                writeln!(f, "{global}")?;
                writeln!(f, "id\tparent\tname\tinstances\treferences")?;
                for segment in segments {
                    writeln!(f, "{segment}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SegmentDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Segment {} (parent {})", self.id, self.parent_id)?;
        writeln!(f, "  Name: {}", or_dash(&self.annotation.name))?;
        writeln!(f, "  Description: {}", or_dash(&self.annotation.description))?;
        writeln!(f, "  Instances: {}", self.annotation.number_of_instances)?;
        if let Some(colour) = &self.colour {
            writeln!(
                f,
                "  Colour: ({:.3}, {:.3}, {:.3}, {:.3})",
                colour.red, colour.green, colour.blue, colour.alpha
            )?;
        }
        writeln!(f, "  External references:")?;
        for (index, reference) in self.annotation.external_references.iter().enumerate() {
            write_reference(f, index, reference)?;
        }
        Ok(())
    }
}
