//! The segmentation document and its segments.
//!
//! # Versioning
//!
//! Documents carry a semantic version string (MAJOR.MINOR.PATCH). Any file
//! with the same major version can be read; a different minor version is
//! read with a warning.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::annotation::{BiologicalAnnotation, ExternalReference, Software};

/// Identifier of a segment, unique within one document.
pub type SegmentId = u32;

/// Errors raised when addressing parts of a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// No segment carries the given id.
    #[error("segment {id} not found")]
    SegmentNotFound {
        /// The requested id
        id: SegmentId,
    },

    /// Positional index past the end of a list.
    #[error("index {index} out of range for {list} (length {len})")]
    IndexOutOfRange {
        /// Which list was addressed
        list: ListKind,
        /// The requested index
        index: usize,
        /// Current length of the list
        len: usize,
    },

    /// Two segments share an id.
    #[error("duplicate segment id {id}")]
    DuplicateSegmentId {
        /// The repeated id
        id: SegmentId,
    },

    /// An annotation claims zero instances.
    #[error("number of instances must be at least 1 (segment {id})")]
    ZeroInstances {
        /// Segment holding the bad count
        id: SegmentId,
    },
}

/// Names the list an index refers to, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// The document's software list.
    Software,
    /// The document-level external references.
    GlobalReferences,
    /// External references of one segment.
    SegmentReferences(SegmentId),
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKind::Software => write!(f, "software list"),
            ListKind::GlobalReferences => write!(f, "global external references"),
            ListKind::SegmentReferences(id) => {
                write!(f, "external references of segment {}", id)
            }
        }
    }
}

/// RGBA colour of a segment, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    #[serde(default = "opaque")]
    pub alpha: f32,
}

fn opaque() -> f32 {
    1.0
}

/// A labelled region of the segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique identifier.
    pub id: SegmentId,
    /// Id of the parent segment, `0` for top-level segments.
    #[serde(default)]
    pub parent_id: SegmentId,
    /// Annotation payload, absent until the segment is first annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biological_annotation: Option<BiologicalAnnotation>,
    /// Display colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<Colour>,
    /// Geometry and any other content this tool does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Segment {
    /// Create an unannotated top-level segment.
    pub fn new(id: SegmentId) -> Self {
        Self {
            id,
            parent_id: 0,
            biological_annotation: None,
            colour: None,
            extra: BTreeMap::new(),
        }
    }

    /// Set the annotation payload.
    pub fn with_annotation(mut self, annotation: BiologicalAnnotation) -> Self {
        self.biological_annotation = Some(annotation);
        self
    }

    /// Set the colour.
    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = Some(colour);
        self
    }

    /// Annotation payload, created with defaults if missing.
    pub fn annotation_mut(&mut self) -> &mut BiologicalAnnotation {
        self.biological_annotation.get_or_insert_with(Default::default)
    }

    /// External references of this segment, empty if unannotated.
    pub fn external_references(&self) -> &[ExternalReference] {
        self.biological_annotation
            .as_ref()
            .map(|a| a.external_references.as_slice())
            .unwrap_or(&[])
    }

    /// Segment name, if annotated.
    pub fn name(&self) -> Option<&str> {
        self.biological_annotation
            .as_ref()
            .and_then(|a| a.name.as_deref())
    }
}

/// A segmentation document: header metadata plus segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Format version of the document.
    pub version: String,

    /// Document name.
    #[serde(default)]
    pub name: Option<String>,

    /// Free text details about the whole segmentation.
    #[serde(default)]
    pub details: Option<String>,

    /// Software used to produce the segmentation.
    #[serde(default)]
    pub software_list: Vec<Software>,

    /// References that apply to the whole document.
    #[serde(default)]
    pub global_external_references: Vec<ExternalReference>,

    /// Segments in document order.
    #[serde(default)]
    pub segments: Vec<Segment>,

    /// Header content this tool does not interpret (primary descriptor,
    /// transforms, lattices...). Preserved across load and save.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Segmentation {
    /// Current version of the document format.
    pub const CURRENT_VERSION: &'static str = "0.8.0";

    /// Major version number for compatibility checking.
    pub const VERSION_MAJOR: u32 = 0;

    /// Minor version number.
    pub const VERSION_MINOR: u32 = 8;

    /// Create an empty document at the current version.
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            name: None,
            details: None,
            software_list: Vec::new(),
            global_external_references: Vec::new(),
            segments: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Append a segment.
    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Parse a version string into (major, minor, patch) components.
    pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() != 3 {
            return None;
        }
        let major = parts[0].parse().ok()?;
        let minor = parts[1].parse().ok()?;
        let patch = parts[2].parse().ok()?;
        Some((major, minor, patch))
    }

    /// Same major and minor version as the current format.
    pub fn is_version_compatible(file_version: &str) -> bool {
        matches!(
            Self::parse_version(file_version),
            Some((major, minor, _)) if major == Self::VERSION_MAJOR && minor == Self::VERSION_MINOR
        )
    }

    /// Same major version; may need a warning.
    pub fn is_version_readable(file_version: &str) -> bool {
        matches!(
            Self::parse_version(file_version),
            Some((major, _, _)) if major == Self::VERSION_MAJOR
        )
    }

    /// Check structural invariants: unique segment ids, instance counts >= 1.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for segment in &self.segments {
            if !seen.insert(segment.id) {
                return Err(ModelError::DuplicateSegmentId { id: segment.id });
            }
            let zero = segment
                .biological_annotation
                .as_ref()
                .is_some_and(|a| a.number_of_instances == 0);
            if zero {
                return Err(ModelError::ZeroInstances { id: segment.id });
            }
        }
        Ok(())
    }

    /// Look up a segment by id.
    pub fn segment(&self, id: SegmentId) -> Result<&Segment, ModelError> {
        self.segments
            .iter()
            .find(|s| s.id == id)
            .ok_or(ModelError::SegmentNotFound { id })
    }

    /// Look up a segment by id for mutation.
    pub fn segment_mut(&mut self, id: SegmentId) -> Result<&mut Segment, ModelError> {
        self.segments
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ModelError::SegmentNotFound { id })
    }

    /// Fail with the first id that is not present.
    pub fn ensure_segments(&self, ids: &[SegmentId]) -> Result<(), ModelError> {
        ids.iter().try_for_each(|id| self.segment(*id).map(|_| ()))
    }

    /// Ids of all segments in document order.
    pub fn segment_ids(&self) -> Vec<SegmentId> {
        self.segments.iter().map(|s| s.id).collect()
    }

    /// Software entry at `index`.
    pub fn software(&self, index: usize) -> Result<&Software, ModelError> {
        entry_at(&self.software_list, index, ListKind::Software)
    }

    /// Software entry at `index`, for mutation.
    pub fn software_mut(&mut self, index: usize) -> Result<&mut Software, ModelError> {
        let len = self.software_list.len();
        self.software_list
            .get_mut(index)
            .ok_or(ModelError::IndexOutOfRange {
                list: ListKind::Software,
                index,
                len,
            })
    }

    /// Number of segments carrying a non-empty annotation.
    pub fn annotated_segment_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.biological_annotation.as_ref().is_some_and(|a| !a.is_empty()))
            .count()
    }
}

impl Default for Segmentation {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry at `index` of a positional list.
pub fn entry_at<T>(list: &[T], index: usize, kind: ListKind) -> Result<&T, ModelError> {
    list.get(index).ok_or(ModelError::IndexOutOfRange {
        list: kind,
        index,
        len: list.len(),
    })
}

/// Fail with the first index past the end of `list`.
pub fn ensure_indices<T>(list: &[T], indices: &[usize], kind: ListKind) -> Result<(), ModelError> {
    indices
        .iter()
        .try_for_each(|index| entry_at(list, *index, kind).map(|_| ()))
}

/// Remove the entries at `indices`.
///
/// All indices are validated first, then removed in descending order so
/// earlier removals do not shift later ones. Duplicates are removed once.
pub fn remove_entries<T>(
    list: &mut Vec<T>,
    indices: &[usize],
    kind: ListKind,
) -> Result<Vec<T>, ModelError> {
    ensure_indices(list, indices, kind)?;

    let mut ordered: Vec<usize> = indices.to_vec();
    ordered.sort_unstable_by(|a, b| b.cmp(a));
    ordered.dedup();

    let mut removed: Vec<T> = ordered.into_iter().map(|i| list.remove(i)).collect();
    removed.reverse();
    Ok(removed)
}

/// Replace the entry at `index` with `items[0]` and insert the rest right
/// after it, in order.
pub fn replace_and_insert<T>(
    list: &mut Vec<T>,
    index: usize,
    items: Vec<T>,
    kind: ListKind,
) -> Result<(), ModelError> {
    entry_at(list, index, kind)?;
    list.splice(index..=index, items);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(accessions: &[&str]) -> Vec<ExternalReference> {
        accessions
            .iter()
            .map(|a| ExternalReference::new("go", format!("http://example.org/{a}"), *a))
            .collect()
    }

    #[test]
    fn test_segment_lookup() {
        let doc = Segmentation::new()
            .with_segment(Segment::new(3))
            .with_segment(Segment::new(7));

        assert_eq!(doc.segment(7).unwrap().id, 7);
        assert_eq!(
            doc.segment(4).unwrap_err(),
            ModelError::SegmentNotFound { id: 4 }
        );
        assert!(doc.ensure_segments(&[3, 7]).is_ok());
        assert!(doc.ensure_segments(&[3, 9]).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates_and_zero_instances() {
        let doc = Segmentation::new()
            .with_segment(Segment::new(1))
            .with_segment(Segment::new(1));
        assert_eq!(
            doc.validate(),
            Err(ModelError::DuplicateSegmentId { id: 1 })
        );

        let annotation = BiologicalAnnotation {
            number_of_instances: 0,
            ..BiologicalAnnotation::default()
        };
        let doc = Segmentation::new().with_segment(Segment::new(2).with_annotation(annotation));
        assert_eq!(doc.validate(), Err(ModelError::ZeroInstances { id: 2 }));
    }

    #[test]
    fn test_remove_entries_descending() {
        let mut list = refs(&["a", "b", "c", "d"]);
        let removed = remove_entries(&mut list, &[0, 2], ListKind::GlobalReferences).unwrap();

        let left: Vec<_> = list.iter().map(|r| r.accession.as_str()).collect();
        assert_eq!(left, vec!["b", "d"]);
        assert_eq!(removed[0].accession, "a");
        assert_eq!(removed[1].accession, "c");
    }

    #[test]
    fn test_remove_entries_validates_before_removing() {
        let mut list = refs(&["a", "b"]);
        let err = remove_entries(&mut list, &[0, 5], ListKind::Software).unwrap_err();

        assert_eq!(
            err,
            ModelError::IndexOutOfRange {
                list: ListKind::Software,
                index: 5,
                len: 2
            }
        );
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_replace_and_insert() {
        let mut list = refs(&["a", "b", "c"]);
        replace_and_insert(
            &mut list,
            1,
            refs(&["x", "y"]),
            ListKind::SegmentReferences(1),
        )
        .unwrap();

        let accessions: Vec<_> = list.iter().map(|r| r.accession.as_str()).collect();
        assert_eq!(accessions, vec!["a", "x", "y", "c"]);
    }

    #[test]
    fn test_version_compatibility() {
        assert_eq!(Segmentation::parse_version("0.8.0"), Some((0, 8, 0)));
        assert_eq!(Segmentation::parse_version("0.8"), None);

        assert!(Segmentation::is_version_compatible(
            Segmentation::CURRENT_VERSION
        ));
        assert!(Segmentation::is_version_compatible("0.8.3"));
        assert!(!Segmentation::is_version_compatible("0.7.0"));

        assert!(Segmentation::is_version_readable("0.7.0"));
        assert!(!Segmentation::is_version_readable("1.0.0"));
        assert!(!Segmentation::is_version_readable("garbage"));
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let json = r#"{
            "version": "0.8.0",
            "primary_descriptor": "mesh_list",
            "segments": [{"id": 1, "mesh_list": [1, 2, 3]}]
        }"#;
        let doc: Segmentation = serde_json::from_str(json).unwrap();
        assert_eq!(doc.extra["primary_descriptor"], "mesh_list");
        assert!(doc.segments[0].extra.contains_key("mesh_list"));

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["primary_descriptor"], "mesh_list");
        assert_eq!(back["segments"][0]["mesh_list"][2], 3);
    }
}
