//! Selectors and payloads accepted by the editors.

use crate::error::{NotesError, Result};
use crate::model::{ExternalReference, SegmentId, Software};

/// An external reference as typed by the user: no label or description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSpec {
    pub resource: String,
    pub url: String,
    pub accession: String,
}

impl ReferenceSpec {
    pub fn new(
        resource: impl Into<String>,
        url: impl Into<String>,
        accession: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            url: url.into(),
            accession: accession.into(),
        }
    }

    /// Build from a `RESOURCE URL ACCESSION` triple.
    pub fn from_triple(values: &[String]) -> Result<Self> {
        match values {
            [resource, url, accession] => {
                if resource.trim().is_empty() {
                    return Err(NotesError::usage(
                        "external reference resource must not be empty",
                    ));
                }
                Ok(Self::new(resource.trim(), url.trim(), accession.trim()))
            }
            _ => Err(NotesError::usage(format!(
                "external reference needs RESOURCE URL ACCESSION, got {} value(s)",
                values.len()
            ))),
        }
    }

    /// Unresolved reference carrying these fields.
    pub fn to_reference(&self) -> ExternalReference {
        ExternalReference::new(&self.resource, &self.url, &self.accession)
    }
}

fn parse_list<T: std::str::FromStr>(text: &str, what: &str) -> Result<Vec<T>> {
    let items: Vec<&str> = text.split(',').map(str::trim).collect();
    if items.iter().all(|item| item.is_empty()) {
        return Err(NotesError::usage(format!("empty {what} list")));
    }
    items
        .into_iter()
        .map(|item| {
            item.parse().map_err(|_| {
                NotesError::usage(format!("invalid {what} '{item}' in '{text}'"))
            })
        })
        .collect()
}

/// Parse a comma separated segment id list such as `15559,15578`.
pub fn parse_id_list(text: &str) -> Result<Vec<SegmentId>> {
    parse_list(text, "segment id")
}

/// Parse a comma separated list of 0-based list positions.
pub fn parse_index_list(text: &str) -> Result<Vec<usize>> {
    parse_list(text, "index")
}

/// Optional fields of one software entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoftwareFields {
    pub name: Option<String>,
    pub version: Option<String>,
    pub processing_details: Option<String>,
}

impl SoftwareFields {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.version.is_none() && self.processing_details.is_none()
    }

    /// Overwrite the supplied fields of `software`.
    pub fn apply_to(&self, software: &mut Software) {
        if let Some(name) = &self.name {
            software.name = Some(name.clone());
        }
        if let Some(version) = &self.version {
            software.version = Some(version.clone());
        }
        if let Some(details) = &self.processing_details {
            software.processing_details = Some(details.clone());
        }
    }

    /// New software entry holding the supplied fields.
    pub fn to_software(&self) -> Software {
        let mut software = Software::default();
        self.apply_to(&mut software);
        software
    }
}

/// Payload for the document-level note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalNote {
    pub name: Option<String>,
    pub details: Option<String>,
    pub software: SoftwareFields,
    pub references: Vec<ReferenceSpec>,
}

impl GlobalNote {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.details.is_none()
            && self.software.is_empty()
            && self.references.is_empty()
    }
}

/// Payload for a segment note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentNote {
    pub name: Option<String>,
    pub description: Option<String>,
    pub number_of_instances: Option<u32>,
    pub references: Vec<ReferenceSpec>,
}

impl SegmentNote {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.number_of_instances.is_none()
            && self.references.is_empty()
    }

    pub(crate) fn check_instances(&self) -> Result<()> {
        if self.number_of_instances == Some(0) {
            return Err(NotesError::usage("number of instances must be at least 1"));
        }
        Ok(())
    }
}

/// What an add or edit applies to, and with which payload.
///
/// Segment notes and the global note are never changed by the same command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteChange {
    Global(GlobalNote),
    Segments {
        ids: Vec<SegmentId>,
        note: SegmentNote,
    },
}

impl NoteChange {
    pub(crate) fn references(&self) -> &[ReferenceSpec] {
        match self {
            NoteChange::Global(note) => &note.references,
            NoteChange::Segments { note, .. } => &note.references,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            NoteChange::Global(note) => note.is_empty(),
            NoteChange::Segments { note, .. } => note.is_empty(),
        }
    }

    pub(crate) fn check_segment_ids(ids: &[SegmentId]) -> Result<()> {
        if ids.is_empty() {
            return Err(NotesError::usage("no segment ids given"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("15559").unwrap(), vec![15559]);
        assert_eq!(parse_id_list("1, 2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("").unwrap_err().kind(), ErrorKind::Usage);
        assert_eq!(parse_id_list("1,x").unwrap_err().kind(), ErrorKind::Usage);
        assert_eq!(parse_id_list("1,,2").unwrap_err().kind(), ErrorKind::Usage);
        assert_eq!(parse_id_list("-1").unwrap_err().kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_parse_index_list() {
        assert_eq!(parse_index_list("0,1").unwrap(), vec![0, 1]);
        assert!(parse_index_list(" , ").is_err());
    }

    #[test]
    fn test_reference_from_triple() {
        let values: Vec<String> = ["emdb", "https://www.ebi.ac.uk/pdbe/emdb/EMD-8654", "EMD-8654"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let spec = ReferenceSpec::from_triple(&values).unwrap();
        assert_eq!(spec.resource, "emdb");
        assert!(!spec.to_reference().is_resolved());

        assert!(ReferenceSpec::from_triple(&values[..2]).is_err());
        let blank = vec![" ".to_string(), "u".to_string(), "a".to_string()];
        assert!(ReferenceSpec::from_triple(&blank).is_err());
    }

    #[test]
    fn test_software_fields() {
        let fields = SoftwareFields {
            version: Some("2.1".into()),
            ..SoftwareFields::default()
        };
        let mut software = Software::new("Segger", "1.0", "watershed");
        fields.apply_to(&mut software);

        assert_eq!(software.name.as_deref(), Some("Segger"));
        assert_eq!(software.version.as_deref(), Some("2.1"));
        assert_eq!(fields.to_software().name, None);
    }

    #[test]
    fn test_empty_payloads() {
        assert!(GlobalNote::default().is_empty());
        assert!(SegmentNote::default().is_empty());
        let note = SegmentNote {
            number_of_instances: Some(0),
            ..SegmentNote::default()
        };
        assert!(!note.is_empty());
        assert!(note.check_instances().is_err());
    }
}
