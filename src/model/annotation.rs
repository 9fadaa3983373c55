//! Annotation payloads carried by segments and by the document header.

use serde::{Deserialize, Serialize};

/// A pointer to an entry in a public biological database or ontology.
///
/// `resource`, `url` and `accession` come from the user. `label` and
/// `description` are only ever filled in by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    /// Resource name (e.g. `ncbitaxon`, `uniprot`, `emdb`).
    pub resource: String,
    /// IRI or URL of the referenced entry.
    pub url: String,
    /// Accession within the resource.
    pub accession: String,
    /// Human readable label returned by the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Longer description returned by the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExternalReference {
    /// Create an unresolved reference.
    pub fn new(
        resource: impl Into<String>,
        url: impl Into<String>,
        accession: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            url: url.into(),
            accession: accession.into(),
            label: None,
            description: None,
        }
    }

    /// Attach resolver output to this reference.
    pub fn with_resolution(mut self, label: Option<String>, description: Option<String>) -> Self {
        self.label = label;
        self.description = description;
        self
    }

    /// Whether the resolver filled in any metadata.
    pub fn is_resolved(&self) -> bool {
        self.label.is_some() || self.description.is_some()
    }
}

/// One entry of the document's software list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Software {
    /// Name of the program that produced the segmentation.
    #[serde(default)]
    pub name: Option<String>,
    /// Version of that program.
    #[serde(default)]
    pub version: Option<String>,
    /// Free text describing the processing steps.
    #[serde(default)]
    pub processing_details: Option<String>,
}

impl Software {
    /// Create a software entry with all fields set.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        processing_details: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            processing_details: Some(processing_details.into()),
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.version.is_none() && self.processing_details.is_none()
    }
}

/// Biological annotation attached to a single segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiologicalAnnotation {
    /// Short name of the annotated structure.
    #[serde(default)]
    pub name: Option<String>,
    /// Free text description.
    #[serde(default)]
    pub description: Option<String>,
    /// How many instances of the structure the segment represents. Never zero.
    #[serde(default = "default_instances")]
    pub number_of_instances: u32,
    /// References to public resources describing the structure.
    #[serde(default)]
    pub external_references: Vec<ExternalReference>,
}

pub(crate) fn default_instances() -> u32 {
    1
}

impl Default for BiologicalAnnotation {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            number_of_instances: default_instances(),
            external_references: Vec::new(),
        }
    }
}

impl BiologicalAnnotation {
    /// Create an annotation carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append an external reference.
    pub fn with_reference(mut self, reference: ExternalReference) -> Self {
        self.external_references.push(reference);
        self
    }

    /// True when the annotation holds nothing beyond its defaults.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
