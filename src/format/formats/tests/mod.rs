//! Unit tests for segmentation format implementations.
//!
//! These tests verify serialization, deserialization and that both
//! encodings carry the same document.

mod roundtrip_tests;

use crate::model::{
    BiologicalAnnotation, Colour, ExternalReference, Segment, Segmentation, Software,
};

/// A document exercising every annotated field.
pub(super) fn annotated_document() -> Segmentation {
    let mut doc = Segmentation::new();
    doc.name = Some("EMD-1014 ribosome".to_string());
    doc.details = Some("Manual segmentation of <large> & small subunits".to_string());
    doc.software_list
        .push(Software::new("Segger", "2.1", "watershed, then merged by hand"));
    doc.global_external_references.push(
        ExternalReference::new("ncbitaxon", "http://purl.obolibrary.org/obo/NCBITaxon_562", "NCBITaxon_562")
            .with_resolution(Some("Escherichia coli".into()), None),
    );

    let large = BiologicalAnnotation::named("50S subunit")
        .with_description("large ribosomal subunit")
        .with_reference(ExternalReference::new(
            "go",
            "http://purl.obolibrary.org/obo/GO_0015934",
            "GO_0015934",
        ));
    doc.segments.push(
        Segment::new(1)
            .with_annotation(large)
            .with_colour(Colour {
                red: 0.25,
                green: 0.5,
                blue: 1.0,
                alpha: 0.75,
            }),
    );

    let mut small = Segment::new(2).with_annotation(BiologicalAnnotation {
        number_of_instances: 3,
        ..BiologicalAnnotation::named("")
    });
    small.parent_id = 1;
    doc.segments.push(small);

    doc.segments.push(Segment::new(3));
    doc
}
