//! Round-trip tests between the two encodings.

use crate::format::formats::{JsonFormat, SffXmlFormat};
use crate::format::traits::SegmentationFormat;

use super::annotated_document;

#[test]
fn test_sff_roundtrip_preserves_document() {
    let doc = annotated_document();
    let bytes = SffXmlFormat.export_to_bytes(&doc).unwrap();
    let reread = SffXmlFormat.import_from_bytes(&bytes).unwrap();

    assert_eq!(reread, doc);
}

#[test]
fn test_json_to_sff_keeps_unknown_content() {
    let input = br#"{
        "version": "0.8.0",
        "primary_descriptor": "shape_primitive_list",
        "segments": [{"id": 2, "shape_primitive_list": [{"shape": "ellipsoid", "x": 3}]}]
    }"#;
    let doc = JsonFormat.import_from_bytes(input).unwrap();

    let xml = SffXmlFormat.export_to_bytes(&doc).unwrap();
    let from_xml = SffXmlFormat.import_from_bytes(&xml).unwrap();
    assert_eq!(from_xml, doc);

    let json = JsonFormat.export_to_bytes(&from_xml).unwrap();
    let back = JsonFormat.import_from_bytes(&json).unwrap();
    assert_eq!(back.segments[0].extra["shape_primitive_list"][0]["shape"], "ellipsoid");
}
