//! SFF XML encoding of segmentation documents.
//!
//! Layout:
//!
//! ```text
//! <segmentation version="0.8.0">
//!   <name/> <details/>
//!   <software_list> <software id="0"> <name/> <version/> <processing_details/> </software> </software_list>
//!   <global_external_references> <ref id="0" resource=".." url=".." accession=".."/> </global_external_references>
//!   <segment_list>
//!     <segment id="1" parent_id="0">
//!       <biological_annotation>
//!         <name/> <description/> <number_of_instances/>
//!         <external_references> <ref .../> </external_references>
//!       </biological_annotation>
//!       <colour red=".." green=".." blue=".." alpha=".."/>
//!       <extra>{json}</extra>
//!     </segment>
//!   </segment_list>
//!   <extra>{json}</extra>
//! </segmentation>
//! ```
//!
//! Content outside the annotation model travels in `<extra>` as embedded JSON.
//! Child elements of `<segmentation>` or `<segment>` that the model does not
//! know (`<mesh_list>`, `<transform_list>`, ...) are kept verbatim under the
//! `xml_elements` key of the matching `extra` map and written back after the
//! modelled elements.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::Write;
use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::Value;

use crate::format::error::FormatError;
use crate::format::formats::check_document;
use crate::format::traits::SegmentationFormat;
use crate::model::{
    BiologicalAnnotation, Colour, ExternalReference, Segment, Segmentation, Software,
};

const ROOT: &str = "segmentation";
const EXTRA: &str = "extra";
const FOREIGN: &str = "xml_elements";
const ROOT_CHILDREN: &[&str] = &[
    "name",
    "details",
    "software_list",
    "global_external_references",
    "segment_list",
    EXTRA,
];
const SEGMENT_CHILDREN: &[&str] = &["biological_annotation", "colour", EXTRA];
const LEAF_ELEMENTS: &[&str] = &[
    "name",
    "details",
    "version",
    "processing_details",
    "description",
    "number_of_instances",
    EXTRA,
];

/// SFF XML format.
pub struct SffXmlFormat;

impl SegmentationFormat for SffXmlFormat {
    fn id(&self) -> &'static str {
        "sff"
    }

    fn display_name(&self) -> &'static str {
        "Segmentation (SFF XML)"
    }

    fn extensions(&self) -> &[&'static str] {
        &["sff", "xml"]
    }

    fn export_to_bytes(&self, doc: &Segmentation) -> Result<Vec<u8>, FormatError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_document(&mut writer, doc)?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn import_from_bytes(&self, bytes: &[u8]) -> Result<Segmentation, FormatError> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|_| FormatError::invalid_format("Invalid UTF-8 in XML"))?;

        let doc = DocumentReader::default().read(xml)?;
        check_document(&doc)?;

        log::debug!(
            "Read SFF XML document with {} segments (format version {})",
            doc.segments.len(),
            doc.version
        );
        Ok(doc)
    }
}

fn write_document<W: Write>(writer: &mut Writer<W>, doc: &Segmentation) -> Result<(), FormatError> {
    write_event(
        writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut root = BytesStart::new(ROOT);
    root.push_attribute(("version", doc.version.as_str()));
    write_event(writer, Event::Start(root))?;

    write_optional(writer, "name", doc.name.as_deref())?;
    write_optional(writer, "details", doc.details.as_deref())?;

    write_list(writer, "software_list", &doc.software_list, |writer, index, software| {
        let mut element = BytesStart::new("software");
        element.push_attribute(("id", index.to_string().as_str()));
        write_event(writer, Event::Start(element))?;
        write_optional(writer, "name", software.name.as_deref())?;
        write_optional(writer, "version", software.version.as_deref())?;
        write_optional(
            writer,
            "processing_details",
            software.processing_details.as_deref(),
        )?;
        write_event(writer, Event::End(BytesEnd::new("software")))
    })?;

    write_list(
        writer,
        "global_external_references",
        &doc.global_external_references,
        write_reference,
    )?;

    write_list(writer, "segment_list", &doc.segments, |writer, _, segment| {
        write_segment(writer, segment)
    })?;

    write_extra(writer, &doc.extra)?;

    write_event(writer, Event::End(BytesEnd::new(ROOT)))
}

fn write_segment<W: Write>(writer: &mut Writer<W>, segment: &Segment) -> Result<(), FormatError> {
    let mut element = BytesStart::new("segment");
    element.push_attribute(("id", segment.id.to_string().as_str()));
    element.push_attribute(("parent_id", segment.parent_id.to_string().as_str()));
    write_event(writer, Event::Start(element))?;

    if let Some(annotation) = &segment.biological_annotation {
        write_event(
            writer,
            Event::Start(BytesStart::new("biological_annotation")),
        )?;
        write_optional(writer, "name", annotation.name.as_deref())?;
        write_optional(writer, "description", annotation.description.as_deref())?;
        write_text(
            writer,
            "number_of_instances",
            &annotation.number_of_instances.to_string(),
        )?;
        write_list(
            writer,
            "external_references",
            &annotation.external_references,
            write_reference,
        )?;
        write_event(writer, Event::End(BytesEnd::new("biological_annotation")))?;
    }

    if let Some(colour) = &segment.colour {
        let mut element = BytesStart::new("colour");
        for (key, value) in [
            ("red", colour.red),
            ("green", colour.green),
            ("blue", colour.blue),
            ("alpha", colour.alpha),
        ] {
            element.push_attribute((key, value.to_string().as_str()));
        }
        write_event(writer, Event::Empty(element))?;
    }

    write_extra(writer, &segment.extra)?;

    write_event(writer, Event::End(BytesEnd::new("segment")))
}

fn write_reference<W: Write>(
    writer: &mut Writer<W>,
    index: usize,
    reference: &ExternalReference,
) -> Result<(), FormatError> {
    let mut element = BytesStart::new("ref");
    element.push_attribute(("id", index.to_string().as_str()));
    element.push_attribute(("resource", reference.resource.as_str()));
    element.push_attribute(("url", reference.url.as_str()));
    element.push_attribute(("accession", reference.accession.as_str()));
    if let Some(label) = &reference.label {
        element.push_attribute(("label", label.as_str()));
    }
    if let Some(description) = &reference.description {
        element.push_attribute(("description", description.as_str()));
    }
    write_event(writer, Event::Empty(element))
}

/// Write `<name>` wrapping one child per item, or `<name/>` when empty.
fn write_list<W: Write, T>(
    writer: &mut Writer<W>,
    name: &str,
    items: &[T],
    mut write_item: impl FnMut(&mut Writer<W>, usize, &T) -> Result<(), FormatError>,
) -> Result<(), FormatError> {
    if items.is_empty() {
        return write_event(writer, Event::Empty(BytesStart::new(name)));
    }

    write_event(writer, Event::Start(BytesStart::new(name)))?;
    for (index, item) in items.iter().enumerate() {
        write_item(writer, index, item)?;
    }
    write_event(writer, Event::End(BytesEnd::new(name)))
}

/// Verbatim XML fragments stored in `extra`, if the entry has that shape.
fn foreign_fragments(extra: &BTreeMap<String, Value>) -> Option<Vec<&str>> {
    extra.get(FOREIGN)?.as_array()?.iter().map(Value::as_str).collect()
}

fn write_extra<W: Write>(
    writer: &mut Writer<W>,
    extra: &BTreeMap<String, Value>,
) -> Result<(), FormatError> {
    let fragments = foreign_fragments(extra);
    let mut json = extra.clone();
    if fragments.is_some() {
        json.remove(FOREIGN);
    }
    if !json.is_empty() {
        write_text(writer, EXTRA, &serde_json::to_string(&json)?)?;
    }
    for fragment in fragments.unwrap_or_default() {
        write_event(writer, Event::Text(BytesText::from_escaped(fragment)))?;
    }
    Ok(())
}

fn write_optional<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: Option<&str>,
) -> Result<(), FormatError> {
    match value {
        Some(value) => write_text(writer, name, value),
        None => Ok(()),
    }
}

/// Write a simple text element. Empty values become `<name/>` so the
/// indenting writer never puts whitespace inside a text element.
fn write_text<W: Write>(writer: &mut Writer<W>, name: &str, value: &str) -> Result<(), FormatError> {
    if value.is_empty() {
        return write_event(writer, Event::Empty(BytesStart::new(name)));
    }
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_event(writer, Event::Text(BytesText::new(value)))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), FormatError> {
    writer.write_event(event).map_err(FormatError::Xml)
}

/// Event-driven reader state.
#[derive(Default)]
struct DocumentReader {
    doc: Segmentation,
    saw_root: bool,
    stack: Vec<String>,
    software: Option<Software>,
    segment: Option<Segment>,
    annotation: Option<BiologicalAnnotation>,
    text: Option<String>,
}

impl DocumentReader {
    fn read(mut self, xml: &str) -> Result<Segmentation, FormatError> {
        let mut reader = Reader::from_str(xml);

        loop {
            let start = reader.buffer_position();
            match reader.read_event()? {
                Event::Start(ref e) if self.is_foreign(e) => {
                    reader.read_to_end(e.name())?;
                    self.keep_foreign(&xml[start..reader.buffer_position()])?;
                }
                Event::Empty(ref e) if self.is_foreign(e) => {
                    self.keep_foreign(&xml[start..reader.buffer_position()])?;
                }
                Event::Start(ref e) => self.open(e)?,
                Event::Empty(ref e) => {
                    self.open(e)?;
                    self.close()?;
                }
                Event::End(_) => self.close()?,
                Event::Text(ref e) => {
                    if let Some(buffer) = self.text.as_mut() {
                        buffer.push_str(&e.unescape()?);
                    }
                }
                Event::CData(ref e) => {
                    if let Some(buffer) = self.text.as_mut() {
                        buffer.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !self.saw_root {
            return Err(FormatError::missing_field(ROOT));
        }
        Ok(self.doc)
    }

    /// Whether `e` is a child of the document or a segment outside the model.
    fn is_foreign(&self, e: &BytesStart<'_>) -> bool {
        let name = e.name();
        let Ok(name) = std::str::from_utf8(name.as_ref()) else {
            return false;
        };
        match self.stack.last().map(String::as_str) {
            Some(ROOT) => !ROOT_CHILDREN.contains(&name),
            Some("segment") => !SEGMENT_CHILDREN.contains(&name),
            _ => false,
        }
    }

    fn keep_foreign(&mut self, markup: &str) -> Result<(), FormatError> {
        let extra = match self.segment.as_mut() {
            Some(segment) => &mut segment.extra,
            None => &mut self.doc.extra,
        };
        let Value::Array(fragments) = extra
            .entry(FOREIGN.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        else {
            return Err(FormatError::invalid_format(format!(
                "'{}' in <extra> must be a list of XML fragments",
                FOREIGN
            )));
        };
        fragments.push(Value::String(markup.trim().to_string()));
        Ok(())
    }

    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), FormatError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let parent = self.stack.last().cloned();

        match (parent.as_deref(), name.as_str()) {
            (None, ROOT) => {
                self.doc.version = attribute(e, "version")?
                    .ok_or_else(|| FormatError::missing_field("segmentation@version"))?;
                self.saw_root = true;
            }
            (None, other) => {
                return Err(FormatError::invalid_format(format!(
                    "unexpected root element <{}>",
                    other
                )));
            }
            (Some("software_list"), "software") => self.software = Some(Software::default()),
            (Some("segment_list"), "segment") => {
                let id = parsed_attribute(e, "id")?
                    .ok_or_else(|| FormatError::missing_field("segment@id"))?;
                let mut segment = Segment::new(id);
                segment.parent_id = parsed_attribute(e, "parent_id")?.unwrap_or(0);
                self.segment = Some(segment);
            }
            (Some("segment"), "biological_annotation") => {
                self.annotation = Some(BiologicalAnnotation::default());
            }
            (Some("segment"), "colour") => {
                let colour = Colour {
                    red: parsed_attribute(e, "red")?.unwrap_or(0.0),
                    green: parsed_attribute(e, "green")?.unwrap_or(0.0),
                    blue: parsed_attribute(e, "blue")?.unwrap_or(0.0),
                    alpha: parsed_attribute(e, "alpha")?.unwrap_or(1.0),
                };
                if let Some(segment) = self.segment.as_mut() {
                    segment.colour = Some(colour);
                }
            }
            (Some("global_external_references"), "ref") => {
                let reference = read_reference(e)?;
                self.doc.global_external_references.push(reference);
            }
            (Some("external_references"), "ref") => {
                let reference = read_reference(e)?;
                let annotation = self.annotation.as_mut().ok_or_else(|| {
                    FormatError::invalid_format("<external_references> outside an annotation")
                })?;
                annotation.external_references.push(reference);
            }
            (_, leaf) if LEAF_ELEMENTS.contains(&leaf) => self.text = Some(String::new()),
            _ => {}
        }

        self.stack.push(name);
        Ok(())
    }

    fn close(&mut self) -> Result<(), FormatError> {
        let Some(name) = self.stack.pop() else {
            return Ok(());
        };
        let parent = self.stack.last().cloned();
        let text = self.text.take().unwrap_or_default();

        match (parent.as_deref(), name.as_str()) {
            (Some(ROOT), "name") => self.doc.name = Some(text),
            (Some(ROOT), "details") => self.doc.details = Some(text),
            (Some(ROOT), EXTRA) => merge_extra(&mut self.doc.extra, parse_extra(&text)?)?,
            (Some("software"), field) => {
                if let Some(software) = self.software.as_mut() {
                    match field {
                        "name" => software.name = Some(text),
                        "version" => software.version = Some(text),
                        "processing_details" => software.processing_details = Some(text),
                        _ => {}
                    }
                }
            }
            (Some("biological_annotation"), field) => {
                if let Some(annotation) = self.annotation.as_mut() {
                    match field {
                        "name" => annotation.name = Some(text),
                        "description" => annotation.description = Some(text),
                        "number_of_instances" => {
                            annotation.number_of_instances =
                                text.trim().parse().map_err(|_| {
                                    FormatError::invalid_format(format!(
                                        "invalid number_of_instances '{}'",
                                        text
                                    ))
                                })?;
                        }
                        _ => {}
                    }
                }
            }
            (Some("segment"), EXTRA) => {
                if let Some(segment) = self.segment.as_mut() {
                    merge_extra(&mut segment.extra, parse_extra(&text)?)?;
                }
            }
            (Some("segment"), "biological_annotation") => {
                if let Some(segment) = self.segment.as_mut() {
                    segment.biological_annotation = self.annotation.take();
                }
            }
            (Some("software_list"), "software") => {
                if let Some(software) = self.software.take() {
                    self.doc.software_list.push(software);
                }
            }
            (Some("segment_list"), "segment") => {
                if let Some(segment) = self.segment.take() {
                    self.doc.segments.push(segment);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn read_reference(e: &BytesStart<'_>) -> Result<ExternalReference, FormatError> {
    let required = |key: &str| -> Result<String, FormatError> {
        attribute(e, key)?.ok_or_else(|| FormatError::missing_field(format!("ref@{}", key)))
    };
    let reference = ExternalReference::new(
        required("resource")?,
        required("url")?,
        required("accession")?,
    );
    Ok(reference.with_resolution(attribute(e, "label")?, attribute(e, "description")?))
}

fn parse_extra(text: &str) -> Result<BTreeMap<String, Value>, FormatError> {
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(text)?)
}

/// Add `<extra>` content to fragments already collected for the same element.
fn merge_extra(
    extra: &mut BTreeMap<String, Value>,
    parsed: BTreeMap<String, Value>,
) -> Result<(), FormatError> {
    for (key, value) in parsed {
        match extra.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), value) {
                (Value::Array(kept), Value::Array(mut earlier)) => {
                    earlier.append(kept);
                    *kept = earlier;
                }
                _ => {
                    return Err(FormatError::invalid_format(format!(
                        "'{}' given both in <extra> and as XML elements",
                        key
                    )));
                }
            },
        }
    }
    Ok(())
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, FormatError> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn parsed_attribute<T: FromStr>(e: &BytesStart<'_>, key: &str) -> Result<Option<T>, FormatError> {
    match attribute(e, key)? {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            FormatError::invalid_format(format!("invalid value '{}' for attribute {}", raw, key))
        }),
        None => Ok(None),
    }
}
