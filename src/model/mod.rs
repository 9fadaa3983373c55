//! Data model for segmentation documents.

mod annotation;
mod segmentation;

pub(crate) use annotation::default_instances;
pub use annotation::{BiologicalAnnotation, ExternalReference, Software};
pub use segmentation::{
    Colour, ListKind, ModelError, Segment, SegmentId, Segmentation, ensure_indices, entry_at,
    remove_entries, replace_and_insert,
};
