//! Segmentation file formats.
//!
//! Two encodings of the same document model are supported:
//!
//! - **JSON** (`.json`): pretty-printed serde encoding. Content outside the
//!   annotation model (geometry, transforms...) is preserved verbatim.
//! - **SFF XML** (`.sff`, `.xml`): element-per-field XML written and read
//!   with quick-xml events.
//!
//! The encoding is picked from the file extension through
//! [`FormatRegistry::for_path`].

mod error;
pub mod formats;
mod registry;
mod traits;

pub use error::FormatError;
pub use formats::{JsonFormat, SffXmlFormat};
pub use registry::FormatRegistry;
pub use traits::SegmentationFormat;
