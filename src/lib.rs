//! SFF Notes - annotation editing for segmentation documents
//!
//! Attach names, descriptions, instance counts, software provenance and
//! external references to segmentation documents. Edits are staged in a
//! side file and only reach the document on `save`. External references
//! are enriched with labels looked up from public ontology and database
//! services.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod model;
pub mod notes;
pub mod resolver;
pub mod staging;
pub mod view;

pub use error::{ErrorKind, NotesError, Result};
