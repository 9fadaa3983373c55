//! Command-line surface.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::error::{NotesError, Result};
use crate::model::SegmentId;
use crate::notes::{
    ClearSpec, CopySpec, GlobalDeletion, GlobalNote, NoteChange, NoteDeletion, NoteEdit,
    ReferenceSpec, SegmentDeletion, SegmentNote, SoftwareDeletion, SoftwareFields, parse_id_list,
    parse_index_list,
};
use crate::view::ListOptions;

#[derive(Parser, Debug)]
#[command(name = "sff-notes")]
#[command(about = "Annotate segmentation documents with names, descriptions and external references")]
#[command(version)]
pub struct Cli {
    /// Read and write configuration from this file
    #[arg(long, global = true, value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Use the built-in configuration and ignore the user file
    #[arg(long, global = true)]
    pub shipped_configs: bool,

    /// Log debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the segments of a document.
    List {
        /// Document, or the last-file token
        file: PathBuf,
        /// Order by segment name
        #[arg(long)]
        sort: bool,
        /// Reverse the order
        #[arg(long)]
        reverse: bool,
        /// Only print segment ids
        #[arg(long)]
        list_ids: bool,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the notes of selected segments.
    Show {
        file: PathBuf,
        /// Comma separated segment ids
        #[arg(short = 'i', long = "segment-id", value_name = "IDS")]
        segment_ids: String,
        #[arg(long)]
        json: bool,
    },

    /// Add notes; lists are appended to.
    Add {
        file: PathBuf,
        #[command(flatten)]
        note: NoteArgs,
    },

    /// Replace notes at explicit positions.
    Edit {
        file: PathBuf,
        #[command(flatten)]
        note: NoteArgs,
        /// Software entry to edit
        #[arg(short = 's', long = "software-id", value_name = "ID")]
        software_id: Option<usize>,
        /// External reference to replace
        #[arg(short = 'e', long = "external-ref-id", value_name = "ID")]
        external_ref_id: Option<usize>,
    },

    /// Delete note fields, software entries or external references.
    Del {
        file: PathBuf,
        #[command(flatten)]
        fields: DeleteArgs,
    },

    /// Copy whole notes between segments and the global note.
    Copy {
        file: PathBuf,
        #[command(flatten)]
        scopes: CopyArgs,
    },

    /// Remove external references, or whole notes.
    Clear {
        file: PathBuf,
        #[command(flatten)]
        scopes: ClearArgs,
    },

    /// Merge the notes of one document into another, writing a third.
    Merge {
        /// Document whose notes win
        #[arg(long)]
        source: PathBuf,
        /// Document receiving the notes
        other: PathBuf,
        /// Where to write the merged document
        #[arg(short = 'o', long)]
        output: PathBuf,
    },

    /// Write staged edits to the document.
    Save { file: PathBuf },

    /// Discard staged edits.
    Trash { file: PathBuf },

    /// Inspect or change configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print one setting, or all of them.
    Get {
        name: Option<String>,
        #[arg(long, conflicts_with = "name")]
        all: bool,
    },
    /// Change a setting.
    Set { name: String, value: String },
    /// Restore a setting, or all of them, to the default.
    Del {
        name: Option<String>,
        #[arg(long, conflicts_with = "name")]
        all: bool,
    },
}

/// Fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct NoteArgs {
    /// Segments to annotate; without it the global note is changed
    #[arg(short = 'i', long = "segment-id", value_name = "IDS")]
    pub segment_ids: Option<String>,

    /// Segment name
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Segment description
    #[arg(short = 'd', long)]
    pub description: Option<String>,
    /// Number of instances of the segment
    #[arg(short = 'I', long)]
    pub number_of_instances: Option<u32>,

    /// Document name
    #[arg(short = 'N', long)]
    pub segmentation_name: Option<String>,
    /// Document details
    #[arg(short = 'D', long)]
    pub details: Option<String>,
    /// Software name
    #[arg(short = 'S', long)]
    pub software_name: Option<String>,
    /// Software version
    #[arg(short = 'T', long)]
    pub software_version: Option<String>,
    /// Software processing details
    #[arg(short = 'P', long)]
    pub software_processing_details: Option<String>,

    /// External reference; repeat for several
    #[arg(
        short = 'E',
        long = "external-ref",
        num_args = 3,
        value_names = ["RESOURCE", "URL", "ACCESSION"],
        action = ArgAction::Append
    )]
    pub external_refs: Vec<String>,
}

fn references(values: &[String]) -> Result<Vec<ReferenceSpec>> {
    values.chunks(3).map(ReferenceSpec::from_triple).collect()
}

fn segment_ids(text: &Option<String>) -> Result<Option<Vec<SegmentId>>> {
    text.as_deref().map(parse_id_list).transpose()
}

fn index_list(text: &Option<String>) -> Result<Vec<usize>> {
    Ok(text.as_deref().map(parse_index_list).transpose()?.unwrap_or_default())
}

impl NoteArgs {
    fn has_global_fields(&self) -> bool {
        self.segmentation_name.is_some()
            || self.details.is_some()
            || self.software_name.is_some()
            || self.software_version.is_some()
            || self.software_processing_details.is_some()
    }

    fn has_segment_fields(&self) -> bool {
        self.name.is_some() || self.description.is_some() || self.number_of_instances.is_some()
    }

    /// Split into the global or segment payload the flags describe.
    pub fn to_change(&self) -> Result<NoteChange> {
        let references = references(&self.external_refs)?;
        match segment_ids(&self.segment_ids)? {
            Some(ids) => {
                if self.has_global_fields() {
                    return Err(NotesError::usage(
                        "document fields (-N -D -S -T -P) cannot be combined with segment ids",
                    ));
                }
                Ok(NoteChange::Segments {
                    ids,
                    note: SegmentNote {
                        name: self.name.clone(),
                        description: self.description.clone(),
                        number_of_instances: self.number_of_instances,
                        references,
                    },
                })
            }
            None => {
                if self.has_segment_fields() {
                    return Err(NotesError::usage(
                        "segment fields (-n -d -I) need segment ids (-i)",
                    ));
                }
                Ok(NoteChange::Global(GlobalNote {
                    name: self.segmentation_name.clone(),
                    details: self.details.clone(),
                    software: SoftwareFields {
                        name: self.software_name.clone(),
                        version: self.software_version.clone(),
                        processing_details: self.software_processing_details.clone(),
                    },
                    references,
                }))
            }
        }
    }

    pub fn to_edit(&self, software_id: Option<usize>, external_ref_id: Option<usize>) -> Result<NoteEdit> {
        Ok(NoteEdit {
            change: self.to_change()?,
            software_id,
            external_ref_id,
        })
    }
}

/// Flags of `del`.
#[derive(Args, Debug, Default)]
pub struct DeleteArgs {
    /// Segments to change; without it the global note is changed
    #[arg(short = 'i', long = "segment-id", value_name = "IDS")]
    pub segment_ids: Option<String>,

    /// Delete the segment name
    #[arg(short = 'n', long)]
    pub name: bool,
    /// Delete the segment description
    #[arg(short = 'd', long)]
    pub description: bool,
    /// Reset the number of instances to 1
    #[arg(short = 'I', long)]
    pub number_of_instances: bool,

    /// Delete the document name
    #[arg(short = 'N', long)]
    pub segmentation_name: bool,
    /// Delete the document details
    #[arg(short = 'D', long)]
    pub details: bool,
    /// Comma separated software entries
    #[arg(short = 's', long = "software-id", value_name = "IDS")]
    pub software_ids: Option<String>,
    /// Only delete the name of the software entries
    #[arg(short = 'S', long)]
    pub software_name: bool,
    /// Only delete the version of the software entries
    #[arg(short = 'T', long)]
    pub software_version: bool,
    /// Only delete the processing details of the software entries
    #[arg(short = 'P', long)]
    pub software_processing_details: bool,

    /// Comma separated external references
    #[arg(short = 'e', long = "external-ref-id", value_name = "IDS")]
    pub external_ref_ids: Option<String>,
}

impl DeleteArgs {
    pub fn to_deletion(&self) -> Result<NoteDeletion> {
        let external_ref_ids = index_list(&self.external_ref_ids)?;
        match segment_ids(&self.segment_ids)? {
            Some(ids) => {
                let global_flags = self.segmentation_name
                    || self.details
                    || self.software_ids.is_some()
                    || self.software_name
                    || self.software_version
                    || self.software_processing_details;
                if global_flags {
                    return Err(NotesError::usage(
                        "document flags (-N -D -s -S -T -P) cannot be combined with segment ids",
                    ));
                }
                Ok(NoteDeletion::Segments {
                    ids,
                    fields: SegmentDeletion {
                        name: self.name,
                        description: self.description,
                        number_of_instances: self.number_of_instances,
                        external_ref_ids,
                    },
                })
            }
            None => {
                if self.name || self.description || self.number_of_instances {
                    return Err(NotesError::usage(
                        "segment flags (-n -d -I) need segment ids (-i)",
                    ));
                }
                Ok(NoteDeletion::Global(GlobalDeletion {
                    name: self.segmentation_name,
                    details: self.details,
                    software: SoftwareDeletion {
                        indices: index_list(&self.software_ids)?,
                        name: self.software_name,
                        version: self.software_version,
                        processing_details: self.software_processing_details,
                    },
                    external_ref_ids,
                }))
            }
        }
    }
}

/// Scopes of `copy`.
#[derive(Args, Debug, Default)]
pub struct CopyArgs {
    /// Segments to copy from
    #[arg(short = 'i', long = "segment-id", value_name = "IDS")]
    pub segment_ids: Option<String>,
    /// Copy from the global note
    #[arg(long)]
    pub from_global: bool,
    /// Segments to copy to
    #[arg(short = 't', long = "to-segment", value_name = "IDS")]
    pub to_segment: Option<String>,
    /// Copy to the global note
    #[arg(long)]
    pub to_global: bool,
    /// Copy to every other segment
    #[arg(long)]
    pub to_all: bool,
}

impl CopyArgs {
    pub fn to_spec(&self) -> Result<CopySpec> {
        let sources = segment_ids(&self.segment_ids)?.unwrap_or_default();
        let targets = segment_ids(&self.to_segment)?.unwrap_or_default();
        CopySpec::from_selectors(
            &sources,
            self.from_global,
            &targets,
            self.to_global,
            self.to_all,
        )
    }
}

/// Scopes of `clear`.
#[derive(Args, Debug, Default)]
pub struct ClearArgs {
    /// Segments to clear
    #[arg(short = 'i', long = "segment-id", value_name = "IDS")]
    pub segment_ids: Option<String>,
    /// Clear every segment
    #[arg(long)]
    pub from_all_segments: bool,
    /// Clear the global note
    #[arg(long)]
    pub from_global: bool,
    /// Clear every segment and the global note
    #[arg(long)]
    pub all: bool,
    /// Remove whole notes, not only external references
    #[arg(long)]
    pub whole: bool,
}

impl ClearArgs {
    pub fn to_spec(&self) -> Result<ClearSpec> {
        let ids = segment_ids(&self.segment_ids)?.unwrap_or_default();
        ClearSpec::from_selectors(
            &ids,
            self.from_all_segments,
            self.from_global,
            self.all,
            self.whole,
        )
    }
}

pub(crate) fn list_options(sort: bool, reverse: bool, list_ids: bool) -> ListOptions {
    ListOptions {
        sort_by_name: sort,
        reverse,
        ids_only: list_ids,
    }
}
