//! Command dispatch.
//!
//! Every document command names a file. Commands that change or persist a
//! document also accept the last-file token (`@` by default) for the
//! document touched by the previous mutating command; `list` and `show` do
//! not.
//! Reads come from the staging file when one exists; mutations always land
//! in it.

mod commands;

use std::io::Write;
use std::path::{Path, PathBuf};

pub use commands::{ClearArgs, Cli, Command, ConfigCommand, CopyArgs, DeleteArgs, NoteArgs};

use crate::config::{ConfigSource, NotesConfig};
use crate::error::{NotesError, Result};
use crate::model::Segmentation;
use crate::notes::{
    EditReport, add_note, clear_notes, copy_notes, delete_note, edit_note, merge_notes,
    parse_id_list,
};
use crate::resolver::Resolver;
use crate::staging::{DocumentStore, FileStore, Session, Staging};
use crate::view;

fn write_out(out: &mut dyn Write, text: &str) -> Result<()> {
    writeln!(out, "{text}").map_err(|e| NotesError::io("<stdout>", e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| NotesError::document("<stdout>", crate::format::FormatError::Json(e)))
}

/// Everything a document command needs.
pub struct Context<S> {
    staging: Staging<S>,
    session: Session,
    resolver: Resolver,
    last_file_token: String,
}

impl Context<FileStore> {
    /// Context working on files, set up from `config`.
    pub fn from_config(config: &NotesConfig) -> Self {
        Self::new(
            FileStore::new(),
            config,
            Resolver::from_config(&config.resolver),
        )
    }
}

impl<S: DocumentStore> Context<S> {
    pub fn new(store: S, config: &NotesConfig, resolver: Resolver) -> Self {
        Self {
            staging: Staging::new(store, config.staging_prefix.clone()),
            session: Session::new(config.session_file.clone()),
            resolver,
            last_file_token: config.last_file_token.clone(),
        }
    }

    pub fn staging(&self) -> &Staging<S> {
        &self.staging
    }

    /// Canonical path for `file`, expanding the last-file token.
    pub fn resolve_document(&self, file: &Path) -> Result<PathBuf> {
        if file.as_os_str() != self.last_file_token.as_str() {
            return Ok(file.to_path_buf());
        }
        let Some(last) = self.session.last()? else {
            return Err(NotesError::usage(format!(
                "'{}' refers to the last edited document, but none was edited",
                self.last_file_token
            )));
        };
        if !self.staging.is_staged(&last)? {
            return Err(NotesError::usage(format!(
                "'{}' refers to {:?}, which has no staged edits",
                self.last_file_token, last
            )));
        }
        log::debug!("'{}' resolved to {:?}", self.last_file_token, last);
        Ok(last)
    }

    /// Canonical path for a read-only command, which must name its file.
    fn readable_document(&self, file: &Path) -> Result<PathBuf> {
        if file.as_os_str() == self.last_file_token.as_str() {
            return Err(NotesError::usage(format!(
                "'{}' is not accepted here; name the document explicitly",
                self.last_file_token
            )));
        }
        Ok(file.to_path_buf())
    }

    fn mutate(
        &self,
        file: &Path,
        out: &mut dyn Write,
        edit: impl FnOnce(&mut Segmentation) -> Result<EditReport>,
    ) -> Result<()> {
        let canonical = self.resolve_document(file)?;
        let report = self.staging.edit(&canonical, edit)?;
        if let Err(e) = self.session.record(&canonical) {
            log::warn!(
                "Edit staged, but '{}' will not refer to {:?}: {}",
                self.last_file_token,
                canonical,
                e
            );
        }

        let staged = self.staging.staging_path(&canonical)?;
        let mut scope = Vec::new();
        if report.touched_global {
            scope.push("global note".to_string());
        }
        if !report.touched_segments.is_empty() {
            scope.push(format!("{} segment(s)", report.touched_segments.len()));
        }
        write_out(
            out,
            &format!("Updated {}; staged in {}", scope.join(" and "), staged.display()),
        )?;
        if !report.warnings.is_empty() {
            write_out(
                out,
                &format!("{} reference(s) could not be resolved", report.warnings.len()),
            )?;
        }
        Ok(())
    }

    /// Run a document command, writing its output to `out`.
    pub fn execute(&self, command: Command, out: &mut dyn Write) -> Result<()> {
        match command {
            Command::List {
                file,
                sort,
                reverse,
                list_ids,
                json,
            } => {
                let doc = self.staging.load_or_create(&self.readable_document(&file)?)?;
                let listing = view::list(&doc, commands::list_options(sort, reverse, list_ids));
                let text = if json {
                    to_json(&listing)?
                } else {
                    listing.to_string()
                };
                write_out(out, text.trim_end())
            }
            Command::Show {
                file,
                segment_ids,
                json,
            } => {
                let ids = parse_id_list(&segment_ids)?;
                let doc = self.staging.load_or_create(&self.readable_document(&file)?)?;
                let details = view::show(&doc, &ids)?;
                if json {
                    return write_out(out, &to_json(&details)?);
                }
                for detail in details {
                    write_out(out, detail.to_string().trim_end())?;
                }
                Ok(())
            }
            Command::Add { file, note } => {
                let change = note.to_change()?;
                self.mutate(&file, out, |doc| add_note(doc, &change, &self.resolver))
            }
            Command::Edit {
                file,
                note,
                software_id,
                external_ref_id,
            } => {
                let edit = note.to_edit(software_id, external_ref_id)?;
                self.mutate(&file, out, |doc| edit_note(doc, &edit, &self.resolver))
            }
            Command::Del { file, fields } => {
                let deletion = fields.to_deletion()?;
                self.mutate(&file, out, |doc| delete_note(doc, &deletion))
            }
            Command::Copy { file, scopes } => {
                let spec = scopes.to_spec()?;
                self.mutate(&file, out, |doc| copy_notes(doc, &spec))
            }
            Command::Clear { file, scopes } => {
                let spec = scopes.to_spec()?;
                self.mutate(&file, out, |doc| clear_notes(doc, &spec))
            }
            Command::Merge {
                source,
                other,
                output,
            } => self.merge(&source, &other, &output, out),
            Command::Save { file } => {
                let canonical = self.resolve_document(&file)?;
                let message = if self.staging.commit(&canonical)? {
                    format!("Saved {}", canonical.display())
                } else {
                    format!("No staged edits for {}", canonical.display())
                };
                write_out(out, &message)
            }
            Command::Trash { file } => {
                let canonical = self.resolve_document(&file)?;
                let message = if self.staging.discard(&canonical)? {
                    format!("Discarded staged edits for {}", canonical.display())
                } else {
                    format!("No staged edits for {}", canonical.display())
                };
                write_out(out, &message)
            }
            Command::Config(_) => Err(NotesError::usage(
                "configuration commands do not operate on documents",
            )),
        }
    }

    fn merge(&self, source: &Path, other: &Path, output: &Path, out: &mut dyn Write) -> Result<()> {
        let source = self.resolve_document(source)?;
        let other = self.resolve_document(other)?;

        let absolute = |path: &Path| std::path::absolute(path).map_err(|e| NotesError::io(path, e));
        let target = absolute(output)?;
        if target == absolute(&source)? || target == absolute(&other)? {
            return Err(NotesError::usage(format!(
                "refusing to overwrite merge input {:?}",
                output
            )));
        }

        let outcome = merge_notes(
            &self.staging.load_or_create(&source)?,
            &self.staging.load_or_create(&other)?,
        );
        self.staging.store().export(&outcome.document, output)?;
        write_out(
            out,
            &format!(
                "Merged notes of {} segment(s) into {}",
                outcome.merged_segments.len(),
                output.display()
            ),
        )
    }
}

/// Run a configuration command against `source`.
pub fn execute_config(
    command: ConfigCommand,
    mut config: NotesConfig,
    source: &ConfigSource,
    out: &mut dyn Write,
) -> Result<()> {
    let print_all = |config: &NotesConfig, out: &mut dyn Write| -> Result<()> {
        for (key, value) in config.entries() {
            write_out(out, &format!("{key} = {value}"))?;
        }
        Ok(())
    };

    match command {
        ConfigCommand::Get { name, all } => match (name, all) {
            (Some(name), false) => write_out(out, &config.get(&name)?),
            (None, true) => {
                write_out(out, &format!("# {source}"))?;
                print_all(&config, out)
            }
            _ => Err(NotesError::usage("name a setting or pass --all")),
        },
        ConfigCommand::Set { name, value } => {
            config.set(&name, &value)?;
            source.save(&config)?;
            write_out(out, &format!("{name} = {}", config.get(&name)?))
        }
        ConfigCommand::Del { name, all } => {
            match (name, all) {
                (Some(name), false) => config.reset(&name)?,
                (None, true) => config = NotesConfig::new(),
                _ => return Err(NotesError::usage("name a setting or pass --all")),
            }
            source.save(&config)?;
            print_all(&config, out)
        }
    }
}

/// Run `cli` with `config` loaded from `source`.
pub fn run(cli: Cli, config: NotesConfig, source: &ConfigSource) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Config(command) => execute_config(command, config, source, &mut out),
        command => Context::from_config(&config).execute(command, &mut out),
    }
}
