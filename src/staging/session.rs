//! Memory of the last document touched by a mutating command.

use std::path::{Path, PathBuf};

use crate::error::{NotesError, Result};

/// Session file holding the canonical path of the last edited document.
#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
}

impl Session {
    /// Session backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `canonical` as the last touched document.
    pub fn record(&self, canonical: &Path) -> Result<()> {
        let absolute = std::path::absolute(canonical).map_err(|e| NotesError::io(canonical, e))?;
        let text = absolute.to_string_lossy().into_owned();
        std::fs::write(&self.path, text).map_err(|e| NotesError::io(&self.path, e))?;
        log::debug!("Recorded {:?} in session {:?}", absolute, self.path);
        Ok(())
    }

    /// The last touched document, if any was recorded.
    pub fn last(&self) -> Result<Option<PathBuf>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let text = text.trim();
                Ok((!text.is_empty()).then(|| PathBuf::from(text)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(NotesError::io(&self.path, e)),
        }
    }

    /// Forget the last touched document.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NotesError::io(&self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_recall() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(dir.path().join(".session"));

        assert_eq!(session.last().unwrap(), None);

        let doc = dir.path().join("emd_1014.json");
        session.record(&doc).unwrap();
        assert_eq!(session.last().unwrap(), Some(doc));

        session.clear().unwrap();
        assert_eq!(session.last().unwrap(), None);
        session.clear().unwrap();
    }
}
