//! Error types for external reference resolution.

use thiserror::Error;

/// Reasons a lookup produced no label or description.
///
/// Every variant is a degraded lookup: callers keep the reference and
/// report the error as a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Transport failure, non-200 status or unparseable body
    #[error("lookup of '{term}' at {resource} unavailable: {reason}")]
    LookupUnavailable {
        /// Resource that was queried
        resource: String,
        /// Term that was looked up
        term: String,
        /// What went wrong
        reason: String,
    },

    /// The service answered but returned no results
    #[error("{resource} has no entry matching '{term}'")]
    NoMatch {
        /// Resource that was queried
        resource: String,
        /// Term that was looked up
        term: String,
    },

    /// Neither accession nor URL gave anything to look up
    #[error("nothing to look up for {resource}: empty accession and URL")]
    MissingTerm {
        /// Resource named by the reference
        resource: String,
    },
}

impl ResolveError {
    /// Create a lookup-unavailable error.
    pub fn unavailable(
        resource: impl Into<String>,
        term: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::LookupUnavailable {
            resource: resource.into(),
            term: term.into(),
            reason: reason.into(),
        }
    }
}
