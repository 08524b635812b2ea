//! Error types for squad-core

use std::path::PathBuf;

/// Result type for squad-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in squad-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An agent or team file whose structured header cannot be parsed
    #[error("Malformed definition for {unit} at {path}: {reason}")]
    UnitDefinitionMalformed {
        unit: String,
        path: PathBuf,
        reason: String,
    },

    /// An agent or team that does not exist in the source store
    #[error("{kind} '{id}' not found at {path}")]
    UnitNotFound {
        kind: String,
        id: String,
        path: PathBuf,
    },

    /// A manifest that exists but cannot be parsed
    #[error("Manifest at {path} is malformed: {reason}")]
    ManifestMalformed { path: PathBuf, reason: String },

    /// An install request that is missing required fields
    #[error("Invalid install request: {0}")]
    InvalidRequest(String),

    /// A decision provider returned a choice that was not offered
    #[error("Choice '{choice}' was not offered for: {prompt}")]
    InvalidDecision { choice: String, prompt: String },

    /// A decision provider could not produce an answer at all
    #[error("No answer for '{prompt}': {reason}")]
    DecisionFailed { prompt: String, reason: String },

    /// Update or repair invoked on a directory without a managed install
    #[error("No managed installation found in {path}")]
    NoManagedInstall { path: PathBuf },

    /// Expansion pack id unknown to the source store
    #[error("Expansion pack not found: {0}")]
    PackNotFound(String),

    /// Filesystem error from squad-fs
    #[error(transparent)]
    Fs(#[from] squad_fs::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Fs(squad_fs::Error::io(path, source))
    }
}
