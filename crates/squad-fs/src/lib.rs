//! Filesystem primitives for the AI Squad installer
//!
//! Provides normalized relative paths, atomic writes, a format-agnostic
//! config store, content fingerprints, recursive file listing and
//! side-by-side backups.

pub mod backup;
pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod walk;

pub use backup::backup_file;
pub use checksum::{fingerprint_bytes, fingerprint_file};
pub use config::ConfigStore;
pub use constants::SquadPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use walk::list_files;
