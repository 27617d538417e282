use std::{io, path::PathBuf};

/// Failure to load a `package.json`. Fatal for the file being checked, never
/// for the run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("malformed manifest {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("malformed manifest {path}: top-level value is not an object")]
    NotAnObject { path: PathBuf },
}

impl ManifestError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ManifestError::Read { path, .. }
            | ManifestError::Parse { path, .. }
            | ManifestError::NotAnObject { path } => path,
        }
    }
}

/// Filesystem failure while probing for a module on disk. Logged and treated
/// as "not found".
#[derive(Debug, thiserror::Error)]
#[error("failed to probe {path}: {source}")]
pub struct ResolutionIoError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Invalid user options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid convertPath pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid tryExtensions entry '{0}': extensions must start with '.'")]
    Extension(String),
}
