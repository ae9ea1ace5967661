use std::path::PathBuf;

use thiserror::Error;

/// Error type for tag resolution and rewriting operations
#[derive(Debug, Error)]
pub enum BumpError {
    #[error("Unrecognized tag format: {0:?}")]
    UnrecognizedTagFormat(String),

    #[error("Malformed commit descriptor {descriptor:?}: {reason}")]
    MalformedCommitDescriptor { descriptor: String, reason: String },

    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),

    #[error("No suitable tag found for {0}")]
    NoSuitableTag(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BumpError>;
