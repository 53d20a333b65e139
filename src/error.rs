use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown property: \"{0}\"")]
    UnknownProperty(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("could not enumerate block devices in {path:?}: {source}")]
    Enumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
