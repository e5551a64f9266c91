use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the event table
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}
