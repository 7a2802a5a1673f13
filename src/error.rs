//! Fatal data errors raised while reading metadata and measurement files.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} did not contain any data rows")]
    EmptyTrace { path: PathBuf },

    #[error("{path} has no values in column {column}")]
    EmptyColumn {
        path: PathBuf,
        column: &'static str,
    },
}

impl DatasetError {
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        DatasetError::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }
}
