use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("malformed template document at path {path}")]
    MalformedDocument {
        source: serde_json::Error,
        path: String,
    },

    #[error("could not serialize template document for path {path}")]
    Serialize {
        source: serde_json::Error,
        path: String,
    },

    #[error("path {path} points outside of the template root {}", .root.display())]
    OutsideRoot { path: String, root: PathBuf },

    #[error(transparent)]
    Io {
        #[from]
        source: io::Error,
    },
}

impl StoreError {
    pub(crate) fn malformed_document(source: serde_json::Error, path: impl Into<String>) -> Self {
        Self::MalformedDocument {
            source,
            path: path.into(),
        }
    }

    pub(crate) fn serialize(source: serde_json::Error, path: impl Into<String>) -> Self {
        Self::Serialize {
            source,
            path: path.into(),
        }
    }

    pub(crate) fn outside_root(path: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self::OutsideRoot {
            path: path.into(),
            root: root.into(),
        }
    }
}
