use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::transform::TransformError;

/// Errors surfaced by a full file-to-file run.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O step failed; `stage` names which one.
    #[error("{stage} '{}': {source}", .path.display())]
    Io {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input and output refer to the same file. Rejected before the output
    /// is opened, otherwise the truncating create would destroy the input.
    #[error("input and output are the same file: '{}'", .0.display())]
    SameFile(PathBuf),

    /// The cooperative transform failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl Error {
    pub(crate) fn io(stage: &'static str, path: &Path, source: io::Error) -> Self {
        Error::Io {
            stage,
            path: path.to_path_buf(),
            source,
        }
    }
}
