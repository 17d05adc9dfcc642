use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure that ends a tree walk. There is no partial recovery: the first
/// error stops the traversal.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("failed to read directory {}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("failed to read an entry of {}", path.display())]
    ReadEntry { path: PathBuf, source: io::Error },

    #[error("failed to write output")]
    Write(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, TreeError>;
