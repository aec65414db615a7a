use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or out-of-range command line parameter.
    #[error("Invalid argument: {msg}")]
    InvalidArgument { msg: String },

    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is truncated: expected {expected} bytes, found {found}", .path.display())]
    Truncated {
        path: PathBuf,
        expected: u64,
        found: u64,
    },

    #[error("{} has an invalid header: matrix order {order}", .path.display())]
    BadHeader { path: PathBuf, order: i32 },

    #[error(transparent)]
    Linear(#[from] linear::Error),

    #[error(transparent)]
    Distributed(#[from] distributed::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { path, source }
    }

    /// True for errors that only report another worker's failure.
    pub fn is_secondary(&self) -> bool {
        matches!(self, Error::Distributed(e) if e.is_secondary())
    }
}
