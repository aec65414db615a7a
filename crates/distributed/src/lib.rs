//! Row-block distributed LU factorization.
//!
//! Every worker runs the same program over its own contiguous block of rows (SPMD) and talks to
//! the others only through the messages and collectives of a [`Comm`]. In production that is
//! [`MpiComm`], one process per worker; the `local` feature adds a thread-backed group for tests.
//! The pieces are:
//!
//! * [`partition`] decides which rows each worker owns,
//! * [`factor`] eliminates the owned rows, with one pivot-row broadcast per elimination step,
//! * [`solve`] runs forward and back substitution with one broadcast per unknown,
//! * [`residual`] sum-reduces the per-block squared errors onto the primary,
//! * [`coordinator`] ties these together around the input scatter and the timed region.

pub mod comm;
pub mod coordinator;
pub mod factor;
#[cfg(any(test, feature = "local"))]
pub mod local;
mod mpi_comm;
pub mod partition;
pub mod residual;
pub mod solve;

pub use comm::{Comm, PRIMARY};
pub use mpi_comm::MpiComm;
pub use partition::{Partition, RowBlock};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("At least one worker is required")]
    NoWorkers,

    /// The peer exited (returned an error or panicked) while others still expected messages.
    #[error("Worker {peer} disconnected")]
    Disconnected { peer: usize },

    #[error("Unexpected message from worker {peer}: expected {expected}")]
    Protocol { peer: usize, expected: &'static str },

    #[error("Worker {rank} panicked")]
    WorkerPanicked { rank: usize },

    #[error("Failed to spawn worker {rank}")]
    Spawn {
        rank: usize,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Linear(#[from] linear::Error),
}

impl Error {
    /// True for errors that are only a consequence of another worker failing first.
    pub fn is_secondary(&self) -> bool {
        matches!(self, Error::Disconnected { .. })
    }
}
