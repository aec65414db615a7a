mod dense;
pub mod factor;
pub mod matrix;
pub mod pivot;
pub mod residual;
mod traits;
pub mod triangular;

pub use dense::Dense;
pub use factor::{factorize, Lu};
pub use matrix::{LinearSystem, Matrix};
pub use pivot::{select_pivots, Permutation};
pub use traits::LSolver;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("A singular matrix was encountered during a LU factorization (col {col})")]
    SingularMatrix { col: usize },

    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Expected a square matrix, found {nrows}x{ncols}")]
    NotSquare { nrows: usize, ncols: usize },

    #[error("Not a permutation: row {row} is out of range or repeated")]
    InvalidPermutation { row: usize },

    #[error("Value at index {index} is not representable in the target precision")]
    NotRepresentable { index: usize },

    /// Working memory could not be reserved.
    #[error("Failed to allocate {bytes} bytes for a {what}")]
    AllocationFailure { what: &'static str, bytes: usize },

    #[error("solve() called before a successful setup()")]
    NotFactorized,
}
