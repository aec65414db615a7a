use crate::{Error, Matrix};

/// A direct solver for square systems `A x = b`.
pub trait LSolver<T> {
    /// Performs any setup needed for subsequent solves with the matrix `mat_a`, e.g. a
    /// factorization. `mat_a` itself is not modified.
    fn setup(&mut self, mat_a: &Matrix<T>) -> Result<(), Error>;

    /// Solves `A x = b` for the matrix given to the last successful [`setup`](Self::setup).
    ///
    /// ## Arguments
    /// * `b` the linear system right-hand side.
    ///
    /// ## Errors
    /// [`Error::NotFactorized`] if called before `setup`.
    fn solve(&self, b: &[T]) -> Result<Vec<T>, Error>;
}
