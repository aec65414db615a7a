//! Residual of a computed solution, `||A x - b||_2`.
//!
//! `A` may be a row block: the squared error is then the contribution of those rows, which a
//! caller sums over all blocks before taking the root.

use nalgebra::RealField;
use rayon::prelude::*;

use crate::{matrix::dot, Error, Matrix};

/// `sum_i (A[i] . x - b[i])^2` over the rows of `mat_a`.
///
/// Rows are evaluated in parallel; the sum itself runs in row order so the result does not depend
/// on the thread count.
pub fn squared_error<T>(mat_a: &Matrix<T>, x: &[T], b: &[T]) -> Result<T, Error>
where
    T: RealField + Copy + Send + Sync,
{
    if mat_a.ncols() != x.len() {
        return Err(Error::DimensionMismatch {
            expected: mat_a.ncols(),
            found: x.len(),
        });
    }
    if mat_a.nrows() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: mat_a.nrows(),
            found: b.len(),
        });
    }
    if mat_a.ncols() == 0 {
        return Ok(b.iter().fold(T::zero(), |acc, &b_i| acc + b_i * b_i));
    }

    let terms: Vec<T> = mat_a
        .as_slice()
        .par_chunks_exact(mat_a.ncols())
        .zip(b.par_iter())
        .map(|(row, &b_i)| {
            let r = dot(row, x) - b_i;
            r * r
        })
        .collect();

    Ok(terms.into_iter().fold(T::zero(), |acc, t| acc + t))
}

/// `||A x - b||_2`.
pub fn norm<T>(mat_a: &Matrix<T>, x: &[T], b: &[T]) -> Result<T, Error>
where
    T: RealField + Copy + Send + Sync,
{
    Ok(squared_error(mat_a, x, b)?.sqrt())
}
