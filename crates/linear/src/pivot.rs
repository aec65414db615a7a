//! Partial pivoting.
//!
//! The pivot at elimination step `k` is the row, among those not yet chosen, holding the largest
//! magnitude in column `k` of the partially eliminated matrix. Rows are never physically moved;
//! a row is only marked as used once it has served as a pivot, and ties go to the lowest row index.
//! The distributed factorization applies the same rule to the rows each worker owns, so both
//! paths produce the same permutation for the same input.

use std::cmp::Ordering;

use approx::AbsDiffEq;
use log::trace;
use nalgebra::RealField;

use crate::{Error, Matrix};

/// A pivot candidate: a row and the magnitude of its entry in the current column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate<T> {
    pub row: usize,
    pub magnitude: T,
}

impl<T: RealField + Copy> Candidate<T> {
    /// The better of two candidates: larger magnitude, then lower row index.
    pub fn max(self, other: Self) -> Self {
        match other.magnitude.partial_cmp(&self.magnitude) {
            Some(Ordering::Greater) => other,
            Some(Ordering::Equal) if other.row < self.row => other,
            _ => self,
        }
    }

    /// Accepts the candidate as the pivot of column `col`, or reports the column as singular.
    pub fn accept(self, col: usize, tolerance: T) -> Result<Self, Error> {
        match self.magnitude.partial_cmp(&tolerance) {
            Some(Ordering::Greater) => Ok(self),
            _ => Err(Error::SingularMatrix { col }),
        }
    }
}

/// Magnitude below which a pivot of an order-`n` matrix whose largest entry is `max_abs` counts
/// as zero.
pub fn singular_tolerance<T: RealField + Copy>(n: usize, max_abs: T) -> T {
    T::default_epsilon() * nalgebra::convert::<f64, T>(n as f64) * max_abs
}

/// A row permutation. Position `k` of the permuted matrix holds row `rows[k]` of the original.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    rows: Vec<usize>,
}

impl Permutation {
    pub fn identity(n: usize) -> Self {
        Permutation {
            rows: (0..n).collect(),
        }
    }

    /// Validates that `rows` is a bijection on `0..rows.len()`.
    pub fn from_rows(rows: Vec<usize>) -> Result<Self, Error> {
        let mut seen = vec![false; rows.len()];
        for &r in &rows {
            match seen.get_mut(r) {
                Some(s) if !*s => *s = true,
                _ => return Err(Error::InvalidPermutation { row: r }),
            }
        }
        Ok(Permutation { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.rows
    }

    pub fn is_identity(&self) -> bool {
        self.rows.iter().enumerate().all(|(k, &r)| k == r)
    }

    /// Materializes the permutation matrix `P`, with `P[k][rows[k]] = 1`.
    pub fn matrix<T: RealField + Copy>(&self) -> Result<Matrix<T>, Error> {
        let n = self.rows.len();
        let mut p = Matrix::zeros(n, n)?;
        for (k, &r) in self.rows.iter().enumerate() {
            p[(k, r)] = T::one();
        }
        Ok(p)
    }
}

/// Computes the partial-pivoting permutation of the square matrix `mat_a`.
///
/// Elimination runs on a scratch copy, `mat_a` is left untouched.
///
/// # Errors
///
/// * [`Error::SingularMatrix`] if the best candidate of some column is numerically zero.
/// * [`Error::NotSquare`] / [`Error::AllocationFailure`].
pub fn select_pivots<T: RealField + Copy>(mat_a: &Matrix<T>) -> Result<Permutation, Error> {
    let n = mat_a.order()?;
    let tolerance = singular_tolerance(n, mat_a.max_abs());
    let mut work = mat_a.try_clone()?;
    let mut used = vec![false; n];
    let mut rows = Vec::with_capacity(n);
    let mut pivot_row = Vec::with_capacity(n);

    for k in 0..n {
        let pivot = (0..n)
            .filter(|&r| !used[r])
            .map(|r| Candidate {
                row: r,
                magnitude: work[(r, k)].abs(),
            })
            .reduce(Candidate::max)
            .ok_or(Error::SingularMatrix { col: k })?
            .accept(k, tolerance)?;

        trace!("pivot for column {k}: row {}", pivot.row);
        used[pivot.row] = true;
        rows.push(pivot.row);

        pivot_row.clear();
        pivot_row.extend_from_slice(&work.row(pivot.row)[k..]);
        eliminate(&mut work, &used, k, &pivot_row);
    }

    Ok(Permutation { rows })
}

/// One elimination step: subtracts multiples of `pivot_row` (columns `k..`) from every unused
/// row, leaving the multiplier in column `k`.
pub fn eliminate<T: RealField + Copy>(
    work: &mut Matrix<T>,
    used: &[bool],
    k: usize,
    pivot_row: &[T],
) {
    let pivot = pivot_row[0];
    for (row, _) in work
        .rows_mut()
        .zip(used.iter())
        .filter(|(_, u)| !**u)
    {
        let mult = row[k] / pivot;
        row[k] = mult;
        if mult != T::zero() {
            for (a_rj, &p_j) in row[k + 1..].iter_mut().zip(&pivot_row[1..]) {
                *a_rj -= mult * p_j;
            }
        }
    }
}
