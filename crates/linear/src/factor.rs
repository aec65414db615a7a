//! Doolittle LU factorization of a row-permuted matrix.

use log::debug;
use nalgebra::RealField;

use crate::{
    matrix::dot,
    pivot::{singular_tolerance, Permutation},
    Error, Matrix,
};

/// The factors of `P A = L U`.
#[derive(Clone, Debug)]
pub struct Lu<T> {
    perm: Permutation,
    p: Matrix<T>,
    l: Matrix<T>,
    u: Matrix<T>,
}

impl<T: RealField + Copy> Lu<T> {
    /// Unit lower triangular factor.
    pub fn l(&self) -> &Matrix<T> {
        &self.l
    }

    /// Upper triangular factor.
    pub fn u(&self) -> &Matrix<T> {
        &self.u
    }

    /// Permutation matrix.
    pub fn p(&self) -> &Matrix<T> {
        &self.p
    }

    pub fn permutation(&self) -> &Permutation {
        &self.perm
    }

    pub fn order(&self) -> usize {
        self.perm.len()
    }
}

/// Factors `P A` into `L U` using the Doolittle recurrence, one column at a time:
///
/// ```text
/// U[j][i] = A'[j][i] - sum_{k<j} L[j][k] U[k][i]             for j <= i
/// L[j][i] = (A'[j][i] - sum_{k<i} L[j][k] U[k][i]) / U[i][i]  for j > i
/// ```
///
/// where `A' = P A`. No pivoting happens here; `perm` must come from
/// [`select_pivots`](crate::pivot::select_pivots) (or any permutation leaving non-zero leading
/// minors).
///
/// # Errors
///
/// [`Error::SingularMatrix`] if some `U[i][i]` is numerically zero.
pub fn factorize<T: RealField + Copy>(perm: &Permutation, mat_a: &Matrix<T>) -> Result<Lu<T>, Error> {
    let n = mat_a.order()?;
    if perm.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: perm.len(),
        });
    }

    let p = perm.matrix()?;
    let a_prime = p.matmul(mat_a)?;
    let tolerance = singular_tolerance(n, mat_a.max_abs());

    let mut l = Matrix::identity(n)?;
    let mut u = Matrix::zeros(n, n)?;
    // column i of U, gathered so the inner sums run over contiguous slices
    let mut u_col = Vec::with_capacity(n);

    for i in 0..n {
        u_col.clear();
        for j in 0..=i {
            let s = dot(&l.row(j)[..j], &u_col[..j]);
            let u_ji = a_prime[(j, i)] - s;
            u[(j, i)] = u_ji;
            u_col.push(u_ji);
        }

        let u_ii = u[(i, i)];
        if !(u_ii.abs() > tolerance) {
            return Err(Error::SingularMatrix { col: i });
        }

        for j in (i + 1)..n {
            let s = dot(&l.row(j)[..i], &u_col[..i]);
            l[(j, i)] = (a_prime[(j, i)] - s) / u_ii;
        }
    }

    debug!("factored matrix of order {n}");

    Ok(Lu {
        perm: perm.clone(),
        p,
        l,
        u,
    })
}
