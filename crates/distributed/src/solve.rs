//! Distributed triangular solves.
//!
//! Unknown `k` belongs to the worker owning the row pivoted at step `k`. That worker computes it
//! from the entries already broadcast and broadcasts it in turn, so every worker ends up with the
//! full `y` and, after the back solve, the full `x`.

use nalgebra::RealField;

use linear::matrix::dot;

use crate::{comm::Element, factor::LocalLu, Comm, Error, Partition};

/// Solves `L y = P b` then `U x = y` and returns the complete `x` on every worker.
///
/// `local_b` holds this worker's rows of `b`.
pub fn solve<C, T>(
    ctx: &C,
    partition: &Partition,
    lu: &LocalLu<T>,
    local_b: &[T],
) -> Result<Vec<T>, Error>
where
    C: Comm,
    T: RealField + Element,
{
    let n = partition.order();
    let block = lu.block();
    if local_b.len() != block.count {
        return Err(linear::Error::DimensionMismatch {
            expected: block.count,
            found: local_b.len(),
        }
        .into());
    }
    let perm = lu.permutation().as_slice();

    // y[k] = b[perm[k]] - sum_{j<k} L[k][j] y[j]
    let mut y: Vec<T> = Vec::with_capacity(n);
    for (k, &row) in perm.iter().enumerate() {
        let value = lu.row(row).map(|lu_row| {
            let b_k = local_b[row - block.start];
            b_k - dot(&lu_row[..k], &y[..k])
        });
        y.push(ctx.broadcast(partition.owner(row), value)?);
    }

    // x[k] = (y[k] - sum_{j>k} U[k][j] x[j]) / U[k][k]
    let mut x = vec![T::zero(); n];
    for (k, &row) in perm.iter().enumerate().rev() {
        let value = lu
            .row(row)
            .map(|lu_row| (y[k] - dot(&lu_row[k + 1..], &x[k + 1..])) / lu_row[k]);
        x[k] = ctx.broadcast(partition.owner(row), value)?;
    }

    Ok(x)
}
