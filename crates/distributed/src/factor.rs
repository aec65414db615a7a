//! Distributed elimination with partial pivoting over row blocks.
//!
//! At step `k` every worker proposes its best unused row for column `k`, an all-gather of the
//! proposals settles the global pivot, and the owner broadcasts that row from column `k` on
//! (the `k`-th row of `U`, pivot value first). Each worker then eliminates its own unused rows against it. Rows never
//! move between workers: the permutation is the sequence of pivot rows, which every worker has
//! seen.

use log::{debug, trace};
use nalgebra::RealField;

use linear::{
    pivot::{eliminate, singular_tolerance, Candidate},
    Matrix, Permutation,
};

use crate::{comm::Element, Comm, Error, Partition, RowBlock};

/// Row index sent by a worker with no candidate left.
const NO_ROW: u64 = u64::MAX;

/// One worker's share of `P A = L U`.
#[derive(Clone, Debug)]
pub struct LocalLu<T> {
    block: RowBlock,
    /// Owned rows after elimination. For a row pivoted at step `s`, columns `< s` hold its `L`
    /// multipliers and columns `>= s` its `U` entries.
    lu: Matrix<T>,
    /// Global pivot sequence, identical on every worker.
    perm: Permutation,
}

impl<T: RealField + Copy> LocalLu<T> {
    pub fn block(&self) -> RowBlock {
        self.block
    }

    pub fn permutation(&self) -> &Permutation {
        &self.perm
    }

    /// The eliminated row for the global `row`, if this worker owns it.
    pub fn row(&self, row: usize) -> Option<&[T]> {
        self.block.local(row).map(|r| self.lu.row(r))
    }
}

/// Factors the distributed matrix whose rows `partition.block(rank)` are `local_a`.
///
/// Must be called by every worker of the group. A zero pivot is detected identically on every
/// worker, so all of them return [`linear::Error::SingularMatrix`] for the same column.
pub fn factorize<C, T>(
    ctx: &C,
    partition: &Partition,
    local_a: Matrix<T>,
) -> Result<LocalLu<T>, Error>
where
    C: Comm,
    T: RealField + Element,
{
    let n = partition.order();
    let block = partition.block(ctx.rank());
    if local_a.nrows() != block.count || local_a.ncols() != n {
        return Err(linear::Error::DimensionMismatch {
            expected: block.count * n,
            found: local_a.nrows() * local_a.ncols(),
        }
        .into());
    }

    let max_abs = ctx.all_reduce(local_a.max_abs(), |a: T, b: T| a.max(b))?;
    let tolerance = singular_tolerance(n, max_abs);

    let mut lu = local_a;
    let mut used = vec![false; block.count];
    let mut rows = Vec::with_capacity(n);

    for k in 0..n {
        let proposal = (0..block.count)
            .filter(|&r| !used[r])
            .map(|r| Candidate {
                row: block.start + r,
                magnitude: lu[(r, k)].abs(),
            })
            .reduce(Candidate::max);

        let pivot = exchange(ctx, proposal)?
            .ok_or(linear::Error::SingularMatrix { col: k })?
            .accept(k, tolerance)?;

        let owner = partition.owner(pivot.row);
        let segment = block.local(pivot.row).map(|r| {
            used[r] = true;
            lu.row(r)[k..].to_vec()
        });
        let pivot_row = ctx.broadcast_vec(owner, segment, n - k)?;
        trace!("worker {} step {k}: pivot row {} from {owner}", ctx.rank(), pivot.row);

        rows.push(pivot.row);
        eliminate(&mut lu, &used, k, &pivot_row);
    }

    debug!("worker {} eliminated rows {:?}", ctx.rank(), block.rows());

    Ok(LocalLu {
        block,
        lu,
        perm: Permutation::from_rows(rows)?,
    })
}

/// The best of all workers' proposals, identical on every worker.
fn exchange<C, T>(ctx: &C, proposal: Option<Candidate<T>>) -> Result<Option<Candidate<T>>, Error>
where
    C: Comm,
    T: RealField + Element,
{
    let (row, magnitude) = match proposal {
        Some(c) => (c.row as u64, c.magnitude),
        None => (NO_ROW, T::zero()),
    };
    let rows = ctx.all_gather(&[row])?;
    let magnitudes = ctx.all_gather(&[magnitude])?;
    Ok(rows
        .into_iter()
        .zip(magnitudes)
        .filter(|&(row, _)| row != NO_ROW)
        .map(|(row, magnitude)| Candidate {
            row: row as usize,
            magnitude,
        })
        .reduce(Candidate::max))
}
