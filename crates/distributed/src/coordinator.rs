//! End-to-end distributed solve of one system.
//!
//! 1. The primary broadcasts the order `n`.
//! 2. The primary sends every other worker its row block of `A` and `b` in storage precision
//!    (`f32`); each worker converts its own block to working precision (`f64`).
//! 3. A barrier opens the timed region: factorization, then the triangular solves.
//! 4. A barrier closes it. Every worker now holds the full `x`.
//! 5. The per-block squared residuals are sum-reduced onto the primary.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use linear::{matrix::cast_slice, LinearSystem, Matrix};

use crate::{factor, residual, solve, Comm, Error, Partition, PRIMARY};

/// What a worker knows after a distributed solve.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub order: usize,
    /// The solution, replicated on every worker.
    pub x: Vec<f64>,
    /// Time between the two barriers around factorization and solve, as seen by this worker.
    pub elapsed: Duration,
    /// `||A x - b||_2`, on the primary only.
    pub residual: Option<f64>,
}

/// Solves the system held by the primary on all workers of the group.
///
/// The primary passes `Some(system)`, every other worker `None`. Must be called by every worker.
pub fn solve<C: Comm>(ctx: &C, system: Option<LinearSystem<f32>>) -> Result<Outcome, Error> {
    let rank = ctx.rank();
    let n = ctx.broadcast(PRIMARY, system.as_ref().map(|s| s.order() as u64))? as usize;
    let partition = Partition::new(n, ctx.size())?;
    if ctx.is_primary() && !partition.is_even() {
        warn!(
            "order {n} is not divisible by {} workers; the first {} workers own one extra row",
            ctx.size(),
            n % ctx.size()
        );
    }

    let (stored_a, stored_b) = distribute(ctx, &partition, system)?;
    let block = partition.block(rank);
    debug!("worker {rank} owns rows {:?}", block.rows());

    let local_a: Matrix<f64> = Matrix::from_vec(block.count, n, stored_a)?.cast()?;
    let local_b: Vec<f64> = cast_slice(&stored_b)?;
    let work = local_a.try_clone()?;

    ctx.barrier()?;
    let start = Instant::now();

    let lu = factor::factorize(ctx, &partition, work)?;
    let x = solve::solve(ctx, &partition, &lu, &local_b)?;

    ctx.barrier()?;
    let elapsed = start.elapsed();

    let residual = residual::global_norm(ctx, &local_a, &x, &local_b)?;
    if let Some(r) = residual {
        info!("solved order {n} on {} workers in {elapsed:?}, residual {r:e}", ctx.size());
    }

    Ok(Outcome {
        order: n,
        x,
        elapsed,
        residual,
    })
}

/// Sends each worker its rows of `A` and `b`; returns this worker's own share.
fn distribute<C: Comm>(
    ctx: &C,
    partition: &Partition,
    system: Option<LinearSystem<f32>>,
) -> Result<(Vec<f32>, Vec<f32>), Error> {
    let n = partition.order();
    if !ctx.is_primary() {
        let block = partition.block(ctx.rank());
        let a = ctx.recv::<f32>(PRIMARY)?;
        let b = ctx.recv::<f32>(PRIMARY)?;
        if a.len() != block.count * n || b.len() != block.count {
            return Err(Error::Protocol {
                peer: PRIMARY,
                expected: "this worker's row block",
            });
        }
        return Ok((a, b));
    }

    let system = system.ok_or(Error::Protocol {
        peer: PRIMARY,
        expected: "the system on the primary",
    })?;
    for rank in (0..ctx.size()).filter(|&r| r != PRIMARY) {
        let block = partition.block(rank);
        ctx.send(rank, system.a.row_block(block.start, block.count))?;
        ctx.send(rank, &system.b[block.rows()])?;
    }

    let own = partition.block(PRIMARY);
    Ok((
        system.a.row_block(own.start, own.count).to_vec(),
        system.b[own.rows()].to_vec(),
    ))
}
