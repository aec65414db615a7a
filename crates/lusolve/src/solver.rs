//! The two solver drivers: read the system, solve it, write `x` and the run log.

use std::{path::Path, time::Instant};

use chrono::Local;
use log::info;

use distributed::{coordinator, Comm};
use linear::{residual, Dense, LSolver, LinearSystem};

use crate::{
    io::{read_system, write_solution},
    Error, RunReport,
};

/// Solves in this process. The log carries no residual line.
pub fn run_sequential(input: &Path, output: &Path, log: &Path) -> Result<RunReport, Error> {
    let system: LinearSystem<f64> = read_system(input)?.cast()?;
    let n = system.order();

    let start = Instant::now();
    let mut dense = Dense::new();
    dense.setup(&system.a)?;
    let x = dense.solve(&system.b)?;
    let elapsed = start.elapsed();

    let norm = residual::norm(&system.a, &x, &system.b)?;
    info!("solved order {n} in {elapsed:?}, residual {norm:e}");

    write_solution(output, &x)?;
    let report = RunReport {
        input: input.into(),
        output: output.into(),
        order: n,
        elapsed,
        residual: None,
        timestamp: Local::now(),
    };
    report.write(log)?;
    Ok(report)
}

/// Solves on the worker group behind `comm`. Every worker calls this; only the primary touches
/// the file system and gets the report back.
///
/// An error on the primary before the solve (unreadable input, say) leaves the other workers
/// waiting in the first collective, so the caller must tear the group down on any error.
pub fn run_distributed<C: Comm>(
    comm: &C,
    input: &Path,
    output: &Path,
    log: &Path,
) -> Result<Option<RunReport>, Error> {
    let system = if comm.is_primary() {
        Some(read_system(input)?)
    } else {
        None
    };
    let outcome = coordinator::solve(comm, system)?;
    if !comm.is_primary() {
        return Ok(None);
    }

    write_solution(output, &outcome.x)?;
    let report = RunReport {
        input: input.into(),
        output: output.into(),
        order: outcome.order,
        elapsed: outcome.elapsed,
        residual: outcome.residual,
        timestamp: Local::now(),
    };
    report.write(log)?;
    info!("wrote {} and {}", output.display(), log.display());
    Ok(Some(report))
}
