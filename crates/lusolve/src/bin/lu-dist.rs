use std::path::PathBuf;

use clap::Parser;
use distributed::{Comm, MpiComm};
use lusolve::{parse_cli, solver::run_distributed, EXIT_FAILURE};

/// Launch with `mpirun -n W lu-dist ...`; rank 0 reads the input and writes the outputs.
#[derive(Parser, Debug)]
#[command(
    name = "lu-dist",
    about = "Solve Ax = b with an LU factorization distributed over the MPI processes"
)]
struct Cli {
    /// System file (i32 n, f32 A row-major, f32 b)
    input: PathBuf,

    /// Solution file to write (f64 x)
    output: PathBuf,

    /// Run log to write
    log: PathBuf,
}

fn main() {
    pretty_env_logger::init();
    let cli: Cli = parse_cli();

    let Some(universe) = mpi::initialize() else {
        eprintln!("error: MPI is already initialized");
        std::process::exit(EXIT_FAILURE)
    };
    let comm = MpiComm::new(universe.world());

    match run_distributed(&comm, &cli.input, &cli.output, &cli.log) {
        Ok(Some(report)) => print!("{report}"),
        Ok(None) => {}
        Err(e) => {
            if comm.is_primary() {
                eprintln!("error: {e}");
            } else {
                eprintln!("error on worker {}: {e}", comm.rank());
            }
            // The other workers may be blocked in a collective the failed one never enters.
            if comm.size() > 1 {
                comm.abort(EXIT_FAILURE)
            }
            drop(comm);
            drop(universe);
            std::process::exit(EXIT_FAILURE)
        }
    }
}
