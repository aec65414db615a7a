use std::path::PathBuf;

use clap::Parser;
use lusolve::{exit_on_error, parse_cli, solver::run_sequential};

#[derive(Parser, Debug)]
#[command(name = "lu-seq", about = "Solve Ax = b with a sequential LU factorization")]
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

    let report = exit_on_error(run_sequential(&cli.input, &cli.output, &cli.log));
    print!("{report}");
}
