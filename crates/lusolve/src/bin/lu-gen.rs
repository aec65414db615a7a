use std::{path::PathBuf, time::Instant};

use clap::Parser;
use lusolve::{exit_on_error, generate::write_generated, io::check_order, parse_cli, MatrixKind};

#[derive(Parser, Debug)]
#[command(name = "lu-gen", about = "Generate a dense linear system file for the LU solvers")]
struct Cli {
    /// Matrix order n
    #[arg(allow_negative_numbers = true)]
    order: i64,

    /// System file to write
    output: PathBuf,

    /// 0: entries uniform in [-10, 10), 1: diagonally dominant
    #[arg(value_parser = clap::value_parser!(u8).range(0..=1), default_value_t = 0)]
    kind: u8,
}

fn main() {
    pretty_env_logger::init();
    let cli: Cli = parse_cli();

    let n = exit_on_error(check_order(cli.order));
    let kind = exit_on_error(MatrixKind::try_from(cli.kind));

    let start = Instant::now();
    exit_on_error(write_generated(&cli.output, n, kind));
    println!(
        "Wrote {kind:?} system of order {n} to {} in {:.3} seconds",
        cli.output.display(),
        start.elapsed().as_secs_f64()
    );
}
