//! File formats, the run log, the test-system generator and the drivers behind the `lu-gen`,
//! `lu-seq` and `lu-dist` binaries.

mod error;
pub mod generate;
pub mod io;
mod report;
pub mod solver;

pub use error::Error;
pub use generate::MatrixKind;
pub use report::RunReport;

use clap::Parser;

/// Exit status of every failed run.
pub const EXIT_FAILURE: i32 = 1;

/// Parses the command line. Usage errors exit with [`EXIT_FAILURE`], `--help` and `--version`
/// exit with 0.
pub fn parse_cli<C: Parser>() -> C {
    C::try_parse().unwrap_or_else(|e| {
        if !e.use_stderr() {
            e.exit()
        }
        let _ = e.print();
        std::process::exit(EXIT_FAILURE)
    })
}

/// Unwraps the result of a run, or prints the error and exits with [`EXIT_FAILURE`].
pub fn exit_on_error<T>(result: Result<T, Error>) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FAILURE)
    })
}
