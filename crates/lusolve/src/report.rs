//! The plain-text run log.

use std::{
    fmt,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Local};

use crate::Error;

/// Summary of one solver run, written once by the primary.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub order: usize,
    pub elapsed: Duration,
    /// Only the distributed solver reports the residual.
    pub residual: Option<f64>,
    pub timestamp: DateTime<Local>,
}

impl RunReport {
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let file = File::create(path).map_err(Error::io(path))?;
        let mut writer = BufWriter::new(file);
        write!(writer, "{self}")
            .and_then(|_| writer.flush())
            .map_err(Error::io(path))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input file        : {}", self.input.display())?;
        writeln!(f, "Output file       : {}", self.output.display())?;
        writeln!(f, "Matrix order      : {}", self.order)?;
        writeln!(
            f,
            "Elapsed time      : {:.6} seconds",
            self.elapsed.as_secs_f64()
        )?;
        if let Some(residual) = self.residual {
            writeln!(f, "Residual L2 norm  : {residual:.6e}")?;
        }
        writeln!(
            f,
            "Timestamp         : {}",
            self.timestamp.format("%a %b %e %H:%M:%S %Y")
        )
    }
}
