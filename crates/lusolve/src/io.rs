//! Binary file formats.
//!
//! System file, little-endian:
//!
//! ```text
//! i32           n
//! f32[n * n]    A, row-major
//! f32[n]        b
//! ```
//!
//! Solution file: `f64[n]` little-endian, no header.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use linear::{matrix::try_alloc, LinearSystem, Matrix};

use crate::Error;

const HEADER_BYTES: u64 = 4;

/// Size in bytes of a system file of order `n`.
pub fn system_file_len(n: usize) -> u64 {
    let n = n as u64;
    HEADER_BYTES + 4 * (n * n + n)
}

/// Checks that `order` is a valid matrix order for the file format: `1 ..= i32::MAX`.
pub fn check_order(order: i64) -> Result<usize, Error> {
    if order <= 0 || order > i64::from(i32::MAX) {
        return Err(Error::InvalidArgument {
            msg: format!("invalid order {order}, expected 1 ..= {}", i32::MAX),
        });
    }
    Ok(order as usize)
}

/// Reads a system file in storage precision.
pub fn read_system(path: &Path) -> Result<LinearSystem<f32>, Error> {
    let file = File::open(path).map_err(Error::io(path))?;
    let found = file.metadata().map_err(Error::io(path))?.len();
    let mut reader = BufReader::new(file);

    let order = reader
        .read_i32::<LittleEndian>()
        .map_err(Error::io(path))?;
    if order <= 0 {
        return Err(Error::BadHeader {
            path: path.into(),
            order,
        });
    }
    let n = order as usize;

    let expected = system_file_len(n);
    if found < expected {
        return Err(Error::Truncated {
            path: path.into(),
            expected,
            found,
        });
    }

    let mut a = try_alloc(n * n, 0.0f32, "matrix")?;
    reader
        .read_f32_into::<LittleEndian>(&mut a)
        .map_err(Error::io(path))?;
    let mut b = try_alloc(n, 0.0f32, "vector")?;
    reader
        .read_f32_into::<LittleEndian>(&mut b)
        .map_err(Error::io(path))?;

    debug!("read system of order {n} from {}", path.display());
    Ok(LinearSystem::new(Matrix::from_vec(n, n, a)?, b)?)
}

/// Streams a system file: header first, then rows of `A` in order, then `b`.
pub struct SystemWriter {
    path: PathBuf,
    order: usize,
    rows_written: usize,
    writer: BufWriter<File>,
}

impl SystemWriter {
    pub fn create(path: &Path, order: usize) -> Result<Self, Error> {
        let header = i32::try_from(order)
            .ok()
            .filter(|&h| h > 0)
            .ok_or_else(|| Error::InvalidArgument {
                msg: format!("order {order} does not fit the file header"),
            })?;
        let file = File::create(path).map_err(Error::io(path))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_i32::<LittleEndian>(header)
            .map_err(Error::io(path))?;
        Ok(SystemWriter {
            path: path.into(),
            order,
            rows_written: 0,
            writer,
        })
    }

    /// Appends whole rows of `A`.
    pub fn write_rows(&mut self, rows: &[f32]) -> Result<(), Error> {
        let count = rows.len() / self.order;
        if rows.len() % self.order != 0 || self.rows_written + count > self.order {
            return Err(linear::Error::DimensionMismatch {
                expected: (self.order - self.rows_written) * self.order,
                found: rows.len(),
            }
            .into());
        }
        write_f32s(&mut self.writer, rows).map_err(Error::io(&self.path))?;
        self.rows_written += count;
        Ok(())
    }

    /// Writes `b` and flushes. All rows of `A` must have been written.
    pub fn finish(mut self, b: &[f32]) -> Result<(), Error> {
        if self.rows_written != self.order || b.len() != self.order {
            return Err(linear::Error::DimensionMismatch {
                expected: self.order,
                found: if self.rows_written != self.order {
                    self.rows_written
                } else {
                    b.len()
                },
            }
            .into());
        }
        write_f32s(&mut self.writer, b).map_err(Error::io(&self.path))?;
        self.writer.flush().map_err(Error::io(&self.path))
    }
}

fn write_f32s<W: Write>(w: &mut W, values: &[f32]) -> std::io::Result<()> {
    values
        .iter()
        .try_for_each(|&v| w.write_f32::<LittleEndian>(v))
}

/// Writes a whole system at once.
pub fn write_system(path: &Path, system: &LinearSystem<f32>) -> Result<(), Error> {
    let mut writer = SystemWriter::create(path, system.order())?;
    writer.write_rows(system.a.as_slice())?;
    writer.finish(&system.b)
}

/// Writes the solution vector.
pub fn write_solution(path: &Path, x: &[f64]) -> Result<(), Error> {
    let file = File::create(path).map_err(Error::io(path))?;
    let mut writer = BufWriter::new(file);
    x.iter()
        .try_for_each(|&v| writer.write_f64::<LittleEndian>(v))
        .and_then(|_| writer.flush())
        .map_err(Error::io(path))
}

/// Reads a solution vector written by [`write_solution`].
pub fn read_solution(path: &Path) -> Result<Vec<f64>, Error> {
    let file = File::open(path).map_err(Error::io(path))?;
    let len = file.metadata().map_err(Error::io(path))?.len();
    if len % 8 != 0 {
        return Err(Error::Truncated {
            path: path.into(),
            expected: len - len % 8 + 8,
            found: len,
        });
    }
    let mut x = try_alloc((len / 8) as usize, 0.0f64, "vector")?;
    BufReader::new(file)
        .read_f64_into::<LittleEndian>(&mut x)
        .map_err(Error::io(path))?;
    Ok(x)
}
