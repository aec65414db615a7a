//! Reproducible test systems.
//!
//! Every row owns an RNG seeded with its row index, so the output does not depend on the number
//! of threads or on the band size.

use std::path::Path;

use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use linear::{matrix::try_alloc, LinearSystem, Matrix};

use crate::{io::SystemWriter, Error};

/// Upper bound on the bytes of `A` held in memory at once while writing.
const BAND_BYTES: usize = 64 << 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatrixKind {
    /// Entries uniform in `[-10, 10)`.
    #[default]
    Random,
    /// Diagonal `10 n`, off-diagonal integers in `[-5, 5)`.
    DiagonallyDominant,
}

impl TryFrom<u8> for MatrixKind {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(MatrixKind::Random),
            1 => Ok(MatrixKind::DiagonallyDominant),
            _ => Err(Error::InvalidArgument {
                msg: format!("unknown matrix type {value}, expected 0 or 1"),
            }),
        }
    }
}

/// Right-hand side entry for row `i`.
pub fn rhs(i: usize) -> f32 {
    (i % 1000) as f32 / 1000.0
}

fn fill_row(kind: MatrixKind, i: usize, row: &mut [f32]) {
    let n = row.len();
    let mut rng = StdRng::seed_from_u64(i as u64);
    match kind {
        MatrixKind::Random => row.iter_mut().for_each(|v| *v = rng.gen_range(-10.0..10.0)),
        MatrixKind::DiagonallyDominant => {
            for (j, v) in row.iter_mut().enumerate() {
                *v = if i == j {
                    n as f32 * 10.0
                } else {
                    rng.gen_range(-5i32..5) as f32
                };
            }
        }
    }
}

fn fill_band(kind: MatrixKind, first_row: usize, n: usize, band: &mut [f32]) {
    band.par_chunks_mut(n)
        .enumerate()
        .for_each(|(offset, row)| fill_row(kind, first_row + offset, row));
}

/// Builds a whole system in memory.
pub fn generate_system(n: usize, kind: MatrixKind) -> Result<LinearSystem<f32>, Error> {
    let mut a = try_alloc(n * n, 0.0f32, "matrix")?;
    if n > 0 {
        fill_band(kind, 0, n, &mut a);
    }
    let b = (0..n).map(rhs).collect();
    Ok(LinearSystem::new(Matrix::from_vec(n, n, a)?, b)?)
}

/// Writes a system of order `n` to `path`, one band of rows at a time.
pub fn write_generated(path: &Path, n: usize, kind: MatrixKind) -> Result<(), Error> {
    let band_rows = (BAND_BYTES / (n * std::mem::size_of::<f32>()).max(1)).clamp(1, n.max(1));
    let mut writer = SystemWriter::create(path, n)?;
    let mut band = try_alloc(band_rows * n, 0.0f32, "row band")?;

    let mut first_row = 0;
    while first_row < n {
        let rows = band_rows.min(n - first_row);
        let band = &mut band[..rows * n];
        fill_band(kind, first_row, n, band);
        writer.write_rows(band)?;
        debug!("wrote rows {first_row}..{}", first_row + rows);
        first_row += rows;
    }

    let b: Vec<f32> = (0..n).map(rhs).collect();
    writer.finish(&b)?;
    info!("generated {kind:?} system of order {n} into {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_system;

    #[test]
    fn test_kind_from_u8() {
        assert_eq!(MatrixKind::try_from(0).unwrap(), MatrixKind::Random);
        assert_eq!(MatrixKind::try_from(1).unwrap(), MatrixKind::DiagonallyDominant);
        assert!(MatrixKind::try_from(2).is_err());
    }

    #[test]
    fn test_random_range() {
        let system = generate_system(30, MatrixKind::Random).unwrap();
        assert!(system.a.as_slice().iter().all(|v| (-10.0..10.0).contains(v)));
        assert_eq!(system.b[7], 0.007);
    }

    #[test]
    fn test_diagonally_dominant() {
        let n = 25;
        let system = generate_system(n, MatrixKind::DiagonallyDominant).unwrap();
        for (i, row) in system.a.rows().enumerate() {
            assert_eq!(row[i], 250.0);
            let off: f32 = row
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, v)| {
                    assert!((-5.0..5.0).contains(v) && v.fract() == 0.0);
                    v.abs()
                })
                .sum();
            assert!(off < row[i]);
        }
    }

    #[test]
    fn test_rows_are_reproducible() {
        let a = generate_system(16, MatrixKind::Random).unwrap();
        let b = generate_system(16, MatrixKind::Random).unwrap();
        assert_eq!(a, b);

        // row i does not depend on the order of the system
        let small = generate_system(4, MatrixKind::DiagonallyDominant).unwrap();
        let mut row = vec![0.0; 4];
        fill_row(MatrixKind::DiagonallyDominant, 2, &mut row);
        assert_eq!(small.a.row(2), row.as_slice());
    }

    #[test]
    fn test_streamed_file_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.bin");
        write_generated(&path, 9, MatrixKind::Random).unwrap();
        assert_eq!(
            read_system(&path).unwrap(),
            generate_system(9, MatrixKind::Random).unwrap()
        );
    }
}
