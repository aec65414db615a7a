//! Contiguous row-block partitioning.
//!
//! `n` rows are split over `W` workers in rank order. When `W` does not divide `n`, the first
//! `n mod W` workers own one extra row; when `W > n` the trailing workers own no rows at all.

use std::ops::Range;

use linear::Matrix;

use crate::Error;

/// Rows `[start, start + count)`, owned by exactly one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowBlock {
    pub start: usize,
    pub count: usize,
}

impl RowBlock {
    pub fn end(&self) -> usize {
        self.start + self.count
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.rows().contains(&row)
    }

    /// Position of the global `row` inside this block.
    pub fn local(&self, row: usize) -> Option<usize> {
        self.contains(row).then(|| row - self.start)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    order: usize,
    blocks: Vec<RowBlock>,
}

impl Partition {
    pub fn new(order: usize, workers: usize) -> Result<Self, Error> {
        if workers == 0 {
            return Err(Error::NoWorkers);
        }
        let base = order / workers;
        let extra = order % workers;
        let mut start = 0;
        let blocks = (0..workers)
            .map(|rank| {
                let count = base + usize::from(rank < extra);
                let block = RowBlock { start, count };
                start += count;
                block
            })
            .collect();
        Ok(Partition { order, blocks })
    }

    /// Number of rows partitioned.
    pub fn order(&self) -> usize {
        self.order
    }

    /// True when every worker owns the same number of rows.
    pub fn is_even(&self) -> bool {
        self.order % self.blocks.len() == 0
    }

    pub fn blocks(&self) -> &[RowBlock] {
        &self.blocks
    }

    pub fn block(&self, rank: usize) -> RowBlock {
        self.blocks[rank]
    }

    /// Rank owning the global `row`.
    pub fn owner(&self, row: usize) -> usize {
        assert!(row < self.order, "row {row} out of range ({})", self.order);
        let workers = self.blocks.len();
        let base = self.order / workers;
        let extra = self.order % workers;
        let wide = extra * (base + 1);
        if row < wide {
            row / (base + 1)
        } else {
            extra + (row - wide) / base
        }
    }

    /// Copies each worker's rows of `mat` into its own matrix.
    pub fn split<T: Copy>(&self, mat: &Matrix<T>) -> Result<Vec<Matrix<T>>, Error> {
        self.check_rows(mat.nrows())?;
        self.blocks
            .iter()
            .map(|b| mat.block(b.start, b.count).map_err(Error::from))
            .collect()
    }

    /// Copies each worker's entries of `v`.
    pub fn split_vec<T: Copy>(&self, v: &[T]) -> Result<Vec<Vec<T>>, Error> {
        self.check_rows(v.len())?;
        Ok(self.blocks.iter().map(|b| v[b.rows()].to_vec()).collect())
    }

    fn check_rows(&self, nrows: usize) -> Result<(), Error> {
        if nrows != self.order {
            return Err(linear::Error::DimensionMismatch {
                expected: self.order,
                found: nrows,
            }
            .into());
        }
        Ok(())
    }
}
