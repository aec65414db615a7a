//! Dense row-major matrix storage.
//!
//! A [`Matrix`] owns one contiguous buffer of `nrows * ncols` elements. Row `i` is the slice
//! `data[i * ncols..(i + 1) * ncols]`, so a block of consecutive rows is also a single contiguous
//! slice, which is what the row-block partitioning relies on.

use std::ops::{Index, IndexMut};

use nalgebra::{DMatrix, DMatrixView, DMatrixViewMut, RealField};
use num_traits::{NumCast, ToPrimitive};

use crate::Error;

/// Allocate a buffer of `len` copies of `value`, reporting failure instead of aborting.
pub fn try_alloc<T: Clone>(len: usize, value: T, what: &'static str) -> Result<Vec<T>, Error> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailure {
            what,
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    data.resize(len, value);
    Ok(data)
}

/// Inner product of two equally long slices.
pub fn dot<T: RealField + Copy>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

fn checked_len(nrows: usize, ncols: usize) -> Result<usize, Error> {
    nrows
        .checked_mul(ncols)
        .ok_or(Error::AllocationFailure {
            what: "matrix",
            bytes: usize::MAX,
        })
}

#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    nrows: usize,
    ncols: usize,
    data: Vec<T>,
}

impl<T: Copy> Matrix<T> {
    /// Creates a `nrows x ncols` matrix filled with `value`.
    pub fn from_elem(nrows: usize, ncols: usize, value: T) -> Result<Self, Error> {
        let len = checked_len(nrows, ncols)?;
        Ok(Matrix {
            nrows,
            ncols,
            data: try_alloc(len, value, "matrix")?,
        })
    }

    /// Takes ownership of a row-major buffer.
    pub fn from_vec(nrows: usize, ncols: usize, data: Vec<T>) -> Result<Self, Error> {
        let len = checked_len(nrows, ncols)?;
        if data.len() != len {
            return Err(Error::DimensionMismatch {
                expected: len,
                found: data.len(),
            });
        }
        Ok(Matrix { nrows, ncols, data })
    }

    /// Copies a row-major slice into a new matrix.
    pub fn from_row_slice(nrows: usize, ncols: usize, data: &[T]) -> Result<Self, Error> {
        let len = checked_len(nrows, ncols)?;
        if data.len() != len {
            return Err(Error::DimensionMismatch {
                expected: len,
                found: data.len(),
            });
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailure {
                what: "matrix",
                bytes: len.saturating_mul(std::mem::size_of::<T>()),
            })?;
        buf.extend_from_slice(data);
        Ok(Matrix {
            nrows,
            ncols,
            data: buf,
        })
    }

    /// Fallible deep copy.
    pub fn try_clone(&self) -> Result<Self, Error> {
        Self::from_row_slice(self.nrows, self.ncols, &self.data)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Fails with [`Error::NotSquare`] unless the matrix is square, returning its order.
    pub fn order(&self) -> Result<usize, Error> {
        if self.is_square() {
            Ok(self.nrows)
        } else {
            Err(Error::NotSquare {
                nrows: self.nrows,
                ncols: self.ncols,
            })
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.ncols..(i + 1) * self.ncols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        &mut self.data[i * self.ncols..(i + 1) * self.ncols]
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.data.chunks_exact(self.ncols.max(1))
    }

    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, T> {
        self.data.chunks_exact_mut(self.ncols.max(1))
    }

    /// The contiguous storage of rows `[start, start + count)`.
    pub fn row_block(&self, start: usize, count: usize) -> &[T] {
        &self.data[start * self.ncols..(start + count) * self.ncols]
    }

    /// Copies rows `[start, start + count)` into a new `count x ncols` matrix.
    pub fn block(&self, start: usize, count: usize) -> Result<Self, Error> {
        if start + count > self.nrows {
            return Err(Error::DimensionMismatch {
                expected: self.nrows,
                found: start + count,
            });
        }
        Self::from_row_slice(count, self.ncols, self.row_block(start, count))
    }

    /// Converts every element to another precision.
    ///
    /// Fails with [`Error::NotRepresentable`] at the first element the target type cannot hold.
    pub fn cast<U>(&self) -> Result<Matrix<U>, Error>
    where
        T: ToPrimitive,
        U: NumCast + Copy,
    {
        Ok(Matrix {
            nrows: self.nrows,
            ncols: self.ncols,
            data: cast_slice(&self.data)?,
        })
    }
}

/// Converts a vector to another precision, see [`Matrix::cast`].
pub fn cast_slice<T, U>(values: &[T]) -> Result<Vec<U>, Error>
where
    T: ToPrimitive + Copy,
    U: NumCast,
{
    let mut out = Vec::new();
    out.try_reserve_exact(values.len())
        .map_err(|_| Error::AllocationFailure {
            what: "vector",
            bytes: values.len().saturating_mul(std::mem::size_of::<U>()),
        })?;
    for (index, &v) in values.iter().enumerate() {
        out.push(<U as NumCast>::from(v).ok_or(Error::NotRepresentable { index })?);
    }
    Ok(out)
}

impl<T: RealField + Copy> Matrix<T> {
    pub fn zeros(nrows: usize, ncols: usize) -> Result<Self, Error> {
        Self::from_elem(nrows, ncols, T::zero())
    }

    pub fn identity(n: usize) -> Result<Self, Error> {
        let mut m = Self::zeros(n, n)?;
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        Ok(m)
    }

    /// Largest absolute entry, zero for an empty matrix.
    pub fn max_abs(&self) -> T {
        self.data
            .iter()
            .fold(T::zero(), |acc, &x| if x.abs() > acc { x.abs() } else { acc })
    }

    /// Dense product `self * rhs`, written into a checked allocation.
    ///
    /// Row-major storage read as column-major is the transpose, so this computes
    /// `rhs^T self^T = (self rhs)^T` on borrowed views, and the column-major result is the
    /// row-major product.
    pub fn matmul(&self, rhs: &Matrix<T>) -> Result<Matrix<T>, Error> {
        if self.ncols != rhs.nrows {
            return Err(Error::DimensionMismatch {
                expected: self.ncols,
                found: rhs.nrows,
            });
        }
        let mut data = try_alloc(self.nrows * rhs.ncols, T::zero(), "matrix")?;
        {
            let lhs_t = DMatrixView::from_slice(&self.data, self.ncols, self.nrows);
            let rhs_t = DMatrixView::from_slice(&rhs.data, rhs.ncols, rhs.nrows);
            let mut out_t = DMatrixViewMut::from_slice(&mut data, rhs.ncols, self.nrows);
            out_t.gemm(T::one(), &rhs_t, &lhs_t, T::zero());
        }
        Matrix::from_vec(self.nrows, rhs.ncols, data)
    }

    /// Dense product `self * x`.
    pub fn matvec(&self, x: &[T]) -> Result<Vec<T>, Error> {
        if self.ncols != x.len() {
            return Err(Error::DimensionMismatch {
                expected: self.ncols,
                found: x.len(),
            });
        }
        Ok(self.rows().take(self.nrows).map(|row| dot(row, x)).collect())
    }

    pub fn to_dmatrix(&self) -> DMatrix<T> {
        DMatrix::from_row_slice(self.nrows, self.ncols, &self.data)
    }
}

impl<T: RealField + Copy> From<&DMatrix<T>> for Matrix<T> {
    fn from(m: &DMatrix<T>) -> Self {
        Matrix {
            nrows: m.nrows(),
            ncols: m.ncols(),
            data: m.transpose().as_slice().to_vec(),
        }
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(j < self.ncols, "column {j} out of bounds ({})", self.ncols);
        &self.data[i * self.ncols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(j < self.ncols, "column {j} out of bounds ({})", self.ncols);
        &mut self.data[i * self.ncols + j]
    }
}

/// A square system `Ax = b` in some precision.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearSystem<T> {
    pub a: Matrix<T>,
    pub b: Vec<T>,
}

impl<T: Copy> LinearSystem<T> {
    /// Checks that `a` is square and `b` matches its order.
    pub fn new(a: Matrix<T>, b: Vec<T>) -> Result<Self, Error> {
        let n = a.order()?;
        if b.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: b.len(),
            });
        }
        Ok(LinearSystem { a, b })
    }

    pub fn order(&self) -> usize {
        self.b.len()
    }

    pub fn cast<U>(&self) -> Result<LinearSystem<U>, Error>
    where
        T: ToPrimitive,
        U: NumCast + Copy,
    {
        Ok(LinearSystem {
            a: self.a.cast()?,
            b: cast_slice(&self.b)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    use super::*;

    #[test]
    fn test_row_layout() {
        let m = Matrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m.row_block(1, 1), m.row(1));
        assert_eq!(m.rows().count(), 2);
    }

    #[test]
    fn test_bad_dims() {
        assert!(matches!(
            Matrix::from_vec(2, 2, vec![1.0; 3]),
            Err(Error::DimensionMismatch {
                expected: 4,
                found: 3
            })
        ));
        let m = Matrix::<f64>::zeros(2, 3).unwrap();
        assert!(matches!(m.order(), Err(Error::NotSquare { .. })));
    }

    #[test]
    fn test_matmul_matches_nalgebra() {
        let a = dmatrix![1.0, 2.0; 3.0, 4.0; 5.0, 6.0];
        let b = dmatrix![1.0, 0.5, -1.0; 2.0, 0.0, 3.0];
        let c = Matrix::from(&a).matmul(&Matrix::from(&b)).unwrap();
        assert_relative_eq!(c.to_dmatrix(), a * b);
    }

    #[test]
    fn test_matvec() {
        let m = Matrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]).unwrap();
        assert_eq!(m.matvec(&[1.0, 1.0]).unwrap(), vec![3.0, 4.0]);
        assert!(m.matvec(&[1.0]).is_err());
    }

    #[test]
    fn test_cast_precision() {
        let m = Matrix::from_row_slice(1, 2, &[0.5f32, -3.25]).unwrap();
        let w: Matrix<f64> = m.cast().unwrap();
        assert_eq!(w.as_slice(), &[0.5, -3.25]);

        let big = [f64::MAX];
        assert!(matches!(
            cast_slice::<f64, i32>(&big),
            Err(Error::NotRepresentable { index: 0 })
        ));
    }

    #[test]
    fn test_system_checks_order() {
        let a = Matrix::<f32>::from_elem(2, 2, 1.0).unwrap();
        assert!(LinearSystem::new(a.clone(), vec![1.0]).is_err());
        assert_eq!(LinearSystem::new(a, vec![1.0, 2.0]).unwrap().order(), 2);
    }
}
