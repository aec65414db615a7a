//! Forward and back substitution.

use nalgebra::RealField;

use crate::{matrix::dot, Error, Matrix};

fn check_square<T: Copy>(mat: &Matrix<T>, rhs: &[T]) -> Result<usize, Error> {
    let n = mat.order()?;
    if rhs.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: rhs.len(),
        });
    }
    Ok(n)
}

/// Solves `L y = b` for unit lower triangular `L`. Entries on and above the diagonal are not read.
pub fn forward_substitution<T: RealField + Copy>(l: &Matrix<T>, b: &[T]) -> Result<Vec<T>, Error> {
    let n = check_square(l, b)?;
    let mut y: Vec<T> = Vec::with_capacity(n);
    for i in 0..n {
        let s = dot(&l.row(i)[..i], &y[..i]);
        y.push(b[i] - s);
    }
    Ok(y)
}

/// Solves `U x = y` for upper triangular `U`, from the last row up. Entries below the diagonal
/// are not read.
///
/// # Errors
///
/// [`Error::SingularMatrix`] if a diagonal entry is exactly zero.
pub fn back_substitution<T: RealField + Copy>(u: &Matrix<T>, y: &[T]) -> Result<Vec<T>, Error> {
    let n = check_square(u, y)?;
    let mut x = vec![T::zero(); n];
    for i in (0..n).rev() {
        let u_ii = u[(i, i)];
        if u_ii == T::zero() {
            return Err(Error::SingularMatrix { col: i });
        }
        let s = dot(&u.row(i)[i + 1..], &x[i + 1..]);
        x[i] = (y[i] - s) / u_ii;
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_forward() {
        let l = Matrix::from_row_slice(3, 3, &[1.0, 9.0, 9.0, 0.5, 1.0, 9.0, 0.25, 2.0, 1.0])
            .unwrap();
        let y = forward_substitution(&l, &[1.0, 1.5, 4.25]).unwrap();
        assert_relative_eq!(y.as_slice(), [1.0, 1.0, 2.0].as_slice());
    }

    #[test]
    fn test_back() {
        let u = Matrix::from_row_slice(3, 3, &[2.0, 1.0, 1.0, 9.0, 1.0, 1.0, 9.0, 9.0, 4.0])
            .unwrap();
        let x = back_substitution(&u, &[4.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(x.as_slice(), [1.0, 1.0, 1.0].as_slice());
    }

    #[test]
    fn test_zero_diagonal() {
        let u = Matrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 0.0]).unwrap();
        assert!(matches!(
            back_substitution(&u, &[1.0, 1.0]),
            Err(Error::SingularMatrix { col: 1 })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let l = Matrix::<f64>::identity(2).unwrap();
        assert!(forward_substitution(&l, &[1.0]).is_err());
    }
}
