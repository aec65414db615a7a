//! Direct solver for dense matrices using LU decomposition with partial pivoting.
//!
use log::trace;
use nalgebra::RealField;

use crate::{
    factor::{factorize, Lu},
    pivot::select_pivots,
    triangular::{back_substitution, forward_substitution},
    Error, LSolver, Matrix,
};

#[derive(Clone, Debug, Default)]
pub struct Dense<T> {
    lu: Option<Lu<T>>,
}

impl<T> Dense<T> {
    /// Creates a new dense linear solver.
    pub fn new() -> Self {
        Dense { lu: None }
    }

    /// The factors from the last successful setup.
    pub fn factors(&self) -> Option<&Lu<T>> {
        self.lu.as_ref()
    }
}

impl<T> LSolver<T> for Dense<T>
where
    T: RealField + Copy,
{
    /// Computes `P` by partial pivoting, then `L` and `U` of `P A`.
    fn setup(&mut self, mat_a: &Matrix<T>) -> Result<(), Error> {
        self.lu = None;
        let perm = select_pivots(mat_a)?;
        trace!("permutation is identity: {}", perm.is_identity());
        self.lu = Some(factorize(&perm, mat_a)?);
        Ok(())
    }

    /// `y = L \ (P b)`, then `x = U \ y`.
    fn solve(&self, b: &[T]) -> Result<Vec<T>, Error> {
        let lu = self.lu.as_ref().ok_or(Error::NotFactorized)?;
        let pb = lu.p().matvec(b)?;
        let y = forward_substitution(lu.l(), &pb)?;
        back_substitution(lu.u(), &y)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::residual;

    #[test]
    fn test_dense1() {
        let mat_a = Matrix::from_row_slice(
            4,
            4,
            &[
                5.0, 0.0, 0.0, 1.0, //
                2.0, 2.0, 2.0, 1.0, //
                4.0, 5.0, 5.0, 5.0, //
                1.0, 6.0, 4.0, 5.0,
            ],
        )
        .unwrap();
        let b = [9.0, 16.0, 49.0, 45.0];
        let expected = [1.0, 2.0, 3.0, 4.0];
        let mut dense = Dense::new();
        dense.setup(&mat_a).unwrap();
        let x = dense.solve(&b).unwrap();
        assert_relative_eq!(x.as_slice(), expected.as_slice(), max_relative = 1e-9);
    }

    #[test]
    fn test_textbook() {
        let mat_a =
            Matrix::from_row_slice(3, 3, &[2.0, 1.0, 1.0, 4.0, 3.0, 3.0, 8.0, 7.0, 9.0]).unwrap();
        let b = [4.0, 10.0, 24.0];
        let mut dense = Dense::new();
        dense.setup(&mat_a).unwrap();
        let x = dense.solve(&b).unwrap();
        assert_relative_eq!(x.as_slice(), [1.0, 1.0, 1.0].as_slice(), epsilon = 1e-12);
        assert!(residual::norm(&mat_a, &x, &b).unwrap() < 1e-12);
    }

    #[test]
    fn test_pivot_swap_required() {
        let mat_a = Matrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]).unwrap();
        let mut dense = Dense::new();
        dense.setup(&mat_a).unwrap();
        assert_eq!(
            dense.factors().unwrap().permutation().as_slice(),
            &[1, 0]
        );
        let x = dense.solve(&[3.0, 5.0]).unwrap();
        assert_eq!(x, vec![5.0, 3.0]);
    }

    #[test]
    fn test_singular() {
        let mat_a = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]).unwrap();
        let mut dense = Dense::new();
        assert!(matches!(
            dense.setup(&mat_a),
            Err(Error::SingularMatrix { .. })
        ));
        assert!(matches!(dense.solve(&[1.0, 1.0]), Err(Error::NotFactorized)));
    }
}
