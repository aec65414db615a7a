use nalgebra::RealField;

use linear::{residual::squared_error, Matrix};

use crate::{comm::Element, Comm, Error, PRIMARY};

/// `||A x - b||_2` of the distributed system, where this worker holds the rows `local_a` of `A`
/// and `local_b` of `b`, and `x` is complete.
///
/// The partial squared errors are summed on the primary, which alone gets `Some(norm)`.
pub fn global_norm<C, T>(
    ctx: &C,
    local_a: &Matrix<T>,
    x: &[T],
    local_b: &[T],
) -> Result<Option<T>, Error>
where
    C: Comm,
    T: RealField + Element + Sync,
{
    let partial = squared_error(local_a, x, local_b)?;
    let total = ctx.reduce(PRIMARY, partial, |a, b| a + b)?;
    Ok(total.map(|s| s.sqrt()))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{local::World, Partition};

    #[test]
    fn test_reduces_on_primary() {
        let a = Matrix::from_row_slice(4, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 0.0]).unwrap();
        let x = [1.0, 1.0];
        let b = [0.0, 0.0, 0.0, 0.0];
        // residuals 1, 1, 2, 2
        let partition = Partition::new(4, 3).unwrap();
        let parts = partition.split(&a).unwrap();
        let b_parts = partition.split_vec(&b).unwrap();

        let results = World::run(3, |ctx| {
            let rank = ctx.rank();
            global_norm(&ctx, &parts[rank], &x, &b_parts[rank])
        })
        .unwrap();

        assert_relative_eq!(results[0].as_ref().unwrap().unwrap(), 10.0f64.sqrt());
        assert!(results[1].as_ref().unwrap().is_none());
        assert!(results[2].as_ref().unwrap().is_none());
    }
}
