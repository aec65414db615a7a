//! The operations a worker group offers its members.
//!
//! Every collective must be entered by every worker of the group, in the same order. Reductions
//! are assembled from gathers and folded in rank order, so every worker computes the same result
//! whatever the transport.

use mpi::traits::Equivalence;

use crate::Error;

/// Rank of the worker that reads the input, receives reductions and writes the output.
pub const PRIMARY: usize = 0;

/// A plain value that can be shipped between workers.
pub trait Element: Equivalence + Copy + Default + Send + 'static {}

impl<T: Equivalence + Copy + Default + Send + 'static> Element for T {}

pub trait Comm {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_primary(&self) -> bool {
        self.rank() == PRIMARY
    }

    /// Returns once every worker has entered the barrier.
    fn barrier(&self) -> Result<(), Error>;

    /// Copies `root`'s `buf` into the `buf` of every other worker. All lengths must agree.
    fn broadcast_into<T: Element>(&self, root: usize, buf: &mut [T]) -> Result<(), Error>;

    /// Every worker's `local`, concatenated in rank order, on every worker. All lengths must
    /// agree.
    fn all_gather<T: Element>(&self, local: &[T]) -> Result<Vec<T>, Error>;

    /// Like [`all_gather`](Self::all_gather), on `root` only.
    fn gather<T: Element>(&self, root: usize, local: &[T]) -> Result<Option<Vec<T>>, Error>;

    fn send<T: Element>(&self, dest: usize, data: &[T]) -> Result<(), Error>;

    /// The next message from `source`, whatever its length.
    fn recv<T: Element>(&self, source: usize) -> Result<Vec<T>, Error>;

    /// Distributes `root`'s value to every worker. Only `root` passes `Some`.
    fn broadcast<T: Element>(&self, root: usize, value: Option<T>) -> Result<T, Error> {
        let mut buf = [root_value(self.rank(), root, value)?.unwrap_or_default()];
        self.broadcast_into(root, &mut buf)?;
        Ok(buf[0])
    }

    /// Distributes `root`'s `len` elements to every worker. Only `root` passes `Some`.
    fn broadcast_vec<T: Element>(
        &self,
        root: usize,
        data: Option<Vec<T>>,
        len: usize,
    ) -> Result<Vec<T>, Error> {
        let mut buf = match root_value(self.rank(), root, data)? {
            Some(data) if data.len() == len => data,
            Some(_) => {
                return Err(Error::Protocol {
                    peer: root,
                    expected: "a broadcast of the announced length",
                })
            }
            None => vec![T::default(); len],
        };
        self.broadcast_into(root, &mut buf)?;
        Ok(buf)
    }

    /// Folds every worker's `value` with `op` in rank order. Returns `Some` on `root` only.
    fn reduce<T, F>(&self, root: usize, value: T, op: F) -> Result<Option<T>, Error>
    where
        T: Element,
        F: Fn(T, T) -> T,
    {
        Ok(self
            .gather(root, &[value])?
            .and_then(|values| values.into_iter().reduce(op)))
    }

    /// [`reduce`](Self::reduce) with the result on every worker.
    fn all_reduce<T, F>(&self, value: T, op: F) -> Result<T, Error>
    where
        T: Element,
        F: Fn(T, T) -> T,
    {
        self.all_gather(&[value])?
            .into_iter()
            .reduce(op)
            .ok_or(Error::NoWorkers)
    }
}

/// Checks that exactly the root of a broadcast supplies the payload.
fn root_value<V>(rank: usize, root: usize, value: Option<V>) -> Result<Option<V>, Error> {
    match (rank == root, value) {
        (true, None) => Err(Error::Protocol {
            peer: root,
            expected: "a payload on the broadcast root",
        }),
        (false, Some(_)) => Err(Error::Protocol {
            peer: rank,
            expected: "no payload off the broadcast root",
        }),
        (_, value) => Ok(value),
    }
}
