//! [`Comm`] over an MPI communicator: one worker per process, launched by `mpirun -n W`.
//!
//! MPI reports transport failures by aborting the job, so these operations only fail on ranks
//! outside the group.

use mpi::{topology::SimpleCommunicator, traits::*, Rank};

use crate::{comm::Element, Comm, Error};

pub struct MpiComm {
    world: SimpleCommunicator,
    rank: usize,
    size: usize,
}

impl MpiComm {
    pub fn new(world: SimpleCommunicator) -> Self {
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        MpiComm { world, rank, size }
    }

    /// Terminates every process of the group with exit status `code`.
    pub fn abort(&self, code: i32) -> ! {
        self.world.abort(code)
    }

    fn peer(&self, rank: usize) -> Result<Rank, Error> {
        if rank < self.size {
            Ok(rank as Rank)
        } else {
            Err(Error::Protocol {
                peer: rank,
                expected: "a rank inside the group",
            })
        }
    }
}

impl Comm for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<(), Error> {
        self.world.barrier();
        Ok(())
    }

    fn broadcast_into<T: Element>(&self, root: usize, buf: &mut [T]) -> Result<(), Error> {
        self.world.process_at_rank(self.peer(root)?).broadcast_into(buf);
        Ok(())
    }

    fn all_gather<T: Element>(&self, local: &[T]) -> Result<Vec<T>, Error> {
        let mut out = vec![T::default(); local.len() * self.size];
        self.world.all_gather_into(local, &mut out[..]);
        Ok(out)
    }

    fn gather<T: Element>(&self, root: usize, local: &[T]) -> Result<Option<Vec<T>>, Error> {
        let process = self.world.process_at_rank(self.peer(root)?);
        if self.rank == root {
            let mut out = vec![T::default(); local.len() * self.size];
            process.gather_into_root(local, &mut out[..]);
            Ok(Some(out))
        } else {
            process.gather_into(local);
            Ok(None)
        }
    }

    fn send<T: Element>(&self, dest: usize, data: &[T]) -> Result<(), Error> {
        self.world.process_at_rank(self.peer(dest)?).send(data);
        Ok(())
    }

    fn recv<T: Element>(&self, source: usize) -> Result<Vec<T>, Error> {
        let (data, _status) = self
            .world
            .process_at_rank(self.peer(source)?)
            .receive_vec::<T>();
        Ok(data)
    }
}
