//! In-process [`Comm`]: a fixed group of worker threads with point-to-point channels.
//!
//! Each ordered pair of workers has its own FIFO channel, so messages between two workers arrive
//! in program order. Collectives go through the primary.
//!
//! A worker that returns drops its channel ends, and peers waiting on it get
//! [`Error::Disconnected`] instead of blocking.

use std::{
    any::{type_name, Any},
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};

use log::{debug, trace};

use crate::{comm::Element, Comm, Error, PRIMARY};

type Envelope = Box<dyn Any + Send>;

/// One thread's view of the group: its rank, the group size and its channel ends.
#[derive(Debug)]
pub struct LocalComm {
    rank: usize,
    size: usize,
    /// `outbox[dest]`, `None` for `dest == rank`
    outbox: Vec<Option<Sender<Envelope>>>,
    /// `inbox[source]`, `None` for `source == rank`
    inbox: Vec<Option<Receiver<Envelope>>>,
}

impl LocalComm {
    fn peers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(move |&r| r != self.rank)
    }

    fn recv_len<T: Element>(&self, source: usize, len: usize) -> Result<Vec<T>, Error> {
        let data = self.recv::<T>(source)?;
        if data.len() != len {
            return Err(Error::Protocol {
                peer: source,
                expected: "a message of the agreed length",
            });
        }
        Ok(data)
    }
}

impl Comm for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<(), Error> {
        trace!("worker {} at barrier", self.rank);
        if self.is_primary() {
            for peer in self.peers() {
                self.recv_len::<u8>(peer, 0)?;
            }
            for peer in self.peers() {
                self.send::<u8>(peer, &[])?;
            }
        } else {
            self.send::<u8>(PRIMARY, &[])?;
            self.recv_len::<u8>(PRIMARY, 0)?;
        }
        Ok(())
    }

    fn broadcast_into<T: Element>(&self, root: usize, buf: &mut [T]) -> Result<(), Error> {
        if self.rank == root {
            for peer in self.peers() {
                self.send(peer, &*buf)?;
            }
        } else {
            let data = self.recv_len(root, buf.len())?;
            buf.copy_from_slice(&data);
        }
        Ok(())
    }

    fn all_gather<T: Element>(&self, local: &[T]) -> Result<Vec<T>, Error> {
        let gathered = self.gather(PRIMARY, local)?;
        let len = local.len() * self.size;
        self.broadcast_vec(PRIMARY, gathered, len)
    }

    fn gather<T: Element>(&self, root: usize, local: &[T]) -> Result<Option<Vec<T>>, Error> {
        if self.rank != root {
            self.send(root, local)?;
            return Ok(None);
        }
        let mut out = Vec::with_capacity(local.len() * self.size);
        for rank in 0..self.size {
            if rank == root {
                out.extend_from_slice(local);
            } else {
                out.extend(self.recv_len::<T>(rank, local.len())?);
            }
        }
        Ok(Some(out))
    }

    fn send<T: Element>(&self, dest: usize, data: &[T]) -> Result<(), Error> {
        let tx = self
            .outbox
            .get(dest)
            .and_then(Option::as_ref)
            .ok_or(Error::Protocol {
                peer: dest,
                expected: "a peer rank",
            })?;
        tx.send(Box::new(data.to_vec()))
            .map_err(|_| Error::Disconnected { peer: dest })
    }

    fn recv<T: Element>(&self, source: usize) -> Result<Vec<T>, Error> {
        let rx = self
            .inbox
            .get(source)
            .and_then(Option::as_ref)
            .ok_or(Error::Protocol {
                peer: source,
                expected: "a peer rank",
            })?;
        let envelope = rx
            .recv()
            .map_err(|_| Error::Disconnected { peer: source })?;
        envelope
            .downcast::<Vec<T>>()
            .map(|msg| *msg)
            .map_err(|_| Error::Protocol {
                peer: source,
                expected: type_name::<T>(),
            })
    }
}

/// A group of worker threads running the same program.
pub struct World;

impl World {
    /// Runs `worker` on `size` threads, each with its own [`LocalComm`], and returns the
    /// per-rank results once all of them finished. A panicking worker yields
    /// [`Error::WorkerPanicked`].
    pub fn run<F, R, E>(size: usize, worker: F) -> Result<Vec<Result<R, E>>, Error>
    where
        F: Fn(LocalComm) -> Result<R, E> + Sync,
        R: Send,
        E: Send + From<Error>,
    {
        if size == 0 {
            return Err(Error::NoWorkers);
        }
        debug!("launching {size} workers");

        let mut outboxes: Vec<Vec<Option<Sender<Envelope>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        let mut inboxes: Vec<Vec<Option<Receiver<Envelope>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        for source in 0..size {
            for dest in (0..size).filter(|&d| d != source) {
                let (tx, rx) = channel();
                outboxes[source][dest] = Some(tx);
                inboxes[dest][source] = Some(rx);
            }
        }

        let contexts = outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outbox, inbox))| LocalComm {
                rank,
                size,
                outbox,
                inbox,
            });

        let worker = &worker;
        let results = thread::scope(|scope| {
            let handles: Vec<_> = contexts
                .map(|ctx| {
                    let rank = ctx.rank;
                    thread::Builder::new()
                        .name(format!("worker-{rank}"))
                        .spawn_scoped(scope, move || worker(ctx))
                        .map_err(|source| Error::Spawn { rank, source })
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| match handle {
                    Ok(handle) => handle
                        .join()
                        .unwrap_or_else(|_| Err(E::from(Error::WorkerPanicked { rank }))),
                    Err(e) => Err(E::from(e)),
                })
                .collect()
        });

        Ok(results)
    }
}
