/* ************************************************************************ **
** This file is part of phdisp, and is licensed under EITHER the MIT        **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! A fixed pool of workers running identical code in lockstep, coordinating
//! only through blocking collectives.
//!
//! Every component that does distributed work receives a `&impl Comm` rather
//! than touching a global communicator handle.  Each collective is a full
//! barrier; mutable state during a distributed phase is strictly partitioned
//! between workers, so barrier ordering is the only synchronization needed.
//!
//! Two implementations are provided: [`Serial`] (one worker, used by tests
//! and single-process runs) and, behind the `mpi-support` feature,
//! [`MpiComm`] over a `SystemCommunicator`.
//!
//! There is no cancellation and there are no timeouts.  A worker that dies
//! inside a collective deadlocks the run; that is acceptable for a batch
//! computation.

#[cfg(feature = "mpi")]
extern crate mpi;

/// Worker rank, worker count, and the collective operations.
///
/// The variable-length collectives take explicit per-worker `counts`; callers
/// obtain those with [`Comm::all_gather_len`] (the size-announcement
/// exchange) or compute them from a deterministic partition, and must pass
/// identical `counts` on every worker.
pub trait Comm {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// One-to-all: after the call, every worker holds the root's `buf`.
    fn broadcast_f64s(&self, buf: &mut [f64], root: usize);

    /// One-to-all for index data.
    fn broadcast_usizes(&self, buf: &mut [usize], root: usize);

    /// All-to-all size announcement: returns every worker's `len`, by rank.
    fn all_gather_len(&self, len: usize) -> Vec<usize>;

    /// Concatenating variable-length all-gather.  `counts[r]` must equal the
    /// length of worker `r`'s `send`; the result is the rank-ordered
    /// concatenation, identical on every worker.
    fn all_gather_v_f64(&self, send: &[f64], counts: &[usize]) -> Vec<f64>;

    /// Like `all_gather_v_f64`, for integer payloads.
    fn all_gather_v_i32(&self, send: &[i32], counts: &[usize]) -> Vec<i32>;

    /// Root-to-all disjoint shares.  `send` must be `Some` on the root and
    /// hold the rank-ordered concatenation of all shares; worker `r`
    /// receives `counts[r]` elements.
    fn scatter_v_f64(&self, send: Option<&[f64]>, counts: &[usize], root: usize) -> Vec<f64>;

    /// All-to-root concatenation; returns `Some` on the root only.
    fn gather_v_f64(&self, send: &[f64], counts: &[usize], root: usize) -> Option<Vec<f64>>;
}

//--------------------------------------------------------------------------
// deterministic partitions
//
// Both are pure functions of (global index, worker count), which is what
// makes gather order line up with scatter order bit-for-bit.

/// Owner of item `index` under the round-robin partition.
///
/// Used where per-item cost is uniform and items are produced by a running
/// counter rather than an indexable array.
#[inline]
pub fn round_robin_owner(index: usize, size: usize) -> usize {
    index % size
}

/// Per-worker item counts under the balanced contiguous partition.
///
/// Every worker gets `num_items / size`; the first `num_items % size`
/// workers absorb one remainder item each.
pub fn balanced_counts(num_items: usize, size: usize) -> Vec<usize> {
    let mut counts = vec![num_items / size; size];
    for count in &mut counts[..num_items % size] {
        *count += 1;
    }
    counts
}

/// Start offset of each worker's contiguous share, plus the total.
pub fn balanced_displs(counts: &[usize]) -> Vec<usize> {
    let mut displs = Vec::with_capacity(counts.len() + 1);
    let mut acc = 0;
    for &count in counts {
        displs.push(acc);
        acc += count;
    }
    displs.push(acc);
    displs
}

//--------------------------------------------------------------------------

/// The one-worker pool.  Every collective degenerates to a copy.
#[derive(Debug, Default, Copy, Clone)]
pub struct Serial;

impl Serial {
    fn check_counts(&self, counts: &[usize], len: usize) {
        assert_eq!(counts.len(), 1, "counts for a different worker pool");
        assert_eq!(counts[0], len, "counts disagree with payload length");
    }
}

impl Comm for Serial {
    fn rank(&self) -> usize { 0 }
    fn size(&self) -> usize { 1 }

    fn broadcast_f64s(&self, _buf: &mut [f64], root: usize) {
        assert_eq!(root, 0);
    }

    fn broadcast_usizes(&self, _buf: &mut [usize], root: usize) {
        assert_eq!(root, 0);
    }

    fn all_gather_len(&self, len: usize) -> Vec<usize> {
        vec![len]
    }

    fn all_gather_v_f64(&self, send: &[f64], counts: &[usize]) -> Vec<f64> {
        self.check_counts(counts, send.len());
        send.to_vec()
    }

    fn all_gather_v_i32(&self, send: &[i32], counts: &[usize]) -> Vec<i32> {
        self.check_counts(counts, send.len());
        send.to_vec()
    }

    fn scatter_v_f64(&self, send: Option<&[f64]>, counts: &[usize], root: usize) -> Vec<f64> {
        assert_eq!(root, 0);
        let send = match send {
            Some(send) => send,
            None => panic!("root did not provide a value to scatter"),
        };
        self.check_counts(counts, send.len());
        send.to_vec()
    }

    fn gather_v_f64(&self, send: &[f64], counts: &[usize], root: usize) -> Option<Vec<f64>> {
        assert_eq!(root, 0);
        self.check_counts(counts, send.len());
        Some(send.to_vec())
    }
}

//--------------------------------------------------------------------------

#[cfg(feature = "mpi")]
pub use self::mpi_comm::MpiComm;

#[cfg(feature = "mpi")]
mod mpi_comm {
    use super::Comm;

    use mpi::traits::*;
    use mpi::topology::SystemCommunicator;
    use mpi::datatype::{Partition, PartitionMut};
    use mpi::Count;

    /// `Comm` over the world communicator.
    ///
    /// The caller owns MPI initialization (the `mpi::initialize` universe
    /// must outlive this value); this type only consumes the collective
    /// contract.
    #[derive(Copy, Clone)]
    pub struct MpiComm {
        world: SystemCommunicator,
    }

    impl MpiComm {
        pub fn new(world: SystemCommunicator) -> Self {
            MpiComm { world }
        }
    }

    fn to_counts(counts: &[usize]) -> Vec<Count> {
        counts.iter().map(|&c| c as Count).collect()
    }

    fn to_displs(counts: &[Count]) -> Vec<Count> {
        let mut acc = 0;
        counts.iter().map(|&c| { let d = acc; acc += c; d }).collect()
    }

    impl Comm for MpiComm {
        fn rank(&self) -> usize { self.world.rank() as usize }
        fn size(&self) -> usize { self.world.size() as usize }

        fn broadcast_f64s(&self, buf: &mut [f64], root: usize) {
            self.world.process_at_rank(root as Count).broadcast_into(buf);
        }

        fn broadcast_usizes(&self, buf: &mut [usize], root: usize) {
            self.world.process_at_rank(root as Count).broadcast_into(buf);
        }

        fn all_gather_len(&self, len: usize) -> Vec<usize> {
            let mut out = vec![0usize; self.size()];
            self.world.all_gather_into(&len, &mut out[..]);
            out
        }

        fn all_gather_v_f64(&self, send: &[f64], counts: &[usize]) -> Vec<f64> {
            let counts = to_counts(counts);
            let displs = to_displs(&counts);
            let total: Count = counts.iter().sum();
            let mut buf = vec![0f64; total as usize];
            {
                let mut partition = PartitionMut::new(&mut buf[..], &counts[..], &displs[..]);
                self.world.all_gather_varcount_into(send, &mut partition);
            }
            buf
        }

        fn all_gather_v_i32(&self, send: &[i32], counts: &[usize]) -> Vec<i32> {
            let counts = to_counts(counts);
            let displs = to_displs(&counts);
            let total: Count = counts.iter().sum();
            let mut buf = vec![0i32; total as usize];
            {
                let mut partition = PartitionMut::new(&mut buf[..], &counts[..], &displs[..]);
                self.world.all_gather_varcount_into(send, &mut partition);
            }
            buf
        }

        fn scatter_v_f64(&self, send: Option<&[f64]>, counts: &[usize], root: usize) -> Vec<f64> {
            let counts = to_counts(counts);
            let displs = to_displs(&counts);
            let process = self.world.process_at_rank(root as Count);
            let mut recv = vec![0f64; counts[self.rank()] as usize];
            if self.rank() == root {
                let send = match send {
                    Some(send) => send,
                    None => panic!("root did not provide a value to scatter"),
                };
                let partition = Partition::new(send, &counts[..], &displs[..]);
                process.scatter_varcount_into_root(&partition, &mut recv[..]);
            } else {
                process.scatter_varcount_into(&mut recv[..]);
            }
            recv
        }

        fn gather_v_f64(&self, send: &[f64], counts: &[usize], root: usize) -> Option<Vec<f64>> {
            let counts = to_counts(counts);
            let displs = to_displs(&counts);
            let process = self.world.process_at_rank(root as Count);
            if self.rank() == root {
                let total: Count = counts.iter().sum();
                let mut buf = vec![0f64; total as usize];
                {
                    let mut partition = PartitionMut::new(&mut buf[..], &counts[..], &displs[..]);
                    process.gather_varcount_into_root(send, &mut partition);
                }
                Some(buf)
            } else {
                process.gather_varcount_into(send);
                None
            }
        }
    }
}

//--------------------------------------------------------------------------
