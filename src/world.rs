use mpi::collective::SystemOperation;
use mpi::traits::*;

use crate::collective::{Collective, ROOT_RANK};

/// [`Collective`] over an MPI communicator.
pub struct MpiWorld<C: Communicator> {
    comm: C,
}

impl<C: Communicator> MpiWorld<C> {
    pub fn new(comm: C) -> Self {
        Self { comm }
    }

    /// Terminates every process of the communicator.
    pub fn abort(&self, code: i32) -> ! {
        self.comm.abort(code)
    }
}

impl<C: Communicator> Collective for MpiWorld<C> {
    fn rank(&self) -> usize {
        self.comm.rank() as usize
    }

    fn size(&self) -> usize {
        self.comm.size() as usize
    }

    fn broadcast_integers(&self, buffer: &mut [u64]) {
        let root_process = self.comm.process_at_rank(ROOT_RANK as i32);
        root_process.broadcast_into(buffer);
    }

    fn broadcast_floats(&self, buffer: &mut [f64]) {
        let root_process = self.comm.process_at_rank(ROOT_RANK as i32);
        root_process.broadcast_into(buffer);
    }

    fn reduce_sum(&self, partial: &[f64]) -> Option<Vec<f64>> {
        let root_process = self.comm.process_at_rank(ROOT_RANK as i32);

        if self.is_root() {
            let mut total = vec![0.0; partial.len()];
            root_process.reduce_into_root(partial, &mut total[..], SystemOperation::sum());
            Some(total)
        } else {
            root_process.reduce_into(partial, SystemOperation::sum());
            None
        }
    }
}
