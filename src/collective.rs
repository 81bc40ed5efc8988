use std::sync::{Arc, Barrier, Mutex};

/// Rank that receives reductions and owns the output.
pub const ROOT_RANK: usize = 0;

/// The two collective operations the simulation needs from its transport.
///
/// Every worker of a group must make the same sequence of calls; each call blocks
/// until all workers have reached it.
pub trait Collective {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    #[inline(always)]
    fn is_root(&self) -> bool {
        self.rank() == ROOT_RANK
    }

    /// Overwrites `buffer` on every worker with the root's contents.
    fn broadcast_integers(&self, buffer: &mut [u64]);

    /// Overwrites `buffer` on every worker with the root's contents.
    fn broadcast_floats(&self, buffer: &mut [f64]);

    /// Element-wise sum of `partial` over all workers, delivered to the root only.
    fn reduce_sum(&self, partial: &[f64]) -> Option<Vec<f64>>;
}

struct Exchange {
    barrier: Barrier,
    integers: Mutex<Vec<u64>>,
    floats: Mutex<Vec<f64>>,
    partials: Mutex<Vec<Vec<f64>>>,
}

/// In-process group of workers, one handle per thread.
///
/// Partial sums are combined in rank order, which makes reductions reproducible.
#[derive(Clone)]
pub struct LocalCollective {
    rank: usize,
    size: usize,
    exchange: Arc<Exchange>,
}

impl LocalCollective {
    /// Handles for a group of `size` workers; element `i` has rank `i`.
    pub fn group(size: usize) -> Vec<Self> {
        assert!(size > 0, "a group needs at least one worker");

        let exchange = Arc::new(Exchange {
            barrier: Barrier::new(size),
            integers: Mutex::new(Vec::new()),
            floats: Mutex::new(Vec::new()),
            partials: Mutex::new(vec![Vec::new(); size]),
        });

        (0..size)
            .map(|rank| Self {
                rank,
                size,
                exchange: exchange.clone(),
            })
            .collect()
    }

    /// A group with a single worker, which is its own root.
    pub fn single() -> Self {
        Self::group(1).remove(0)
    }

    fn broadcast<T: Copy>(&self, slot: &Mutex<Vec<T>>, buffer: &mut [T]) {
        if self.is_root() {
            *slot.lock().unwrap() = buffer.to_vec();
        }
        self.exchange.barrier.wait();

        if !self.is_root() {
            buffer.copy_from_slice(&slot.lock().unwrap());
        }
        self.exchange.barrier.wait();
    }
}

impl Collective for LocalCollective {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn broadcast_integers(&self, buffer: &mut [u64]) {
        self.broadcast(&self.exchange.integers, buffer);
    }

    fn broadcast_floats(&self, buffer: &mut [f64]) {
        self.broadcast(&self.exchange.floats, buffer);
    }

    fn reduce_sum(&self, partial: &[f64]) -> Option<Vec<f64>> {
        self.exchange.partials.lock().unwrap()[self.rank] = partial.to_vec();
        self.exchange.barrier.wait();

        let total = if self.is_root() {
            let partials = self.exchange.partials.lock().unwrap();
            let mut total = vec![0.0; partial.len()];
            for contribution in partials.iter() {
                assert_eq!(contribution.len(), total.len(), "mismatched reduction buffers");
                for (sum, value) in total.iter_mut().zip(contribution) {
                    *sum += value;
                }
            }
            Some(total)
        } else {
            None
        };
        self.exchange.barrier.wait();

        total
    }
}
