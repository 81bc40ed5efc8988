use itertools::iproduct;
use rand::Rng;

use crate::lattice::{Lattice, J};

/// Largest single-flip energy change on the square lattice.
const MAX_DELTA: i32 = 8 * J;

/// `exp(-dE / T)` for every energy change a single flip can produce.
#[derive(Clone, Debug, PartialEq)]
pub struct BoltzmannTable {
    temperature: f64,
    weights: [f64; 5],
}

impl BoltzmannTable {
    /// `temperature` must be positive; the sweep configuration rejects anything else.
    pub fn new(temperature: f64) -> Self {
        let mut weights = [0.0; 5];
        for (i, weight) in weights.iter_mut().enumerate() {
            let delta = 4 * J * i as i32 - MAX_DELTA;
            *weight = (-(delta as f64) / temperature).exp();
        }
        Self { temperature, weights }
    }

    #[inline(always)]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[inline(always)]
    pub fn weight(&self, delta_energy: i32) -> f64 {
        self.weights[((delta_energy + MAX_DELTA) / (4 * J)) as usize]
    }
}

/// One Monte Carlo cycle: a Metropolis update at every site, row by row.
///
/// Returns the number of accepted flips.
pub fn metropolis_cycle(lattice: &mut Lattice, table: &BoltzmannTable, rng: &mut impl Rng) -> usize {
    metropolis_cycle_with(lattice, table, || rng.gen::<f64>())
}

/// Same as [`metropolis_cycle`] with an explicit source of uniform `[0, 1)` draws.
///
/// A draw is consumed only for energy-raising candidates.
pub fn metropolis_cycle_with(
    lattice: &mut Lattice,
    table: &BoltzmannTable,
    mut uniform: impl FnMut() -> f64,
) -> usize {
    let size = lattice.size();
    let mut accepted = 0;

    for (row, col) in iproduct!(0..size, 0..size) {
        let delta = lattice.local_delta_energy(row, col);

        if delta <= 0 || uniform() < table.weight(delta) {
            lattice.flip(row, col);
            accepted += 1;
        }
    }

    accepted
}
