use std::ops::{AddAssign, RangeInclusive};

use rand::Rng;

use crate::collective::Collective;
use crate::lattice::Lattice;
use crate::metropolis::{metropolis_cycle, BoltzmannTable};

/// Running sums of the sampled observables over a block of MC cycles.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Observables {
    pub energy: f64,
    pub energy_squared: f64,
    pub magnetization: f64,
    pub magnetization_squared: f64,
    pub abs_magnetization: f64,
}

impl Observables {
    pub const COUNT: usize = 5;

    /// Adds one sample taken from the current state of `lattice`.
    #[inline(always)]
    pub fn record(&mut self, lattice: &Lattice) {
        let energy = lattice.energy();
        let magnetization = lattice.magnetization();

        self.energy += energy;
        self.energy_squared += energy * energy;
        self.magnetization += magnetization;
        self.magnetization_squared += magnetization * magnetization;
        self.abs_magnetization += magnetization.abs();
    }

    pub fn to_array(&self) -> [f64; Self::COUNT] {
        [
            self.energy,
            self.energy_squared,
            self.magnetization,
            self.magnetization_squared,
            self.abs_magnetization,
        ]
    }

    pub fn from_slice(values: &[f64]) -> Self {
        assert_eq!(values.len(), Self::COUNT);
        Self {
            energy: values[0],
            energy_squared: values[1],
            magnetization: values[2],
            magnetization_squared: values[3],
            abs_magnetization: values[4],
        }
    }
}

impl AddAssign for Observables {
    fn add_assign(&mut self, rhs: Self) {
        self.energy += rhs.energy;
        self.energy_squared += rhs.energy_squared;
        self.magnetization += rhs.magnetization;
        self.magnetization_squared += rhs.magnetization_squared;
        self.abs_magnetization += rhs.abs_magnetization;
    }
}

/// Inclusive, 1-based block of MC cycles run by one worker.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CycleRange {
    pub begin: usize,
    pub end: usize,
}

impl CycleRange {
    /// Even split of `total_cycles` between `workers`; the last rank takes the remainder.
    pub fn for_worker(total_cycles: usize, workers: usize, rank: usize) -> Self {
        assert!(rank < workers, "rank {} outside a group of {}", rank, workers);

        let chunk = total_cycles / workers;
        let begin = rank * chunk + 1;
        let mut end = (rank + 1) * chunk;
        if rank == workers - 1 && end < total_cycles {
            end = total_cycles;
        }

        Self { begin, end }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.begin > self.end
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end - self.begin + 1
        }
    }

    pub fn cycles(&self) -> RangeInclusive<usize> {
        self.begin..=self.end
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Accumulation {
    pub observables: Observables,
    pub accepted_flips: usize,
}

/// Runs the cycles of `range` and samples the lattice after each one.
pub fn accumulate(
    lattice: &mut Lattice,
    table: &BoltzmannTable,
    range: CycleRange,
    rng: &mut impl Rng,
) -> Accumulation {
    let mut accumulation = Accumulation::default();

    for _ in range.cycles() {
        accumulation.accepted_flips += metropolis_cycle(lattice, table, rng);
        accumulation.observables.record(lattice);
    }

    accumulation
}

/// Sums every worker's observables; only the root gets `Some`.
pub fn reduce_observables(collective: &impl Collective, local: &Observables) -> Option<Observables> {
    collective
        .reduce_sum(&local.to_array())
        .map(|total| Observables::from_slice(&total))
}
