use itertools::iproduct;
use rand::Rng;

use crate::matrix::Matrix;

/// Coupling constant of the nearest-neighbor interaction.
pub const J: i32 = 1;

/// Square Ising lattice with periodic boundaries.
///
/// `energy` and `magnetization` are kept in sync with the spins on every
/// [`Lattice::flip`], so reading them is free.
#[derive(Clone, Debug)]
pub struct Lattice {
    spins: Matrix<i8>,
    energy: f64,
    magnetization: f64,
}

impl Lattice {
    /// Creates an `size`×`size` lattice with every spin up.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "lattice side must be positive");

        let mut lattice = Self {
            spins: Matrix::filled(size, 1),
            energy: 0.0,
            magnetization: 0.0,
        };
        lattice.recalculate_energy();
        lattice.recalculate_magnetization();
        lattice
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.spins.size()
    }

    #[inline(always)]
    pub fn spin_count(&self) -> usize {
        self.size() * self.size()
    }

    #[inline(always)]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    #[inline(always)]
    pub fn magnetization(&self) -> f64 {
        self.magnetization
    }

    #[inline(always)]
    pub fn spin(&self, row: usize, col: usize) -> i8 {
        self.spins[(row, col)]
    }

    #[inline(always)]
    pub fn spins(&self) -> &Matrix<i8> {
        &self.spins
    }

    /// All spins up when `ordered`, otherwise each spin is an independent fair coin.
    pub fn set_configuration(&mut self, ordered: bool, rng: &mut impl Rng) {
        if ordered {
            self.spins.fill(1);
        } else {
            for spin in self.spins.as_mut_slice() {
                *spin = if rng.gen_bool(0.5) { 1 } else { -1 };
            }
        }
        self.recalculate_energy();
        self.recalculate_magnetization();
    }

    /// Loads a row-major spin configuration.
    pub fn set_spins(&mut self, spins: &[i8]) {
        assert_eq!(self.spin_count(), spins.len());
        assert!(spins.iter().all(|&s| s == 1 || s == -1), "spins must be +1 or -1");

        self.spins.as_mut_slice().copy_from_slice(spins);
        self.recalculate_energy();
        self.recalculate_magnetization();
    }

    /// Up, down, left and right neighbors of a site, wrapped around the edges.
    #[inline(always)]
    pub fn neighbors(&self, row: usize, col: usize) -> [(usize, usize); 4] {
        let n = self.size();
        [
            ((row + n - 1) % n, col),
            ((row + 1) % n, col),
            (row, (col + n - 1) % n),
            (row, (col + 1) % n),
        ]
    }

    #[inline(always)]
    pub fn neighbor_sum(&self, row: usize, col: usize) -> i32 {
        self.neighbors(row, col)
            .iter()
            .map(|&index| self.spins[index] as i32)
            .sum()
    }

    /// Energy change caused by flipping the spin at `(row, col)`.
    #[inline(always)]
    pub fn local_delta_energy(&self, row: usize, col: usize) -> i32 {
        // a single site only couples to itself
        if self.size() == 1 {
            return 0;
        }
        2 * J * self.spins[(row, col)] as i32 * self.neighbor_sum(row, col)
    }

    pub fn flip(&mut self, row: usize, col: usize) {
        let delta = self.local_delta_energy(row, col);

        let new_spin = -self.spins[(row, col)];
        self.spins[(row, col)] = new_spin;

        self.energy += delta as f64;
        self.magnetization += 2.0 * new_spin as f64;
    }

    /// Sums the right and lower bond of every site.
    pub fn recalculate_energy(&mut self) {
        let n = self.size();
        let energy: i64 = iproduct!(0..n, 0..n)
            .map(|(row, col)| {
                let s = self.spins[(row, col)] as i64;
                let right = self.spins[(row, (col + 1) % n)] as i64;
                let down = self.spins[((row + 1) % n, col)] as i64;
                -(J as i64) * s * (right + down)
            })
            .sum();
        self.energy = energy as f64;
    }

    pub fn recalculate_magnetization(&mut self) {
        let magnetization: i64 = self.spins.as_slice().iter().map(|&s| s as i64).sum();
        self.magnetization = magnetization as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn from_scratch(lattice: &Lattice) -> Lattice {
        let mut fresh = Lattice::new(lattice.size());
        fresh.set_spins(lattice.spins().as_slice());
        fresh
    }

    #[test]
    fn ordered_two_by_two() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut lattice = Lattice::new(2);
        lattice.set_configuration(true, &mut rng);

        assert_eq!(lattice.energy(), -8.0);
        assert_eq!(lattice.magnetization(), 4.0);
        assert_eq!(lattice.local_delta_energy(0, 0), 8);
    }

    #[test]
    fn single_site_flips_are_free() {
        let mut lattice = Lattice::new(1);
        assert_eq!(lattice.energy(), -2.0);
        assert_eq!(lattice.local_delta_energy(0, 0), 0);

        lattice.flip(0, 0);
        assert_eq!(lattice.energy(), -2.0);
        assert_eq!(lattice.magnetization(), -1.0);
    }

    #[test]
    fn ordered_ground_state_energy() {
        let lattice = Lattice::new(5);
        assert_eq!(lattice.energy(), -2.0 * 25.0);
        assert_eq!(lattice.magnetization(), 25.0);
    }

    #[test]
    fn corner_wraps_around() {
        let lattice = Lattice::new(4);
        let neighbors = lattice.neighbors(0, 0);

        for expected in [(3, 0), (1, 0), (0, 3), (0, 1)] {
            assert!(neighbors.contains(&expected), "missing {:?}", expected);
        }

        let neighbors = lattice.neighbors(3, 3);
        for expected in [(2, 3), (0, 3), (3, 2), (3, 0)] {
            assert!(neighbors.contains(&expected), "missing {:?}", expected);
        }
    }

    #[test]
    fn delta_energy_follows_neighbors() {
        let mut lattice = Lattice::new(3);
        #[rustfmt::skip]
        let spins: [i8; 9] = [
            1, -1,  1,
           -1,  1, -1,
            1, -1,  1,
        ];
        lattice.set_spins(&spins);

        // (1, 1) is surrounded by opposite spins
        assert_eq!(lattice.neighbor_sum(1, 1), -4);
        assert_eq!(lattice.local_delta_energy(1, 1), -8);

        // (0, 0) sees (2, 0), (1, 0), (0, 2), (0, 1)
        assert_eq!(lattice.neighbor_sum(0, 0), 1 - 1 + 1 - 1);
        assert_eq!(lattice.local_delta_energy(0, 0), 0);
    }

    #[test]
    fn random_configuration_keeps_spin_domain() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let mut lattice = Lattice::new(16);
        lattice.set_configuration(false, &mut rng);

        let spins = lattice.spins().as_slice();
        assert!(spins.iter().all(|&s| s == 1 || s == -1));
        assert!(spins.iter().any(|&s| s == 1));
        assert!(spins.iter().any(|&s| s == -1));

        let fresh = from_scratch(&lattice);
        assert_eq!(lattice.energy(), fresh.energy());
        assert_eq!(lattice.magnetization(), fresh.magnetization());
    }

    #[test]
    fn incremental_updates_match_recalculation() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        for size in [1, 2, 3, 8] {
            let mut lattice = Lattice::new(size);
            lattice.set_configuration(false, &mut rng);

            for _ in 0..2000 {
                let row = rng.gen_range(0..size);
                let col = rng.gen_range(0..size);
                lattice.flip(row, col);
            }

            assert!(lattice.spins().as_slice().iter().all(|&s| s == 1 || s == -1));

            let fresh = from_scratch(&lattice);
            assert_relative_eq!(lattice.energy(), fresh.energy(), max_relative = 1e-9);
            assert_relative_eq!(
                lattice.magnetization(),
                fresh.magnetization(),
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn flip_twice_restores_state() {
        let mut lattice = Lattice::new(4);
        let before = lattice.clone();

        lattice.flip(2, 1);
        assert_eq!(lattice.spin(2, 1), -1);
        assert_eq!(lattice.magnetization(), 14.0);

        lattice.flip(2, 1);
        assert_eq!(lattice.spins(), before.spins());
        assert_eq!(lattice.energy(), before.energy());
    }

    #[test]
    #[should_panic]
    fn rejects_invalid_spins() {
        let mut lattice = Lattice::new(2);
        lattice.set_spins(&[1, 0, 1, -1]);
    }
}
