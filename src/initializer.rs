use rand::Rng;

use crate::lattice::Lattice;

/// Onsager's critical temperature of the square lattice, `2 / ln(1 + sqrt(2))`, to
/// three decimals.
pub const CRITICAL_TEMPERATURE: f64 = 2.269;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Start {
    Ordered,
    Random,
}

/// Resets `lattice` for a new temperature: aligned below `critical_temperature`,
/// random at or above it.
pub fn initialize_lattice(
    lattice: &mut Lattice,
    temperature: f64,
    critical_temperature: f64,
    rng: &mut impl Rng,
) -> Start {
    let start = if temperature < critical_temperature {
        Start::Ordered
    } else {
        Start::Random
    };

    lattice.set_configuration(start == Start::Ordered, rng);
    start
}
