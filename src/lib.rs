pub mod accumulator;
pub mod collective;
pub mod config;
pub mod initializer;
pub mod lattice;
pub mod matrix;
pub mod metropolis;
pub mod reporter;
pub mod sweep;
pub mod utils;
pub mod world;

pub use accumulator::{accumulate, reduce_observables, Accumulation, CycleRange, Observables};
pub use collective::{Collective, LocalCollective, ROOT_RANK};
pub use config::{Opt, SweepParameters};
pub use lattice::Lattice;
pub use metropolis::{metropolis_cycle, BoltzmannTable};
pub use reporter::{Reporter, ThermodynamicAverages};
pub use sweep::run_sweep;
pub use world::MpiWorld;

/// Sets up leveled logging; `RUST_LOG` overrides the default `Info` level.
pub fn init_logging() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;
    Ok(())
}
