use log::debug;

use crate::accumulator::{accumulate, reduce_observables, CycleRange};
use crate::collective::Collective;
use crate::config::SweepParameters;
use crate::initializer::{initialize_lattice, CRITICAL_TEMPERATURE};
use crate::lattice::Lattice;
use crate::metropolis::BoltzmannTable;
use crate::reporter::ThermodynamicAverages;
use crate::utils::worker_rng;

/// Runs the whole temperature sweep on this worker.
///
/// Must be called by every worker of `collective` with the shared parameters.
/// `on_row` is invoked on the root only, once per temperature, in sweep order; an
/// error from it stops the sweep. Returns the number of temperatures visited.
pub fn run_sweep<C, F>(collective: &C, params: &SweepParameters, mut on_row: F) -> anyhow::Result<usize>
where
    C: Collective,
    F: FnMut(&ThermodynamicAverages) -> anyhow::Result<()>,
{
    let rank = collective.rank();
    let range = CycleRange::for_worker(params.cycles, collective.size(), rank);
    debug!("worker {}: cycles {}..={} ({})", rank, range.begin, range.end, range.len());

    let mut rng = worker_rng(params.seed, rank);
    let mut lattice = Lattice::new(params.lattice_size);
    let mut points = 0;

    for temperature in params.temperatures() {
        measure_time::debug_time!("worker {} at T = {}", rank, temperature);

        let start = initialize_lattice(&mut lattice, temperature, CRITICAL_TEMPERATURE, &mut rng);
        let table = BoltzmannTable::new(temperature);
        let local = accumulate(&mut lattice, &table, range, &mut rng);
        debug!(
            "worker {}: T = {} start {:?}, {} accepted flips",
            rank, temperature, start, local.accepted_flips
        );

        if let Some(totals) = reduce_observables(collective, &local.observables) {
            let averages = ThermodynamicAverages::from_totals(params.lattice_size, params.cycles, temperature, &totals);
            on_row(&averages)?;
        }
        points += 1;
    }

    Ok(points)
}
