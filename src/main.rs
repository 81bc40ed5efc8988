use anyhow::{anyhow, Context};
use log::{error, info};
use structopt::StructOpt;

use ising_mpi::{init_logging, run_sweep, Collective, MpiWorld, Opt, Reporter};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    // invalid arguments end the run before any process talks to another
    let mut params = opt.parameters()?;
    init_logging()?;

    let universe = mpi::initialize().ok_or_else(|| anyhow!("MPI is already initialized"))?;
    let world = MpiWorld::new(universe.world());
    let rank = world.rank();
    let size = world.size();

    if world.is_root() {
        info!("{}", mpi::environment::library_version().unwrap_or_default());
    }

    params.share(&world);
    info!("worker {}/{} starting with {:?}", rank, size, params);

    let mut reporter = if world.is_root() {
        match Reporter::create(opt.output_path()) {
            Ok(reporter) => Some(reporter),
            Err(err) => {
                error!("{:#}", err);
                world.abort(1);
            }
        }
    } else {
        None
    };

    let time_start = mpi::time();

    let sweep = run_sweep(&world, &params, |averages| {
        let reporter = reporter.as_mut().context("Result row outside the root process")?;
        reporter.write(averages)?;
        println!("{}", averages.temperature);
        Ok(())
    });

    if let Err(err) = sweep {
        error!("worker {}: {:#}", rank, err);
        world.abort(1);
    }
    drop(reporter);

    let total_time = mpi::time() - time_start;
    if world.is_root() {
        println!("Time = {} on number of processors: {}", total_time, size);
    }

    Ok(())
}
