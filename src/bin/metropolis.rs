use structopt::StructOpt;

use ising_mpi::{init_logging, run_sweep, LocalCollective, Opt, Reporter};

/// Runs the sweep in a single process, without an MPI launcher.
fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    let params = opt.parameters()?;
    init_logging()?;

    let collective = LocalCollective::single();
    let mut reporter = Reporter::create(opt.output_path())?;

    measure_time::info_time!("Sweep of {}x{} lattice", params.lattice_size, params.lattice_size);
    run_sweep(&collective, &params, |averages| {
        reporter.write(averages)?;
        println!("{}", averages.temperature);
        Ok(())
    })?;

    Ok(())
}
