use std::path::PathBuf;

use anyhow::ensure;
use structopt::StructOpt;

use crate::collective::Collective;

#[derive(Debug, StructOpt)]
#[structopt(name = "ising_mpi", about = "Metropolis Monte Carlo sweep of the 2D Ising model")]
pub struct Opt {
    /// lattice side length
    pub lattice_size: usize,
    /// total number of MC cycles per temperature
    pub cycles: usize,
    /// first temperature of the sweep
    pub t_min: f64,
    /// last temperature of the sweep (inclusive)
    pub t_max: f64,
    /// temperature step
    pub t_step: f64,
    /// output file name
    #[structopt(parse(from_os_str))]
    pub output: PathBuf,
    /// directory the output file is placed in
    #[structopt(long, default_value = "results", parse(from_os_str))]
    pub output_dir: PathBuf,
    /// base seed for the per-worker random streams, drawn from entropy when absent
    #[structopt(long)]
    pub seed: Option<u64>,
}

impl Opt {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output)
    }

    pub fn parameters(&self) -> anyhow::Result<SweepParameters> {
        let parameters = SweepParameters {
            lattice_size: self.lattice_size,
            cycles: self.cycles,
            t_min: self.t_min,
            t_max: self.t_max,
            t_step: self.t_step,
            seed: self.seed.unwrap_or_else(rand::random),
        };
        parameters.validate()?;
        Ok(parameters)
    }
}

/// Run-wide constants, identical on every worker once shared.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepParameters {
    pub lattice_size: usize,
    pub cycles: usize,
    pub t_min: f64,
    pub t_max: f64,
    pub t_step: f64,
    pub seed: u64,
}

impl SweepParameters {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.lattice_size > 0, "Lattice size must be positive");
        ensure!(self.cycles > 0, "Number of MC cycles must be positive");
        ensure!(
            self.t_min.is_finite() && self.t_max.is_finite() && self.t_step.is_finite(),
            "Temperatures must be finite"
        );
        ensure!(self.t_min > 0.0, "Initial temperature must be positive, got {}", self.t_min);
        ensure!(self.t_step > 0.0, "Temperature step must be positive, got {}", self.t_step);
        ensure!(
            self.t_max >= self.t_min,
            "Final temperature {} is below the initial temperature {}",
            self.t_max,
            self.t_min
        );
        Ok(())
    }

    /// `t_min, t_min + t_step, ...` up to and including `t_max`.
    pub fn temperatures(&self) -> impl Iterator<Item = f64> {
        let SweepParameters { t_min, t_max, t_step, .. } = *self;
        let limit = t_max + t_step * 1e-9;

        (0u64..)
            .map(move |k| t_min + k as f64 * t_step)
            .take_while(move |&t| t <= limit)
    }

    /// Replaces every worker's parameters with the root's.
    pub fn share(&mut self, collective: &impl Collective) {
        let mut integers = [self.lattice_size as u64, self.cycles as u64, self.seed];
        collective.broadcast_integers(&mut integers);

        let mut floats = [self.t_min, self.t_max, self.t_step];
        collective.broadcast_floats(&mut floats);

        let [lattice_size, cycles, seed] = integers;
        let [t_min, t_max, t_step] = floats;
        *self = SweepParameters {
            lattice_size: lattice_size as usize,
            cycles: cycles as usize,
            t_min,
            t_max,
            t_step,
            seed,
        };
    }
}
