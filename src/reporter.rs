use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use crate::accumulator::Observables;

pub const FIELD_WIDTH: usize = 15;
pub const SIGNIFICANT_DIGITS: usize = 8;

/// Per-spin thermodynamic averages at one temperature.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThermodynamicAverages {
    pub temperature: f64,
    pub mean_energy: f64,
    pub specific_heat: f64,
    pub mean_magnetization: f64,
    pub susceptibility: f64,
    pub mean_abs_magnetization: f64,
}

impl ThermodynamicAverages {
    /// Turns sums collected over `cycles` MC cycles into per-spin averages.
    pub fn from_totals(lattice_size: usize, cycles: usize, temperature: f64, totals: &Observables) -> Self {
        let norm = 1.0 / cycles as f64;
        let spins = (lattice_size * lattice_size) as f64;

        let energy = totals.energy * norm;
        let energy_squared = totals.energy_squared * norm;
        let magnetization = totals.magnetization * norm;
        let magnetization_squared = totals.magnetization_squared * norm;
        let abs_magnetization = totals.abs_magnetization * norm;

        let energy_variance = (energy_squared - energy * energy) / spins;
        let susceptibility = (magnetization_squared - abs_magnetization * abs_magnetization) / (spins * temperature);

        Self {
            temperature,
            mean_energy: energy / spins,
            specific_heat: energy_variance / (temperature * temperature),
            mean_magnetization: magnetization / spins,
            susceptibility,
            mean_abs_magnetization: abs_magnetization / spins,
        }
    }

    pub fn fields(&self) -> [f64; 6] {
        [
            self.temperature,
            self.mean_energy,
            self.specific_heat,
            self.mean_magnetization,
            self.susceptibility,
            self.mean_abs_magnetization,
        ]
    }

    /// Fixed-width output line, without the newline.
    pub fn to_row(&self) -> String {
        self.fields()
            .iter()
            .map(|&value| format!("{:>width$}", format_general(value, SIGNIFICANT_DIGITS), width = FIELD_WIDTH))
            .collect()
    }
}

/// `value` with `precision` significant digits, laid out like C's `%#.{precision}G`.
pub fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}E{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        let fixed = format!("{:.*}", decimals, value);
        // the decimal point is always kept
        if decimals == 0 {
            fixed + "."
        } else {
            fixed
        }
    }
}

/// Appends result rows to the run's output.
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<BufWriter<File>> {
    /// Opens `path` for appending, creating missing directories on the way.
    pub fn create(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open output file {}", path.display()))?;

        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Derives the averages from reduced `totals` and writes them as one row.
    pub fn report(
        &mut self,
        lattice_size: usize,
        cycles: usize,
        temperature: f64,
        totals: &Observables,
    ) -> anyhow::Result<ThermodynamicAverages> {
        let averages = ThermodynamicAverages::from_totals(lattice_size, cycles, temperature, totals);
        self.write(&averages)?;
        Ok(averages)
    }

    pub fn write(&mut self, averages: &ThermodynamicAverages) -> anyhow::Result<()> {
        writeln!(self.out, "{}", averages.to_row()).context("Failed to write result row")?;
        self.out.flush().context("Failed to flush output")?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn general_format_fixed_range() {
        assert_eq!(format_general(1.0, 8), "1.0000000");
        assert_eq!(format_general(-2.0, 8), "-2.0000000");
        assert_eq!(format_general(2.269, 8), "2.2690000");
        assert_eq!(format_general(0.0, 8), "0.0000000");
        assert_eq!(format_general(0.00012345678, 8), "0.00012345678");
        assert_eq!(format_general(12345678.0, 8), "12345678.");
        assert_eq!(format_general(-1.234567891, 8), "-1.2345679");
    }

    #[test]
    fn general_format_exponent_range() {
        assert_eq!(format_general(1.5e-7, 8), "1.5000000E-07");
        assert_eq!(format_general(123456789.0, 8), "1.2345679E+08");
        assert_eq!(format_general(-3.0e-5, 8), "-3.0000000E-05");
        assert_eq!(format_general(2.5e120, 8), "2.5000000E+120");
        assert_eq!(format_general(f64::NAN, 8), "NAN");
    }

    #[test]
    fn rounding_can_bump_the_exponent() {
        assert_eq!(format_general(99999999.5, 8), "1.0000000E+08");
        assert_eq!(format_general(9.99999999, 8), "10.000000");
    }

    #[test]
    fn averages_from_totals() {
        // two cycles on a 2x2 lattice with E = -8, -4 and M = 4, -2
        let totals = Observables {
            energy: -12.0,
            energy_squared: 80.0,
            magnetization: 2.0,
            magnetization_squared: 20.0,
            abs_magnetization: 6.0,
        };
        let averages = ThermodynamicAverages::from_totals(2, 2, 2.0, &totals);

        assert_relative_eq!(averages.mean_energy, -1.5);
        // <E^2> - <E>^2 = 40 - 36
        assert_relative_eq!(averages.specific_heat, 4.0 / 4.0 / 4.0);
        assert_relative_eq!(averages.mean_magnetization, 0.25);
        // <M^2> - <|M|>^2 = 10 - 9
        assert_relative_eq!(averages.susceptibility, 1.0 / 4.0 / 2.0);
        assert_relative_eq!(averages.mean_abs_magnetization, 0.75);
        assert_eq!(averages.temperature, 2.0);
    }

    #[test]
    fn report_appends_fixed_width_rows() {
        let totals = Observables {
            energy: -8.0,
            energy_squared: 64.0,
            magnetization: 4.0,
            magnetization_squared: 16.0,
            abs_magnetization: 4.0,
        };

        let mut reporter = Reporter::new(Vec::new());
        reporter.report(2, 1, 1.0, &totals).unwrap();
        reporter.report(2, 1, 1.5, &totals).unwrap();

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "      1.0000000     -2.0000000      0.0000000      1.0000000      0.0000000      1.0000000"
        );
        assert!(lines.iter().all(|line| line.len() == 6 * FIELD_WIDTH));
        assert!(lines[1].starts_with("      1.5000000"));
    }
}
