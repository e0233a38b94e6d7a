//! # DELTASIM-RS
//!
//! Pin-cell delta-tracking run on synthetic nuclear data.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use deltasim_rs::particle::ParticleSource;
use deltasim_rs::problems::{pin_cell, synthetic_library};
use deltasim_rs::*;

/// Points per nuclide in the synthetic tabulation
const LIBRARY_POINTS: usize = 2000;

#[derive(Parser, Debug)]
#[command(name = "deltasim", version, about = "Delta-tracking transport through a pin cell")]
struct Args {
    /// Number of particle histories
    #[arg(short = 'n', long)]
    particles: Option<usize>,

    /// Random number seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Energy cutoff (eV)
    #[arg(long)]
    e_min: Option<f64>,

    /// JSON settings file; flags given on the command line take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log every history
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn settings(&self) -> Result<TransportSettings> {
        let mut settings = match &self.config {
            Some(path) => TransportSettings::from_json_file(path)?,
            None => TransportSettings::default(),
        };
        if let Some(n) = self.particles {
            settings.n_particles = n;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(e_min) = self.e_min {
            settings.energy_cutoff = e_min;
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    println!("{}", info());
    println!();

    let settings = args.settings()?;

    info!("Computing material cross-sections...");
    let library = synthetic_library(LIBRARY_POINTS)?;
    let mut geometry = pin_cell();
    geometry.tabulate_cross_sections(&library)?;

    info!("Computing majorant cross-section...");
    let majorant = majorant_from_geometry(&geometry, &library)?.into_function()?;

    let start = std::time::Instant::now();
    let n_particles = settings.n_particles;
    let mut tracker = DeltaTracker::new(&majorant, &geometry, settings)?;
    tracker.run(&ParticleSource::new(), n_particles)?;
    let elapsed = start.elapsed();

    println!();
    println!("{}", tracker.summary());
    println!("Wall-clock time: {:.3} s", elapsed.as_secs_f64());
    println!(
        "Performance: {:.2e} flights/s",
        tracker.stats().advances as f64 / elapsed.as_secs_f64()
    );

    Ok(())
}
