//! Headless launcher: resolve configuration, build the simulation and
//! call `update()` until told to stop.

mod telemetry;

use anthill_core::SimulationConfig;
use anthill_world::{Simulation, Snapshot};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Command-line options of the headless host
#[derive(Parser, Debug)]
#[command(name = "anthill-host", about = "Headless ant colony simulation")]
struct Args {
    /// JSON configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run; runs until interrupted when omitted
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Override the configured random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Resume from a snapshot instead of building a new world
    #[arg(long, conflicts_with_all = ["config", "seed"])]
    resume: Option<PathBuf>,

    /// Write a snapshot here when the run ends (`.json` for JSON, else binary)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.json_logs)?;

    let mut sim = match &args.resume {
        Some(path) => {
            let snapshot = Snapshot::load(path)
                .with_context(|| format!("failed to load snapshot {}", path.display()))?;
            Simulation::restore(snapshot)?
        }
        None => Simulation::new(load_config(&args)?)?,
    };

    info!(
        tick = sim.tick(),
        ticks = ?args.ticks,
        colonies = sim.colonies().len(),
        "Starting simulation"
    );

    let start = Instant::now();
    let first_tick = sim.tick();
    match args.ticks {
        Some(ticks) => {
            for _ in 0..ticks {
                sim.update();
            }
        }
        None => loop {
            sim.update();
        },
    }
    let elapsed = start.elapsed();

    info!(
        ticks = sim.tick() - first_tick,
        elapsed_ms = elapsed.as_millis() as u64,
        "Simulation finished"
    );

    if let Some(path) = &args.snapshot {
        sim.snapshot()
            .save(path)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    }

    print_report(&sim);
    Ok(())
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn print_report(sim: &Simulation) {
    println!("=== tick {} ===", sim.tick());
    for colony in sim.colonies() {
        let stats = colony.stats();
        println!(
            "{} nest={} population={} stored={:.2} delivered={:.2} trips={} spawned={} died={}",
            colony.id,
            colony.nest,
            colony.population(),
            colony.stored(),
            stats.food_delivered,
            stats.trips_completed,
            stats.spawned,
            stats.died
        );
    }
    println!("food_remaining={:.2}", sim.field().total_food());
}
