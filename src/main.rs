// Headless flocking run: load a scenario, spawn the flock around the
// centerpiece, step it for a fixed number of ticks and log how it moves.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flume_flock::{ScenarioConfig, Simulation};

#[derive(Parser, Debug)]
#[command(about = "Run a flocking scenario without a window")]
struct Args {
    /// Scenario YAML. Relative names that don't exist are looked up in `scenarios/`.
    #[arg(short, long, default_value = "flock.yaml")]
    scenario: PathBuf,

    /// Override the scenario's tick count.
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the scenario's time step, in seconds.
    #[arg(long)]
    dt: Option<f32>,

    /// Override the scenario's random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Log flock statistics every N ticks (0 = only at the end).
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

fn resolve_scenario_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(path)
}

fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    let path = resolve_scenario_path(args.scenario.clone());
    let file = File::open(&path).with_context(|| format!("opening scenario {}", path.display()))?;
    let mut config: ScenarioConfig = serde_yaml::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing scenario {}", path.display()))?;

    if let Some(ticks) = args.ticks {
        config.simulation.ticks = ticks;
    }
    if let Some(dt) = args.dt {
        config.simulation.dt = dt;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = load_scenario(&args)?;
    let ticks = config.simulation.ticks;
    let dt = config.simulation.dt;

    let mut sim = Simulation::new(config).context("invalid scenario")?;
    let spawned = sim.enable()?;
    log::info!("running {ticks} ticks of {dt:.4}s with {spawned} agents");

    for tick in 1..=ticks {
        sim.tick(dt);
        if args.report_every > 0 && tick % args.report_every == 0 {
            log::info!("tick {tick} | {}", sim.stats());
        }
    }

    println!("{}", sim.stats());
    sim.disable();
    Ok(())
}
