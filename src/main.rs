use gravitypie::{ScenarioConfig, Scenario, Runner};
use gravitypie::{bench_gravity, bench_tick};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Headless 2D N-body gravity simulation")]
struct Args {
    /// Scenario file: a path, or a name under the crate's `scenarios/` directory
    #[arg(short, default_value = "two_body.yaml")]
    file_name: String,

    /// Number of ticks to run, overrides `run.ticks`
    #[arg(long)]
    ticks: Option<u64>,

    /// Benchmark the force models instead of running a scenario
    #[arg(long)]
    bench: bool,
}

fn scenario_path(file_name: &str) -> PathBuf {
    let direct = PathBuf::from(file_name);
    if direct.exists() {
        return direct;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = scenario_path(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let scenario_cfg = ScenarioConfig::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;
    log::debug!("{:?}", scenario_cfg);
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_tick();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let ticks = args.ticks.unwrap_or(scenario_cfg.run.ticks);
    let scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario")?;

    let mut runner = Runner::from_scenario(scenario);
    let summary = runner.run(ticks, |_| {})?;

    let cfg = runner.engine().config();
    let (g, soft) = (cfg.gravitational_constant, cfg.softening);
    let e0 = summary.first.total_energy(g, soft);
    let e1 = summary.last.total_energy(g, soft);
    let drift = if e0 != 0.0 { ((e1 - e0) / e0).abs() } else { (e1 - e0).abs() };

    log::info!(
        "done: {} ticks, t = {:.4}, bodies {} -> {}, energy drift {:.3e}, {:.3}ms/frame (slowest {:.3}ms)",
        summary.ticks_run,
        summary.last.t,
        summary.first.len(),
        summary.last.len(),
        drift,
        summary.stats.mean_ms(),
        summary.stats.slowest.as_secs_f64() * 1000.0,
    );
    Ok(())
}
