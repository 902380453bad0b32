use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use hexhold::{
    engine::{Engine, EngineSettings},
    logging,
    scenario::ScenarioLoader,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Hex settlement simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/river_valley.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,

    /// Override the scenario's log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;

    let level = match &cli.log_level {
        Some(level) => logging::parse_level(level)?,
        None => scenario.logging.parse_level()?,
    };
    logging::init_tracing(level);

    let mut game = scenario.build_game()?;
    let ticks = scenario.ticks(cli.ticks);
    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        snapshot_interval_ticks: cli
            .snapshot_interval
            .unwrap_or(scenario.snapshot_interval_ticks),
        snapshot_dir: cli.snapshot_dir,
        tick_seconds: scenario.tick_seconds,
    };
    let mut engine = Engine::new(settings)?;
    let summary = engine.run(&mut game, ticks)?;

    let stock: Vec<String> = game
        .warehouse()
        .iter()
        .filter(|(_, amount)| *amount > 0)
        .map(|(resource, amount)| format!("{resource}={amount}"))
        .collect();
    println!(
        "Scenario '{}' completed at tick {}. Money: {}, buildings: {}, snapshots: {}, stock: [{}]",
        scenario.name,
        game.current_tick(),
        game.available_money(),
        game.buildings().len(),
        summary.snapshots.len(),
        stock.join(", ")
    );
    Ok(())
}
