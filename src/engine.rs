use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use crate::{
    clock::TickClock,
    game::{Game, TickReport},
    snapshot::SnapshotWriter,
    warehouse::ResourceType,
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
    /// Real-time seconds per game tick, used by `advance_by`.
    pub tick_seconds: f64,
}

/// Totals over one `run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub produced: BTreeMap<ResourceType, i64>,
    pub economy_ticks: u64,
    pub snapshots: Vec<PathBuf>,
}

impl RunSummary {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        if report.settlement.is_some() {
            self.economy_ticks += 1;
        }
        for (_, output) in &report.produced {
            let total = self.produced.entry(output.resource).or_insert(0);
            *total = total.saturating_add(output.amount);
        }
    }
}

pub struct Engine {
    settings: EngineSettings,
    snapshot_writer: SnapshotWriter,
    clock: TickClock,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Result<Self> {
        let clock = TickClock::new(settings.tick_seconds)?;
        Ok(Self {
            snapshot_writer: SnapshotWriter::new(
                &settings.snapshot_dir,
                settings.snapshot_interval_ticks,
            ),
            clock,
            settings,
        })
    }

    pub fn run(&mut self, game: &mut Game, ticks: u64) -> Result<RunSummary> {
        self.run_with_hook(game, ticks, |_, _| {})
    }

    /// Run `ticks` game ticks, calling `hook` after each one.
    pub fn run_with_hook<F>(&mut self, game: &mut Game, ticks: u64, mut hook: F) -> Result<RunSummary>
    where
        F: FnMut(&Game, &TickReport),
    {
        let mut summary = RunSummary::default();
        for _ in 0..ticks {
            let report = self.step(game, &mut summary)?;
            hook(&*game, &report);
        }
        Ok(summary)
    }

    /// Feed `elapsed` real-time seconds through the clock and run every game
    /// tick that became due.
    pub fn advance_by(&mut self, game: &mut Game, elapsed: f64) -> Result<RunSummary> {
        let due = self.clock.update(elapsed)?;
        let mut summary = RunSummary::default();
        for _ in 0..due {
            self.step(game, &mut summary)?;
        }
        Ok(summary)
    }

    fn step(&mut self, game: &mut Game, summary: &mut RunSummary) -> Result<TickReport> {
        let report = game.game_time_tick()?;
        summary.record(&report);
        if let Some(path) = self
            .snapshot_writer
            .maybe_write(game, &self.settings.scenario_name)?
        {
            summary.snapshots.push(path);
        }
        Ok(report)
    }
}
