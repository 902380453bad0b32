use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingId, ProductionState};
use crate::game::Game;
use crate::grid::TilePos;
use crate::warehouse::ResourceType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub scenario: String,
    pub tick: u64,
    pub written_at: DateTime<Utc>,
    pub money: i64,
    pub ticks_until_economy_tick: u32,
    pub resources: Vec<ResourceCount>,
    pub buildings: Vec<BuildingSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCount {
    pub resource: ResourceType,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    pub id: BuildingId,
    pub category: String,
    pub pos: TilePos,
    pub kind: String,
    pub upkeep_cost: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ProductionState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
    #[serde(default)]
    pub residents: u32,
}

impl GameSnapshot {
    pub fn capture(game: &Game, scenario: &str) -> Self {
        let resources = game
            .warehouse()
            .iter()
            .map(|(resource, amount)| ResourceCount { resource, amount })
            .collect();
        let buildings = game
            .buildings()
            .iter()
            .map(|placed| {
                let (efficiency, state, progress) = match &placed.building {
                    Building::Production(building) => (
                        Some(building.efficiency()),
                        Some(building.state()),
                        Some(building.progress()),
                    ),
                    Building::Housing(_) => (None, None, None),
                };
                BuildingSnapshot {
                    id: placed.id,
                    category: placed.category.clone(),
                    pos: placed.pos,
                    kind: placed.building.kind_name().to_string(),
                    upkeep_cost: placed.building.upkeep_cost(),
                    efficiency,
                    state,
                    progress,
                    residents: placed.building.residents(),
                }
            })
            .collect();
        Self {
            scenario: scenario.to_string(),
            tick: game.current_tick(),
            written_at: Utc::now(),
            money: game.available_money(),
            ticks_until_economy_tick: game.ticks_until_economy_tick(),
            resources,
            buildings,
        }
    }

    pub fn resource(&self, resource: ResourceType) -> Option<i64> {
        self.resources
            .iter()
            .find(|count| count.resource == resource)
            .map(|count| count.amount)
    }
}

/// Writes a JSON snapshot every `interval` ticks; an interval of 0 turns it off.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn maybe_write(&self, game: &Game, scenario: &str) -> Result<Option<PathBuf>> {
        let tick = game.current_tick();
        if self.interval == 0 || tick == 0 || tick % self.interval != 0 {
            return Ok(None);
        }
        self.write(game, scenario).map(Some)
    }

    pub fn write(&self, game: &Game, scenario: &str) -> Result<PathBuf> {
        let dir = self.dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{:06}.json", game.current_tick()));
        let snapshot = GameSnapshot::capture(game, scenario);
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        tracing::info!(tick = snapshot.tick, path = %path.display(), "snapshot written");
        Ok(path)
    }
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<GameSnapshot> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Failed to parse snapshot {}", path.display()))
}
