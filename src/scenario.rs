use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{
    buildings::BuildingCategory,
    game::{Game, GameSettings, PlacementOutcome},
    grid::TilePos,
    logging::LoggingConfig,
    mapgen::HeightMap,
    warehouse::ResourceType,
};

fn default_ticks() -> u64 {
    120
}

fn default_snapshot_interval_ticks() -> u64 {
    30
}

fn default_tick_seconds() -> f64 {
    1.0
}

fn default_smoothing_passes() -> u32 {
    2
}

fn default_sea_level() -> f32 {
    0.15
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    /// Real-time seconds per game tick.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,
    pub map: MapConfig,
    pub economy: GameSettings,
    #[serde(default)]
    pub initial_resources: BTreeMap<ResourceType, i64>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub buildings: Vec<BuildingCategory>,
    #[serde(default)]
    pub placements: Vec<ScenarioPlacement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,
    /// Gray values per row, `y` outer. Generated from the seed when absent.
    #[serde(default)]
    pub heights: Option<Vec<Vec<f32>>>,
    #[serde(default = "default_smoothing_passes")]
    pub smoothing_passes: u32,
    #[serde(default = "default_sea_level")]
    pub sea_level: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPlacement {
    pub building: String,
    pub x: u32,
    pub y: u32,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("scenario name must not be empty");
        }
        if self.map.width == 0 || self.map.height == 0 {
            bail!(
                "map dimensions must be positive, got {}x{}",
                self.map.width,
                self.map.height
            );
        }
        if let Some(rows) = &self.map.heights {
            if rows.len() != self.map.height as usize {
                bail!(
                    "map has {} height rows, expected {}",
                    rows.len(),
                    self.map.height
                );
            }
            if let Some((y, row)) = rows
                .iter()
                .enumerate()
                .find(|(_, row)| row.len() != self.map.width as usize)
            {
                bail!(
                    "height row {y} has {} values, expected {}",
                    row.len(),
                    self.map.width
                );
            }
        }
        if self.economy.economy_tick_interval == 0 {
            bail!("economy_tick_interval must be at least 1");
        }
        if self.economy.initial_money < 0 || self.economy.income_per_economy_tick < 0 {
            bail!("economy amounts must not be negative");
        }
        if !(self.tick_seconds > 0.0 && self.tick_seconds.is_finite()) {
            bail!("tick_seconds must be positive, got {}", self.tick_seconds);
        }
        if let Some((resource, amount)) = self
            .initial_resources
            .iter()
            .find(|(_, amount)| **amount < 0)
        {
            bail!("initial {resource} must not be negative, got {amount}");
        }

        let mut names = HashSet::new();
        for category in &self.buildings {
            if !names.insert(category.name.as_str()) {
                bail!("building '{}' is defined more than once", category.name);
            }
            category.validate()?;
        }
        for placement in &self.placements {
            if !names.contains(placement.building.as_str()) {
                bail!("placement refers to unknown building '{}'", placement.building);
            }
        }
        Ok(())
    }

    pub fn category(&self, name: &str) -> Option<&BuildingCategory> {
        self.buildings.iter().find(|category| category.name == name)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or_else(default_ticks)
    }

    pub fn height_map(&self) -> Result<HeightMap> {
        let map = match &self.map.heights {
            Some(rows) => HeightMap::from_rows(rows)?,
            None => HeightMap::generate(
                self.map.width,
                self.map.height,
                self.seed,
                self.map.smoothing_passes,
                self.map.sea_level,
            )?,
        };
        Ok(map)
    }

    /// Build the map, stock the warehouse and apply the configured
    /// placements in order. Rejected placements are logged and skipped.
    pub fn build_game(&self) -> Result<Game> {
        let grid = self
            .height_map()?
            .to_grid()
            .with_context(|| format!("Failed to build the map of scenario '{}'", self.name))?;
        let mut game = Game::new(grid, self.economy)?;
        for (&resource, &amount) in &self.initial_resources {
            game.store_resource(resource, amount)?;
        }

        for placement in &self.placements {
            let Some(category) = self.category(&placement.building) else {
                bail!("placement refers to unknown building '{}'", placement.building);
            };
            let pos = TilePos::new(placement.x, placement.y);
            let outcome = game
                .try_place_building(pos, category)
                .with_context(|| format!("Failed to place '{}' at {pos}", category.name))?;
            if let PlacementOutcome::Rejected(reason) = outcome {
                tracing::warn!(
                    scenario = %self.name,
                    building = %category.name,
                    pos = %pos,
                    %reason,
                    "scenario placement rejected"
                );
            }
        }
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: test
seed: 3
map:
  width: 3
  height: 2
  heights:
    - [0.3, 0.3, 0.5]
    - [0.0, 0.3, 0.3]
economy:
  initial_money: 100
buildings:
  - name: farm
    upkeep_cost: 1
    build_cost_money: 40
    compatible_tile_types: [grass]
    kind:
      type: production
      generation_interval: 2
      output_resource: potato
placements:
  - { building: farm, x: 0, y: 0 }
  - { building: farm, x: 2, y: 0 }
  - { building: farm, x: 1, y: 0 }
  - { building: farm, x: 1, y: 1 }
"#;

    fn parse(yaml: &str) -> Scenario {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let scenario = parse(MINIMAL);
        scenario.validate().unwrap();
        assert_eq!(scenario.ticks(None), 120);
        assert_eq!(scenario.ticks(Some(7)), 7);
        assert_eq!(scenario.snapshot_interval_ticks, 30);
        assert_eq!(scenario.tick_seconds, 1.0);
        assert_eq!(scenario.map.smoothing_passes, 2);
        assert_eq!(scenario.economy.economy_tick_interval, 10);
        assert_eq!(scenario.economy.income_per_economy_tick, 0);
        assert_eq!(scenario.logging.level, "info");
    }

    #[test]
    fn test_build_game_applies_placements_in_order() {
        let game = parse(MINIMAL).build_game().unwrap();
        // forest at (2, 0) is incompatible and the last farm is unaffordable
        assert_eq!(game.buildings().len(), 2);
        assert_eq!(game.buildings()[0].pos, TilePos::new(0, 0));
        assert_eq!(game.buildings()[1].pos, TilePos::new(1, 0));
        assert_eq!(game.available_money(), 20);
    }

    #[test]
    fn test_rejects_unknown_building() {
        let yaml = MINIMAL.replace("{ building: farm, x: 1, y: 1 }", "{ building: mine, x: 1, y: 1 }");
        assert!(parse(&yaml).validate().is_err());
    }

    #[test]
    fn test_rejects_bad_height_rows() {
        let yaml = MINIMAL.replace("- [0.0, 0.3, 0.3]", "- [0.0, 0.3]");
        assert!(parse(&yaml).validate().is_err());
    }

    #[test]
    fn test_rejects_zero_economy_interval() {
        let yaml = MINIMAL.replace("initial_money: 100", "initial_money: 100\n  economy_tick_interval: 0");
        assert!(parse(&yaml).validate().is_err());
    }

    #[test]
    fn test_rejects_invalid_category() {
        let yaml = MINIMAL.replace("upkeep_cost: 1", "upkeep_cost: -5");
        assert!(parse(&yaml).validate().is_err());
        let yaml = MINIMAL.replace("generation_interval: 2", "generation_interval: 0");
        assert!(parse(&yaml).validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_category() {
        let mut scenario = parse(MINIMAL);
        let duplicate = scenario.buildings[0].clone();
        scenario.buildings.push(duplicate);
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_procedural_map_when_heights_missing() {
        let mut scenario = parse(MINIMAL);
        scenario.map.heights = None;
        scenario.map.width = 12;
        scenario.map.height = 9;
        scenario.placements.clear();
        let a = scenario.height_map().unwrap();
        let b = scenario.height_map().unwrap();
        assert_eq!(a, b);
        assert_eq!(scenario.build_game().unwrap().grid().tile_count(), 108);
    }
}
