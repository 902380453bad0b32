//! Building catalog and placed buildings

mod efficiency;
mod production;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::grid::{TilePos, TileType};
use crate::warehouse::{ResourceType, Warehouse};

pub use efficiency::{building_efficiency, efficiency_for_count, EfficiencyScaling};
pub use production::{ProducedResource, ProductionBuilding, ProductionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

fn default_output_count() -> i64 {
    1
}

/// Everything needed to place a building of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingCategory {
    pub name: String,
    #[serde(default)]
    pub upkeep_cost: i64,
    #[serde(default)]
    pub build_cost_money: i64,
    #[serde(default)]
    pub build_cost_planks: i64,
    pub compatible_tile_types: Vec<TileType>,
    pub kind: BuildingKind,
}

impl BuildingCategory {
    pub fn is_compatible(&self, tile_type: TileType) -> bool {
        self.compatible_tile_types.contains(&tile_type)
    }

    /// Reject parameters that would break the tick loop once placed.
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |problem: &str| {
            Err(SimError::invalid(format!(
                "building '{}' {problem}",
                self.name
            )))
        };
        if self.upkeep_cost < 0 || self.build_cost_money < 0 || self.build_cost_planks < 0 {
            return invalid("has a negative cost");
        }
        if self.compatible_tile_types.is_empty() {
            return invalid("has no compatible tile types");
        }
        if let BuildingKind::Production(params) = &self.kind {
            if params.generation_interval == 0 {
                return invalid("needs a generation_interval of at least 1");
            }
            if params.output_count < 0 {
                return invalid("has a negative output_count");
            }
            if let Some(scaling) = &params.efficiency_scaling {
                if scaling.min_neighbors > scaling.max_neighbors {
                    return invalid("has min_neighbors above max_neighbors");
                }
            }
        }
        Ok(())
    }

    pub fn efficiency_scaling(&self) -> Option<&EfficiencyScaling> {
        match &self.kind {
            BuildingKind::Production(params) => params.efficiency_scaling.as_ref(),
            BuildingKind::Housing(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildingKind {
    Production(ProductionParams),
    Housing(HousingParams),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionParams {
    /// Ticks per cycle at full efficiency.
    pub generation_interval: u32,
    pub output_resource: ResourceType,
    #[serde(default = "default_output_count")]
    pub output_count: i64,
    /// One unit of each entry is consumed when a cycle starts.
    #[serde(default)]
    pub input_resources: Vec<ResourceType>,
    #[serde(default)]
    pub efficiency_scaling: Option<EfficiencyScaling>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousingParams {
    #[serde(default)]
    pub residents: u32,
}

/// Homes a fixed number of residents whose work pays a side income each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HousingBuilding {
    upkeep_cost: i64,
    residents: u32,
}

impl HousingBuilding {
    pub fn new(upkeep_cost: i64, params: &HousingParams) -> Self {
        Self {
            upkeep_cost,
            residents: params.residents,
        }
    }

    pub fn residents(&self) -> u32 {
        self.residents
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Building {
    Production(ProductionBuilding),
    Housing(HousingBuilding),
}

impl Building {
    /// Instantiate a category. `efficiency` only matters for production.
    pub fn from_category(category: &BuildingCategory, efficiency: f32) -> Self {
        match &category.kind {
            BuildingKind::Production(params) => Building::Production(ProductionBuilding::new(
                category.upkeep_cost,
                params,
                efficiency,
            )),
            BuildingKind::Housing(params) => {
                Building::Housing(HousingBuilding::new(category.upkeep_cost, params))
            }
        }
    }

    pub fn upkeep_cost(&self) -> i64 {
        match self {
            Building::Production(building) => building.upkeep_cost(),
            Building::Housing(building) => building.upkeep_cost,
        }
    }

    pub fn residents(&self) -> u32 {
        match self {
            Building::Production(_) => 0,
            Building::Housing(building) => building.residents(),
        }
    }

    /// Advance by exactly one game tick.
    pub fn advance(
        &mut self,
        warehouse: &mut Warehouse,
    ) -> Result<Option<ProducedResource>, SimError> {
        match self {
            Building::Production(building) => building.advance(warehouse),
            Building::Housing(_) => Ok(None),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Building::Production(_) => "production",
            Building::Housing(_) => "housing",
        }
    }
}

/// A building together with where it stands and what it was built as.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBuilding {
    pub id: BuildingId,
    pub pos: TilePos,
    pub category: String,
    pub building: Building,
}
