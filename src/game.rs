//! The simulation context: map, buildings, stock and money in one place.
//!
//! `Game` is driven from outside, one `game_time_tick` at a time, with
//! building placement in between. Everything it does is synchronous and
//! in-memory; notifications for a renderer or UI are queued as `GameEvent`s.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buildings::{
    building_efficiency, Building, BuildingCategory, BuildingId, PlacedBuilding, ProducedResource,
};
use crate::economy::{EconomySimulation, Settlement};
use crate::error::SimError;
use crate::grid::{HexGrid, TilePos};
use crate::navigation::CommuteMap;
use crate::warehouse::{ResourceType, Warehouse};

fn default_economy_tick_interval() -> u32 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub initial_money: i64,
    /// Income credited on every economy tick.
    #[serde(default)]
    pub income_per_economy_tick: i64,
    /// Game ticks between two economy ticks.
    #[serde(default = "default_economy_tick_interval")]
    pub economy_tick_interval: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            initial_money: 1000,
            income_per_economy_tick: 0,
            economy_tick_interval: default_economy_tick_interval(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementRejection {
    Occupied,
    IncompatibleTile,
    InsufficientFunds,
    InsufficientPlanks,
}

impl fmt::Display for PlacementRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            PlacementRejection::Occupied => "tile is occupied",
            PlacementRejection::IncompatibleTile => "tile type is not compatible",
            PlacementRejection::InsufficientFunds => "not enough money",
            PlacementRejection::InsufficientPlanks => "not enough planks",
        };
        f.write_str(reason)
    }
}

/// Placement is expected to fail during normal play, so a rejection is an
/// outcome rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    Placed(BuildingId),
    Rejected(PlacementRejection),
}

impl PlacementOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, PlacementOutcome::Placed(_))
    }

    pub fn building_id(&self) -> Option<BuildingId> {
        match self {
            PlacementOutcome::Placed(id) => Some(*id),
            PlacementOutcome::Rejected(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    BuildingPlaced {
        building: BuildingId,
        category: String,
        pos: TilePos,
    },
    ResourceProduced {
        building: BuildingId,
        resource: ResourceType,
        amount: i64,
    },
}

/// What happened during one game tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Present on ticks where the economy settled.
    pub settlement: Option<Settlement>,
    pub produced: Vec<(BuildingId, ProducedResource)>,
    /// Income paid by residents of housing buildings.
    pub resident_income: i64,
}

#[derive(Debug)]
pub struct Game {
    grid: HexGrid,
    buildings: Vec<PlacedBuilding>,
    commute_maps: HashMap<BuildingId, CommuteMap>,
    economy: EconomySimulation,
    warehouse: Warehouse,
    settings: GameSettings,
    ticks_until_economy_tick: u32,
    tick: u64,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(grid: HexGrid, settings: GameSettings) -> Result<Self, SimError> {
        if settings.economy_tick_interval == 0 {
            return Err(SimError::invalid("economy tick interval must be at least 1"));
        }
        if settings.initial_money < 0 || settings.income_per_economy_tick < 0 {
            return Err(SimError::invalid(format!(
                "money settings must not be negative (initial {}, income {})",
                settings.initial_money, settings.income_per_economy_tick
            )));
        }
        Ok(Self {
            grid,
            buildings: Vec::new(),
            commute_maps: HashMap::new(),
            economy: EconomySimulation::new(settings.initial_money),
            warehouse: Warehouse::new(),
            ticks_until_economy_tick: settings.economy_tick_interval,
            settings,
            tick: 0,
            events: Vec::new(),
        })
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn ticks_until_economy_tick(&self) -> u32 {
        self.ticks_until_economy_tick
    }

    pub fn available_money(&self) -> i64 {
        self.economy.available_money()
    }

    pub fn available_resource(&self, resource: ResourceType) -> i64 {
        self.warehouse.available_amount(resource)
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn store_resource(&mut self, resource: ResourceType, amount: i64) -> Result<(), SimError> {
        self.warehouse.store(resource, amount)
    }

    /// Placed buildings, in placement order.
    pub fn buildings(&self) -> &[PlacedBuilding] {
        &self.buildings
    }

    pub fn building(&self, id: BuildingId) -> Option<&PlacedBuilding> {
        self.buildings.get(id.raw() as usize)
    }

    pub fn building_at(&self, pos: TilePos) -> Option<&PlacedBuilding> {
        let id = self.grid.try_tile_at(pos).ok()?.building()?;
        self.building(id)
    }

    pub fn commute_map(&self, id: BuildingId) -> Option<&CommuteMap> {
        self.commute_maps.get(&id)
    }

    pub fn total_residents(&self) -> u64 {
        self.buildings
            .iter()
            .map(|placed| u64::from(placed.building.residents()))
            .sum()
    }

    /// Take the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Place a building of `category` on the tile at `pos`.
    ///
    /// Checks run in a fixed order: the tile must be vacant, its type
    /// compatible, the money affordable and the planks in stock. The first
    /// failing check decides the rejection and nothing is changed. A
    /// position outside the map or a category failing
    /// `BuildingCategory::validate` is an error.
    pub fn try_place_building(
        &mut self,
        pos: TilePos,
        category: &BuildingCategory,
    ) -> Result<PlacementOutcome, SimError> {
        category.validate()?;
        let tile = self.grid.try_tile_at(pos)?;
        let rejection = if !tile.is_vacant() {
            Some(PlacementRejection::Occupied)
        } else if !category.is_compatible(tile.tile_type()) {
            Some(PlacementRejection::IncompatibleTile)
        } else if !self.economy.can_afford(category.build_cost_money)? {
            Some(PlacementRejection::InsufficientFunds)
        } else if !self
            .warehouse
            .is_available(ResourceType::Plank, category.build_cost_planks)?
        {
            Some(PlacementRejection::InsufficientPlanks)
        } else {
            None
        };
        if let Some(reason) = rejection {
            tracing::debug!(
                category = %category.name,
                pos = %pos,
                %reason,
                "placement rejected"
            );
            return Ok(PlacementOutcome::Rejected(reason));
        }

        let efficiency = building_efficiency(&self.grid, pos, category.efficiency_scaling())?;
        let commute_map = CommuteMap::build(&self.grid, pos)?;

        self.economy.spend_money(category.build_cost_money)?;
        self.warehouse
            .pick(ResourceType::Plank, category.build_cost_planks)?;

        let id = BuildingId::new(self.buildings.len() as u32);
        self.grid.tile_mut(pos)?.set_building(id);
        self.buildings.push(PlacedBuilding {
            id,
            pos,
            category: category.name.clone(),
            building: Building::from_category(category, efficiency),
        });
        self.commute_maps.insert(id, commute_map);
        self.events.push(GameEvent::BuildingPlaced {
            building: id,
            category: category.name.clone(),
            pos,
        });
        tracing::debug!(
            building = id.raw(),
            category = %category.name,
            pos = %pos,
            efficiency,
            "building placed"
        );
        Ok(PlacementOutcome::Placed(id))
    }

    /// Advance the simulation by one game tick.
    ///
    /// Counts down to the next economy tick and settles upkeep when it is
    /// due, advances every building one step in row-major map order and
    /// finally pays the residents' income.
    pub fn game_time_tick(&mut self) -> Result<TickReport, SimError> {
        let order = self.buildings_in_map_order();

        let settlement = if self.ticks_until_economy_tick <= 1 {
            let upkeep: Vec<i64> = order
                .iter()
                .map(|&index| self.buildings[index].building.upkeep_cost())
                .collect();
            let settlement = self
                .economy
                .settle(self.settings.income_per_economy_tick, upkeep)?;
            self.ticks_until_economy_tick = self.settings.economy_tick_interval;
            tracing::debug!(
                tick = self.tick + 1,
                income = settlement.income,
                upkeep = settlement.upkeep_charged,
                balance = settlement.balance,
                "economy settled"
            );
            Some(settlement)
        } else {
            self.ticks_until_economy_tick -= 1;
            None
        };

        let mut produced = Vec::new();
        for index in order {
            let placed = &mut self.buildings[index];
            if let Some(output) = placed.building.advance(&mut self.warehouse)? {
                self.warehouse.store(output.resource, output.amount)?;
                tracing::trace!(
                    building = placed.id.raw(),
                    resource = %output.resource,
                    amount = output.amount,
                    "production finished"
                );
                self.events.push(GameEvent::ResourceProduced {
                    building: placed.id,
                    resource: output.resource,
                    amount: output.amount,
                });
                produced.push((placed.id, output));
            }
        }

        let resident_income = i64::try_from(self.total_residents())
            .map_err(|_| SimError::invalid("resident count overflows the money balance"))?;
        self.economy.add_income(resident_income)?;

        self.tick += 1;
        Ok(TickReport {
            tick: self.tick,
            settlement,
            produced,
            resident_income,
        })
    }

    // Indices into `buildings`, ordered by tile position, `y` outer.
    fn buildings_in_map_order(&self) -> Vec<usize> {
        self.grid
            .tiles()
            .iter()
            .filter_map(|tile| tile.building())
            .map(|id| id.raw() as usize)
            .collect()
    }
}
