use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::grid::{HexGrid, TilePos, TileType};

/// Ties a building's output rate to the number of vacant neighbor tiles of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyScaling {
    pub tile_type: TileType,
    /// Below this count the building produces nothing.
    pub min_neighbors: u32,
    /// Above this count the building runs at full rate.
    pub max_neighbors: u32,
}

/// Efficiency for `count` qualifying neighbors: `count / max` inside the
/// `[min, max]` band, so reaching `min` jumps straight to `min / max`.
pub fn efficiency_for_count(scaling: &EfficiencyScaling, count: u32) -> f32 {
    if count < scaling.min_neighbors {
        0.0
    } else if count > scaling.max_neighbors || scaling.max_neighbors == 0 {
        1.0
    } else {
        count as f32 / scaling.max_neighbors as f32
    }
}

/// Efficiency of a building about to be placed at `pos`. Computed once; later
/// changes around the tile do not affect an existing building.
pub fn building_efficiency(
    grid: &HexGrid,
    pos: TilePos,
    scaling: Option<&EfficiencyScaling>,
) -> Result<f32, SimError> {
    let Some(scaling) = scaling else {
        return Ok(1.0);
    };
    let qualifying = grid
        .neighbor_positions(pos)?
        .into_iter()
        .filter_map(|neighbor| grid.try_tile_at(neighbor).ok())
        .filter(|tile| tile.is_vacant() && tile.tile_type() == scaling.tile_type)
        .count();
    Ok(efficiency_for_count(scaling, qualifying as u32))
}
