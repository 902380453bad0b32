//! Commute maps: how workers walk from a building to every tile they can reach.
//!
//! The map is built by a queue-driven relaxation over the hex grid rather
//! than a priority-ordered search. Each tile expands its neighbors only the
//! first time it is reached; a cheaper route found later overwrites the
//! tile's own cost and predecessor but is not pushed on to its neighbors.
//! Costs are therefore upper bounds, not guaranteed shortest distances.

use std::collections::{HashMap, VecDeque};

use crate::error::SimError;
use crate::grid::{HexGrid, TilePos};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommuteMap {
    origin: TilePos,
    predecessor: HashMap<TilePos, TilePos>,
    cost: HashMap<TilePos, u32>,
}

impl CommuteMap {
    pub fn build(grid: &HexGrid, origin: TilePos) -> Result<Self, SimError> {
        let origin_index = grid.index_of(origin).ok_or_else(|| {
            SimError::invalid(format!(
                "commute origin {origin} is outside the {}x{} grid",
                grid.width(),
                grid.height()
            ))
        })?;

        let tiles = grid.tiles();
        let mut predecessor: Vec<Option<usize>> = vec![None; tiles.len()];
        let mut cost: Vec<Option<u32>> = vec![None; tiles.len()];
        predecessor[origin_index] = Some(origin_index);
        cost[origin_index] = Some(0);

        let mut queue: VecDeque<(usize, usize)> = grid
            .neighbor_indices(origin_index)
            .iter()
            .map(|&neighbor| (origin_index, neighbor))
            .collect();

        while let Some((previous, current)) = queue.pop_front() {
            let Some(previous_cost) = cost[previous] else {
                continue;
            };
            let candidate = previous_cost + tiles[current].tile_type().traversal_weight();
            match cost[current] {
                None => {
                    cost[current] = Some(candidate);
                    predecessor[current] = Some(previous);
                    queue.extend(
                        grid.neighbor_indices(current)
                            .iter()
                            .filter(|&&next| next != previous)
                            .map(|&next| (current, next)),
                    );
                }
                Some(recorded) if candidate < recorded => {
                    cost[current] = Some(candidate);
                    predecessor[current] = Some(previous);
                }
                Some(_) => {}
            }
        }

        let mut map = CommuteMap {
            origin,
            predecessor: HashMap::new(),
            cost: HashMap::new(),
        };
        for (index, entry) in cost.iter().enumerate() {
            let (Some(total), Some(prev)) = (*entry, predecessor[index]) else {
                continue;
            };
            if let (Some(pos), Some(prev_pos)) = (grid.pos_of(index), grid.pos_of(prev)) {
                map.cost.insert(pos, total);
                map.predecessor.insert(pos, prev_pos);
            }
        }
        tracing::debug!(
            origin = %origin,
            reached = map.cost.len(),
            "built commute map"
        );
        Ok(map)
    }

    pub fn origin(&self) -> TilePos {
        self.origin
    }

    pub fn is_reachable(&self, pos: TilePos) -> bool {
        self.cost.contains_key(&pos)
    }

    pub fn cost_to(&self, pos: TilePos) -> Option<u32> {
        self.cost.get(&pos).copied()
    }

    /// Next tile on the way from `pos` back to the origin.
    pub fn predecessor_of(&self, pos: TilePos) -> Option<TilePos> {
        self.predecessor.get(&pos).copied()
    }

    pub fn reachable_count(&self) -> usize {
        self.cost.len()
    }

    /// Tiles from the origin to `goal`, both ends included.
    pub fn path_to(&self, goal: TilePos) -> Result<Vec<TilePos>, SimError> {
        let unreachable = || SimError::Unreachable {
            origin: self.origin,
            goal,
        };
        if !self.is_reachable(goal) {
            return Err(unreachable());
        }

        let mut path = vec![goal];
        let mut current = goal;
        while current != self.origin {
            current = self.predecessor_of(current).ok_or_else(unreachable)?;
            path.push(current);
            // a chain longer than the map cannot end at the origin
            if path.len() > self.cost.len() {
                return Err(unreachable());
            }
        }
        path.reverse();
        Ok(path)
    }
}
