//! Hexagonal map grid in offset coordinates

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingId;
use crate::error::SimError;

/// Tile position in the grid. `(0, 0)` is the top-left tile seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: u32,
    pub y: u32,
}

impl TilePos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Terrain class of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    Water,
    Sand,
    Grass,
    Forest,
    Stone,
    Mountain,
}

impl TileType {
    pub const ALL: [TileType; 6] = [
        TileType::Water,
        TileType::Sand,
        TileType::Grass,
        TileType::Forest,
        TileType::Stone,
        TileType::Mountain,
    ];

    /// Cost for a commuter to step onto a tile of this type.
    pub fn traversal_weight(self) -> u32 {
        match self {
            TileType::Water => 30,
            TileType::Sand => 2,
            TileType::Grass => 1,
            TileType::Forest => 2,
            TileType::Stone => 1,
            TileType::Mountain => 3,
        }
    }
}

/// A single map tile. Height and type never change; only the building slot does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    height: f32,
    tile_type: TileType,
    building: Option<BuildingId>,
}

impl Tile {
    pub fn new(height: f32, tile_type: TileType) -> Self {
        Self {
            height,
            tile_type,
            building: None,
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn tile_type(&self) -> TileType {
        self.tile_type
    }

    pub fn building(&self) -> Option<BuildingId> {
        self.building
    }

    pub fn is_vacant(&self) -> bool {
        self.building.is_none()
    }

    pub(crate) fn set_building(&mut self, id: BuildingId) {
        self.building = Some(id);
    }
}

/// Rectangular grid of hexagonal tiles stored row-major, with a neighbor
/// table computed once at construction.
#[derive(Debug, Clone)]
pub struct HexGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    neighbors: Vec<Vec<usize>>,
}

impl HexGrid {
    /// Wrap an existing row-major tile vector.
    pub fn new(width: u32, height: u32, tiles: Vec<Tile>) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::invalid(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(SimError::invalid(format!(
                "{width}x{height} grid needs {expected} tiles, got {}",
                tiles.len()
            )));
        }

        let mut neighbors = Vec::with_capacity(expected);
        for y in 0..height {
            for x in 0..width {
                neighbors.push(compute_neighbors(x, y, width, height));
            }
        }

        Ok(Self {
            width,
            height,
            tiles,
            neighbors,
        })
    }

    /// Build a grid by asking `factory` for the tile at every position, row by row.
    pub fn build<F>(width: u32, height: u32, mut factory: F) -> Result<Self, SimError>
    where
        F: FnMut(u32, u32) -> Tile,
    {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                tiles.push(factory(x, y));
            }
        }
        Self::new(width, height, tiles)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Row-major index of a position, if it lies on the grid.
    pub fn index_of(&self, pos: TilePos) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn pos_of(&self, index: usize) -> Option<TilePos> {
        if index < self.tiles.len() {
            let width = self.width as usize;
            Some(TilePos {
                x: (index % width) as u32,
                y: (index / width) as u32,
            })
        } else {
            None
        }
    }

    /// Tile at `(x, y)`.
    ///
    /// # Panics
    /// Panics when the position is off the grid.
    pub fn tile_at(&self, x: u32, y: u32) -> &Tile {
        &self.tiles[self.expect_index(TilePos::new(x, y))]
    }

    pub fn try_tile_at(&self, pos: TilePos) -> Result<&Tile, SimError> {
        self.index_of(pos)
            .map(|index| &self.tiles[index])
            .ok_or_else(|| self.out_of_bounds(pos))
    }

    pub(crate) fn tile_mut(&mut self, pos: TilePos) -> Result<&mut Tile, SimError> {
        match self.index_of(pos) {
            Some(index) => Ok(&mut self.tiles[index]),
            None => Err(self.out_of_bounds(pos)),
        }
    }

    /// Neighbors of `(x, y)` in a stable order.
    ///
    /// # Panics
    /// Panics when the position is off the grid.
    pub fn neighbors_of(&self, x: u32, y: u32) -> Vec<&Tile> {
        let index = self.expect_index(TilePos::new(x, y));
        self.neighbors[index]
            .iter()
            .map(|&neighbor| &self.tiles[neighbor])
            .collect()
    }

    /// Positions of the neighbors of `pos`, same order as `neighbors_of`.
    pub fn neighbor_positions(&self, pos: TilePos) -> Result<Vec<TilePos>, SimError> {
        let index = self.index_of(pos).ok_or_else(|| self.out_of_bounds(pos))?;
        Ok(self.neighbors[index]
            .iter()
            .filter_map(|&neighbor| self.pos_of(neighbor))
            .collect())
    }

    pub(crate) fn neighbor_indices(&self, index: usize) -> &[usize] {
        &self.neighbors[index]
    }

    /// Visit every tile row-major: `y` outer, `x` inner.
    pub fn for_each_tile<F>(&self, mut visitor: F)
    where
        F: FnMut(TilePos, &Tile),
    {
        for (index, tile) in self.tiles.iter().enumerate() {
            let width = self.width as usize;
            let pos = TilePos {
                x: (index % width) as u32,
                y: (index / width) as u32,
            };
            visitor(pos, tile);
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    fn expect_index(&self, pos: TilePos) -> usize {
        match self.index_of(pos) {
            Some(index) => index,
            None => panic!(
                "tile {pos} is outside the {}x{} grid",
                self.width, self.height
            ),
        }
    }

    fn out_of_bounds(&self, pos: TilePos) -> SimError {
        SimError::invalid(format!(
            "tile {pos} is outside the {}x{} grid",
            self.width, self.height
        ))
    }
}

/// Offset-coordinate neighbor rule. Rows where `y + 1` is even (odd `y`)
/// reach to the right diagonals, the others to the left below and right
/// above. Candidates that would fall off the grid are dropped even where the
/// edge flags alone would admit them (the right column of both row kinds).
fn compute_neighbors(x: u32, y: u32, width: u32, height: u32) -> Vec<usize> {
    let lowest_row = y == 0;
    let highest_row = y == height - 1;
    let leftmost = x == 0;
    let rightmost = x == width - 1;

    let mut candidates: Vec<(i64, i64)> = Vec::with_capacity(6);
    let (x, y) = (i64::from(x), i64::from(y));

    if !leftmost {
        candidates.push((x - 1, y));
    }
    if !rightmost {
        candidates.push((x + 1, y));
    }

    if (y + 1) % 2 == 0 {
        if !lowest_row {
            candidates.push((x, y - 1));
        }
        if !rightmost && !lowest_row {
            candidates.push((x + 1, y - 1));
        }
        if !rightmost && !highest_row {
            candidates.push((x, y + 1));
        }
        if !highest_row {
            candidates.push((x + 1, y + 1));
        }
    } else {
        if !lowest_row && !leftmost {
            candidates.push((x - 1, y - 1));
        }
        if !lowest_row {
            candidates.push((x, y - 1));
        }
        if !highest_row && !leftmost {
            candidates.push((x, y + 1));
        }
        if !highest_row {
            candidates.push((x + 1, y + 1));
        }
    }

    let (width, height) = (i64::from(width), i64::from(height));
    candidates
        .into_iter()
        .filter(|&(cx, cy)| cx >= 0 && cy >= 0 && cx < width && cy < height)
        .map(|(cx, cy)| (cy * width + cx) as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grass_grid(width: u32, height: u32) -> HexGrid {
        HexGrid::build(width, height, |_, _| Tile::new(0.3, TileType::Grass)).unwrap()
    }

    fn neighbor_set(grid: &HexGrid, x: u32, y: u32) -> Vec<TilePos> {
        let mut positions = grid.neighbor_positions(TilePos::new(x, y)).unwrap();
        positions.sort_by_key(|pos| (pos.y, pos.x));
        positions
    }

    #[test]
    fn test_pos_index_conversion() {
        let grid = grass_grid(10, 5);

        let pos = TilePos::new(3, 2);
        let index = grid.index_of(pos).unwrap();
        assert_eq!(index, 23);
        assert_eq!(grid.pos_of(index), Some(pos));
        assert_eq!(grid.index_of(TilePos::new(10, 0)), None);
        assert_eq!(grid.pos_of(50), None);
    }

    #[test]
    fn test_rejects_mismatched_tile_count() {
        let tiles = vec![Tile::new(0.0, TileType::Water); 5];
        assert!(matches!(
            HexGrid::new(2, 3, tiles),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(HexGrid::new(0, 3, Vec::new()).is_err());
    }

    #[test]
    fn test_interior_tiles_have_six_neighbors() {
        for (width, height) in [(3, 3), (4, 5), (7, 6), (10, 10)] {
            let grid = grass_grid(width, height);
            for y in 1..height - 1 {
                for x in 1..width - 1 {
                    let neighbors = neighbor_set(&grid, x, y);
                    assert_eq!(neighbors.len(), 6, "tile ({x}, {y}) in {width}x{height}");
                    let mut deduped = neighbors.clone();
                    deduped.sort();
                    deduped.dedup();
                    assert_eq!(deduped.len(), 6);
                }
            }
        }
    }

    #[test]
    fn test_row_parity_offsets() {
        let grid = grass_grid(5, 5);

        // y = 2: y + 1 odd, diagonals at left-below and right-above
        assert_eq!(
            neighbor_set(&grid, 2, 2),
            vec![
                TilePos::new(1, 1),
                TilePos::new(2, 1),
                TilePos::new(1, 2),
                TilePos::new(3, 2),
                TilePos::new(2, 3),
                TilePos::new(3, 3),
            ]
        );

        // y = 1: y + 1 even, diagonals to the right above and below
        assert_eq!(
            neighbor_set(&grid, 2, 1),
            vec![
                TilePos::new(2, 0),
                TilePos::new(3, 0),
                TilePos::new(1, 1),
                TilePos::new(3, 1),
                TilePos::new(2, 2),
                TilePos::new(3, 2),
            ]
        );
    }

    #[test]
    fn test_boundary_tiles() {
        let grid = grass_grid(4, 4);

        assert_eq!(
            neighbor_set(&grid, 0, 0),
            vec![TilePos::new(1, 0), TilePos::new(1, 1)]
        );
        // top-right corner of an odd row: (x, y + 1) excluded, (x + 1, y + 1) off grid
        assert_eq!(
            neighbor_set(&grid, 3, 1),
            vec![TilePos::new(3, 0), TilePos::new(2, 1)]
        );
        // left column, even y: no left-below, no (x, y + 1)
        assert_eq!(
            neighbor_set(&grid, 0, 2),
            vec![TilePos::new(0, 1), TilePos::new(1, 2), TilePos::new(1, 3)]
        );
        // highest row uses the height, not the width, as its bound
        let wide = grass_grid(6, 2);
        assert_eq!(
            neighbor_set(&wide, 2, 1),
            vec![
                TilePos::new(2, 0),
                TilePos::new(3, 0),
                TilePos::new(1, 1),
                TilePos::new(3, 1),
            ]
        );
    }

    #[test]
    fn test_single_row_and_column() {
        let row = grass_grid(3, 1);
        assert_eq!(neighbor_set(&row, 1, 0), vec![TilePos::new(0, 0), TilePos::new(2, 0)]);

        let column = grass_grid(1, 3);
        assert_eq!(neighbor_set(&column, 0, 1), vec![TilePos::new(0, 0)]);
        assert_eq!(neighbor_set(&column, 0, 0), Vec::<TilePos>::new());
    }

    #[test]
    fn test_neighbors_never_leave_grid() {
        for (width, height) in [(1, 1), (2, 2), (3, 5), (6, 4)] {
            let grid = grass_grid(width, height);
            grid.for_each_tile(|pos, _| {
                for neighbor in grid.neighbor_positions(pos).unwrap() {
                    assert!(grid.contains(neighbor));
                    assert_ne!(neighbor, pos);
                }
            });
        }
    }

    #[test]
    fn test_adjacency_symmetric_except_above_even_rows() {
        let grid = grass_grid(8, 8);
        for y in 1..7 {
            for x in 1..7 {
                let pos = TilePos::new(x, y);
                for neighbor in grid.neighbor_positions(pos).unwrap() {
                    let interior =
                        neighbor.x > 0 && neighbor.x < 7 && neighbor.y > 0 && neighbor.y < 7;
                    let lower_row = y.min(neighbor.y);
                    let spans_even_row_upward = neighbor.y != y && lower_row % 2 == 0;
                    if interior && !spans_even_row_upward {
                        assert!(
                            grid.neighbor_positions(neighbor).unwrap().contains(&pos),
                            "{neighbor} should list {pos}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_upward_links_from_even_rows_are_one_sided() {
        // Even-y rows link up to (x, y + 1) and (x + 1, y + 1); the row above
        // links down to its own x and x + 1, so the right diagonal is one-sided.
        let grid = grass_grid(6, 6);
        let from = TilePos::new(2, 2);
        let up_right = TilePos::new(3, 3);
        assert!(grid.neighbor_positions(from).unwrap().contains(&up_right));
        assert!(!grid.neighbor_positions(up_right).unwrap().contains(&from));
    }

    #[test]
    fn test_neighbor_lookup_is_stable() {
        let grid = grass_grid(5, 5);
        let first = grid.neighbor_positions(TilePos::new(2, 3)).unwrap();
        let second = grid.neighbor_positions(TilePos::new(2, 3)).unwrap();
        assert_eq!(first, second);
        assert_eq!(grid.neighbors_of(2, 3).len(), first.len());
    }

    #[test]
    fn test_for_each_tile_is_row_major() {
        let grid = grass_grid(3, 2);
        let mut visited = Vec::new();
        grid.for_each_tile(|pos, _| visited.push(pos));
        assert_eq!(
            visited,
            vec![
                TilePos::new(0, 0),
                TilePos::new(1, 0),
                TilePos::new(2, 0),
                TilePos::new(0, 1),
                TilePos::new(1, 1),
                TilePos::new(2, 1),
            ]
        );
    }

    #[test]
    #[should_panic]
    fn test_tile_at_out_of_range_panics() {
        let grid = grass_grid(2, 2);
        grid.tile_at(2, 0);
    }

    #[test]
    fn test_try_tile_at_out_of_range() {
        let grid = grass_grid(2, 2);
        assert!(matches!(
            grid.try_tile_at(TilePos::new(0, 2)),
            Err(SimError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_traversal_weights() {
        let weights: Vec<u32> = TileType::ALL.iter().map(|t| t.traversal_weight()).collect();
        assert_eq!(weights, vec![30, 2, 1, 2, 1, 3]);
    }
}
