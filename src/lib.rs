pub mod buildings;
pub mod clock;
pub mod economy;
pub mod engine;
pub mod error;
pub mod game;
pub mod grid;
pub mod logging;
pub mod mapgen;
pub mod navigation;
pub mod scenario;
pub mod snapshot;
pub mod warehouse;

pub use error::SimError;
pub use game::{Game, GameEvent, GameSettings, PlacementOutcome, PlacementRejection, TickReport};
pub use grid::{HexGrid, Tile, TilePos, TileType};
pub use scenario::{Scenario, ScenarioLoader};
pub use warehouse::{ResourceType, Warehouse};
