use thiserror::Error;

use crate::grid::TilePos;
use crate::warehouse::ResourceType;

/// Failures surfaced by the simulation core.
///
/// Expected outcomes of normal play (an occupied tile, a building the
/// player cannot afford) are not errors; see `game::PlacementOutcome`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },
    #[error("insufficient {resource}: requested {requested}, available {available}")]
    InsufficientResources {
        resource: ResourceType,
        requested: i64,
        available: i64,
    },
    #[error("tile {goal} is not reachable from {origin}")]
    Unreachable { origin: TilePos, goal: TilePos },
}

impl SimError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SimError::InvalidArgument(message.into())
    }
}
