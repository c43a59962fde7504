use std::fmt;

use crate::sim::EntityId;

/// Everything that can go wrong while building or running a game
#[derive(Clone, Debug, PartialEq)]
pub enum GameError {
    /// A body with non-positive width or height
    DegenerateBody { width: f32, height: f32 },
    /// Entity id not present in the live set
    UnknownEntity(EntityId),
    /// No level registered under this name
    UnknownLevel(String),
    /// Unknown kind string for a registry lookup
    UnknownKind { category: &'static str, name: String },
    /// Unknown draw style or render type name
    InvalidStyle(String),
    /// A path needs at least two waypoints
    InvalidPath { waypoints: usize },
    /// Not enough money to place a tower
    InsufficientFunds { cost: u32, available: u32 },
    /// Handle refers to an entity of another kind
    WrongEntityKind { id: EntityId, expected: &'static str },
    /// Malformed settings document
    Settings(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateBody { width, height } => {
                write!(f, "degenerate body: {width}x{height} (both sides must be > 0)")
            }
            Self::UnknownEntity(id) => write!(f, "entity {id} is not in the live set"),
            Self::UnknownLevel(name) => write!(f, "cannot find level '{name}'"),
            Self::UnknownKind { category, name } => write!(f, "unknown {category} kind '{name}'"),
            Self::InvalidStyle(name) => write!(f, "'{name}' is not a valid style"),
            Self::InvalidPath { waypoints } => {
                write!(f, "path needs at least 2 waypoints, got {waypoints}")
            }
            Self::InsufficientFunds { cost, available } => {
                write!(f, "insufficient funds: cost {cost}, available {available}")
            }
            Self::WrongEntityKind { id, expected } => {
                write!(f, "entity {id} is not a {expected}")
            }
            Self::Settings(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for GameError {}
