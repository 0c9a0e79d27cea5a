//! Common types: shot outcomes, model errors and seat identifiers.

use alloc::string::String;
use core::fmt;

/// Result of firing at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireResult {
    /// Shot struck a ship segment; carries the ship name when this shot sank it.
    Hit { sunk: Option<&'static str> },
    /// Shot landed in open water.
    Miss,
    /// Cell was already resolved as a hit or a miss; nothing changed.
    AlreadyTargeted,
}

/// Errors returned by Board operations.
///
/// `ShipOutOfBounds`, `ShipOverlaps` and `EmptyShip` are the placement-invalid
/// family: the board is left untouched and the caller re-prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// Ship would extend past the edge of the grid.
    ShipOutOfBounds,
    /// Ship would cover a cell that is not water.
    ShipOverlaps,
    /// Ship has no segments.
    EmptyShip,
    /// Random placement could not find any free spot.
    UnableToPlaceShip,
    /// Fire target outside the grid.
    TargetOutOfBounds { row: usize, col: usize },
}

impl BoardError {
    /// True for the errors that mean "this placement is not allowed, ask again".
    pub fn is_placement_invalid(&self) -> bool {
        matches!(
            self,
            BoardError::ShipOutOfBounds | BoardError::ShipOverlaps | BoardError::EmptyShip
        )
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::ShipOutOfBounds => write!(f, "Ship placement is out of bounds"),
            BoardError::ShipOverlaps => write!(f, "Ship placement overlaps with another ship"),
            BoardError::EmptyShip => write!(f, "Ship has no length"),
            BoardError::UnableToPlaceShip => write!(f, "Unable to place ship"),
            BoardError::TargetOutOfBounds { row, col } => {
                write!(f, "Target ({}, {}) is outside the board", row, col)
            }
        }
    }
}

/// Reasons a coordinate token such as `B2` is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    TooShort,
    InvalidRow(char),
    InvalidColumn(String),
    ColumnOutOfBounds(usize),
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateError::TooShort => write!(f, "Coordinate too short."),
            CoordinateError::InvalidRow(ch) => write!(f, "Invalid row letter: {}", ch),
            CoordinateError::InvalidColumn(digits) => {
                write!(f, "Invalid column number: {}", digits)
            }
            CoordinateError::ColumnOutOfBounds(col) => write!(f, "Column out of bounds: {}", col),
        }
    }
}

/// Rejected game configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Board side must be between 1 and 26 so every row has a letter.
    BoardSize(usize),
    EmptyFleet,
    /// A ship longer than the board side (or zero-length) can never be placed.
    ShipLength { name: &'static str, length: usize },
    /// Total ship cells exceed the number of board cells.
    FleetTooLarge { cells: usize, capacity: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BoardSize(n) => write!(f, "board size {} is not within 1..=26", n),
            ConfigError::EmptyFleet => write!(f, "fleet has no ships"),
            ConfigError::ShipLength { name, length } => {
                write!(f, "{} has length {} which does not fit the board", name, length)
            }
            ConfigError::FleetTooLarge { cells, capacity } => write!(
                f,
                "fleet needs {} cells but the board only has {}",
                cells, capacity
            ),
        }
    }
}

/// One of the two active-session slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::One, Seat::Two];

    pub fn other(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }

    /// Zero-based slot index.
    pub fn index(self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => 1,
        }
    }

    /// Player number shown to clients.
    pub fn number(self) -> u8 {
        match self {
            Seat::One => 1,
            Seat::Two => 2,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// Current role of a connected identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Spectator,
    Player(Seat),
}

impl Role {
    pub fn seat(self) -> Option<Seat> {
        match self {
            Role::Spectator => None,
            Role::Player(seat) => Some(seat),
        }
    }
}
