use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::time::Duration;

use crate::common::ConfigError;
use crate::ship::ShipType;

/// Largest board side; rows are labelled `A..=Z`.
pub const MAX_BOARD_SIZE: usize = 26;

pub const CLASSIC_BOARD_SIZE: usize = 10;
pub const CLASSIC_FLEET: [ShipType; 5] = [
    ShipType::new("Carrier", 5),
    ShipType::new("Battleship", 4),
    ShipType::new("Cruiser", 3),
    ShipType::new("Submarine", 3),
    ShipType::new("Destroyer", 2),
];

/// Quick 3x3 match with a single destroyer.
pub const SKIRMISH_BOARD_SIZE: usize = 3;
pub const SKIRMISH_FLEET: [ShipType; 1] = [ShipType::new("Destroyer", 2)];

/// Board dimensions and the fleet each seat places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub board_size: usize,
    pub fleet: Vec<ShipType>,
}

impl GameConfig {
    /// Validated constructor.
    pub fn new(board_size: usize, fleet: Vec<ShipType>) -> Result<Self, ConfigError> {
        let config = Self { board_size, fleet };
        config.validate()?;
        Ok(config)
    }

    pub fn classic() -> Self {
        Self {
            board_size: CLASSIC_BOARD_SIZE,
            fleet: CLASSIC_FLEET.to_vec(),
        }
    }

    pub fn skirmish() -> Self {
        Self {
            board_size: SKIRMISH_BOARD_SIZE,
            fleet: SKIRMISH_FLEET.to_vec(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size == 0 || self.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::BoardSize(self.board_size));
        }
        if self.fleet.is_empty() {
            return Err(ConfigError::EmptyFleet);
        }
        if let Some(bad) = self
            .fleet
            .iter()
            .find(|s| s.length() == 0 || s.length() > self.board_size)
        {
            return Err(ConfigError::ShipLength {
                name: bad.name(),
                length: bad.length(),
            });
        }
        let cells = self.total_ship_cells();
        let capacity = self.board_size * self.board_size;
        if cells > capacity {
            return Err(ConfigError::FleetTooLarge { cells, capacity });
        }
        Ok(())
    }

    /// Total number of ship segments in the fleet.
    pub fn total_ship_cells(&self) -> usize {
        self.fleet.iter().map(|s| s.length()).sum()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}

pub const DEFAULT_BIND: &str = "127.0.0.1:50045";
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PLACEMENT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_ANNOUNCE_INTERVAL: Duration = Duration::from_secs(15);
/// Longest inbound line, in bytes, before the connection is dropped.
pub const DEFAULT_MAX_LINE_LEN: usize = 4 * 1024;

/// Everything the server needs to run matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub game: GameConfig,
    /// How long a seat may take to fire before its turn is skipped.
    pub turn_timeout: Duration,
    /// How long a seat may take per placement answer before its ships are placed randomly.
    pub placement_timeout: Duration,
    /// Period of the next-match preview sent to spectators.
    pub announce_interval: Duration,
    /// Fixes the session RNGs so random placement is reproducible.
    pub seed: Option<u64>,
    /// Inbound lines longer than this end the connection.
    pub max_line_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            game: GameConfig::default(),
            turn_timeout: DEFAULT_TURN_TIMEOUT,
            placement_timeout: DEFAULT_PLACEMENT_TIMEOUT,
            announce_interval: DEFAULT_ANNOUNCE_INTERVAL,
            seed: None,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}
