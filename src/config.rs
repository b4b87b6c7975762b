use std::fmt;

use thiserror::Error;

use crate::snake::Position;

/// Default grid width in cells.
pub const DEFAULT_GRID_WIDTH: u16 = 20;

/// Default grid height in cells.
pub const DEFAULT_GRID_HEIGHT: u16 = 20;

/// Number of foods eaten between two speed increases.
pub const SPEED_UP_EVERY: u32 = 5;

/// Milliseconds removed from the tick interval on each speed increase.
pub const SPEED_UP_AMOUNT_MS: u64 = 12;

/// Shortest tick interval the game ever reaches.
pub const SPEED_FLOOR_MS: u64 = 40;

/// Number of foods eaten between two level increases.
pub const LEVEL_UP_EVERY: u32 = 5;

/// Logical grid dimensions passed through the game as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Returns the spawn cell for a fresh snake (integer division, as the
    /// grid may have even dimensions).
    #[must_use]
    pub fn center(self) -> Position {
        Position {
            x: i32::from(self.width / 2),
            y: i32::from(self.height / 2),
        }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
    }
}

/// Selectable difficulty; each one maps to a base tick interval.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// All difficulties in menu order.
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Normal, Self::Hard];

    /// Base tick interval in milliseconds for a fresh run.
    #[must_use]
    pub fn base_interval_ms(self) -> u64 {
        match self {
            Self::Easy => 160,
            Self::Normal => 110,
            Self::Hard => 70,
        }
    }

    /// Lowercase key used on the command line and in logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }

    /// Resolves a difficulty key, falling back to [`Difficulty::Normal`] for
    /// anything unrecognised.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let key = name.trim();
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(key))
            .unwrap_or_else(|| {
                log::warn!("unknown difficulty {key:?}, using {}", Self::default());
                Self::default()
            })
    }

    /// Returns the next difficulty in menu order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Easy => Self::Normal,
            Self::Normal => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Speed and level progression constants.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Tuning {
    pub speed_up_every: u32,
    pub speed_up_amount_ms: u64,
    pub speed_floor_ms: u64,
    pub level_up_every: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            speed_up_every: SPEED_UP_EVERY,
            speed_up_amount_ms: SPEED_UP_AMOUNT_MS,
            speed_floor_ms: SPEED_FLOOR_MS,
            level_up_every: LEVEL_UP_EVERY,
        }
    }
}

/// Startup configuration for one engine instance.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct EngineConfig {
    pub grid: GridSize,
    pub tuning: Tuning,
    pub difficulty: Difficulty,
}

impl EngineConfig {
    /// Checks that the configuration describes a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // One cell for the snake and one for the food.
        if self.grid.total_cells() < 2 {
            return Err(ConfigError::GridTooSmall {
                width: self.grid.width,
                height: self.grid.height,
            });
        }
        if self.tuning.speed_up_every == 0 {
            return Err(ConfigError::ZeroThreshold("speed_up_every"));
        }
        if self.tuning.level_up_every == 0 {
            return Err(ConfigError::ZeroThreshold("level_up_every"));
        }
        Ok(())
    }
}

/// Rejected engine configuration.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("grid {width}x{height} is too small, at least two cells are required")]
    GridTooSmall { width: u16, height: u16 },
    #[error("tuning value `{0}` must be greater than zero")]
    ZeroThreshold(&'static str),
}
