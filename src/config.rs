//! Validated game settings.

use std::fmt;

use crate::entities::{PausePolicy, SpeedProfile, PLAYER_SIZE};

pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 600.0;
pub const SCREEN_TITLE: &str = "Arcade Space Shooter";

/// Vertical margin kept clear at the top and bottom when spawning flyers.
pub const SPAWN_MARGIN: f32 = 10.0;

/// Largest accepted width or height. Spawn placement works in whole pixels,
/// and positions stay exact in `f32` well past this.
pub const MAX_SCREEN_SIDE: f32 = 1_000_000.0;

/// Seconds between collision and game over.
pub const DEFAULT_GAME_OVER_DELAY: f32 = 1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    pub speed: SpeedProfile,
    pub pause_policy: PausePolicy,
    /// Zero ends the game on the tick the collision is detected.
    pub game_over_delay: f32,
    /// Fixed RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            speed: SpeedProfile::default(),
            pause_policy: PausePolicy::default(),
            game_over_delay: DEFAULT_GAME_OVER_DELAY,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The vertical spawn range `[10, height - 10]` would be empty.
    NoSpawnRoom { height: f32 },
    /// The player sprite does not fit on screen.
    ScreenTooSmall { width: f32, height: f32 },
    ScreenTooLarge { width: f32, height: f32 },
    InvalidDelay(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoSpawnRoom { height } => write!(
                f,
                "screen height {} leaves no room to spawn (needs more than {})",
                height,
                SPAWN_MARGIN * 2.0
            ),
            ConfigError::ScreenTooSmall { width, height } => write!(
                f,
                "screen {}x{} is smaller than the player sprite ({}x{})",
                width, height, PLAYER_SIZE.0, PLAYER_SIZE.1
            ),
            ConfigError::ScreenTooLarge { width, height } => write!(
                f,
                "screen {}x{} is too large (each side at most {})",
                width, height, MAX_SCREEN_SIDE
            ),
            ConfigError::InvalidDelay(d) => {
                write!(f, "game-over delay must be a finite, non-negative number of seconds (got {})", d)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height <= SPAWN_MARGIN * 2.0 {
            return Err(ConfigError::NoSpawnRoom { height: self.height });
        }
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width < PLAYER_SIZE.0
            || self.height < PLAYER_SIZE.1
        {
            return Err(ConfigError::ScreenTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_SCREEN_SIDE || self.height > MAX_SCREEN_SIDE {
            return Err(ConfigError::ScreenTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if !self.game_over_delay.is_finite() || self.game_over_delay < 0.0 {
            return Err(ConfigError::InvalidDelay(self.game_over_delay));
        }
        Ok(())
    }
}
