//! The services the game loop consumes from its window/audio backend.
//!
//! The controller receives one `Host` at construction and routes every
//! draw, sound and window call through it.

use anyhow::Result;

use crate::entities::{Entity, Hud};

pub const PLAYER_IMAGE: &str = "images/jet.png";
pub const ENEMY_IMAGE: &str = "images/missile.png";
pub const CLOUD_IMAGE: &str = "images/cloud.png";

pub const IMAGE_ASSETS: [&str; 3] = [PLAYER_IMAGE, ENEMY_IMAGE, CLOUD_IMAGE];

pub const MUSIC_SOUND: &str = "sounds/Apoxode_-_Electric_1.wav";
pub const COLLISION_SOUND: &str = "sounds/Collision.wav";
pub const MOVE_UP_SOUND: &str = "sounds/Rising_putter.wav";
pub const MOVE_DOWN_SOUND: &str = "sounds/Falling_putter.wav";

/// Every sound asset the game loads at setup.
pub const SOUND_ASSETS: [&str; 4] = [MUSIC_SOUND, COLLISION_SOUND, MOVE_UP_SOUND, MOVE_DOWN_SOUND];

/// Opaque handle returned by `Host::load_sound`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub usize);

pub trait Host {
    /// Draw one sprite. Called in insertion order once per frame.
    fn draw(&mut self, entity: &Entity) -> Result<()>;

    /// Finish the frame after all sprites were drawn.
    fn present(&mut self, hud: &Hud) -> Result<()>;

    fn load_sound(&mut self, path: &str) -> Result<SoundHandle>;

    /// Fire-and-forget playback.
    fn play_sound(&mut self, handle: SoundHandle);

    fn close_window(&mut self) -> Result<()>;
}
