//! Fixed-interval spawn scheduling and flyer placement.

use rand::Rng;

use crate::config::SPAWN_MARGIN;
use crate::entities::{Entity, EntityKind, SpeedProfile};

pub const ENEMY_INTERVAL: f32 = 0.25;
pub const CLOUD_INTERVAL: f32 = 1.0;

/// How far past the right edge a new flyer may start.
pub const SPAWN_DEPTH: f32 = 80.0;

/// Slack for frame times that are not exact in binary (1/60 s and friends).
const FIRE_TOLERANCE: f64 = 1e-6;

// ── Spawner ───────────────────────────────────────────────────────────────────

/// Accumulates tick time and fires once per whole interval, carrying the
/// remainder into the next poll. The accumulator is `f64` so a long run of
/// `f32` frame times does not drift below the interval.
#[derive(Clone, Debug, PartialEq)]
pub struct Spawner {
    interval: f32,
    elapsed: f64,
}

impl Spawner {
    pub fn new(interval: f32) -> Self {
        Spawner { interval, elapsed: 0.0 }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Time accumulated toward the next spawn.
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    /// Add `dt` and return how many spawns are now due.
    pub fn maybe_spawn(&mut self, dt: f32) -> u32 {
        if self.interval <= 0.0 {
            return 0;
        }
        let interval = f64::from(self.interval);
        self.elapsed += f64::from(dt);
        let mut fired = 0;
        while self.elapsed + FIRE_TOLERANCE >= interval {
            self.elapsed = (self.elapsed - interval).max(0.0);
            fired += 1;
        }
        fired
    }
}

// ── Placement ─────────────────────────────────────────────────────────────────

/// Inclusive horizontal speed range (pixels per second, leftward).
pub fn speed_range(kind: EntityKind, profile: SpeedProfile) -> (i32, i32) {
    match (kind, profile) {
        (EntityKind::Enemy, SpeedProfile::Classic) => (-20, -5),
        (EntityKind::Enemy, SpeedProfile::Fast) => (-200, -50),
        (EntityKind::Cloud, SpeedProfile::Classic) => (-5, -2),
        (EntityKind::Cloud, SpeedProfile::Fast) => (-50, -20),
        (EntityKind::Player, _) => (0, 0),
    }
}

/// Build a flyer just off the right edge at a random height and speed.
/// Screen dimensions must already be validated (see `GameConfig::validate`).
pub fn spawn_flyer(
    kind: EntityKind,
    screen_width: f32,
    screen_height: f32,
    profile: SpeedProfile,
    rng: &mut impl Rng,
) -> Entity {
    let w = screen_width as i64;
    let h = screen_height as i64;
    let margin = SPAWN_MARGIN as i64;

    let left = rng.gen_range(w..=w + SPAWN_DEPTH as i64);
    let top = rng.gen_range(margin..=h - margin);
    let (lo, hi) = speed_range(kind, profile);
    let vx = rng.gen_range(lo..=hi);

    let mut entity = Entity::create(kind, (0.0, 0.0), (vx as f32, 0.0));
    entity.set_left(left as f32);
    entity.set_top(top as f32);
    entity
}

pub fn spawn_enemy(w: f32, h: f32, profile: SpeedProfile, rng: &mut impl Rng) -> Entity {
    spawn_flyer(EntityKind::Enemy, w, h, profile, rng)
}

pub fn spawn_cloud(w: f32, h: f32, profile: SpeedProfile, rng: &mut impl Rng) -> Entity {
    spawn_flyer(EntityKind::Cloud, w, h, profile, rng)
}
