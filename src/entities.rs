//! Game entity types and the per-entity update rules.
//!
//! World coordinates follow the original arcade layout: the origin is the
//! bottom-left corner of the screen and `y` grows upward.

// ── Sprite dimensions ─────────────────────────────────────────────────────────

pub const PLAYER_SIZE: (f32, f32) = (64.0, 32.0);
pub const ENEMY_SIZE: (f32, f32) = (40.0, 40.0);
pub const CLOUD_SIZE: (f32, f32) = (96.0, 48.0);

// ── Kinds & ids ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    Cloud,
}

impl EntityKind {
    /// Fixed sprite size `(width, height)` for this kind.
    pub fn size(self) -> (f32, f32) {
        match self {
            EntityKind::Player => PLAYER_SIZE,
            EntityKind::Enemy => ENEMY_SIZE,
            EntityKind::Cloud => CLOUD_SIZE,
        }
    }
}

/// Stable handle used to link an entity across the scene's collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

// ── Entity ────────────────────────────────────────────────────────────────────

/// A moving rectangle. `x`/`y` are the left and bottom edges.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    /// Horizontal velocity in pixels per second (negative = leftward).
    pub vx: f32,
    /// Vertical velocity in pixels per second (positive = upward).
    pub vy: f32,
    pub width: f32,
    pub height: f32,
}

impl Entity {
    pub fn create(kind: EntityKind, position: (f32, f32), velocity: (f32, f32)) -> Entity {
        let (width, height) = kind.size();
        Entity {
            id: EntityId(0),
            kind,
            x: position.0,
            y: position.1,
            vx: velocity.0,
            vy: velocity.1,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.width;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom;
    }

    pub fn set_top(&mut self, top: f32) {
        self.y = top - self.height;
    }

    pub fn set_center_y(&mut self, center_y: f32) {
        self.y = center_y - self.height / 2.0;
    }

    /// `position += velocity * dt`, independently per axis.
    pub fn advance(&mut self, dt: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
    }

    /// True once the right edge has passed the left side of the screen.
    /// The screen width is irrelevant because every flyer exits leftward.
    pub fn is_off_screen(&self, _screen_width: f32) -> bool {
        self.right() < 0.0
    }

    /// Keep the whole sprite inside `[0, w] × [0, h]`.
    pub fn clamp_to_bounds(&mut self, screen_width: f32, screen_height: f32) {
        if self.top() > screen_height {
            self.set_top(screen_height);
        }
        if self.right() > screen_width {
            self.set_right(screen_width);
        }
        if self.bottom() < 0.0 {
            self.set_bottom(0.0);
        }
        if self.left() < 0.0 {
            self.set_left(0.0);
        }
    }

    /// Axis-aligned bounding-box intersection. Touching edges do not count.
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.bottom() < other.top()
            && other.bottom() < self.top()
    }
}

// ── Settings enums ────────────────────────────────────────────────────────────

/// Which flyer speed table to use. `Fast` is the classic table × 10.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SpeedProfile {
    Classic,
    #[default]
    Fast,
}

/// Whether the spawners keep running while the game is paused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PausePolicy {
    #[default]
    SuppressSpawns,
    SpawnWhilePaused,
}

// ── Game status ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameStatus {
    Running,
    Paused,
    /// Seconds elapsed since the collision was detected.
    Collided(f32),
    GameOver,
}

impl GameStatus {
    pub fn is_collided(&self) -> bool {
        matches!(self, GameStatus::Collided(_) | GameStatus::GameOver)
    }
}

/// Per-frame summary handed to the host along with the sprites.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub status: GameStatus,
    /// Seconds of unpaused play.
    pub play_time: f32,
    pub enemies: usize,
    pub clouds: usize,
    pub world_width: f32,
    pub world_height: f32,
}
