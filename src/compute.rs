//! Game loop controller.
//!
//! `Game` owns the scene, the pause/collision state, the spawn and music
//! timers, the RNG and the host. The front end calls `tick` once per frame
//! with the elapsed seconds, forwards key events, and calls `render`.
//! All randomness comes from the seeded RNG so a fixed seed replays
//! exactly (useful for tests).

use anyhow::Result;
use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::collection::Scene;
use crate::config::GameConfig;
use crate::entities::{Entity, EntityKind, GameStatus, Hud, PausePolicy};
use crate::host::{
    Host, SoundHandle, COLLISION_SOUND, MOVE_DOWN_SOUND, MOVE_UP_SOUND, MUSIC_SOUND,
};
use crate::input::{action_for, Action, Direction};
use crate::spawner::{spawn_cloud, spawn_enemy, Spawner, CLOUD_INTERVAL, ENEMY_INTERVAL};

/// Player speed per axis while a movement key is held (pixels per second).
pub const PLAYER_SPEED: f32 = 300.0;

/// The background track is restarted after this many seconds.
pub const MUSIC_LOOP_SECONDS: f32 = 15.0;

/// Distance of the player's left edge from the screen edge at setup.
const PLAYER_START_LEFT: f32 = 10.0;

#[derive(Clone, Copy, Debug)]
struct Sounds {
    music: SoundHandle,
    collision: SoundHandle,
    move_up: SoundHandle,
    move_down: SoundHandle,
}

pub struct Game<H: Host> {
    config: GameConfig,
    host: H,
    scene: Scene,
    status: GameStatus,
    enemy_spawner: Spawner,
    cloud_spawner: Spawner,
    music_timer: f32,
    play_time: f32,
    sounds: Sounds,
    rng: StdRng,
    in_tick: bool,
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// The player sprite, left edge at x = 10 and vertically centred.
pub fn init_player(config: &GameConfig) -> Entity {
    let mut player = Entity::create(EntityKind::Player, (0.0, 0.0), (0.0, 0.0));
    player.set_left(PLAYER_START_LEFT);
    player.set_center_y(config.height / 2.0);
    player
}

impl<H: Host> Game<H> {
    /// Validate the config, load every sound, place the player and start
    /// the music. Any failure here is fatal to startup.
    pub fn setup(config: GameConfig, mut host: H) -> Result<Self> {
        config.validate()?;

        let sounds = Sounds {
            music: host.load_sound(MUSIC_SOUND)?,
            collision: host.load_sound(COLLISION_SOUND)?,
            move_up: host.load_sound(MOVE_UP_SOUND)?,
            move_down: host.load_sound(MOVE_DOWN_SOUND)?,
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let scene = Scene::new(init_player(&config));
        host.play_sound(sounds.music);

        tracing::info!(
            width = config.width,
            height = config.height,
            speed = ?config.speed,
            pause_policy = ?config.pause_policy,
            game_over_delay = config.game_over_delay,
            "game set up"
        );

        Ok(Game {
            config,
            host,
            scene,
            status: GameStatus::Running,
            enemy_spawner: Spawner::new(ENEMY_INTERVAL),
            cloud_spawner: Spawner::new(CLOUD_INTERVAL),
            music_timer: 0.0,
            play_time: 0.0,
            sounds,
            rng,
            in_tick: false,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn player(&self) -> &Entity {
        &self.scene.player
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn music_timer(&self) -> f32 {
        self.music_timer
    }

    pub fn play_time(&self) -> f32 {
        self.play_time
    }

    pub fn hud(&self) -> Hud {
        Hud {
            status: self.status,
            play_time: self.play_time,
            enemies: self.scene.enemies.len(),
            clouds: self.scene.clouds.len(),
            world_width: self.config.width,
            world_height: self.config.height,
        }
    }

    // ── Input ────────────────────────────────────────────────────────────────

    pub fn on_key_down(&mut self, code: KeyCode) -> Result<()> {
        match action_for(code) {
            Some(Action::Quit) => self.quit(),
            Some(Action::TogglePause) => {
                self.toggle_pause();
                Ok(())
            }
            Some(Action::Move(dir)) => {
                self.start_move(dir);
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn on_key_up(&mut self, code: KeyCode) {
        if self.status.is_collided() {
            return;
        }
        if let Some(Action::Move(dir)) = action_for(code) {
            let player = &mut self.scene.player;
            match dir {
                Direction::Up | Direction::Down => player.vy = 0.0,
                Direction::Left | Direction::Right => player.vx = 0.0,
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            other => other,
        };
        tracing::info!(status = ?self.status, "pause toggled");
    }

    /// End the game right away and close the window.
    pub fn quit(&mut self) -> Result<()> {
        tracing::info!("quit requested");
        self.finish()
    }

    fn start_move(&mut self, dir: Direction) {
        if self.status.is_collided() {
            return;
        }
        let player = &mut self.scene.player;
        match dir {
            Direction::Up => {
                player.vy = PLAYER_SPEED;
                self.host.play_sound(self.sounds.move_up);
            }
            Direction::Down => {
                player.vy = -PLAYER_SPEED;
                self.host.play_sound(self.sounds.move_down);
            }
            Direction::Left => player.vx = -PLAYER_SPEED,
            Direction::Right => player.vx = PLAYER_SPEED,
        }
    }

    // ── Per-frame tick ───────────────────────────────────────────────────────

    /// Advance the simulation by `dt` seconds. Negative or non-finite
    /// values are treated as zero.
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        if self.in_tick {
            tracing::warn!("tick refused: previous tick did not complete");
            return Ok(());
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.in_tick = true;
        let result = self.step(dt);
        self.in_tick = false;
        result
    }

    fn step(&mut self, dt: f32) -> Result<()> {
        match self.status {
            GameStatus::GameOver => Ok(()),
            GameStatus::Collided(t) => {
                let t = t + dt;
                if t > self.config.game_over_delay {
                    self.finish()
                } else {
                    self.status = GameStatus::Collided(t);
                    Ok(())
                }
            }
            GameStatus::Paused => {
                if self.config.pause_policy == PausePolicy::SpawnWhilePaused {
                    self.run_spawners(dt);
                }
                Ok(())
            }
            GameStatus::Running => self.step_running(dt),
        }
    }

    fn step_running(&mut self, dt: f32) -> Result<()> {
        // Collision is judged on last tick's positions, before anything moves.
        let hits = self.scene.enemies.overlapping(&self.scene.player);
        if !hits.is_empty() {
            return self.collide(hits.len());
        }

        let (w, h) = (self.config.width, self.config.height);
        self.play_time += dt;
        self.scene.advance(dt, w);
        self.scene.player.clamp_to_bounds(w, h);
        self.run_spawners(dt);

        self.music_timer += dt;
        if self.music_timer > MUSIC_LOOP_SECONDS {
            self.host.play_sound(self.sounds.music);
            self.music_timer = 0.0;
        }
        Ok(())
    }

    fn run_spawners(&mut self, dt: f32) {
        let (w, h, speed) = (self.config.width, self.config.height, self.config.speed);

        for _ in 0..self.enemy_spawner.maybe_spawn(dt) {
            let enemy = spawn_enemy(w, h, speed, &mut self.rng);
            let id = self.scene.insert(enemy);
            tracing::debug!(id = id.0, "enemy spawned");
        }
        for _ in 0..self.cloud_spawner.maybe_spawn(dt) {
            let cloud = spawn_cloud(w, h, speed, &mut self.rng);
            let id = self.scene.insert(cloud);
            tracing::debug!(id = id.0, "cloud spawned");
        }
    }

    fn collide(&mut self, hits: usize) -> Result<()> {
        tracing::info!(hits, play_time = self.play_time, "player collided");
        self.host.play_sound(self.sounds.collision);
        if self.config.game_over_delay <= 0.0 {
            return self.finish();
        }
        self.status = GameStatus::Collided(0.0);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.status == GameStatus::GameOver {
            return Ok(());
        }
        self.status = GameStatus::GameOver;
        tracing::info!(play_time = self.play_time, "game over");
        self.host.close_window()
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    /// Draw every entity in insertion order, then present the frame.
    pub fn render(&mut self) -> Result<()> {
        for entity in self.scene.draw_order() {
            self.host.draw(entity)?;
        }
        let hud = self.hud();
        self.host.present(&hud)
    }
}
