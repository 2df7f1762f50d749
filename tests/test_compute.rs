use anyhow::{bail, Result};
use crossterm::event::KeyCode;

use sky_shooter::compute::*;
use sky_shooter::config::GameConfig;
use sky_shooter::entities::*;
use sky_shooter::host::*;

// ── Recording host ────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingHost {
    loaded: Vec<String>,
    played: Vec<SoundHandle>,
    drawn: Vec<EntityId>,
    presented: Vec<Hud>,
    closed: u32,
    missing: Option<&'static str>,
}

impl RecordingHost {
    fn plays(&self, path: &str) -> usize {
        self.played
            .iter()
            .filter(|h| self.loaded[h.0] == path)
            .count()
    }
}

impl Host for RecordingHost {
    fn draw(&mut self, entity: &Entity) -> Result<()> {
        self.drawn.push(entity.id);
        Ok(())
    }

    fn present(&mut self, hud: &Hud) -> Result<()> {
        self.presented.push(hud.clone());
        Ok(())
    }

    fn load_sound(&mut self, path: &str) -> Result<SoundHandle> {
        if self.missing == Some(path) {
            bail!("missing sound asset: {}", path);
        }
        self.loaded.push(path.to_string());
        Ok(SoundHandle(self.loaded.len() - 1))
    }

    fn play_sound(&mut self, handle: SoundHandle) {
        self.played.push(handle);
    }

    fn close_window(&mut self) -> Result<()> {
        self.closed += 1;
        Ok(())
    }
}

fn config() -> GameConfig {
    GameConfig {
        seed: Some(42),
        ..GameConfig::default()
    }
}

fn make_game() -> Game<RecordingHost> {
    Game::setup(config(), RecordingHost::default()).unwrap()
}

fn make_game_with(cfg: GameConfig) -> Game<RecordingHost> {
    Game::setup(cfg, RecordingHost::default()).unwrap()
}

/// Drop an enemy right on top of the player.
fn place_enemy_on_player(game: &mut Game<RecordingHost>) -> EntityId {
    let (x, y) = (game.player().x, game.player().y);
    let enemy = Entity::create(EntityKind::Enemy, (x + 10.0, y), (-100.0, 0.0));
    game.scene_mut().insert(enemy)
}

fn snapshot(game: &Game<RecordingHost>) -> Vec<(EntityId, f32, f32)> {
    game.scene().draw_order().map(|e| (e.id, e.x, e.y)).collect()
}

// ── setup ─────────────────────────────────────────────────────────────────────

#[test]
fn setup_places_player_and_starts_music() {
    let game = make_game();
    let p = game.player();
    assert_eq!(p.kind, EntityKind::Player);
    assert_eq!(p.left(), 10.0);
    assert_eq!(p.bottom() + p.height / 2.0, 300.0);
    assert_eq!((p.vx, p.vy), (0.0, 0.0));

    assert_eq!(game.status(), GameStatus::Running);
    assert_eq!(game.host().loaded.len(), SOUND_ASSETS.len());
    assert_eq!(game.host().plays(MUSIC_SOUND), 1);
    assert_eq!(game.scene().len(), 1);
}

#[test]
fn setup_rejects_invalid_config() {
    let cfg = GameConfig { height: 15.0, ..config() };
    let err = Game::setup(cfg, RecordingHost::default()).err().unwrap();
    assert!(err.to_string().contains("no room to spawn"), "{}", err);
}

#[test]
fn setup_fails_on_missing_sound() {
    let host = RecordingHost {
        missing: Some(COLLISION_SOUND),
        ..RecordingHost::default()
    };
    let err = Game::setup(config(), host).err().unwrap();
    assert!(err.to_string().contains(COLLISION_SOUND));
}

// ── collision ─────────────────────────────────────────────────────────────────

#[test]
fn collision_then_game_over_after_delay() {
    let mut game = make_game();
    // Enemy at (400, 300), player moved under it.
    game.scene_mut()
        .insert(Entity::create(EntityKind::Enemy, (400.0, 300.0), (-100.0, 0.0)));
    game.scene_mut().player.set_left(390.0);

    game.tick(0.0625).unwrap();
    assert_eq!(game.status(), GameStatus::Collided(0.0));
    assert_eq!(game.host().plays(COLLISION_SOUND), 1);

    // 16 × 0.0625 = exactly 1.0 s: still waiting.
    for _ in 0..16 {
        game.tick(0.0625).unwrap();
    }
    assert_eq!(game.status(), GameStatus::Collided(1.0));
    assert_eq!(game.host().closed, 0);

    game.tick(0.0625).unwrap();
    assert_eq!(game.status(), GameStatus::GameOver);
    assert!(game.is_finished());
    assert_eq!(game.host().closed, 1);
}

#[test]
fn game_over_after_one_hundredth_past_delay() {
    let mut game = make_game();
    place_enemy_on_player(&mut game);
    game.tick(0.01).unwrap();
    assert!(matches!(game.status(), GameStatus::Collided(_)));

    for _ in 0..101 {
        game.tick(0.01).unwrap();
    }
    assert_eq!(game.status(), GameStatus::GameOver);
}

#[test]
fn collided_freezes_positions_and_spawns() {
    let mut game = make_game();
    game.on_key_down(KeyCode::Right).unwrap();
    game.tick(0.25).unwrap(); // spawns one enemy off to the right
    place_enemy_on_player(&mut game);

    game.tick(0.1).unwrap();
    assert!(matches!(game.status(), GameStatus::Collided(_)));
    let before = snapshot(&game);

    for dt in [0.1, 0.2, 0.3, 0.05] {
        game.tick(dt).unwrap();
        assert_eq!(snapshot(&game), before);
    }
}

#[test]
fn game_over_is_terminal() {
    let mut game = make_game();
    place_enemy_on_player(&mut game);
    game.tick(0.1).unwrap();
    game.tick(2.0).unwrap();
    assert_eq!(game.status(), GameStatus::GameOver);
    let before = snapshot(&game);

    for _ in 0..5 {
        game.tick(1.0).unwrap();
    }
    assert_eq!(game.status(), GameStatus::GameOver);
    assert_eq!(snapshot(&game), before);
    assert_eq!(game.host().closed, 1);
}

#[test]
fn zero_delay_ends_immediately() {
    let mut game = make_game_with(GameConfig { game_over_delay: 0.0, ..config() });
    place_enemy_on_player(&mut game);
    game.tick(0.016).unwrap();
    assert_eq!(game.status(), GameStatus::GameOver);
    assert_eq!(game.host().closed, 1);
    assert_eq!(game.host().plays(COLLISION_SOUND), 1);
}

#[test]
fn collision_uses_positions_from_before_the_tick() {
    let mut game = make_game();
    // Not overlapping yet, but would be after this tick's movement.
    let p = game.player().clone();
    game.scene_mut().insert(Entity::create(
        EntityKind::Enemy,
        (p.right() + 5.0, p.y),
        (-200.0, 0.0),
    ));
    game.tick(0.25).unwrap();
    assert_eq!(game.status(), GameStatus::Running);

    game.tick(0.0).unwrap();
    assert!(matches!(game.status(), GameStatus::Collided(_)));
}

#[test]
fn clouds_do_not_collide() {
    let mut game = make_game();
    let (x, y) = (game.player().x, game.player().y);
    game.scene_mut()
        .insert(Entity::create(EntityKind::Cloud, (x, y), (0.0, 0.0)));
    game.tick(0.1).unwrap();
    assert_eq!(game.status(), GameStatus::Running);
}

// ── pause ─────────────────────────────────────────────────────────────────────

#[test]
fn pause_freezes_then_resumes_from_same_spot() {
    let mut game = make_game();
    game.on_key_down(KeyCode::Right).unwrap();
    game.tick(0.25).unwrap();
    let x_before = game.player().x;
    assert_eq!(x_before, 10.0 + PLAYER_SPEED * 0.25);

    game.on_key_down(KeyCode::Char('p')).unwrap();
    assert_eq!(game.status(), GameStatus::Paused);
    let frozen = snapshot(&game);
    let enemies = game.scene().enemies.len();

    for dt in [0.016, 0.5, 1.0, 0.033, 3.0] {
        game.tick(dt).unwrap();
        assert_eq!(snapshot(&game), frozen);
    }
    assert_eq!(game.scene().enemies.len(), enemies);

    game.on_key_down(KeyCode::Char('P')).unwrap();
    assert_eq!(game.status(), GameStatus::Running);
    game.tick(0.125).unwrap();
    assert_eq!(game.player().x, x_before + PLAYER_SPEED * 0.125);
    assert_eq!(game.play_time(), 0.375);
}

#[test]
fn spawn_while_paused_policy_keeps_spawning() {
    let mut game = make_game_with(GameConfig {
        pause_policy: PausePolicy::SpawnWhilePaused,
        ..config()
    });
    game.toggle_pause();
    game.tick(1.0).unwrap();
    assert_eq!(game.scene().enemies.len(), 4);
    assert_eq!(game.scene().clouds.len(), 1);

    // Spawned, but frozen in place.
    let frozen = snapshot(&game);
    game.tick(0.0625).unwrap();
    assert_eq!(game.scene().enemies.len(), 4);
    let still: Vec<_> = snapshot(&game).into_iter().take(frozen.len()).collect();
    assert_eq!(still, frozen);
}

#[test]
fn pause_cannot_be_toggled_after_collision() {
    let mut game = make_game();
    place_enemy_on_player(&mut game);
    game.tick(0.1).unwrap();
    game.toggle_pause();
    assert!(matches!(game.status(), GameStatus::Collided(_)));
}

// ── spawning ──────────────────────────────────────────────────────────────────

#[test]
fn spawners_follow_their_intervals() {
    let mut game = make_game();
    for _ in 0..32 {
        game.tick(0.0625).unwrap(); // 2.0 s
    }
    assert_eq!(game.status(), GameStatus::Running);
    assert_eq!(game.scene().enemies.len(), 8);
    assert_eq!(game.scene().clouds.len(), 2);
    assert_eq!(game.scene().len(), 11);
}

#[test]
fn flyers_are_removed_within_one_tick_of_exiting() {
    let mut game = make_game();
    let id = game
        .scene_mut()
        .insert(Entity::create(EntityKind::Cloud, (-95.0, 500.0), (-50.0, 0.0)));
    game.tick(0.0625).unwrap();
    assert!(game.scene().get(id).is_none());
    assert!(!game.scene().all_ids().contains(&id));
}

// ── input ─────────────────────────────────────────────────────────────────────

#[test]
fn movement_keys_set_velocity() {
    let mut game = make_game();
    game.on_key_down(KeyCode::Char('i')).unwrap();
    assert_eq!(game.player().vy, PLAYER_SPEED);
    game.on_key_down(KeyCode::Down).unwrap();
    assert_eq!(game.player().vy, -PLAYER_SPEED);
    game.on_key_down(KeyCode::Char('j')).unwrap();
    assert_eq!(game.player().vx, -PLAYER_SPEED);
    game.on_key_down(KeyCode::Right).unwrap();
    assert_eq!(game.player().vx, PLAYER_SPEED);

    assert_eq!(game.host().plays(MOVE_UP_SOUND), 1);
    assert_eq!(game.host().plays(MOVE_DOWN_SOUND), 1);
}

#[test]
fn key_release_zeroes_only_its_axis() {
    let mut game = make_game();
    game.on_key_down(KeyCode::Up).unwrap();
    game.on_key_down(KeyCode::Char('l')).unwrap();

    game.on_key_up(KeyCode::Char('I'));
    assert_eq!(game.player().vy, 0.0);
    assert_eq!(game.player().vx, PLAYER_SPEED);

    game.on_key_up(KeyCode::Left);
    assert_eq!(game.player().vx, 0.0);
}

#[test]
fn player_is_clamped_every_tick() {
    let mut game = make_game();
    game.on_key_down(KeyCode::Left).unwrap();
    game.on_key_down(KeyCode::Up).unwrap();
    game.tick(5.0).unwrap();
    assert_eq!(game.player().left(), 0.0);
    assert_eq!(game.player().top(), 600.0);
}

#[test]
fn movement_ignored_after_collision() {
    let mut game = make_game();
    place_enemy_on_player(&mut game);
    game.tick(0.1).unwrap();
    game.on_key_down(KeyCode::Up).unwrap();
    assert_eq!(game.player().vy, 0.0);
}

#[test]
fn quit_closes_the_window() {
    let mut game = make_game();
    game.on_key_down(KeyCode::Char('q')).unwrap();
    assert_eq!(game.status(), GameStatus::GameOver);
    assert_eq!(game.host().closed, 1);

    game.on_key_down(KeyCode::Char('Q')).unwrap();
    assert_eq!(game.host().closed, 1);
}

// ── timers ────────────────────────────────────────────────────────────────────

#[test]
fn music_restarts_after_fifteen_seconds() {
    let mut game = make_game_with(GameConfig {
        speed: SpeedProfile::Classic,
        ..config()
    });
    for _ in 0..30 {
        game.tick(0.5).unwrap(); // exactly 15.0 s: not yet
    }
    assert_eq!(game.host().plays(MUSIC_SOUND), 1);
    assert_eq!(game.music_timer(), 15.0);

    game.tick(0.5).unwrap();
    assert_eq!(game.host().plays(MUSIC_SOUND), 2);
    assert_eq!(game.music_timer(), 0.0);
}

#[test]
fn negative_or_nan_dt_counts_as_zero() {
    let mut game = make_game();
    game.on_key_down(KeyCode::Right).unwrap();
    game.tick(-1.0).unwrap();
    game.tick(f32::NAN).unwrap();
    assert_eq!(game.player().x, 10.0);
    assert_eq!(game.play_time(), 0.0);
}

// ── rendering ─────────────────────────────────────────────────────────────────

#[test]
fn render_draws_in_insertion_order_then_presents() {
    let mut game = make_game();
    game.tick(1.0).unwrap();
    game.render().unwrap();

    let expected: Vec<EntityId> = game.scene().all_ids().to_vec();
    assert_eq!(game.host().drawn, expected);
    assert_eq!(game.host().drawn[0], game.player().id);
    assert_eq!(game.host().presented.len(), 1);

    let hud = &game.host().presented[0];
    assert_eq!(hud.status, GameStatus::Running);
    assert_eq!(hud.enemies, 4);
    assert_eq!(hud.clouds, 1);
}

#[test]
fn same_seed_same_game() {
    let mut a = make_game();
    let mut b = make_game();
    for _ in 0..20 {
        a.tick(0.1).unwrap();
        b.tick(0.1).unwrap();
    }
    assert_eq!(snapshot(&a), snapshot(&b));
}
