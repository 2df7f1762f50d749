use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};

use sky_shooter::compute::Game;
use sky_shooter::config::{GameConfig, SCREEN_HEIGHT, SCREEN_TITLE, SCREEN_WIDTH};
use sky_shooter::display::TerminalHost;
use sky_shooter::entities::{PausePolicy, SpeedProfile};
use sky_shooter::input::KeyTracker;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Speed {
    Classic,
    Fast,
}

#[derive(Parser, Debug)]
#[command(name = "sky_shooter")]
#[command(about = "Side-scrolling terminal shooter: dodge the missiles")]
struct Cli {
    /// Logical world width in pixels
    #[arg(long, default_value_t = SCREEN_WIDTH)]
    width: f32,
    /// Logical world height in pixels
    #[arg(long, default_value_t = SCREEN_HEIGHT)]
    height: f32,
    /// Flyer speed table (fast = classic × 10)
    #[arg(long, value_enum, default_value_t = Speed::Fast)]
    speed: Speed,
    /// Seconds between the collision and game over (0 = immediately)
    #[arg(long, default_value_t = 1.0)]
    game_over_delay: f32,
    /// Keep spawning enemies and clouds while paused
    #[arg(long)]
    spawn_while_paused: bool,
    /// Fixed RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Frames per second
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,
    /// Directory holding the sound assets; each one must exist when given
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Write logs here (RUST_LOG controls the filter)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            width: self.width,
            height: self.height,
            speed: match self.speed {
                Speed::Classic => SpeedProfile::Classic,
                Speed::Fast => SpeedProfile::Fast,
            },
            pause_policy: if self.spawn_while_paused {
                PausePolicy::SpawnWhilePaused
            } else {
                PausePolicy::SuppressSpawns
            },
            game_over_delay: self.game_over_delay,
            seed: self.seed,
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the game closes its window.
///
/// Key handling: a key-down reaches the game only on the first press of a
/// hold. A key-up is sent on a release event, or by `KeyTracker::expire`
/// on terminals that never report releases.
fn game_loop<W: Write>(
    game: &mut Game<TerminalHost<W>>,
    rx: &mpsc::Receiver<Event>,
    frame_time: Duration,
) -> Result<()> {
    let mut keys = KeyTracker::new();
    let mut last_tick = Instant::now();

    while !game.host().is_closed() {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    if code == KeyCode::Esc
                        || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL))
                    {
                        game.quit()?;
                        continue;
                    }
                    if keys.press(code, Instant::now()) {
                        game.on_key_down(code)?;
                    }
                }
                KeyEventKind::Release => {
                    if keys.release(code) {
                        game.on_key_up(code);
                    }
                }
            }
        }

        // ── Expire keys that stopped repeating ────────────────────────────────
        for code in keys.expire(Instant::now()) {
            game.on_key_up(code);
        }

        let dt = last_tick.elapsed().as_secs_f32();
        last_tick = Instant::now();
        game.tick(dt)?;

        if game.host().is_closed() {
            break;
        }
        game.render()?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config();

    let mut host = TerminalHost::open_window(
        BufWriter::new(stdout()),
        config.width,
        config.height,
        SCREEN_TITLE,
    );
    if let Some(dir) = &cli.assets {
        host = host.with_assets(dir.clone())?;
    }

    // Sounds are loaded before the terminal switches modes so a missing
    // asset is reported on a normal screen.
    let mut game = Game::setup(config, host)?;

    let mut out = stdout();
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // kitty-protocol terminals support this; others fall back to hold expiry.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let frame_time = Duration::from_secs(1) / cli.fps;
    let result = game_loop(&mut game, &rx, frame_time);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if result.is_ok() {
        println!("Survived {:.1}s", game.play_time());
    }
    result
}
