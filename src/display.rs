//! Rendering layer. All terminal I/O lives here.
//!
//! `TerminalHost` implements `Host` on top of crossterm. It receives
//! sprites one at a time from the game loop and scales the logical world
//! (800×600, y up) onto the terminal grid. No game logic is performed.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use crate::entities::{Entity, EntityKind, GameStatus, Hud};
use crate::host::{Host, SoundHandle, COLLISION_SOUND, IMAGE_ASSETS};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_TITLE: Color = Color::Cyan;
const C_HUD_TIME: Color = Color::Yellow;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Red;
const C_CLOUD: Color = Color::Grey;
const C_HINT: Color = Color::DarkGrey;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps world rectangles onto terminal cells.
///
/// Row 0 is the HUD, row 1 and row `rows - 2` are the border bars and the
/// last row is the controls hint; the play area sits between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub world_width: f32,
    pub world_height: f32,
}

/// A sprite's footprint in cells: top-left column/row plus span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRect {
    pub col: i32,
    pub row: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    fn inner_cols(&self) -> f32 {
        self.cols.saturating_sub(2) as f32
    }

    fn inner_rows(&self) -> f32 {
        self.rows.saturating_sub(4) as f32
    }

    /// First and last usable column / row (inclusive).
    pub fn play_area(&self) -> (i32, i32, i32, i32) {
        (1, self.cols as i32 - 2, 2, self.rows as i32 - 3)
    }

    pub fn project(&self, entity: &Entity) -> CellRect {
        let sx = self.inner_cols() / self.world_width;
        let sy = self.inner_rows() / self.world_height;
        CellRect {
            col: 1 + (entity.left() * sx).floor() as i32,
            row: 2 + ((self.world_height - entity.top()) * sy).floor() as i32,
            width: ((entity.width * sx).round() as i32).max(1),
            height: ((entity.height * sy).round() as i32).max(1),
        }
    }
}

fn sprite_row(kind: EntityKind, width: usize) -> String {
    match kind {
        // ==>
        EntityKind::Player => format!("{}>", "=".repeat(width.saturating_sub(1))),
        // <--
        EntityKind::Enemy => format!("<{}", "-".repeat(width.saturating_sub(1))),
        EntityKind::Cloud => "░".repeat(width),
    }
}

fn sprite_color(kind: EntityKind) -> Color {
    match kind {
        EntityKind::Player => C_PLAYER,
        EntityKind::Enemy => C_ENEMY,
        EntityKind::Cloud => C_CLOUD,
    }
}

// ── TerminalHost ──────────────────────────────────────────────────────────────

pub struct TerminalHost<W: Write> {
    out: W,
    title: String,
    world: (f32, f32),
    /// When set, sounds are checked on disk and played as a terminal bell.
    asset_dir: Option<PathBuf>,
    sounds: Vec<String>,
    /// Fixed grid size; `None` queries the terminal every frame.
    fixed_size: Option<(u16, u16)>,
    viewport: Viewport,
    frame_open: bool,
    closed: bool,
}

impl<W: Write> TerminalHost<W> {
    pub fn open_window(out: W, width: f32, height: f32, title: &str) -> Self {
        TerminalHost {
            out,
            title: title.to_string(),
            world: (width, height),
            asset_dir: None,
            sounds: Vec::new(),
            fixed_size: None,
            viewport: Viewport {
                cols: 80,
                rows: 24,
                world_width: width,
                world_height: height,
            },
            frame_open: false,
            closed: false,
        }
    }

    /// Point the host at an asset directory. The sprite images must all be
    /// present; sounds are checked as they are loaded.
    pub fn with_assets(mut self, dir: PathBuf) -> Result<Self> {
        for image in IMAGE_ASSETS {
            let full = dir.join(image);
            if !full.is_file() {
                bail!("missing image asset: {}", full.display());
            }
        }
        self.asset_dir = Some(dir);
        Ok(self)
    }

    pub fn with_size(mut self, cols: u16, rows: u16) -> Self {
        self.fixed_size = Some((cols, rows));
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn begin_frame(&mut self) -> Result<()> {
        let (cols, rows) = match self.fixed_size {
            Some(size) => size,
            None => terminal::size()?,
        };
        self.viewport = Viewport {
            cols,
            rows,
            world_width: self.world.0,
            world_height: self.world.1,
        };
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        self.draw_border()?;
        self.frame_open = true;
        Ok(())
    }

    // ── Border ────────────────────────────────────────────────────────────────

    fn draw_border(&mut self) -> Result<()> {
        let w = self.viewport.cols as usize;
        let h = self.viewport.rows;

        self.out.queue(style::SetForegroundColor(C_BORDER))?;

        // Row 1: top bar
        self.out.queue(cursor::MoveTo(0, 1))?;
        self.out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

        // Row h-2: bottom bar
        self.out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
        self.out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

        for row in 2..h.saturating_sub(2) {
            self.out.queue(cursor::MoveTo(0, row))?;
            self.out.queue(Print("│"))?;
            self.out.queue(cursor::MoveTo(self.viewport.cols.saturating_sub(1), row))?;
            self.out.queue(Print("│"))?;
        }
        Ok(())
    }

    // ── HUD (row 0) ───────────────────────────────────────────────────────────

    fn draw_hud(&mut self, hud: &Hud) -> Result<()> {
        let width = self.viewport.cols;

        self.out.queue(cursor::MoveTo(1, 0))?;
        self.out.queue(style::SetForegroundColor(C_TITLE))?;
        self.out.queue(Print(&self.title))?;

        let (status_str, status_color) = match hud.status {
            GameStatus::Running => ("[ FLYING ]", Color::Green),
            GameStatus::Paused => ("[ PAUSED ]", Color::Yellow),
            GameStatus::Collided(_) => ("[ HIT! ]", Color::Red),
            GameStatus::GameOver => ("[ GAME OVER ]", Color::Red),
        };
        let sx = (width / 2).saturating_sub(status_str.len() as u16 / 2);
        self.out.queue(cursor::MoveTo(sx, 0))?;
        self.out.queue(style::SetForegroundColor(status_color))?;
        self.out.queue(Print(status_str))?;

        let time_text = format!("Time: {:>6.1}s", hud.play_time);
        let tx = width.saturating_sub(time_text.chars().count() as u16 + 1);
        self.out.queue(cursor::MoveTo(tx, 0))?;
        self.out.queue(style::SetForegroundColor(C_HUD_TIME))?;
        self.out.queue(Print(&time_text))?;
        Ok(())
    }

    // ── Controls hint (last row) ──────────────────────────────────────────────

    fn draw_controls_hint(&mut self) -> Result<()> {
        self.out.queue(cursor::MoveTo(1, self.viewport.rows.saturating_sub(1)))?;
        self.out.queue(style::SetForegroundColor(C_HINT))?;
        self.out
            .queue(Print("I J K L / arrows : Move   P : Pause   Q : Quit"))?;
        Ok(())
    }

    // ── Overlays ──────────────────────────────────────────────────────────────

    fn draw_banner(&mut self, lines: &[(&str, Color)]) -> Result<()> {
        let cx = self.viewport.cols / 2;
        let start_row = (self.viewport.rows / 2).saturating_sub(lines.len() as u16 / 2);

        for (i, (msg, color)) in lines.iter().enumerate() {
            let row = start_row + i as u16;
            let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
            self.out.queue(cursor::MoveTo(col, row))?;
            self.out.queue(style::SetForegroundColor(*color))?;
            self.out.queue(Print(*msg))?;
        }
        Ok(())
    }

    fn draw_overlay(&mut self, hud: &Hud) -> Result<()> {
        match hud.status {
            GameStatus::Running => Ok(()),
            GameStatus::Paused => self.draw_banner(&[
                ("╔══════════════════╗", Color::Yellow),
                ("║      PAUSED      ║", Color::Yellow),
                ("╚══════════════════╝", Color::Yellow),
                ("P - Resume  Q - Quit", Color::White),
            ]),
            GameStatus::Collided(_) | GameStatus::GameOver => {
                let survived = format!("Survived: {:.1}s", hud.play_time);
                self.draw_banner(&[
                    ("╔══════════════════╗", Color::Red),
                    ("║    GAME  OVER    ║", Color::Red),
                    ("╚══════════════════╝", Color::Red),
                    (survived.as_str(), Color::Yellow),
                ])
            }
        }
    }
}

impl<W: Write> Host for TerminalHost<W> {
    fn draw(&mut self, entity: &Entity) -> Result<()> {
        if !self.frame_open {
            self.begin_frame()?;
        }
        let rect = self.viewport.project(entity);
        let (min_col, max_col, min_row, max_row) = self.viewport.play_area();
        let row_text = sprite_row(entity.kind, rect.width as usize);

        self.out.queue(style::SetForegroundColor(sprite_color(entity.kind)))?;
        for row in rect.row..rect.row + rect.height {
            if row < min_row || row > max_row {
                continue;
            }
            // Clip the sprite to the play area column by column.
            let visible: String = row_text
                .chars()
                .enumerate()
                .filter(|(i, _)| {
                    let col = rect.col + *i as i32;
                    col >= min_col && col <= max_col
                })
                .map(|(_, c)| c)
                .collect();
            if visible.is_empty() {
                continue;
            }
            let col = rect.col.max(min_col);
            self.out.queue(cursor::MoveTo(col as u16, row as u16))?;
            self.out.queue(Print(visible))?;
        }
        Ok(())
    }

    fn present(&mut self, hud: &Hud) -> Result<()> {
        if !self.frame_open {
            self.begin_frame()?;
        }
        self.draw_hud(hud)?;
        self.draw_controls_hint()?;
        self.draw_overlay(hud)?;

        // Park cursor in a harmless spot and flush
        self.out.queue(style::ResetColor)?;
        self.out
            .queue(cursor::MoveTo(0, self.viewport.rows.saturating_sub(1)))?;
        self.out.flush()?;
        self.frame_open = false;
        Ok(())
    }

    fn load_sound(&mut self, path: &str) -> Result<SoundHandle> {
        if let Some(dir) = &self.asset_dir {
            let full = dir.join(path);
            if !full.is_file() {
                bail!("missing sound asset: {}", full.display());
            }
        }
        self.sounds.push(path.to_string());
        Ok(SoundHandle(self.sounds.len() - 1))
    }

    fn play_sound(&mut self, handle: SoundHandle) {
        let Some(path) = self.sounds.get(handle.0) else {
            tracing::warn!(handle = handle.0, "unknown sound handle");
            return;
        };
        tracing::debug!(sound = %path, "play");
        // The terminal can only beep, so only the collision cue is audible.
        if self.asset_dir.is_some() && path == COLLISION_SOUND {
            let _ = self.out.write_all(b"\x07");
        }
    }

    fn close_window(&mut self) -> Result<()> {
        if !self.closed {
            tracing::info!(title = %self.title, "window closed");
            self.closed = true;
            self.out.flush()?;
        }
        Ok(())
    }
}
