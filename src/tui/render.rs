use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::direction::Direction;
use crate::dot::Tint;
use crate::error::Result as CoreResult;
use crate::maze::{Maze, Pos};
use crate::session::Session;

/// Terminal columns per lattice point.
pub const CELL_W: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Glyph {
    Wall,
    Empty,
    Player,
    Pursuer,
    Caught,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sprite {
    glyph: Glyph,
    color: Color,
}

const BLANK: Sprite = Sprite {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

/// Diffing renderer: remembers the last frame and only redraws lattice
/// points that changed.
pub struct Renderer {
    last: Vec<Sprite>,
    last_hud: String,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            last: Vec::new(),
            last_hud: String::new(),
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Forces the next frame to repaint everything.
    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lattice size for a maze: one point per cell, one per wall and corner.
fn lattice_size(maze: &Maze) -> (usize, usize) {
    (2 * maze.width() + 1, 2 * maze.height() + 1)
}

/// Terminal `(cols, rows)` a frame needs: the lattice plus the HUD and
/// status lines.
fn needed_size(maze: &Maze) -> (usize, usize) {
    let (lattice_w, lattice_h) = lattice_size(maze);
    (lattice_w.saturating_mul(CELL_W), lattice_h.saturating_add(2))
}

/// Where the lattice starts when a frame of `needed` size is centred in a
/// `term` sized terminal, or `None` if it does not fit.
fn frame_origin(needed: (usize, usize), term: (u16, u16)) -> Option<(u16, u16)> {
    let (term_w, term_h) = term;
    let needed_w = u16::try_from(needed.0).ok().filter(|&w| w <= term_w)?;
    let needed_h = u16::try_from(needed.1).ok().filter(|&h| h <= term_h)?;
    Some(((term_w - needed_w) / 2, (term_h - needed_h) / 2 + 1))
}

/// Whether the lattice point `(lx, ly)` is solid.
fn is_wall(maze: &Maze, lx: usize, ly: usize) -> CoreResult<bool> {
    match (lx % 2, ly % 2) {
        (1, 1) => Ok(false),
        (0, 0) => Ok(true),
        (0, _) => {
            let y = ly / 2;
            if lx == 0 {
                Ok(maze.cell(Pos::new(0, y))?.wall(Direction::West))
            } else {
                Ok(maze.cell(Pos::new(lx / 2 - 1, y))?.wall(Direction::East))
            }
        }
        _ => {
            let x = lx / 2;
            if ly == 0 {
                Ok(maze.cell(Pos::new(x, 0))?.wall(Direction::North))
            } else {
                Ok(maze.cell(Pos::new(x, ly / 2 - 1))?.wall(Direction::South))
            }
        }
    }
}

fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Black => Color::White,
        Tint::Red => Color::Red,
        Tint::Blue => Color::Blue,
        Tint::Pink => Color::Magenta,
        Tint::Orange => Color::Rgb {
            r: 255,
            g: 165,
            b: 0,
        },
    }
}

fn sprite_for(session: &Session, maze: &Maze, lx: usize, ly: usize) -> CoreResult<Sprite> {
    if is_wall(maze, lx, ly)? {
        return Ok(Sprite {
            glyph: Glyph::Wall,
            color: Color::DarkGrey,
        });
    }
    if lx % 2 == 0 || ly % 2 == 0 {
        return Ok(BLANK);
    }
    let pos = Pos::new(lx / 2, ly / 2);
    let player = session.player();
    if pos == player.pos() {
        if session.is_overlapping() {
            return Ok(Sprite {
                glyph: Glyph::Caught,
                color: Color::Red,
            });
        }
        return Ok(Sprite {
            glyph: Glyph::Player,
            color: tint_color(player.tint()),
        });
    }
    if let Some(p) = session.pursuers().iter().find(|p| p.pos() == pos) {
        return Ok(Sprite {
            glyph: Glyph::Pursuer,
            color: tint_color(p.tint()),
        });
    }
    Ok(BLANK)
}

fn glyph_text(glyph: Glyph) -> &'static str {
    match glyph {
        Glyph::Wall => "██",
        Glyph::Empty => "  ",
        Glyph::Player => "😃",
        Glyph::Pursuer => "● ",
        Glyph::Caught => "💀",
    }
}

/// Draws one frame. `status` is shown under the maze.
pub fn render(
    out: &mut impl Write,
    session: &Session,
    renderer: &mut Renderer,
    status: &str,
) -> anyhow::Result<()> {
    let maze = session.maze()?;
    let (lattice_w, lattice_h) = lattice_size(maze);
    let (needed_w, needed_h) = needed_size(maze);

    out.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    let Some((origin_x, origin_y)) = frame_origin((needed_w, needed_h), (term_w, term_h)) else {
        out.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        out.queue(Print(msg))?;
        out.flush()?;
        renderer.needs_full = true;
        return Ok(());
    };

    if renderer.last.len() != lattice_w * lattice_h {
        renderer.last = vec![BLANK; lattice_w * lattice_h];
        renderer.needs_full = true;
    }

    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        out.queue(Clear(ClearType::All))?;
    }

    let hud = format!(
        "Time: {}  AI delay: {}ms  (arrows/hjkl/wasd, q to quit)",
        session.elapsed(),
        session.move_delay().as_millis()
    );
    if renderer.needs_full || hud != renderer.last_hud {
        draw_line(out, renderer.origin_x, renderer.origin_y - 1, Color::White, &hud)?;
        renderer.last_hud = hud;
    }

    for ly in 0..lattice_h {
        for lx in 0..lattice_w {
            let sprite = sprite_for(session, maze, lx, ly)?;
            let idx = ly * lattice_w + lx;
            if renderer.needs_full || sprite != renderer.last[idx] {
                renderer.last[idx] = sprite;
                draw_sprite(out, renderer, lx, ly, sprite)?;
            }
        }
    }

    if renderer.needs_full || status != renderer.last_status {
        let y = renderer.origin_y + lattice_h as u16;
        draw_line(out, renderer.origin_x, y, Color::Yellow, status)?;
        renderer.last_status = status.to_string();
    }
    renderer.needs_full = false;

    out.flush()?;
    Ok(())
}

fn draw_line(out: &mut impl Write, x: u16, y: u16, color: Color, text: &str) -> io::Result<()> {
    out.queue(MoveTo(x, y))?;
    out.queue(Clear(ClearType::CurrentLine))?;
    out.queue(SetForegroundColor(color))?;
    out.queue(Print(text))?;
    out.queue(ResetColor)?;
    Ok(())
}

fn draw_sprite(
    out: &mut impl Write,
    renderer: &Renderer,
    lx: usize,
    ly: usize,
    sprite: Sprite,
) -> io::Result<()> {
    let text = glyph_text(sprite.glyph);
    let x_pos = renderer.origin_x + (lx * CELL_W) as u16;
    let y_pos = renderer.origin_y + ly as u16;
    out.queue(MoveTo(x_pos, y_pos))?;
    out.queue(SetForegroundColor(sprite.color))?;
    out.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            out.queue(Print(' '))?;
        }
    }
    out.queue(ResetColor)?;
    Ok(())
}
