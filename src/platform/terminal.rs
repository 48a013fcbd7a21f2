//! Crossterm terminal frontend
//!
//! Raw mode + alternate screen. Frames are rasterised into a character
//! canvas sized to the terminal; the bottom row carries the HUD.
//!
//! Most terminals never report key releases, so direction keys count as
//! held for `key_hold_ms` after their last press (key repeat refreshes
//! them). Shoot, jump, restart and quit are one-shot: each press is
//! delivered to exactly one input snapshot.

use std::io::{self, BufWriter, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::{Frontend, FrontendError, Wake};
use crate::settings::Settings;
use crate::sim::{Aabb, Frame, Intent, IntentSet, Phase, Sprite};

/// Intents that stay active while their key repeats
const HELD: [Intent; 4] = [Intent::Left, Intent::Right, Intent::Up, Intent::Down];

/// Map a key press to the intents it triggers
pub fn map_key(code: KeyCode, modifiers: KeyModifiers) -> IntentSet {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('C') => IntentSet::of(&[Intent::Quit]),
            _ => IntentSet::EMPTY,
        };
    }

    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => IntentSet::of(&[Intent::Left]),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => IntentSet::of(&[Intent::Right]),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => IntentSet::of(&[Intent::Up]),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => IntentSet::of(&[Intent::Down]),
        KeyCode::Char(' ') => IntentSet::of(&[Intent::Shoot, Intent::Jump]),
        KeyCode::Char('r') | KeyCode::Char('R') => IntentSet::of(&[Intent::Restart]),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => IntentSet::of(&[Intent::Quit]),
        _ => IntentSet::EMPTY,
    }
}

/// Key state between input snapshots
#[derive(Debug, Clone)]
pub struct KeyLatch {
    hold: Duration,
    /// Last press of each `HELD` intent
    pressed_at: [Option<Instant>; HELD.len()],
    /// One-shot intents not yet delivered
    pending: IntentSet,
}

impl KeyLatch {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            pressed_at: [None; HELD.len()],
            pending: IntentSet::EMPTY,
        }
    }

    /// Record a press; returns true if it asks to quit
    pub fn press(&mut self, intents: IntentSet, now: Instant) -> bool {
        for intent in intents.iter() {
            match HELD.iter().position(|h| *h == intent) {
                Some(slot) => self.pressed_at[slot] = Some(now),
                None => self.pending.insert(intent),
            }
        }
        intents.contains(Intent::Quit)
    }

    /// Intents active at `now`; consumes pending one-shots
    pub fn snapshot(&mut self, now: Instant) -> IntentSet {
        let held: IntentSet = HELD
            .iter()
            .zip(self.pressed_at.iter())
            .filter(|(_, pressed)| pressed.is_some_and(|t| now.saturating_duration_since(t) < self.hold))
            .map(|(intent, _)| *intent)
            .collect();
        std::mem::take(&mut self.pending).merged(held)
    }

    pub fn quit_pending(&self) -> bool {
        self.pending.contains(Intent::Quit)
    }
}

fn glyph(sprite: Sprite) -> (char, Color) {
    match sprite {
        Sprite::Player => ('A', Color::Green),
        Sprite::EnemyBasic => ('W', Color::Magenta),
        Sprite::EnemyFast => ('V', Color::Red),
        Sprite::EnemyShooter => ('M', Color::Yellow),
        Sprite::PlayerBullet => ('|', Color::White),
        Sprite::EnemyBullet => ('!', Color::Red),
        Sprite::Platform => ('=', Color::Blue),
        Sprite::SnakeHead => ('@', Color::Green),
        Sprite::SnakeBody => ('o', Color::DarkGreen),
        Sprite::Food => ('*', Color::Red),
    }
}

const BLANK: (char, Color) = (' ', Color::Reset);
const WALL: (char, Color) = ('#', Color::DarkGrey);

/// Character grid a frame is rasterised into
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<(char, Color)>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![BLANK; cols as usize * rows as usize],
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.cells.clear();
        self.cells.resize(cols as usize * rows as usize, BLANK);
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn get(&self, x: u16, y: u16) -> Option<char> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(self.cells[y as usize * self.cols as usize + x as usize].0)
    }

    pub fn row(&self, y: u16) -> &[(char, Color)] {
        let start = y as usize * self.cols as usize;
        &self.cells[start..start + self.cols as usize]
    }

    /// Fill the cells covered by `bounds` (world units, seen through `view`)
    fn fill(&mut self, bounds: &Aabb, view: &Aabb, cell: (char, Color)) {
        if view.size.x <= 0.0 || view.size.y <= 0.0 {
            return;
        }
        let to_col = |x: f32| (x - view.left()) * self.cols as f32 / view.size.x;
        let to_row = |y: f32| (y - view.top()) * self.rows as f32 / view.size.y;

        let x0 = to_col(bounds.left()).floor() as i32;
        let y0 = to_row(bounds.top()).floor() as i32;
        // Anything with area covers at least one cell
        let x1 = (to_col(bounds.right()).ceil() as i32 - 1).max(x0);
        let y1 = (to_row(bounds.bottom()).ceil() as i32 - 1).max(y0);

        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(self.cols as i32 - 1);
        let y1 = y1.min(self.rows as i32 - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                self.cells[y as usize * self.cols as usize + x as usize] = cell;
            }
        }
    }

    /// Rasterise a frame: walls first, then entities in list order
    pub fn draw(&mut self, frame: &Frame<'_>) {
        self.cells.fill(BLANK);
        let view = frame.viewport;

        if frame.walled {
            let field = frame.playfield;
            let (w, h) = (field.size.x, field.size.y);
            let (x, y) = (field.left(), field.top());
            for wall in [
                Aabb::new(x, y, w, 1.0),
                Aabb::new(x, y + h - 1.0, w, 1.0),
                Aabb::new(x, y, 1.0, h),
                Aabb::new(x + w - 1.0, y, 1.0, h),
            ] {
                self.fill(&wall, &view, WALL);
            }
        }

        for entity in frame.entities {
            self.fill(&entity.bounds, &view, glyph(entity.sprite));
        }
    }
}

/// HUD text for the status row
pub fn hud_line(frame: &Frame<'_>) -> String {
    let hud = &frame.hud;
    let mut line = format!("Score {}", hud.score);
    if let Some(lives) = hud.lives {
        line.push_str(&format!("  Lives {}", lives));
    }
    if let Some(level) = hud.level {
        line.push_str(&format!("  Level {}", level));
    }
    if let Some(best) = hud.best {
        line.push_str(&format!("  Best {}", best));
    }
    match frame.phase {
        Phase::Running => line.push_str("  [q] quit"),
        Phase::GameOver => line.push_str("  GAME OVER  [r] restart  [q] quit"),
    }
    line
}

/// Terminal frontend; restores the terminal when dropped
pub struct TerminalFrontend {
    out: BufWriter<Stdout>,
    keys: KeyLatch,
    canvas: Canvas,
    size: (u16, u16),
    active: bool,
}

impl TerminalFrontend {
    pub fn new(settings: &Settings) -> Result<Self, FrontendError> {
        let mut frontend = Self {
            out: BufWriter::new(io::stdout()),
            keys: KeyLatch::new(Duration::from_millis(settings.key_hold_ms)),
            canvas: Canvas::default(),
            size: (0, 0),
            active: false,
        };
        // On failure the drop below undoes whatever part succeeded
        frontend.enter().map_err(FrontendError::Init)?;
        log::info!("Terminal frontend ready ({}x{})", frontend.size.0, frontend.size.1);
        Ok(frontend)
    }

    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        self.size = terminal::size()?;
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.out, ResetColor, Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn handle_event(&mut self, ev: Event, now: Instant) -> bool {
        match ev {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) if kind != KeyEventKind::Release => self.keys.press(map_key(code, modifiers), now),
            _ => false,
        }
    }

    /// Read every queued event without blocking; true if quit was pressed
    fn drain(&mut self) -> io::Result<bool> {
        let mut quit = false;
        while event::poll(Duration::ZERO)? {
            let ev = event::read()?;
            quit |= self.handle_event(ev, Instant::now());
        }
        Ok(quit)
    }
}

impl Frontend for TerminalFrontend {
    fn poll_input(&mut self) -> Result<IntentSet, FrontendError> {
        self.drain()?;
        Ok(self.keys.snapshot(Instant::now()))
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), FrontendError> {
        let size = terminal::size()?;
        if size != self.size {
            self.size = size;
            queue!(self.out, Clear(ClearType::All))?;
        }
        let (cols, rows) = size;
        if cols == 0 || rows < 2 {
            return Ok(());
        }

        let field_rows = rows - 1;
        if self.canvas.cols() != cols || self.canvas.rows() != field_rows {
            self.canvas.resize(cols, field_rows);
        }
        self.canvas.draw(frame);

        let mut run = String::with_capacity(cols as usize);
        for y in 0..field_rows {
            queue!(self.out, MoveTo(0, y))?;
            let mut color = Color::Reset;
            for &(ch, cell_color) in self.canvas.row(y) {
                if cell_color != color && ch != ' ' {
                    queue!(self.out, SetForegroundColor(color), Print(&run))?;
                    run.clear();
                    color = cell_color;
                }
                run.push(ch);
            }
            queue!(self.out, SetForegroundColor(color), Print(&run))?;
            run.clear();
        }

        let hud: String = hud_line(frame).chars().take(cols as usize).collect();
        queue!(
            self.out,
            MoveTo(0, field_rows),
            ResetColor,
            Clear(ClearType::CurrentLine),
            Print(hud)
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn tick_delay(&mut self, timeout: Duration) -> Result<Wake, FrontendError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.keys.quit_pending() {
                return Ok(Wake::Quit);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(Wake::Elapsed);
            }
            if event::poll(remaining)? {
                let ev = event::read()?;
                if self.handle_event(ev, Instant::now()) {
                    return Ok(Wake::Quit);
                }
            }
        }
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}
