//! Terminal front end
//!
//! Raw-mode session handling, key bindings and frame painting. Frames
//! are composed into a string buffer and flushed inside a synchronized
//! update so partially drawn screens never show.

use std::fmt::Write as FmtWrite;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, BeginSynchronizedUpdate, Clear, ClearType,
    EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
};

use crate::render::{bar_rgb, column_cells};

const BAR_CELL: char = '█';

// ===== Key Bindings =====

/// Player actions reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Select the next track
    NextTrack,
    /// Select the previous track
    PreviousTrack,
    /// Append a digit to the pending track entry
    Digit(char),
    /// Jump to the pending track entry
    CommitTrack,
    /// Pause or resume playback
    TogglePause,
    /// Enable or disable loop-range playback
    ToggleLooping,
    /// Move the loop start down one track
    LoopStartDown,
    /// Move the loop start up one track
    LoopStartUp,
    /// Move the loop end down one track
    LoopEndDown,
    /// Move the loop end up one track
    LoopEndUp,
    /// Enable or disable the loudness normalizer
    ToggleNormalizer,
    /// Raise the normalizer target level
    TargetUp,
    /// Lower the normalizer target level
    TargetDown,
    /// Leave the player
    Quit,
}

/// Translate a key press into a player action
pub fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<PlayerInput> {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Some(PlayerInput::Quit);
    }
    match code {
        KeyCode::Right => Some(PlayerInput::NextTrack),
        KeyCode::Left => Some(PlayerInput::PreviousTrack),
        KeyCode::Char(digit @ '0'..='9') => Some(PlayerInput::Digit(digit)),
        KeyCode::Enter => Some(PlayerInput::CommitTrack),
        KeyCode::Char(' ') => Some(PlayerInput::TogglePause),
        KeyCode::Char('l') => Some(PlayerInput::ToggleLooping),
        KeyCode::Char('[') => Some(PlayerInput::LoopStartDown),
        KeyCode::Char(']') => Some(PlayerInput::LoopStartUp),
        KeyCode::Char('{') => Some(PlayerInput::LoopEndDown),
        KeyCode::Char('}') => Some(PlayerInput::LoopEndUp),
        KeyCode::Char('n') => Some(PlayerInput::ToggleNormalizer),
        KeyCode::Up => Some(PlayerInput::TargetUp),
        KeyCode::Down => Some(PlayerInput::TargetDown),
        KeyCode::Char('q') | KeyCode::Esc => Some(PlayerInput::Quit),
        _ => None,
    }
}

// ===== Frame Composition =====

/// Everything one frame shows, already formatted by the application
#[derive(Debug)]
pub struct FrameView<'a> {
    /// Track label and playback state
    pub header: &'a str,
    /// Spectrum bin value per terminal column, `None` while the
    /// spectrum renderer is stopped
    pub spectrum: Option<&'a [u8]>,
    /// Loudness meter fill, `None` while the meter renderer is stopped
    pub meter: Option<MeterView>,
    /// Loop and normalizer settings line
    pub status: &'a str,
    /// Key binding reminder line
    pub help: &'a str,
}

/// Loudness meter fill for one frame
#[derive(Debug, Clone, Copy)]
pub struct MeterView {
    /// Filled cells
    pub filled: usize,
    /// Total meter width in cells
    pub width: usize,
    /// Loudness percentage shown next to the bar
    pub percent: f32,
}

fn push_line(buffer: &mut String, row: u16, text: &str, width: usize) {
    let _ = write!(buffer, "{}{}", MoveTo(0, row), Clear(ClearType::UntilNewLine));
    for ch in text.chars().take(width) {
        buffer.push(ch);
    }
}

/// Compose a full frame into `buffer`
///
/// Layout, top to bottom: header row, spectrum region, meter row,
/// status row, help row. The spectrum region shrinks with the terminal
/// but always keeps at least one row.
pub fn compose_frame(buffer: &mut String, view: &FrameView, width: u16, height: u16) {
    let width = width as usize;
    let height = height as usize;
    let spectrum_height = height.saturating_sub(4).max(1);

    push_line(buffer, 0, view.header, width);

    for row in 0..spectrum_height {
        let _ = write!(
            buffer,
            "{}{}",
            MoveTo(0, (row + 1) as u16),
            Clear(ClearType::UntilNewLine)
        );
        let Some(columns) = view.spectrum else {
            continue;
        };
        // Rows are painted top down; a column lights this row once its
        // bar is tall enough to reach it.
        let threshold = spectrum_height - 1 - row;
        let mut painted: Option<u8> = None;
        for &value in columns.iter().take(width) {
            if column_cells(value, spectrum_height) > threshold {
                if painted != Some(value) {
                    let (r, g, b) = bar_rgb(value);
                    let _ = write!(buffer, "{}", SetForegroundColor(Color::Rgb { r, g, b }));
                    painted = Some(value);
                }
                buffer.push(BAR_CELL);
            } else {
                buffer.push(' ');
            }
        }
        if painted.is_some() {
            let _ = write!(buffer, "{}", ResetColor);
        }
    }

    let meter_row = height.saturating_sub(3) as u16;
    let _ = write!(
        buffer,
        "{}{}",
        MoveTo(0, meter_row),
        Clear(ClearType::UntilNewLine)
    );
    if let Some(meter) = &view.meter {
        let filled = meter.filled.min(meter.width);
        buffer.push_str("Loudness [");
        let _ = write!(buffer, "{}", SetForegroundColor(Color::Green));
        for _ in 0..filled {
            buffer.push(BAR_CELL);
        }
        let _ = write!(buffer, "{}", ResetColor);
        for _ in filled..meter.width {
            buffer.push(' ');
        }
        let _ = write!(buffer, "] {:3.0}%", meter.percent);
    }

    push_line(buffer, height.saturating_sub(2) as u16, view.status, width);
    push_line(buffer, height.saturating_sub(1) as u16, view.help, width);
}

// ===== Terminal Session =====

/// Raw-mode alternate-screen session, restored on drop
pub struct TerminalSession {
    out: io::Stdout,
    buffer: String,
}

impl TerminalSession {
    /// Switch the terminal into raw mode on the alternate screen
    pub fn new() -> Result<Self> {
        let mut out = io::stdout();
        enable_raw_mode().context("failed to enable raw terminal mode")?;
        execute!(out, EnterAlternateScreen, Hide)
            .context("failed to enter the alternate screen")?;
        Ok(Self {
            out,
            buffer: String::new(),
        })
    }

    /// Current terminal size as (columns, rows)
    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size().context("failed to query the terminal size")
    }

    /// Wait up to `budget` for a key press and map it to an action
    ///
    /// Returns `Ok(None)` when the budget elapses quietly, on key
    /// release events and on keys without a binding. The budget doubles
    /// as the frame pacing for the caller's render loop.
    pub fn poll_input(&self, budget: Duration) -> Result<Option<PlayerInput>> {
        if event::poll(budget).context("failed to poll terminal input")? {
            if let Event::Key(key) = event::read().context("failed to read terminal input")? {
                if key.kind == KeyEventKind::Press {
                    return Ok(map_key(key.code, key.modifiers));
                }
            }
        }
        Ok(None)
    }

    /// Paint one frame
    pub fn draw(&mut self, view: &FrameView) -> Result<()> {
        let (width, height) = self.size()?;
        self.buffer.clear();
        compose_frame(&mut self.buffer, view, width, height);

        execute!(self.out, BeginSynchronizedUpdate)?;
        self.out.write_all(self.buffer.as_bytes())?;
        execute!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.out, LeaveAlternateScreen, Show);
        let _ = disable_raw_mode();
    }
}
