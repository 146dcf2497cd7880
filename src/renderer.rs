use crate::converter::AsciiFrame;
use crate::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Print, ResetColor},
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use log::debug;
use std::io::{stdout, Stdout, Write};
use std::time::Duration;

/// Display surface for rendered frames
pub trait FrameSink {
    /// Replace whatever was shown before with `frame`, plus an optional status line
    fn show(&mut self, frame: &AsciiFrame, status: Option<&str>) -> Result<()>;
}

/// Writes frames to a terminal, or anything else that accepts ANSI output
pub struct TerminalRenderer<W: Write> {
    out: W,
    frames_shown: u64,
}

impl TerminalRenderer<Stdout> {
    pub fn stdout() -> Self {
        Self::new(stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames_shown: 0 }
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TerminalRenderer<W> {
    fn show(&mut self, frame: &AsciiFrame, status: Option<&str>) -> Result<()> {
        let start_time = std::time::Instant::now();

        queue!(self.out, MoveTo(0, 0), Clear(ClearType::All))?;

        // One cursor move per row so output stays aligned in raw mode
        let mut rows = 0u16;
        for line in frame.lines() {
            queue!(self.out, MoveTo(0, rows), Print(line))?;
            rows = rows.saturating_add(1);
        }

        if let Some(status) = status.filter(|s| !s.is_empty()) {
            queue!(self.out, MoveTo(0, rows.saturating_add(1)), Print(status))?;
        }

        self.out.flush()?;
        self.frames_shown += 1;

        debug!(
            "Frame {} shown in {}us ({}x{})",
            frame.frame_number,
            start_time.elapsed().as_micros(),
            frame.columns,
            frame.rows
        );
        Ok(())
    }
}

/// Raw-mode terminal session; the terminal is restored on drop
pub struct TerminalSession<W: Write = Stdout> {
    out: W,
    raw_mode: bool,
    active: bool,
}

impl TerminalSession<Stdout> {
    /// Put stdout in raw mode and hide the cursor.
    ///
    /// The screen is not cleared here so the intro banner stays visible;
    /// every frame clears before drawing.
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        Self::start(stdout(), true)
    }
}

impl<W: Write> TerminalSession<W> {
    /// Guard `out` first, then touch it, so a failed setup still restores
    fn start(out: W, raw_mode: bool) -> Result<Self> {
        let mut session = Self {
            out,
            raw_mode,
            active: true,
        };
        execute!(session.out, Hide)?;
        debug!("Terminal initialized for rendering");
        Ok(session)
    }

    /// Restore terminal to normal state
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let shown = execute!(self.out, Show, ResetColor);
        if self.raw_mode {
            disable_raw_mode()?;
        }
        shown?;
        debug!("Terminal restored to normal state");
        Ok(())
    }
}

impl<W: Write> Drop for TerminalSession<W> {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Time budget of a single frame
pub fn calculate_frame_delay(fps: f64) -> Duration {
    if fps.is_finite() && fps > 0.0 {
        Duration::from_secs_f64(1.0 / fps)
    } else {
        Duration::ZERO
    }
}

/// What is left of `budget` after `elapsed` has been spent, never negative
pub fn remaining_delay(budget: Duration, elapsed: Duration) -> Duration {
    budget.saturating_sub(elapsed)
}
