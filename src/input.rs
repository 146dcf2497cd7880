//! Cooperative stop requests for the playback loop.

use crate::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Non-blocking check for a user stop request
pub trait InterruptSource {
    fn interrupted(&mut self) -> Result<bool>;
}

/// Polls crossterm key events. Only meaningful while the terminal is in raw mode.
#[derive(Debug, Default)]
pub struct KeyboardInterrupt {
    requested: bool,
}

impl KeyboardInterrupt {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InterruptSource for KeyboardInterrupt {
    fn interrupted(&mut self) -> Result<bool> {
        while !self.requested && event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if is_stop_key(&key) {
                    info!("Quit requested by user");
                    self.requested = true;
                }
            }
        }
        Ok(self.requested)
    }
}

/// q, Esc or Ctrl+C
pub fn is_stop_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// SIGINT handler backed by an atomic flag, for when stdout is not a terminal
#[derive(Debug, Clone)]
pub struct SignalInterrupt {
    flag: Arc<AtomicBool>,
}

impl SignalInterrupt {
    /// Install the process-wide Ctrl+C handler. Can only succeed once per process.
    pub fn install() -> Result<Self> {
        let interrupt = Self::from_flag(Arc::new(AtomicBool::new(false)));
        let flag = Arc::clone(&interrupt.flag);
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })?;
        Ok(interrupt)
    }

    /// Wrap an existing flag without touching signal handlers
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

impl InterruptSource for SignalInterrupt {
    fn interrupted(&mut self) -> Result<bool> {
        let requested = self.flag.load(Ordering::SeqCst);
        if requested {
            info!("Interrupt signal received");
        }
        Ok(requested)
    }
}
