//! ASCII Video Player - plays video files in the terminal as ASCII art
//!
//! Frames are decoded with FFmpeg, resampled to the requested column count,
//! mapped from luminance to a character palette and written to the terminal
//! at the source frame rate.

pub mod cli;
pub mod config;
pub mod converter;
pub mod decoder;
pub mod input;
pub mod player;
pub mod prelude;
pub mod renderer;

use std::path::PathBuf;

pub use cli::Cli;
pub use config::PlayerConfig;
pub use converter::{
    frame_to_ascii, luminance, luminance_to_index, target_dimensions, AsciiFrame,
    FrameConverter, Palette, RenderConfig,
};
pub use decoder::{Frame, FrameSource, StreamInfo, VideoDecoder};
pub use input::{InterruptSource, KeyboardInterrupt, SignalInterrupt};
pub use player::{play, status_line, PlaybackOptions, PlaybackOutcome, PlaybackSummary};
pub use renderer::{
    calculate_frame_delay, remaining_delay, FrameSink, TerminalRenderer, TerminalSession,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
pub const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

/// Frame rate used when the source does not report one.
///
/// This silently decides playback pacing for such files, so it is also
/// configurable through `fallback_fps` in the config file.
pub const DEFAULT_FPS: f64 = 30.0;

/// Row multiplier compensating for terminal cells being taller than wide
pub const DEFAULT_ASPECT_CORRECTION: f64 = 0.55;

/// Default output width in characters
pub const DEFAULT_WIDTH: u32 = 120;

/// Standard palette, darkest to brightest
pub const STANDARD_PALETTE: &str = "@%#*+=-:. ";

/// Detailed palette, darkest to brightest
pub const DETAILED_PALETTE: &str =
    "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ";

/// Error types used throughout the application
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    #[error("Cannot open video source '{}': {reason}", .path.display())]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("Invalid frame dimensions {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },

    #[error("Video decoding error: {0}")]
    VideoDecoding(#[from] ffmpeg_next::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Failed to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl PlayerError {
    pub(crate) fn source_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Utility functions
pub mod utils {
    /// Format duration in a human-readable way
    pub fn format_duration(seconds: f64) -> String {
        let total_seconds = seconds.max(0.0) as u64;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let secs = total_seconds % 60;

        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, secs)
        } else {
            format!("{}:{:02}", minutes, secs)
        }
    }

    /// Calculate aspect ratio from dimensions
    pub fn calculate_aspect_ratio(width: u32, height: u32) -> f64 {
        width as f64 / height as f64
    }

}
