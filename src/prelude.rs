// Re-export commonly used types for convenience
pub use crate::cli::Cli;
pub use crate::config::PlayerConfig;
pub use crate::converter::{frame_to_ascii, AsciiFrame, FrameConverter, Palette, RenderConfig};
pub use crate::decoder::{Frame, FrameSource, StreamInfo, VideoDecoder};
pub use crate::input::{InterruptSource, KeyboardInterrupt, SignalInterrupt};
pub use crate::player::{play, PlaybackOptions, PlaybackOutcome, PlaybackSummary};
pub use crate::renderer::{calculate_frame_delay, FrameSink, TerminalRenderer, TerminalSession};
pub use crate::utils::*;
pub use crate::{PlayerError, Result};
