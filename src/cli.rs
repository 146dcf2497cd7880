use clap::Parser;
use std::path::PathBuf;

/// Play videos in the terminal as ASCII art
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the video file to play
    #[arg(required = true)]
    pub file_path: PathBuf,

    /// Width in characters [default: 120]
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Use the detailed 70-character palette
    #[arg(short, long)]
    pub detailed: bool,

    /// Reverse the palette, for light text on a dark background
    #[arg(short, long)]
    pub invert: bool,

    /// Skip this many frames before playback starts
    #[arg(short, long, default_value_t = 0, value_name = "FRAME")]
    pub start: u64,

    /// Load settings from a JSON file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Hide the frame counter under the picture
    #[arg(long)]
    pub no_status: bool,

    /// Show video information only (don't play)
    #[arg(long)]
    pub info_only: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<(), String> {
        if !self.file_path.exists() {
            return Err(format!("Video file does not exist: {}", self.file_path.display()));
        }

        if self.width == Some(0) {
            return Err("Width must be greater than 0".to_string());
        }

        if let Some(config) = &self.config {
            if !config.is_file() {
                return Err(format!("Config file does not exist: {}", config.display()));
            }
        }

        Ok(())
    }

    /// File name for status display
    pub fn file_name(&self) -> &str {
        self.file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["ascii-video-player", "clip.mp4"]).unwrap();
        assert_eq!(cli.file_path, PathBuf::from("clip.mp4"));
        assert_eq!(cli.width, None);
        assert!(!cli.detailed);
        assert!(!cli.invert);
        assert_eq!(cli.start, 0);
        assert!(!cli.no_status);
        assert_eq!(cli.file_name(), "clip.mp4");
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "ascii-video-player",
            "-w",
            "150",
            "-d",
            "-s",
            "30",
            "v.mkv",
        ])
        .unwrap();
        assert_eq!(cli.width, Some(150));
        assert!(cli.detailed);
        assert_eq!(cli.start, 30);
    }

    #[test]
    fn test_file_is_required() {
        assert!(Cli::try_parse_from(["ascii-video-player"]).is_err());
    }

    #[test]
    fn test_validate_missing_file() {
        let cli = Cli::try_parse_from(["ascii-video-player", "does/not/exist.mp4"]).unwrap();
        let err = cli.validate().unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn test_validate_zero_width() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        let cli = Cli::try_parse_from(["ascii-video-player", path, "--width", "0"]).unwrap();
        assert_eq!(cli.validate().unwrap_err(), "Width must be greater than 0");

        let cli = Cli::try_parse_from(["ascii-video-player", path, "--width", "80"]).unwrap();
        assert!(cli.validate().is_ok());
    }
}
