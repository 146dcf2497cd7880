use crate::cli::Cli;
use crate::converter::{Palette, RenderConfig};
use crate::{PlayerError, Result, DEFAULT_ASPECT_CORRECTION, DEFAULT_FPS, DEFAULT_WIDTH};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Player settings. Any field may be omitted from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Output width in characters
    pub width: u32,
    pub palette: Palette,
    pub invert: bool,
    /// Row multiplier for non-square character cells
    pub aspect_correction: f64,
    /// Frame rate assumed when the source reports none
    pub fallback_fps: f64,
    pub show_status: bool,
    /// Pause after the info banner before playback starts
    pub intro_delay_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            palette: Palette::Standard,
            invert: false,
            aspect_correction: DEFAULT_ASPECT_CORRECTION,
            fallback_fps: DEFAULT_FPS,
            show_status: true,
            intro_delay_ms: 2000,
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON config document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Defaults, overlaid by the `--config` file, overlaid by CLI flags
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply flags given on the command line
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(width) = cli.width {
            self.width = width;
        }
        if cli.detailed {
            self.palette = Palette::Detailed;
        }
        if cli.invert {
            self.invert = true;
        }
        if cli.no_status {
            self.show_status = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(PlayerError::InvalidConfig("width must be greater than 0".to_string()));
        }
        if !self.aspect_correction.is_finite() || self.aspect_correction <= 0.0 {
            return Err(PlayerError::InvalidConfig(format!(
                "aspect_correction must be a positive number, got {}",
                self.aspect_correction
            )));
        }
        if !self.fallback_fps.is_finite() || self.fallback_fps <= 0.0 {
            return Err(PlayerError::InvalidConfig(format!(
                "fallback_fps must be a positive number, got {}",
                self.fallback_fps
            )));
        }
        Ok(())
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            width: self.width,
            palette: self.palette,
            aspect_correction: self.aspect_correction,
            invert: self.invert,
        }
    }

    pub fn intro_delay(&self) -> Duration {
        Duration::from_millis(self.intro_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.width, 120);
        assert_eq!(config.palette, Palette::Standard);
        assert_eq!(config.aspect_correction, 0.55);
        assert_eq!(config.fallback_fps, 30.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = PlayerConfig::from_json(r#"{ "width": 80, "palette": "detailed" }"#).unwrap();
        assert_eq!(config.width, 80);
        assert_eq!(config.palette, Palette::Detailed);
        assert_eq!(config.fallback_fps, DEFAULT_FPS);
        assert!(config.show_status);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = PlayerConfig::from_json(r#"{ "colour": true }"#);
        assert!(matches!(result, Err(PlayerError::ConfigParse(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            PlayerConfig { width: 0, ..Default::default() },
            PlayerConfig { aspect_correction: 0.0, ..Default::default() },
            PlayerConfig { aspect_correction: f64::INFINITY, ..Default::default() },
            PlayerConfig { fallback_fps: -1.0, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(PlayerError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "width": 80, "invert": true, "intro_delay_ms": 0 }}"#).unwrap();
        let config_path = file.path().to_str().unwrap();

        let cli = Cli::try_parse_from([
            "ascii-video-player",
            "clip.mp4",
            "--config",
            config_path,
            "--width",
            "100",
            "--detailed",
            "--no-status",
        ])
        .unwrap();

        let config = PlayerConfig::resolve(&cli).unwrap();
        assert_eq!(config.width, 100);
        assert_eq!(config.palette, Palette::Detailed);
        assert!(config.invert);
        assert!(!config.show_status);
        assert_eq!(config.intro_delay(), Duration::ZERO);

        let render = config.render_config();
        assert_eq!(render.width, 100);
        assert_eq!(render.palette, Palette::Detailed);
        assert!(render.invert);
    }
}
