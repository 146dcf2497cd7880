use crate::decoder::Frame;
use crate::{
    PlayerError, Result, DEFAULT_ASPECT_CORRECTION, DEFAULT_WIDTH, DETAILED_PALETTE,
    STANDARD_PALETTE,
};
use image::imageops::{self, FilterType};
use log::debug;
use serde::{Deserialize, Serialize};

/// Character palette granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// 10 glyphs
    #[default]
    Standard,
    /// 70 glyphs
    Detailed,
}

impl Palette {
    /// Pick the palette selected by the detail-mode flag
    pub fn from_detailed(detailed: bool) -> Self {
        if detailed {
            Palette::Detailed
        } else {
            Palette::Standard
        }
    }

    /// Glyphs ordered from darkest to brightest. Every glyph is one ASCII byte.
    pub const fn glyphs(self) -> &'static [u8] {
        match self {
            Palette::Standard => STANDARD_PALETTE.as_bytes(),
            Palette::Detailed => DETAILED_PALETTE.as_bytes(),
        }
    }

    pub fn len(self) -> usize {
        self.glyphs().len()
    }

    pub fn darkest(self) -> char {
        self.glyphs()[0] as char
    }

    pub fn brightest(self) -> char {
        self.glyphs()[self.len() - 1] as char
    }
}

/// Render settings passed explicitly to the converter
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Output width in characters
    pub width: u32,
    /// Glyph palette
    pub palette: Palette,
    /// Row multiplier for non-square character cells
    pub aspect_correction: f64,
    /// Map dark pixels to the bright end of the palette
    pub invert: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            palette: Palette::Standard,
            aspect_correction: DEFAULT_ASPECT_CORRECTION,
            invert: false,
        }
    }
}

/// A rendered text frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiFrame {
    /// Rows joined by `\n`, each row newline-terminated
    pub text: String,
    /// Frame width in characters
    pub columns: u32,
    /// Frame height in characters
    pub rows: u32,
    /// Source frame number
    pub frame_number: u64,
}

impl AsciiFrame {
    /// Iterate over rows without their line terminators
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

/// Video frame to ASCII converter
pub struct FrameConverter {
    config: RenderConfig,
}

impl FrameConverter {
    /// Create a new frame converter with the given configuration
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Convert a video frame to its ASCII representation
    pub fn convert_frame(&self, frame: &Frame) -> Result<AsciiFrame> {
        let (src_width, src_height) = frame.dimensions();
        if src_width == 0 || src_height == 0 || self.config.width == 0 {
            return Err(PlayerError::InvalidFrame {
                width: src_width,
                height: src_height,
            });
        }

        let (columns, rows) = target_dimensions(
            src_width,
            src_height,
            self.config.width,
            self.config.aspect_correction,
        );

        debug!(
            "Converting frame {} {}x{} to {}x{} characters",
            frame.number(),
            src_width,
            src_height,
            columns,
            rows
        );

        let resized = imageops::resize(frame.image(), columns, rows, FilterType::Triangle);

        let glyphs = self.config.palette.glyphs();
        let mut text = String::with_capacity(text_capacity(columns, rows));

        for row in resized.rows() {
            for pixel in row {
                let [r, g, b] = pixel.0;
                let mut index = luminance_to_index(luminance(r, g, b), glyphs.len());
                if self.config.invert {
                    index = glyphs.len() - 1 - index;
                }
                text.push(glyphs[index] as char);
            }
            text.push('\n');
        }

        Ok(AsciiFrame {
            text,
            columns,
            rows,
            frame_number: frame.number(),
        })
    }
}

/// Compute `(columns, rows)` for a source frame rendered at `width` columns.
///
/// Rows are scaled by `aspect_correction` and never drop below 1.
pub fn target_dimensions(
    src_width: u32,
    src_height: u32,
    width: u32,
    aspect_correction: f64,
) -> (u32, u32) {
    let rows = (width as f64 * src_height as f64 / src_width as f64 * aspect_correction).round();
    let rows = if rows.is_finite() { rows.max(1.0) as u32 } else { 1 };
    (width, rows)
}

/// Bytes needed for `rows` lines of `columns` glyphs plus line breaks
fn text_capacity(columns: u32, rows: u32) -> usize {
    (columns as usize + 1).saturating_mul(rows as usize)
}

/// ITU-R BT.601 luma in integer arithmetic
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Map a luminance value to an index into a palette of `len` glyphs
pub fn luminance_to_index(luminance: u8, len: usize) -> usize {
    (luminance as usize * len / 256).min(len.saturating_sub(1))
}

/// Convenience function to render a frame with the default aspect correction
pub fn frame_to_ascii(frame: &Frame, width: u32, palette: Palette) -> Result<String> {
    let config = RenderConfig {
        width,
        palette,
        ..Default::default()
    };

    FrameConverter::new(config)
        .convert_frame(frame)
        .map(|ascii| ascii.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_frame(width: u32, height: u32, r: u8, g: u8, b: u8) -> Frame {
        let mut data = Vec::new();
        for _ in 0..(width * height) {
            data.extend_from_slice(&[r, g, b]);
        }
        Frame::from_rgb(width, height, data, 0).unwrap()
    }

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let v = ((x + y) * 255 / (width + height - 2).max(1)) as u8;
                data.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }
        Frame::from_rgb(width, height, data, 7).unwrap()
    }

    fn square_config(width: u32) -> RenderConfig {
        RenderConfig {
            width,
            aspect_correction: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_luminance_calculation() {
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(0, 0, 0), 0);

        let red = luminance(255, 0, 0);
        let green = luminance(0, 255, 0);
        assert!(red > 0 && red < 255);
        assert!(green > red);
    }

    #[test]
    fn test_char_index_mapping() {
        for palette in [Palette::Standard, Palette::Detailed] {
            let len = palette.len();
            assert_eq!(luminance_to_index(0, len), 0);
            assert_eq!(luminance_to_index(255, len), len - 1);
            for lum in 0..=255u8 {
                assert!(luminance_to_index(lum, len) < len);
            }
        }
        assert_eq!(luminance_to_index(128, 10), 5);
    }

    #[test]
    fn test_target_dimensions() {
        assert_eq!(target_dimensions(1920, 1080, 120, 0.55), (120, 37));
        assert_eq!(target_dimensions(2, 2, 2, 0.55), (2, 1));
        assert_eq!(target_dimensions(2, 2, 2, 1.0), (2, 2));
        // Very wide source still gets a row
        assert_eq!(target_dimensions(10_000, 1, 1, 0.55), (1, 1));
    }

    #[test]
    fn test_text_capacity_does_not_overflow() {
        assert_eq!(text_capacity(2, 3), 9);
        assert_eq!(
            text_capacity(u32::MAX, 2),
            (u32::MAX as usize + 1).saturating_mul(2)
        );
        // Product exceeds u32 and must be computed in usize
        assert!(text_capacity(100_000, 100_000) >= u32::MAX as usize);
    }

    #[test]
    fn test_white_frame_uses_brightest_glyph() {
        let frame = create_test_frame(2, 2, 255, 255, 255);
        let ascii = FrameConverter::new(square_config(2)).convert_frame(&frame).unwrap();

        let brightest = Palette::Standard.brightest();
        assert_eq!(ascii.rows, 2);
        assert_eq!(ascii.columns, 2);
        assert_eq!(ascii.text, format!("{b}{b}\n{b}{b}\n", b = brightest));
    }

    #[test]
    fn test_black_frame_uses_darkest_glyph() {
        let frame = create_test_frame(2, 2, 0, 0, 0);
        let ascii = FrameConverter::new(square_config(2)).convert_frame(&frame).unwrap();

        assert_eq!(ascii.text, "@@\n@@\n");
    }

    #[test]
    fn test_default_aspect_correction_halves_rows() {
        let frame = create_test_frame(2, 2, 255, 255, 255);
        let text = frame_to_ascii(&frame, 2, Palette::Standard).unwrap();
        assert_eq!(text, "  \n");
    }

    #[test]
    fn test_output_is_rectangular() {
        let frame = gradient_frame(64, 48);
        for width in [1, 3, 17, 80, 200] {
            let converter = FrameConverter::new(RenderConfig {
                width,
                palette: Palette::Detailed,
                ..Default::default()
            });
            let ascii = converter.convert_frame(&frame).unwrap();
            let (_, rows) = target_dimensions(64, 48, width, DEFAULT_ASPECT_CORRECTION);

            assert_eq!(ascii.rows, rows);
            assert_eq!(ascii.lines().count(), rows as usize);
            assert!(ascii.lines().all(|line| line.len() == width as usize));
            assert!(ascii.text.ends_with('\n'));
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let frame = gradient_frame(33, 21);
        let converter = FrameConverter::new(RenderConfig::default());

        let first = converter.convert_frame(&frame).unwrap();
        let second = converter.convert_frame(&frame).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.frame_number, 7);
    }

    #[test]
    fn test_invert_mirrors_palette() {
        let frame = create_test_frame(4, 4, 0, 0, 0);
        let config = RenderConfig {
            invert: true,
            ..square_config(4)
        };
        let ascii = FrameConverter::new(config).convert_frame(&frame).unwrap();
        assert!(ascii.lines().all(|line| line == "    "));
    }

    #[test]
    fn test_zero_width_is_invalid() {
        let frame = create_test_frame(2, 2, 10, 10, 10);
        let result = FrameConverter::new(square_config(0)).convert_frame(&frame);
        assert!(matches!(result, Err(PlayerError::InvalidFrame { .. })));
    }

    #[test]
    fn test_palette_selection() {
        assert_eq!(Palette::from_detailed(false), Palette::Standard);
        assert_eq!(Palette::from_detailed(true), Palette::Detailed);
        assert_eq!(Palette::Standard.darkest(), '@');
        assert_eq!(Palette::Detailed.darkest(), '$');
        assert_eq!(Palette::Detailed.brightest(), ' ');
    }
}
