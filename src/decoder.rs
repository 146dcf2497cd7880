use crate::{PlayerError, Result, DEFAULT_FPS};
use ffmpeg_next as ffmpeg;
use image::RgbImage;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// A decoded video frame
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
    number: u64,
}

impl Frame {
    /// Wrap an RGB image. Fails with `InvalidFrame` if either dimension is zero.
    pub fn new(image: RgbImage, number: u64) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PlayerError::InvalidFrame { width, height });
        }
        Ok(Self { image, number })
    }

    /// Build a frame from packed RGB24 bytes
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>, number: u64) -> Result<Self> {
        let image = RgbImage::from_raw(width, height, data)
            .ok_or(PlayerError::InvalidFrame { width, height })?;
        Self::new(image, number)
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Zero-based position in the source stream
    pub fn number(&self) -> u64 {
        self.number
    }
}

/// Pull-based sequence of frames
pub trait FrameSource {
    /// Frames per second used for pacing. Always positive.
    fn fps(&self) -> f64;

    /// Next frame in presentation order, or `None` once the stream is exhausted
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Source metadata
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Whether `fps` came from the source or from the fallback
    pub fps_reported: bool,
    pub frame_count: Option<u64>,
    pub duration: Option<f64>,
}

/// Video decoder that extracts frames from video files
pub struct VideoDecoder {
    path: PathBuf,
    input_context: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: Option<ffmpeg::software::scaling::Context>,
    decoded: ffmpeg::frame::Video,
    rgb: ffmpeg::frame::Video,
    reported_fps: Option<f64>,
    fallback_fps: f64,
    frame_count: Option<u64>,
    duration: Option<f64>,
    frames_decoded: u64,
    eof_sent: bool,
    finished: bool,
}

impl VideoDecoder {
    /// Open a video file for decoding
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PlayerError::source_unavailable(path, "file does not exist"));
        }

        ffmpeg::init().map_err(|e| PlayerError::source_unavailable(path, e))?;

        debug!("Attempting to open video file: {}", path.display());
        let input_context = ffmpeg::format::input(&path).map_err(|e| {
            info!("FFmpeg error details: {:?}", e);
            PlayerError::source_unavailable(path, e)
        })?;

        let stream = input_context
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| PlayerError::source_unavailable(path, "no video stream found"))?;
        let stream_index = stream.index();

        let context_decoder =
            ffmpeg::codec::context::Context::from_parameters(stream.parameters())
                .map_err(|e| PlayerError::source_unavailable(path, e))?;
        let decoder = context_decoder
            .decoder()
            .video()
            .map_err(|e| {
                PlayerError::source_unavailable(path, format!("unsupported codec: {}", e))
            })?;

        if decoder.width() == 0 || decoder.height() == 0 {
            return Err(PlayerError::source_unavailable(
                path,
                "video stream has no dimensions",
            ));
        }

        let reported_fps = rational_to_fps(stream.avg_frame_rate())
            .or_else(|| rational_to_fps(stream.rate()));

        let frame_count = u64::try_from(stream.frames()).ok().filter(|&n| n > 0);

        let duration = if stream.duration() != ffmpeg::ffi::AV_NOPTS_VALUE && stream.duration() > 0
        {
            let time_base = stream.time_base();
            Some(
                stream.duration() as f64 * time_base.numerator() as f64
                    / time_base.denominator() as f64,
            )
        } else {
            None
        };

        info!(
            "Found video stream {} in '{}': {}x{}",
            stream_index,
            path.display(),
            decoder.width(),
            decoder.height()
        );

        Ok(Self {
            path: path.to_path_buf(),
            input_context,
            stream_index,
            decoder,
            scaler: None,
            decoded: ffmpeg::frame::Video::empty(),
            rgb: ffmpeg::frame::Video::empty(),
            reported_fps,
            fallback_fps: DEFAULT_FPS,
            frame_count,
            duration,
            frames_decoded: 0,
            eof_sent: false,
            finished: false,
        })
    }

    /// Replace the frame rate used when the source does not report one
    pub fn with_fallback_fps(mut self, fps: f64) -> Self {
        if fps.is_finite() && fps > 0.0 {
            self.fallback_fps = fps;
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get video dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.decoder.width(), self.decoder.height())
    }

    pub fn info(&self) -> StreamInfo {
        let (width, height) = self.dimensions();
        StreamInfo {
            width,
            height,
            fps: self.fps(),
            fps_reported: self.reported_fps.is_some(),
            frame_count: self.frame_count,
            duration: self.duration,
        }
    }

    /// Number of frames handed out so far
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Convert the current decoded frame to packed RGB24
    fn convert_frame(&mut self) -> Result<Frame> {
        let format = self.decoded.format();
        let width = self.decoded.width();
        let height = self.decoded.height();

        let stale = self.scaler.as_ref().map_or(true, |scaler| {
            let input = scaler.input();
            input.format != format || input.width != width || input.height != height
        });
        if stale {
            debug!("Creating scaler for {:?} {}x{}", format, width, height);
            self.scaler = Some(ffmpeg::software::scaling::Context::get(
                format,
                width,
                height,
                ffmpeg::format::Pixel::RGB24,
                width,
                height,
                ffmpeg::software::scaling::Flags::BILINEAR,
            )?);
        }

        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&self.decoded, &mut self.rgb)?;
        }

        // Rows in the FFmpeg buffer may be padded past width * 3
        let stride = self.rgb.stride(0);
        let row_len = width as usize * 3;
        let plane = self.rgb.data(0);
        let mut data = Vec::with_capacity(row_len * height as usize);
        for row in plane.chunks(stride).take(height as usize) {
            data.extend_from_slice(&row[..row_len]);
        }

        let frame = Frame::from_rgb(width, height, data, self.frames_decoded)?;
        self.frames_decoded += 1;

        debug!("Decoded frame {}: {}x{}", frame.number(), width, height);
        Ok(frame)
    }
}

impl FrameSource for VideoDecoder {
    fn fps(&self) -> f64 {
        self.reported_fps.unwrap_or(self.fallback_fps)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            match self.decoder.receive_frame(&mut self.decoded) {
                Ok(()) => return self.convert_frame().map(Some),
                Err(ffmpeg::Error::Eof) => {
                    self.finished = true;
                    debug!("Decoder drained after {} frames", self.frames_decoded);
                    return Ok(None);
                }
                Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::ffi::EAGAIN => {}
                Err(e) => {
                    self.finished = true;
                    return Err(e.into());
                }
            }

            // Decoder wants more input
            if self.eof_sent {
                self.finished = true;
                return Ok(None);
            }

            let mut packet = ffmpeg::Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.stream_index {
                        self.decoder.send_packet(&packet)?;
                    }
                }
                Err(ffmpeg::Error::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(e) => {
                    self.finished = true;
                    return Err(e.into());
                }
            }
        }
    }
}

/// Frame rate from an FFmpeg rational, if it is usable
fn rational_to_fps(rate: ffmpeg::Rational) -> Option<f64> {
    if rate.numerator() <= 0 || rate.denominator() <= 0 {
        return None;
    }
    let fps = rate.numerator() as f64 / rate.denominator() as f64;
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

/// Log which frame rate playback will use
pub fn log_frame_rate(info: &StreamInfo) {
    if info.fps_reported {
        debug!("Source reports {:.3} FPS", info.fps);
    } else {
        warn!("Source does not report a frame rate, pacing at fallback {:.2} FPS", info.fps);
    }
}
