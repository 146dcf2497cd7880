//! Playback loop: decode, render, display, then sleep out the frame budget.
//!
//! The `--start` skip and the intro pause run inside the same loop's
//! interrupt checks, so a stop request is honoured from the first moment.
//!
//! Every frame is shown. A slow frame makes playback lag behind the source
//! clock; nothing is skipped to catch up.

use crate::converter::{FrameConverter, RenderConfig};
use crate::decoder::FrameSource;
use crate::input::InterruptSource;
use crate::renderer::{remaining_delay, FrameSink};
use crate::Result;
use log::{debug, info};
use std::time::{Duration, Instant};
use tokio::time::{interval, sleep};

/// How often the intro pause checks for a stop request
const INTERRUPT_POLL: Duration = Duration::from_millis(50);

/// Settings for one playback run
#[derive(Debug, Clone)]
pub struct PlaybackOptions {
    pub render: RenderConfig,
    /// Time budget per frame
    pub frame_delay: Duration,
    pub show_status: bool,
    /// Declared frame count of the source, for the progress display
    pub total_frames: Option<u64>,
    /// Frames to decode and discard before anything is shown
    pub skip_frames: u64,
    /// Pause before the first frame
    pub lead_in: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The source ran out of frames
    Completed,
    /// The user asked to stop
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub outcome: PlaybackOutcome,
    pub frames_rendered: u64,
}

/// Play `source` to `sink` until it is exhausted or `interrupt` fires
pub async fn play<S, K, I>(
    source: &mut S,
    sink: &mut K,
    interrupt: &mut I,
    options: &PlaybackOptions,
) -> Result<PlaybackSummary>
where
    S: FrameSource + ?Sized,
    K: FrameSink + ?Sized,
    I: InterruptSource + ?Sized,
{
    let converter = FrameConverter::new(options.render.clone());
    let mut frames_rendered = 0u64;
    let playback_start = Instant::now();

    let interrupted = PlaybackSummary {
        outcome: PlaybackOutcome::Interrupted,
        frames_rendered: 0,
    };

    let mut skipped = 0u64;
    while skipped < options.skip_frames {
        if interrupt.interrupted()? {
            return Ok(interrupted);
        }
        if source.next_frame()?.is_none() {
            break;
        }
        skipped += 1;
    }
    if options.skip_frames > 0 {
        info!("Skipped {} of {} requested frames", skipped, options.skip_frames);
    }

    if wait_or_interrupt(options.lead_in, interrupt).await? {
        return Ok(interrupted);
    }

    info!(
        "Starting playback at {:.3}s per frame",
        options.frame_delay.as_secs_f64()
    );

    let outcome = loop {
        if interrupt.interrupted()? {
            break PlaybackOutcome::Interrupted;
        }

        let frame_start = Instant::now();

        let frame = match source.next_frame()? {
            Some(frame) => frame,
            None => break PlaybackOutcome::Completed,
        };

        let ascii = converter.convert_frame(&frame)?;
        let status = options
            .show_status
            .then(|| status_line(frame.number(), options.total_frames));
        sink.show(&ascii, status.as_deref())?;
        frames_rendered += 1;

        let pause = remaining_delay(options.frame_delay, frame_start.elapsed());
        if pause.is_zero() {
            debug!("Frame {} overran its budget", frame.number());
        } else {
            sleep(pause).await;
        }
    };

    info!(
        "Playback {:?} after {} frames in {:.2}s",
        outcome,
        frames_rendered,
        playback_start.elapsed().as_secs_f64()
    );

    Ok(PlaybackSummary {
        outcome,
        frames_rendered,
    })
}

/// Sleep for `delay`, returning `true` early if `interrupt` fires first
pub async fn wait_or_interrupt<I>(delay: Duration, interrupt: &mut I) -> Result<bool>
where
    I: InterruptSource + ?Sized,
{
    if delay.is_zero() {
        return Ok(false);
    }

    let deadline = sleep(delay);
    tokio::pin!(deadline);
    let mut poll = interval(INTERRUPT_POLL);

    loop {
        tokio::select! {
            _ = &mut deadline => return Ok(false),
            _ = poll.tick() => {
                if interrupt.interrupted()? {
                    return Ok(true);
                }
            }
        }
    }
}

/// Progress text shown under the frame
pub fn status_line(frame_number: u64, total_frames: Option<u64>) -> String {
    match total_frames {
        Some(total) if total > 0 => format!(
            "Frame: {}/{} | {:.1}%",
            frame_number,
            total,
            frame_number as f64 / total as f64 * 100.0
        ),
        _ => format!("Frame: {}", frame_number),
    }
}
