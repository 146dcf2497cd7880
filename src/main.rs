use anyhow::{Context, Result};
use ascii_video_player::decoder::log_frame_rate;
use ascii_video_player::prelude::*;
use ascii_video_player::target_dimensions;
use clap::Parser;
use log::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG still wins when set
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let config = PlayerConfig::resolve(&cli).context("Failed to load configuration")?;

    info!("Starting {} v{}", ascii_video_player::PACKAGE_NAME, ascii_video_player::VERSION);
    info!("Playing: {}", cli.file_path.display());

    let mut decoder = VideoDecoder::open(&cli.file_path)?.with_fallback_fps(config.fallback_fps);
    let stream = decoder.info();
    log_frame_rate(&stream);

    let render = config.render_config();
    let (columns, rows) = target_dimensions(
        stream.width,
        stream.height,
        render.width,
        render.aspect_correction,
    );

    if cli.info_only {
        print_info(&cli, &stream, (columns, rows));
        return Ok(());
    }

    println!("\nPlaying: {}", cli.file_name());
    println!(
        "Resolution: {}x{} -> {}x{} (ASCII)",
        stream.width, stream.height, columns, rows
    );
    match stream.frame_count {
        Some(frames) => println!("FPS: {:.2} | Frames: {}", stream.fps, frames),
        None => println!("FPS: {:.2}", stream.fps),
    }
    println!("\nPress q, Esc or Ctrl+C to stop\n");

    // The frame skip and the intro pause run inside `play` so they can be interrupted too
    let options = PlaybackOptions {
        render,
        frame_delay: calculate_frame_delay(decoder.fps()),
        show_status: config.show_status,
        total_frames: stream.frame_count,
        skip_frames: cli.start,
        lead_in: config.intro_delay(),
    };

    let mut sink = TerminalRenderer::stdout();

    // Raw mode turns Ctrl+C into a key event, so only poll keys on a real terminal
    let interactive = atty::is(atty::Stream::Stdout) && atty::is(atty::Stream::Stdin);
    let mut session: Option<TerminalSession> = None;
    let mut interrupt: Box<dyn InterruptSource> = if interactive {
        session = Some(TerminalSession::enter()?);
        Box::new(KeyboardInterrupt::new())
    } else {
        Box::new(SignalInterrupt::install()?)
    };

    let result = play(&mut decoder, &mut sink, interrupt.as_mut(), &options).await;

    if let Some(session) = session.as_mut() {
        session.restore()?;
    }

    let summary = result?;
    match summary.outcome {
        PlaybackOutcome::Completed => println!("\n\nVideo playback complete!"),
        PlaybackOutcome::Interrupted => println!("\n\nPlayback stopped by user"),
    }

    info!(
        "Playback finished. Frames shown: {}, decoded: {}",
        summary.frames_rendered,
        decoder.frames_decoded()
    );
    Ok(())
}

fn print_info(cli: &Cli, stream: &StreamInfo, (columns, rows): (u32, u32)) {
    println!("Video Information:");
    println!("  File: {}", cli.file_path.display());
    println!("  Dimensions: {}x{}", stream.width, stream.height);
    println!("  ASCII Output: {}x{}", columns, rows);
    println!(
        "  Frame Rate: {:.2} FPS{}",
        stream.fps,
        if stream.fps_reported { "" } else { " (fallback)" }
    );
    if let Some(frames) = stream.frame_count {
        println!("  Frames: {}", frames);
    }
    if let Some(duration) = stream.duration {
        println!("  Duration: {}", format_duration(duration));
    }
    println!(
        "  Aspect Ratio: {:.2}",
        calculate_aspect_ratio(stream.width, stream.height)
    );
}
