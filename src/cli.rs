// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Recording frames from the sensor to disk
//! - Saving preview images
//! - Replaying clips on the playback service
//! - Inspecting the configuration

use depth_recorder::Config;
use depth_recorder::backends::playback::SimulatedPlaybackClient;
use depth_recorder::backends::sensor::{SyntheticSensor, SyntheticSensorConfig};
use depth_recorder::constants::JpegQuality;
use depth_recorder::constants::timing::FRAME_INTERVAL;
use depth_recorder::media::{DepthScaling, FrameEncoder};
use depth_recorder::pipelines::capture::CaptureSession;
use depth_recorder::pipelines::export::{DirectoryPicker, ExportStreams};
use depth_recorder::pipelines::playback::{PlaybackController, PlayerState};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// JPEG quality presets accepted on the command line
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum QualityArg {
    Low,
    Medium,
    High,
    Maximum,
}

impl From<QualityArg> for JpegQuality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Low => JpegQuality::Low,
            QualityArg::Medium => JpegQuality::Medium,
            QualityArg::High => JpegQuality::High,
            QualityArg::Maximum => JpegQuality::Maximum,
        }
    }
}

/// Depth preview scaling accepted on the command line
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ScalingArg {
    Saturate,
    Wrap,
}

impl From<ScalingArg> for DepthScaling {
    fn from(arg: ScalingArg) -> Self {
        match arg {
            ScalingArg::Saturate => DepthScaling::Saturate,
            ScalingArg::Wrap => DepthScaling::Wrap,
        }
    }
}

pub struct RecordArgs {
    pub output: Option<PathBuf>,
    pub ask: bool,
    pub color: bool,
    pub depth: bool,
    pub body: bool,
    pub frames: u64,
    pub quality: Option<QualityArg>,
    pub queued: bool,
}

/// Reads an output directory from stdin; an empty line cancels
struct StdinDirectoryPicker;

impl DirectoryPicker for StdinDirectoryPicker {
    fn pick_directory(&mut self) -> Option<PathBuf> {
        print!("Save folder (empty to cancel): ");
        std::io::stdout().flush().ok()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).ok()?;
        let line = line.trim();
        if line.is_empty() {
            None
        } else {
            Some(PathBuf::from(line))
        }
    }
}

/// Set up a Ctrl+C handler and return its flag
fn stop_flag() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;
    Ok(stop_flag)
}

/// Record frames from the sensor
pub fn record(args: RecordArgs) -> CliResult {
    let mut config = Config::load()?;
    if let Some(quality) = args.quality {
        config.jpeg_quality = quality.into();
    }
    if args.queued {
        config.writer_mode = Config::queued_writer();
    }

    // Flags replace the configured selection when any is given
    let streams = if args.color || args.depth || args.body {
        ExportStreams {
            color: args.color,
            depth: args.depth,
            body: args.body,
        }
    } else {
        config.streams
    };

    let sensor = SyntheticSensor::new(SyntheticSensorConfig::default());
    let mut session =
        CaptureSession::with_options(sensor, config.export_options(), config.depth_scaling);

    if args.ask {
        let started = session
            .exporter_mut()
            .start_with_dialog(&mut StdinDirectoryPicker, streams)?;
        if !started {
            println!("Cancelled.");
            return Ok(());
        }
    } else {
        let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());
        std::fs::create_dir_all(&output_dir)?;
        session.exporter_mut().start(&output_dir, streams)?;
    }

    if let Some(dir) = session.exporter().directory() {
        println!("Output: {}", dir.display());
    }
    if let Some(csv) = session.exporter().csv_path() {
        println!("Skeleton table: {}", csv.display());
    }
    println!(
        "Streams: color={} depth={} body={}",
        streams.color, streams.depth, streams.body
    );
    println!();
    println!("Recording... (press Ctrl+C to stop early)");

    let stop_flag = stop_flag()?;
    let mut images = 0usize;
    let mut rows = 0usize;
    let mut skipped = 0usize;

    for tick in 0..args.frames {
        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Stopping early...");
            break;
        }

        let started = Instant::now();
        let report = session.tick()?;
        if let Some(export) = report.export {
            images += export.images_written;
            rows += export.rows_written;
            skipped += export.skipped.len();
        }

        print!(
            "\rTick {}/{}: {} images, {} rows",
            tick + 1,
            args.frames,
            images,
            rows
        );
        std::io::stdout().flush()?;

        if let Some(rest) = FRAME_INTERVAL.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    println!();

    session.exporter_mut().stop()?;
    println!(
        "Recorded {} ticks: {} images, {} skeleton rows, {} skipped frames",
        session.ticks(),
        images,
        rows,
        skipped
    );
    Ok(())
}

/// Capture a few ticks and save preview images
pub fn preview(output: Option<PathBuf>, ticks: u64, scaling: Option<ScalingArg>) -> CliResult {
    let config = Config::load()?;
    let scaling = scaling.map(DepthScaling::from).unwrap_or(config.depth_scaling);
    let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir)?;

    let sensor = SyntheticSensor::new(SyntheticSensorConfig::default());
    let mut session = CaptureSession::with_options(sensor, config.export_options(), scaling);
    for _ in 0..ticks.max(1) {
        session.tick()?;
    }

    let encoder = FrameEncoder::new(config.jpeg_quality);

    if let Some(color) = session.preview_color()? {
        let rgb = image::DynamicImage::ImageRgba8(color).into_rgb8();
        let path = output_dir.join("preview_color.jpg");
        encoder.encode_jpeg(&rgb)?.save(&path)?;
        println!("Color preview: {}", path.display());
    }
    if let Some(depth) = session.preview_depth()? {
        let path = output_dir.join("preview_depth.png");
        encoder.encode_png8(&depth)?.save(&path)?;
        println!("Depth preview: {}", path.display());
    }
    if let Some(infrared) = session.preview_infrared()? {
        let path = output_dir.join("preview_infrared.png");
        encoder.encode_png16(&infrared)?.save(&path)?;
        println!("Infrared preview: {}", path.display());
    }

    let bodies: Vec<_> = session.tracked_bodies().collect();
    println!("Tracked bodies: {}", bodies.len());
    for body in bodies {
        let tracked = body.joints.iter().filter(|j| j.is_tracked()).count();
        println!("  [{}] {} joints tracked", body.tracking_id, tracked);
    }
    Ok(())
}

/// Replay a clip until it ends or Ctrl+C is pressed
pub fn play(clip: PathBuf, loops: Option<u32>) -> CliResult {
    let config = Config::load()?;
    let clip = std::path::absolute(&clip)?;
    let loops = loops.unwrap_or(config.loop_count);

    let client = SimulatedPlaybackClient::new(config.simulated_clip_duration());
    let mut controller = PlaybackController::with_clip(Arc::new(client), &clip, loops)?;
    controller.set_poll_interval(config.poll_interval());

    println!("Clip: {}", clip.display());
    println!("Loops: {}", loops);
    println!();
    println!("Playing... (press Ctrl+C to stop early)");

    let stop_flag = stop_flag()?;
    let start = Instant::now();
    controller.play()?;

    loop {
        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Stopping early...");
            break;
        }
        if controller.state() == PlayerState::Stopped {
            break;
        }

        let elapsed = start.elapsed().as_secs();
        print!("\rPlaying: {:02}:{:02}", elapsed / 60, elapsed % 60);
        std::io::stdout().flush()?;

        std::thread::sleep(Duration::from_millis(100));
    }
    println!();

    controller.stop()?;
    println!("Playback finished");
    Ok(())
}

pub fn config_show() -> CliResult {
    let config = Config::load()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

pub fn config_path() -> CliResult {
    println!("{}", Config::path()?.display());
    Ok(())
}

pub fn config_reset() -> CliResult {
    let path = Config::default().save()?;
    println!("Configuration reset: {}", path.display());
    Ok(())
}
