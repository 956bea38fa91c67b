//! Wiring of sources, pins and sinks from CLI arguments and configuration

use anyhow::{bail, Context, Result};
use clap::Parser;
use flamewatch_core::{LogPin, OutputPin, SysfsPin};
use flamewatch_cv::{
    FrameSource, ImageSequenceSource, LoopDriver, MaskDumper, MonitorConfig, RunStats, StopHandle,
};
use serde::Serialize;
use std::path::PathBuf;

/// Flamewatch - trigger a GPIO line when a flame-colored region appears on camera
#[derive(Parser, Debug)]
#[command(name = "flamewatch", version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "flamewatch.json")]
    pub config: PathBuf,

    /// Replay frames from a directory of images
    #[arg(long, conflicts_with_all = ["camera", "video"])]
    pub source: Option<PathBuf>,

    /// Camera index (requires the opencv feature)
    #[arg(long, conflicts_with = "video")]
    pub camera: Option<i32>,

    /// Video file (requires the opencv feature)
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Restart an image directory from the beginning when it runs out
    #[arg(long, default_value_t = false)]
    pub loop_source: bool,

    /// BCM line to drive, overrides the configuration
    #[arg(long)]
    pub gpio: Option<u32>,

    /// Log pin changes instead of touching GPIO
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Stop after this many frames
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Save masks of processed frames into this directory
    #[arg(long)]
    pub dump_masks: Option<PathBuf>,

    /// Print run statistics as JSON on exit
    #[arg(long, default_value_t = false)]
    pub json_stats: bool,

    /// Write the default configuration to this path and exit
    #[arg(long)]
    pub write_default_config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// What was monitored and how it ended
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub pin: String,
    pub stats: RunStats,
}

/// Load the configuration file and apply command line overrides
pub fn load_config(args: &Args) -> Result<MonitorConfig> {
    let mut config = MonitorConfig::load(&args.config)?;
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

pub fn apply_overrides(config: &mut MonitorConfig, args: &Args) {
    if let Some(line) = args.gpio {
        config.pin.line = line;
    }
    if args.max_frames.is_some() {
        config.max_frames = args.max_frames;
    }
    if let Some(dir) = &args.dump_masks {
        config.visualization.save_masks = true;
        config.visualization.output_dir = dir.clone();
    }
}

/// Pick the frame source named on the command line
pub fn open_source(args: &Args) -> Result<Box<dyn FrameSource>> {
    if let Some(dir) = &args.source {
        let source = ImageSequenceSource::open(dir, args.loop_source)?;
        return Ok(Box::new(source));
    }
    open_capture(args)
}

#[cfg(feature = "opencv")]
fn open_capture(args: &Args) -> Result<Box<dyn FrameSource>> {
    use flamewatch_cv::CaptureSource;

    if let Some(path) = &args.video {
        return Ok(Box::new(CaptureSource::file(path)?));
    }
    Ok(Box::new(CaptureSource::camera(args.camera.unwrap_or(0))?))
}

#[cfg(not(feature = "opencv"))]
fn open_capture(args: &Args) -> Result<Box<dyn FrameSource>> {
    if args.camera.is_some() || args.video.is_some() {
        bail!("camera and video capture need the `opencv` feature");
    }
    bail!("no frame source given, pass --source <DIR>");
}

pub fn open_pin(args: &Args, config: &MonitorConfig) -> Result<Box<dyn OutputPin>> {
    if args.dry_run {
        return Ok(Box::new(LogPin::new(format!("gpio{} (dry run)", config.pin.line))));
    }
    let pin = SysfsPin::open(config.pin.line, config.pin.active_low)
        .with_context(|| format!("Failed to open gpio{}", config.pin.line))?;
    Ok(Box::new(pin))
}

/// Build the loop from arguments and configuration and run it to completion
pub fn run(args: &Args, config: &MonitorConfig, stop: StopHandle) -> Result<RunSummary> {
    let source = open_source(args)?;
    let pin = open_pin(args, config)?;
    let source_name = source.name();
    let pin_name = pin.name();

    let mut driver = LoopDriver::from_config(config, source, pin).with_stop_handle(stop);

    let visualization = &config.visualization;
    if visualization.save_masks {
        let dumper = MaskDumper::new(
            &visualization.output_dir,
            visualization.every_n_frames,
            visualization.save_frames,
        )?;
        log::info!("Saving masks to {:?}", visualization.output_dir);
        driver.add_sink(Box::new(dumper));
    }

    let stats = driver.run();
    Ok(RunSummary {
        source: source_name,
        pin: pin_name,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() -> Result<()> {
        let args = Args::try_parse_from([
            "flamewatch",
            "--gpio",
            "27",
            "--max-frames",
            "10",
            "--dump-masks",
            "/tmp/masks",
        ])?;
        let mut config = MonitorConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.pin.line, 27);
        assert_eq!(config.max_frames, Some(10));
        assert!(config.visualization.save_masks);
        assert_eq!(config.visualization.output_dir, PathBuf::from("/tmp/masks"));
        Ok(())
    }

    #[test]
    fn test_no_overrides_keeps_config() -> Result<()> {
        let args = Args::try_parse_from(["flamewatch"])?;
        let mut config = MonitorConfig::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config, MonitorConfig::default());
        Ok(())
    }

    #[test]
    fn test_source_conflicts_with_camera() {
        let result = Args::try_parse_from(["flamewatch", "--source", "frames", "--camera", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dry_run_uses_log_pin() -> Result<()> {
        let args = Args::try_parse_from(["flamewatch", "--dry-run"])?;
        let pin = open_pin(&args, &MonitorConfig::default())?;
        assert_eq!(pin.name(), "gpio17 (dry run)");
        Ok(())
    }
}
