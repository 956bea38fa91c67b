//! Debug observers of each cycle
//!
//! Sinks see the frame, the mask and the decision after actuation. They
//! cannot influence the decision; their errors are logged by the driver.

use crate::detection::FrameAnalysis;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use flamewatch_core::ActuatorState;
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything known about one processed frame
#[derive(Debug)]
pub struct CycleReport<'a> {
    /// 1-based index of the frame in the run
    pub frame_index: u64,
    pub frame: &'a RgbImage,
    pub analysis: &'a FrameAnalysis,
    /// Actuator state after this cycle's update
    pub state: ActuatorState,
}

/// Observer for visualization or recording
pub trait DebugSink {
    fn observe(&mut self, report: &CycleReport<'_>) -> Result<()>;
}

impl<F> DebugSink for F
where
    F: FnMut(&CycleReport<'_>) -> Result<()>,
{
    fn observe(&mut self, report: &CycleReport<'_>) -> Result<()> {
        self(report)
    }
}

/// Writes masks (and optionally overlays) to a directory
pub struct MaskDumper {
    output_dir: PathBuf,
    every_n_frames: u64,
    save_frames: bool,
}

impl MaskDumper {
    pub fn new<P: AsRef<Path>>(output_dir: P, every_n_frames: u64, save_frames: bool) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

        Ok(Self {
            output_dir,
            every_n_frames: every_n_frames.max(1),
            save_frames,
        })
    }

    pub fn mask_path(&self, frame_index: u64) -> PathBuf {
        self.output_dir.join(format!("mask_{:06}.png", frame_index))
    }

    pub fn overlay_path(&self, frame_index: u64) -> PathBuf {
        self.output_dir.join(format!("frame_{:06}.png", frame_index))
    }
}

impl DebugSink for MaskDumper {
    fn observe(&mut self, report: &CycleReport<'_>) -> Result<()> {
        if report.frame_index % self.every_n_frames != 0 {
            return Ok(());
        }

        ImageUtils::save_mask(&report.analysis.mask, self.mask_path(report.frame_index))?;
        if self.save_frames {
            let overlay = ImageUtils::overlay_mask(report.frame, &report.analysis.mask);
            ImageUtils::save_rgb(&overlay, self.overlay_path(report.frame_index))?;
        }
        Ok(())
    }
}
