//! Live camera or video file through OpenCV

use super::FrameSource;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::{bail, Context};
use image::DynamicImage;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::Path;

/// Frames read from an OpenCV `VideoCapture`
pub struct CaptureSource {
    capture: VideoCapture,
    description: String,
}

impl CaptureSource {
    /// Open a camera by index
    pub fn camera(index: i32) -> Result<Self> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY)
            .with_context(|| format!("Failed to open camera {}", index))?;
        Self::from_capture(capture, format!("camera {}", index))
    }

    /// Open a video file
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let capture = VideoCapture::from_file(&path_str, videoio::CAP_ANY)
            .with_context(|| format!("Failed to open video: {}", path_str))?;
        Self::from_capture(capture, format!("video {}", path_str))
    }

    fn from_capture(capture: VideoCapture, description: String) -> Result<Self> {
        if !capture.is_opened()? {
            bail!("{} could not be opened", description);
        }
        log::info!("Opened {}", description);
        Ok(Self {
            capture,
            description,
        })
    }
}

impl FrameSource for CaptureSource {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .with_context(|| format!("Failed to read from {}", self.description))?;

        if !grabbed || frame.empty() {
            return Ok(None);
        }

        let rgb = ImageUtils::mat_to_rgb(&frame)?;
        Ok(Some(DynamicImage::ImageRgb8(rgb)))
    }

    fn name(&self) -> String {
        self.description.clone()
    }
}

impl Drop for CaptureSource {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            log::warn!("Failed to release {}: {}", self.description, e);
        }
    }
}
