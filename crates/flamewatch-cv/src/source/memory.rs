//! In-memory frame replay

use super::FrameSource;
use crate::Result;
use image::{DynamicImage, RgbImage};
use std::collections::VecDeque;

/// Hands out a fixed list of frames, then ends the stream
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    frames: VecDeque<DynamicImage>,
    delivered: u64,
}

impl MemorySource {
    pub fn new(frames: Vec<DynamicImage>) -> Self {
        Self {
            frames: frames.into(),
            delivered: 0,
        }
    }

    pub fn from_rgb(frames: Vec<RgbImage>) -> Self {
        Self::new(frames.into_iter().map(DynamicImage::ImageRgb8).collect())
    }

    pub fn push(&mut self, frame: DynamicImage) {
        self.frames.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        let frame = self.frames.pop_front();
        if frame.is_some() {
            self.delivered += 1;
        }
        Ok(frame)
    }

    fn name(&self) -> String {
        format!("memory ({} frames left)", self.frames.len())
    }
}
