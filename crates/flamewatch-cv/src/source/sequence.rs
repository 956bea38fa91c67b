//! Recorded frames replayed from a directory

use super::FrameSource;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::{bail, Context};
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Replays image files in file-name order
pub struct ImageSequenceSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    position: usize,
    looping: bool,
    skipped: usize,
}

impl ImageSequenceSource {
    const SUPPORTED_EXTENSIONS: [&'static str; 4] = ["png", "jpg", "jpeg", "bmp"];

    /// Scan a directory for frames
    pub fn open<P: AsRef<Path>>(dir: P, looping: bool) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let entries =
            fs::read_dir(&dir).with_context(|| format!("Failed to read directory: {:?}", dir))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(extension) = path.extension() {
                let ext = extension.to_string_lossy().to_lowercase();
                if Self::SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                    files.push(path);
                }
            }
        }

        if files.is_empty() {
            bail!("No frames found in {:?}", dir);
        }
        files.sort();

        log::info!("Found {} frames in {:?}", files.len(), dir);
        Ok(Self {
            dir,
            files,
            position: 0,
            looping,
            skipped: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files that failed to decode so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl FrameSource for ImageSequenceSource {
    /// Undecodable files are skipped; a full pass without a readable file is an error
    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        let mut unreadable = 0;
        loop {
            if self.position >= self.files.len() {
                if !self.looping {
                    return Ok(None);
                }
                log::debug!("Sequence {:?} rewound", self.dir);
                self.position = 0;
            }

            let path = &self.files[self.position];
            self.position += 1;
            match ImageUtils::load_rgb(path) {
                Ok(frame) => return Ok(Some(DynamicImage::ImageRgb8(frame))),
                Err(e) => {
                    log::warn!("Skipping unreadable frame {:?}: {:#}", path, e);
                    self.skipped += 1;
                    unreadable += 1;
                    if unreadable >= self.files.len() {
                        bail!("No readable frames in {:?}", self.dir);
                    }
                }
            }
        }
    }

    fn name(&self) -> String {
        format!("sequence {:?}", self.dir)
    }
}
