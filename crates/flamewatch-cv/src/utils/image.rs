//! Image loading, saving and debug rendering helpers

use crate::Result;
use anyhow::Context;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use std::path::Path;

#[cfg(feature = "opencv")]
use opencv::core::Mat;
#[cfg(feature = "opencv")]
use opencv_match::prelude::*;

/// Highlight color for mask pixels in overlays
const OVERLAY_COLOR: Rgb<u8> = Rgb([255, 0, 255]);

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Load an image file without converting its pixel layout
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        image::open(&path).with_context(|| format!("Failed to open image: {:?}", path.as_ref()))
    }

    /// Load an image file as 8-bit RGB
    pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
        Ok(Self::load(path)?.to_rgb8())
    }

    /// Save an RGB image, format chosen by extension
    pub fn save_rgb<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
        image
            .save(&path)
            .with_context(|| format!("Failed to save image: {:?}", path.as_ref()))
    }

    /// Save a mask as a grayscale image
    pub fn save_mask<P: AsRef<Path>>(mask: &GrayImage, path: P) -> Result<()> {
        mask.save(&path)
            .with_context(|| format!("Failed to save mask: {:?}", path.as_ref()))
    }

    /// Paint mask pixels over a copy of the frame
    pub fn overlay_mask(frame: &RgbImage, mask: &GrayImage) -> RgbImage {
        let mut output = frame.clone();
        for (x, y, pixel) in output.enumerate_pixels_mut() {
            if mask.get_pixel_checked(x, y).is_some_and(|m| m.0[0] != 0) {
                *pixel = OVERLAY_COLOR;
            }
        }
        output
    }

    /// Solid frame with one filled rectangle of `blob` color
    pub fn frame_with_blob(
        width: u32,
        height: u32,
        background: Rgb<u8>,
        blob: Rgb<u8>,
        origin: (u32, u32),
        blob_width: u32,
        blob_height: u32,
    ) -> RgbImage {
        let (ox, oy) = origin;
        RgbImage::from_fn(width, height, |x, y| {
            let inside = x >= ox && x < ox + blob_width && y >= oy && y < oy + blob_height;
            if inside { blob } else { background }
        })
    }

    /// Convert a BGR OpenCV Mat to image::RgbImage using opencv-match
    #[cfg(feature = "opencv")]
    pub fn mat_to_rgb(mat: &Mat) -> Result<RgbImage> {
        mat.try_into_cv()
            .context("Failed to convert OpenCV Mat to RGB image")
    }
}
