//! Frame to binary mask

use super::{ColorBand, FrameError, Hsv};
use image::{DynamicImage, GrayImage, RgbImage};

/// Mask value for pixels inside the band
pub const MASK_ON: u8 = 255;

/// Marks pixels whose HSV color lies inside a band
#[derive(Debug, Clone)]
pub struct Segmenter {
    band: ColorBand,
}

impl Segmenter {
    pub fn new(band: ColorBand) -> Self {
        Self { band }
    }

    pub fn band(&self) -> &ColorBand {
        &self.band
    }

    /// Check that a frame is 8-bit RGB with at least one pixel
    pub fn validate(frame: &DynamicImage) -> Result<&RgbImage, FrameError> {
        let rgb = frame
            .as_rgb8()
            .ok_or_else(|| FrameError::UnsupportedLayout(frame.color()))?;
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        Ok(rgb)
    }

    /// Validate and segment a frame as delivered by a source
    pub fn segment_frame(&self, frame: &DynamicImage) -> Result<GrayImage, FrameError> {
        Self::validate(frame).map(|rgb| self.segment(rgb))
    }

    /// Produce a 0/255 mask with the frame's dimensions
    pub fn segment(&self, frame: &RgbImage) -> GrayImage {
        let (width, height) = frame.dimensions();
        let mut mask = GrayImage::new(width, height);
        if width == 0 || height == 0 {
            return mask;
        }

        let src_stride = width as usize * 3;
        let dst_stride = width as usize;
        let src: &[u8] = frame.as_raw();
        let dst: &mut [u8] = &mut mask;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            dst.par_chunks_mut(dst_stride)
                .zip(src.par_chunks(src_stride))
                .for_each(|(out, row)| self.segment_row(row, out));
        }

        #[cfg(not(feature = "parallel"))]
        {
            dst.chunks_mut(dst_stride)
                .zip(src.chunks(src_stride))
                .for_each(|(out, row)| self.segment_row(row, out));
        }

        mask
    }

    fn segment_row(&self, row: &[u8], out: &mut [u8]) {
        for (px, m) in row.chunks_exact(3).zip(out.iter_mut()) {
            if self.band.contains(Hsv::from_rgb(px[0], px[1], px[2])) {
                *m = MASK_ON;
            }
        }
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(ColorBand::default())
    }
}
