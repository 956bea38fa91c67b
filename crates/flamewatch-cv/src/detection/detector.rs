//! Per-frame flame detector

use super::config::MonitorConfig;
use super::policy::DetectionPolicy;
use crate::region::{Connectivity, RegionExtractor, RegionStats};
use crate::segment::{ColorBand, FrameError, Segmenter};
use image::{DynamicImage, GrayImage, RgbImage};
use std::time::{Duration, Instant};

/// Outcome of running one frame through segmentation and the policy
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub mask: GrayImage,
    pub regions: RegionStats,
    pub detected: bool,
    pub processing_time: Duration,
}

impl FrameAnalysis {
    pub fn largest_area(&self) -> u32 {
        self.regions.largest_area
    }
}

/// Segmenter, region extractor and policy chained together
#[derive(Debug, Clone)]
pub struct FlameDetector {
    segmenter: Segmenter,
    extractor: RegionExtractor,
    policy: DetectionPolicy,
}

impl FlameDetector {
    pub fn new(band: ColorBand, connectivity: Connectivity, area_threshold: u32) -> Self {
        Self {
            segmenter: Segmenter::new(band),
            extractor: RegionExtractor::new(connectivity),
            policy: DetectionPolicy::new(area_threshold),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.band, config.connectivity, config.area_threshold)
    }

    pub fn policy(&self) -> &DetectionPolicy {
        &self.policy
    }

    /// Analyze a frame as delivered by a source
    pub fn analyze(&self, frame: &DynamicImage) -> Result<FrameAnalysis, FrameError> {
        Segmenter::validate(frame).map(|rgb| self.analyze_rgb(rgb))
    }

    /// Analyze an 8-bit RGB frame
    pub fn analyze_rgb(&self, frame: &RgbImage) -> FrameAnalysis {
        let start_time = Instant::now();

        let mask = self.segmenter.segment(frame);
        let regions = self.extractor.stats(&mask);
        let detected = self.policy.is_detected(regions.largest_area);

        FrameAnalysis {
            mask,
            regions,
            detected,
            processing_time: start_time.elapsed(),
        }
    }
}

impl Default for FlameDetector {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ImageUtils;
    use image::Rgb;
    use proptest::prelude::*;

    const BACKGROUND: Rgb<u8> = Rgb([30, 60, 140]);
    const FLAME: Rgb<u8> = Rgb([255, 190, 30]);

    #[test]
    fn test_no_flame_pixels_means_no_detection() {
        let frame = RgbImage::from_pixel(80, 60, BACKGROUND);
        let analysis = FlameDetector::default().analyze_rgb(&frame);
        assert_eq!(analysis.largest_area(), 0);
        assert!(!analysis.detected);
    }

    #[test]
    fn test_blob_above_threshold_is_detected() {
        let frame = ImageUtils::frame_with_blob(80, 60, BACKGROUND, FLAME, (10, 10), 15, 10);
        let analysis = FlameDetector::default().analyze_rgb(&frame);
        assert_eq!(analysis.largest_area(), 150);
        assert!(analysis.detected);
    }

    #[test]
    fn test_blob_at_threshold_is_not_detected() {
        let frame = ImageUtils::frame_with_blob(80, 60, BACKGROUND, FLAME, (10, 10), 10, 10);
        let analysis = FlameDetector::default().analyze_rgb(&frame);
        assert_eq!(analysis.largest_area(), 100);
        assert!(!analysis.detected);
    }

    #[test]
    fn test_scattered_pixels_do_not_add_up() {
        // 200 flame pixels on a checkerboard spacing, none adjacent
        let mut frame = RgbImage::from_pixel(40, 40, BACKGROUND);
        for y in (0..40).step_by(2) {
            for x in (0..40).step_by(4) {
                frame.put_pixel(x, y, FLAME);
            }
        }
        let analysis = FlameDetector::default().analyze_rgb(&frame);
        assert_eq!(analysis.regions.region_count, 200);
        assert_eq!(analysis.largest_area(), 1);
        assert!(!analysis.detected);
    }

    #[test]
    fn test_malformed_frame_is_reported() {
        let frame = DynamicImage::ImageLuma8(GrayImage::new(8, 8));
        assert!(FlameDetector::default().analyze(&frame).is_err());
    }

    proptest! {
        #[test]
        fn frames_without_band_pixels_are_never_detected(
            pixels in prop::collection::vec(any::<[u8; 3]>(), 24 * 16),
        ) {
            let band = ColorBand::flame();
            let frame = RgbImage::from_fn(24, 16, |x, y| {
                let [r, g, b] = pixels[(y * 24 + x) as usize];
                if band.contains_rgb(r, g, b) { BACKGROUND } else { Rgb([r, g, b]) }
            });

            let analysis = FlameDetector::default().analyze_rgb(&frame);
            prop_assert_eq!(analysis.largest_area(), 0);
            prop_assert!(!analysis.detected);
        }
    }
}
