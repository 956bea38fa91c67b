//! HSV color model and band bounds
//!
//! Uses the 8-bit OpenCV convention: hue is stored as degrees / 2 in
//! `0..=179`, saturation and value span `0..=255`.

use serde::{Deserialize, Serialize};

/// Largest hue value in the 8-bit representation
pub const HUE_MAX: u8 = 179;

/// A pixel in hue/saturation/value space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Convert an 8-bit RGB sample
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let diff = (max - min) as i32;

        let v = max;
        let s = if max == 0 {
            0
        } else {
            ((diff as u32 * 255 + max as u32 / 2) / max as u32) as u8
        };

        if diff == 0 {
            return Self { h: 0, s, v };
        }

        let (r, g, b) = (r as i32, g as i32, b as i32);
        // sector offset in units of 60 degrees, scaled by diff
        let numerator = if max as i32 == r {
            g - b
        } else if max as i32 == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };

        // halves round up, negative ones included
        let mut h = (numerator as f32 * 30.0 / diff as f32 + 0.5).floor() as i32;
        if h < 0 {
            h += 180;
        }

        Self {
            h: h.min(HUE_MAX as i32) as u8,
            s,
            v,
        }
    }
}

impl From<[u8; 3]> for Hsv {
    fn from([h, s, v]: [u8; 3]) -> Self {
        Self { h, s, v }
    }
}

impl From<Hsv> for [u8; 3] {
    fn from(hsv: Hsv) -> Self {
        [hsv.h, hsv.s, hsv.v]
    }
}

/// Inclusive lower/upper HSV bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorBand {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl ColorBand {
    pub const fn new(lower: Hsv, upper: Hsv) -> Self {
        Self { lower, upper }
    }

    /// Yellow band approximating combustion light
    pub const fn flame() -> Self {
        Self {
            lower: Hsv::new(15, 50, 50),
            upper: Hsv::new(30, 255, 255),
        }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }

    pub fn contains_rgb(&self, r: u8, g: u8, b: u8) -> bool {
        self.contains(Hsv::from_rgb(r, g, b))
    }

    /// Describe the first problem with the bounds, if any
    pub fn problem(&self) -> Option<String> {
        if self.upper.h > HUE_MAX {
            return Some(format!("upper hue {} exceeds {}", self.upper.h, HUE_MAX));
        }
        let pairs = [
            ("hue", self.lower.h, self.upper.h),
            ("saturation", self.lower.s, self.upper.s),
            ("value", self.lower.v, self.upper.v),
        ];
        pairs
            .iter()
            .find(|(_, lo, hi)| lo > hi)
            .map(|(name, lo, hi)| format!("{} lower bound {} is above upper bound {}", name, lo, hi))
    }
}

impl Default for ColorBand {
    fn default() -> Self {
        Self::flame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colors() {
        assert_eq!(Hsv::from_rgb(255, 0, 0), Hsv::new(0, 255, 255));
        assert_eq!(Hsv::from_rgb(0, 255, 0), Hsv::new(60, 255, 255));
        assert_eq!(Hsv::from_rgb(0, 0, 255), Hsv::new(120, 255, 255));
        assert_eq!(Hsv::from_rgb(255, 255, 0), Hsv::new(30, 255, 255));
    }

    #[test]
    fn test_negative_half_hue_rounds_up_to_zero() {
        // numerator -1 over diff 60 is exactly -0.5
        assert_eq!(Hsv::from_rgb(100, 40, 41).h, 0);
        // and +0.5 still rounds up
        assert_eq!(Hsv::from_rgb(100, 41, 40).h, 1);
    }

    #[test]
    fn test_grays_have_no_hue_or_saturation() {
        assert_eq!(Hsv::from_rgb(0, 0, 0), Hsv::new(0, 0, 0));
        assert_eq!(Hsv::from_rgb(128, 128, 128), Hsv::new(0, 0, 128));
        assert_eq!(Hsv::from_rgb(255, 255, 255), Hsv::new(0, 0, 255));
    }

    #[test]
    fn test_magenta_wraps_hue() {
        // 300 degrees -> 150
        assert_eq!(Hsv::from_rgb(255, 0, 255).h, 150);
        // just below red on the wrap side
        assert_eq!(Hsv::from_rgb(255, 0, 20).h, 178);
    }

    #[test]
    fn test_orange_flame_is_in_band() {
        let band = ColorBand::flame();
        // orange-yellow, hue ~ 22
        assert!(band.contains_rgb(255, 180, 40));
        assert!(band.contains_rgb(255, 200, 0));
        assert!(!band.contains_rgb(255, 0, 0));
        assert!(!band.contains_rgb(0, 0, 255));
        // too dark
        assert!(!band.contains_rgb(40, 30, 5));
        // too washed out
        assert!(!band.contains_rgb(250, 245, 235));
    }

    #[test]
    fn test_band_bounds_are_inclusive() {
        let band = ColorBand::new(Hsv::new(30, 255, 255), Hsv::new(30, 255, 255));
        assert!(band.contains(Hsv::from_rgb(255, 255, 0)));
    }

    #[test]
    fn test_band_problem_detection() {
        assert!(ColorBand::flame().problem().is_none());

        let inverted = ColorBand::new(Hsv::new(30, 50, 50), Hsv::new(15, 255, 255));
        assert!(inverted.problem().unwrap().contains("hue"));

        let out_of_range = ColorBand::new(Hsv::new(0, 0, 0), Hsv::new(200, 255, 255));
        assert!(out_of_range.problem().is_some());
    }

    #[test]
    fn test_band_serializes_as_triples() -> anyhow::Result<()> {
        let json = serde_json::to_string(&ColorBand::flame())?;
        assert_eq!(json, r#"{"lower":[15,50,50],"upper":[30,255,255]}"#);

        let back: ColorBand = serde_json::from_str(&json)?;
        assert_eq!(back, ColorBand::flame());
        Ok(())
    }
}
