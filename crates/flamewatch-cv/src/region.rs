//! Connected region extraction from binary masks

use image::{GrayImage, Luma};
use imageproc::region_labelling::{self, connected_components};
use serde::{Deserialize, Serialize};

/// Pixel neighbourhood used when joining mask pixels into regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Edge neighbours only
    Four,
    /// Edge and corner neighbours
    #[default]
    Eight,
}

impl From<Connectivity> for region_labelling::Connectivity {
    fn from(value: Connectivity) -> Self {
        match value {
            Connectivity::Four => region_labelling::Connectivity::Four,
            Connectivity::Eight => region_labelling::Connectivity::Eight,
        }
    }
}

/// Summary of the regions found in one mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RegionStats {
    pub region_count: usize,
    pub largest_area: u32,
}

/// Reduces a mask to the area of its largest connected region
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionExtractor {
    connectivity: Connectivity,
}

impl RegionExtractor {
    pub fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Pixel areas of every region, indexed by label - 1
    ///
    /// Areas are those of the external outlines: background enclosed by a
    /// region counts towards it, along with anything nested inside.
    pub fn areas(&self, mask: &GrayImage) -> Vec<u32> {
        let filled = self.fill_holes(mask);
        let labels = connected_components(&filled, self.connectivity.into(), Luma([0u8]));

        let mut areas: Vec<u32> = Vec::new();
        for label in labels.pixels() {
            let label = label.0[0] as usize;
            if label == 0 {
                continue;
            }
            if areas.len() < label {
                areas.resize(label, 0);
            }
            areas[label - 1] += 1;
        }
        areas
    }

    /// Set every background pixel that cannot reach the image border
    fn fill_holes(&self, mask: &GrayImage) -> GrayImage {
        let (width, height) = mask.dimensions();
        if width == 0 || height == 0 {
            return mask.clone();
        }
        let background = GrayImage::from_fn(width, height, |x, y| {
            if mask.get_pixel(x, y).0[0] == 0 { Luma([255]) } else { Luma([0]) }
        });
        // background uses the dual neighbourhood so outlines stay closed
        let dual = match self.connectivity {
            Connectivity::Four => Connectivity::Eight,
            Connectivity::Eight => Connectivity::Four,
        };
        let labels = connected_components(&background, dual.into(), Luma([0u8]));

        let mut outside = vec![false];
        let mut mark = |label: u32| {
            let label = label as usize;
            if outside.len() <= label {
                outside.resize(label + 1, false);
            }
            outside[label] = true;
        };
        for x in 0..width {
            mark(labels.get_pixel(x, 0).0[0]);
            mark(labels.get_pixel(x, height - 1).0[0]);
        }
        for y in 0..height {
            mark(labels.get_pixel(0, y).0[0]);
            mark(labels.get_pixel(width - 1, y).0[0]);
        }

        GrayImage::from_fn(width, height, |x, y| {
            let label = labels.get_pixel(x, y).0[0] as usize;
            let enclosed = label != 0 && !outside.get(label).copied().unwrap_or(false);
            if mask.get_pixel(x, y).0[0] != 0 || enclosed {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    pub fn stats(&self, mask: &GrayImage) -> RegionStats {
        let areas = self.areas(mask);
        RegionStats {
            region_count: areas.iter().filter(|a| **a > 0).count(),
            largest_area: areas.into_iter().max().unwrap_or(0),
        }
    }

    /// Area of the largest region, 0 for an empty mask
    pub fn largest_area(&self, mask: &GrayImage) -> u32 {
        self.stats(mask).largest_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> GrayImage {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        GrayImage::from_fn(width, height, |x, y| {
            if rows[y as usize].as_bytes()[x as usize] == b'#' {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_empty_mask_has_zero_area() {
        let mask = GrayImage::new(32, 32);
        let extractor = RegionExtractor::default();
        assert_eq!(extractor.largest_area(&mask), 0);
        assert_eq!(extractor.stats(&mask).region_count, 0);
    }

    #[test]
    fn test_largest_region_wins() {
        let mask = mask_from(&[
            "##.....",
            "##..###",
            ".....##",
            "#....##",
        ]);
        let stats = RegionExtractor::default().stats(&mask);
        assert_eq!(stats.region_count, 3);
        assert_eq!(stats.largest_area, 7);
    }

    #[test]
    fn test_connectivity_changes_diagonal_joins() {
        let mask = mask_from(&[
            "#...",
            ".#..",
            "..#.",
            "...#",
        ]);
        assert_eq!(RegionExtractor::new(Connectivity::Eight).largest_area(&mask), 4);
        assert_eq!(RegionExtractor::new(Connectivity::Four).largest_area(&mask), 1);
    }

    #[test]
    fn test_holes_are_not_subtracted() {
        let mask = mask_from(&[
            "#####",
            "#...#",
            "#...#",
            "#####",
        ]);
        assert_eq!(RegionExtractor::default().largest_area(&mask), 20);
    }

    #[test]
    fn test_island_inside_hole_joins_outline() {
        let mask = mask_from(&[
            ".......",
            ".#####.",
            ".#...#.",
            ".#.#.#.",
            ".#...#.",
            ".#####.",
            ".......",
        ]);
        let stats = RegionExtractor::default().stats(&mask);
        assert_eq!(stats.region_count, 1);
        assert_eq!(stats.largest_area, 25);
    }

    #[test]
    fn test_open_outline_is_not_filled() {
        let mask = mask_from(&[
            "#####",
            "#....",
            "#####",
        ]);
        assert_eq!(RegionExtractor::default().largest_area(&mask), 11);
    }
}
