//! Color segmentation module

pub mod hsv;
pub mod segmenter;

pub use hsv::{ColorBand, Hsv};
pub use segmenter::Segmenter;

use thiserror::Error;

/// Reasons a frame cannot be segmented
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("unsupported pixel layout {0:?}, expected 8-bit RGB")]
    UnsupportedLayout(image::ColorType),
    #[error("frame has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("frame is {actual:?}, stream geometry is {expected:?}")]
    GeometryMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}
