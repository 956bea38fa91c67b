//! Flamewatch Computer Vision Library
//!
//! Color segmentation, region extraction and the capture-to-actuation loop
//! built on top of `flamewatch-core`.

pub mod detection;
pub mod monitor;
pub mod region;
pub mod segment;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use detection::{DetectionPolicy, FlameDetector, FrameAnalysis, MonitorConfig};
pub use monitor::{DebugSink, LoopDriver, MaskDumper, RunStats, StopHandle, StopReason};
pub use region::{Connectivity, RegionExtractor};
pub use segment::{ColorBand, FrameError, Hsv, Segmenter};
pub use source::{FrameSource, ImageSequenceSource, MemorySource};

#[cfg(feature = "opencv")]
pub use source::CaptureSource;

// Error handling
pub type Result<T> = anyhow::Result<T>;
