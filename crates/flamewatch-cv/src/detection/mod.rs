//! High-level detection module

pub mod config;
pub mod detector;
pub mod policy;

pub use config::{ConfigError, MonitorConfig, PinConfig, VisualizationConfig};
pub use detector::{FlameDetector, FrameAnalysis};
pub use policy::DetectionPolicy;
