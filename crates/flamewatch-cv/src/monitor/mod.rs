//! Capture-to-actuation loop

pub mod driver;
pub mod sink;

pub use driver::LoopDriver;
pub use sink::{CycleReport, DebugSink, MaskDumper};

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cross-thread request to end the loop
///
/// Checked by the driver once per cycle.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Why a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Stop handle was triggered
    Stopped,
    /// Source reported end of stream
    EndOfStream,
    /// Configured frame limit reached
    FrameLimit,
    /// Source failed to deliver a frame
    SourceFailed(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Stopped => write!(f, "stop requested"),
            StopReason::EndOfStream => write!(f, "end of stream"),
            StopReason::FrameLimit => write!(f, "frame limit reached"),
            StopReason::SourceFailed(e) => write!(f, "source failed: {}", e),
        }
    }
}

/// Counters collected over one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Frames received from the source
    pub cycles: u64,
    pub frames_processed: u64,
    /// Malformed frames that were skipped
    pub frames_skipped: u64,
    pub detections: u64,
    /// Rising edges on the output pin
    pub triggers: u64,
    pub pin_failures: u64,
    pub deadline_misses: u64,
    pub worst_cycle: Duration,
    pub stop_reason: Option<StopReason>,
}

impl RunStats {
    pub fn log_summary(&self) {
        log::info!("Run finished: {}", self.stop_reason.as_ref().map_or_else(|| "unknown".to_string(), |r| r.to_string()));
        log::info!("  - Frames: {} processed, {} skipped", self.frames_processed, self.frames_skipped);
        log::info!("  - Detections: {} ({} triggers)", self.detections, self.triggers);
        log::info!("  - Pin failures: {}", self.pin_failures);
        log::info!(
            "  - Deadline misses: {} (worst cycle {}ms)",
            self.deadline_misses,
            self.worst_cycle.as_millis()
        );
    }
}
