//! Area threshold decision

/// Flags a frame when its largest region exceeds a pixel area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionPolicy {
    threshold: u32,
}

impl DetectionPolicy {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Strictly greater than: an area equal to the threshold is not a detection
    pub fn is_detected(&self, area: u32) -> bool {
        area > self.threshold
    }
}
