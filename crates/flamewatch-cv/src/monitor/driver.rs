//! Loop driver: source -> detector -> actuator, once per cycle

use super::sink::{CycleReport, DebugSink};
use super::{RunStats, StopHandle, StopReason};
use crate::detection::{FlameDetector, MonitorConfig};
use crate::segment::{FrameError, Segmenter};
use crate::source::FrameSource;
use flamewatch_core::{Actuator, ActuatorState, Clock, OutputPin, SystemClock};
use image::DynamicImage;
use std::time::{Duration, Instant};

/// Owns the source, the actuator and the pacing of the loop
///
/// The actuator is shut down (pin forced LOW) on every exit from [`run`],
/// and again on drop if `run` was never reached.
///
/// [`run`]: LoopDriver::run
pub struct LoopDriver<S, P, C = SystemClock>
where
    S: FrameSource,
    P: OutputPin,
    C: Clock,
{
    source: S,
    detector: FlameDetector,
    actuator: Actuator<P>,
    clock: C,
    cycle_budget: Duration,
    max_frames: Option<u64>,
    stop: StopHandle,
    sinks: Vec<Box<dyn DebugSink>>,
    geometry: Option<(u32, u32)>,
    stats: RunStats,
}

impl<S: FrameSource, P: OutputPin> LoopDriver<S, P, SystemClock> {
    /// Driver on the wall clock, configured from `config`
    pub fn from_config(config: &MonitorConfig, source: S, pin: P) -> Self {
        Self::with_clock(config, source, pin, SystemClock)
    }
}

impl<S: FrameSource, P: OutputPin, C: Clock> LoopDriver<S, P, C> {
    pub fn with_clock(config: &MonitorConfig, source: S, pin: P, clock: C) -> Self {
        Self {
            source,
            detector: FlameDetector::from_config(config),
            actuator: Actuator::new(pin, config.cooldown()),
            clock,
            cycle_budget: config.cycle_budget(),
            max_frames: config.max_frames,
            stop: StopHandle::new(),
            sinks: Vec::new(),
            geometry: None,
            stats: RunStats::default(),
        }
    }

    /// Override the minimum cycle duration derived from `max_fps`
    pub fn with_cycle_budget(mut self, budget: Duration) -> Self {
        self.cycle_budget = budget;
        self
    }

    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Use an externally created stop handle
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn DebugSink>) {
        self.sinks.push(sink);
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn actuator(&self) -> &Actuator<P> {
        &self.actuator
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn state(&self) -> ActuatorState {
        self.actuator.state()
    }

    /// Run until stopped, then release the pin
    pub fn run(mut self) -> RunStats {
        log::info!(
            "Monitoring {} -> {} (cycle budget {:?})",
            self.source.name(),
            self.actuator.pin().name(),
            self.cycle_budget
        );

        let reason = loop {
            if let Some(reason) = self.step() {
                break reason;
            }
        };

        self.actuator.shutdown();
        self.stats.pin_failures = self.actuator.pin_failures();
        self.stats.stop_reason = Some(reason);
        self.stats.log_summary();
        std::mem::take(&mut self.stats)
    }

    /// Execute one cycle, returning the reason to stop if the loop must end
    pub fn step(&mut self) -> Option<StopReason> {
        if self.stop.is_stopped() {
            return Some(StopReason::Stopped);
        }
        if self.max_frames.is_some_and(|max| self.stats.cycles >= max) {
            return Some(StopReason::FrameLimit);
        }

        let cycle_start = self.clock.now();
        match self.source.next_frame() {
            Ok(Some(frame)) => self.process(frame),
            Ok(None) => {
                log::info!("{} reached end of stream", self.source.name());
                return Some(StopReason::EndOfStream);
            }
            Err(e) => {
                log::error!("{} failed: {:#}", self.source.name(), e);
                return Some(StopReason::SourceFailed(format!("{:#}", e)));
            }
        }
        self.pace(cycle_start);
        None
    }

    fn process(&mut self, frame: DynamicImage) {
        self.stats.cycles += 1;
        let frame_index = self.stats.cycles;

        let rgb = match self.check_frame(&frame) {
            Ok(rgb) => rgb,
            Err(e) => {
                self.stats.frames_skipped += 1;
                log::warn!("Skipping frame {}: {}", frame_index, e);
                return;
            }
        };

        let analysis = self.detector.analyze_rgb(rgb);
        self.stats.frames_processed += 1;
        if analysis.detected {
            self.stats.detections += 1;
        }

        if let Some(transition) = self.actuator.update(analysis.detected, self.clock.now()) {
            if transition.is_rising_edge() {
                self.stats.triggers += 1;
            }
            log::debug!("Frame {}: {} -> {}", frame_index, transition.from, transition.to);
        }

        log::debug!(
            "Frame {}: area {} ({} regions), detected: {}, state: {}",
            frame_index,
            analysis.largest_area(),
            analysis.regions.region_count,
            analysis.detected,
            self.actuator.state()
        );

        let report = CycleReport {
            frame_index,
            frame: rgb,
            analysis: &analysis,
            state: self.actuator.state(),
        };
        for sink in &mut self.sinks {
            if let Err(e) = sink.observe(&report) {
                log::warn!("Debug sink failed on frame {}: {:#}", frame_index, e);
            }
        }
    }

    /// Validate layout and lock the stream geometry on the first good frame
    fn check_frame<'f>(&mut self, frame: &'f DynamicImage) -> Result<&'f image::RgbImage, FrameError> {
        let rgb = Segmenter::validate(frame)?;
        let actual = rgb.dimensions();
        match self.geometry {
            Some(expected) if expected != actual => {
                Err(FrameError::GeometryMismatch { expected, actual })
            }
            Some(_) => Ok(rgb),
            None => {
                log::info!("Stream geometry locked at {}x{}", actual.0, actual.1);
                self.geometry = Some(actual);
                Ok(rgb)
            }
        }
    }

    fn pace(&mut self, cycle_start: Instant) {
        let elapsed = self.clock.now().saturating_duration_since(cycle_start);
        if elapsed > self.stats.worst_cycle {
            self.stats.worst_cycle = elapsed;
        }
        if elapsed > self.cycle_budget {
            self.stats.deadline_misses += 1;
        } else {
            self.clock.sleep(self.cycle_budget - elapsed);
        }
    }
}
