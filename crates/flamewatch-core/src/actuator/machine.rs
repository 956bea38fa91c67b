//! Actuator owning the output pin

use super::{ActuatorState, Transition};
use crate::pin::{Level, OutputPin};
use std::time::{Duration, Instant};

/// One-shot trigger with a wall-clock cooldown
///
/// The pin is written only when the state's level changes, on construction
/// (armed LOW) and on shutdown (forced LOW). A failed write is logged and the
/// state machine advances as if it had succeeded.
pub struct Actuator<P: OutputPin> {
    pin: P,
    state: ActuatorState,
    cooldown: Duration,
    triggered_at: Option<Instant>,
    released: bool,
    triggers: u64,
    pin_failures: u64,
}

impl<P: OutputPin> Actuator<P> {
    /// Take ownership of the pin and arm it LOW
    pub fn new(pin: P, cooldown: Duration) -> Self {
        let mut actuator = Self {
            pin,
            state: ActuatorState::Idle,
            cooldown,
            triggered_at: None,
            released: false,
            triggers: 0,
            pin_failures: 0,
        };
        actuator.drive(Level::Low);
        log::debug!(
            "Actuator armed on {} (cooldown: {:?})",
            actuator.pin.name(),
            cooldown
        );
        actuator
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Level the pin is expected to be at
    pub fn level(&self) -> Level {
        if self.released {
            Level::Low
        } else {
            self.state.level()
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Number of rising edges produced so far
    pub fn triggers(&self) -> u64 {
        self.triggers
    }

    /// Number of pin writes that failed
    pub fn pin_failures(&self) -> u64 {
        self.pin_failures
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Feed one cycle's detection signal
    pub fn update(&mut self, detected: bool, now: Instant) -> Option<Transition> {
        if self.released {
            log::debug!("Actuator already released, ignoring update");
            return None;
        }

        let from = self.state;
        let to = match from {
            ActuatorState::Idle if detected => {
                self.triggered_at = Some(now);
                ActuatorState::Triggered
            }
            ActuatorState::Idle => ActuatorState::Idle,
            // one-shot pulse; cooldown may already be over when D < cycle period
            ActuatorState::Triggered | ActuatorState::Cooldown => {
                if self.cooldown_elapsed(now) {
                    ActuatorState::Idle
                } else {
                    ActuatorState::Cooldown
                }
            }
        };

        if from == to {
            return None;
        }

        self.enter(to);
        let transition = Transition { from, to, at: now };
        if transition.is_rising_edge() {
            self.triggers += 1;
            log::info!("Flame detected, {} -> HIGH", self.pin.name());
        } else if transition.is_falling_edge() {
            log::info!("Cooldown elapsed, {} -> LOW", self.pin.name());
        }
        Some(transition)
    }

    /// Force the pin LOW and stop reacting to updates
    ///
    /// Only the first call writes the pin.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.state = ActuatorState::Idle;
        self.triggered_at = None;
        self.drive(Level::Low);
        log::debug!("Actuator released, {} forced LOW", self.pin.name());
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        match self.triggered_at {
            Some(at) => now.saturating_duration_since(at) >= self.cooldown,
            None => true,
        }
    }

    fn enter(&mut self, state: ActuatorState) {
        let previous = self.state.level();
        self.state = state;
        if state == ActuatorState::Idle {
            self.triggered_at = None;
        }
        if state.level() != previous {
            self.drive(state.level());
        }
    }

    fn drive(&mut self, level: Level) {
        if let Err(e) = self.pin.set_level(level) {
            self.pin_failures += 1;
            log::warn!("Failed to set {} {}: {}", self.pin.name(), level, e);
        }
    }
}

impl<P: OutputPin> Drop for Actuator<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
