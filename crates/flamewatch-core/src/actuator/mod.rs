//! Trigger/cooldown state machine driving the output pin

pub mod machine;

pub use machine::Actuator;

use crate::pin::Level;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// State of the actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActuatorState {
    /// Armed, pin LOW
    Idle,
    /// Fired on this cycle, pin HIGH
    Triggered,
    /// Holding the pin HIGH until the cooldown elapses
    Cooldown,
}

impl ActuatorState {
    /// The pin level every state maps to
    pub fn level(self) -> Level {
        match self {
            ActuatorState::Idle => Level::Low,
            ActuatorState::Triggered | ActuatorState::Cooldown => Level::High,
        }
    }
}

impl fmt::Display for ActuatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActuatorState::Idle => "IDLE",
            ActuatorState::Triggered => "TRIGGERED",
            ActuatorState::Cooldown => "COOLDOWN",
        };
        f.write_str(name)
    }
}

/// A state change produced by one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ActuatorState,
    pub to: ActuatorState,
    pub at: Instant,
}

impl Transition {
    /// True when this transition raised the pin
    pub fn is_rising_edge(&self) -> bool {
        !self.from.level().is_high() && self.to.level().is_high()
    }

    /// True when this transition lowered the pin
    pub fn is_falling_edge(&self) -> bool {
        self.from.level().is_high() && !self.to.level().is_high()
    }
}
