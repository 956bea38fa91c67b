//! Digital output abstraction

pub mod memory;
pub mod sysfs;

#[cfg(feature = "embedded-hal")]
pub mod embedded;

pub use memory::{LogPin, MemoryPin};
pub use sysfs::SysfsPin;

#[cfg(feature = "embedded-hal")]
pub use embedded::EmbeddedPin;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Logical level of a digital output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    /// Level written to an active-low line
    pub fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "LOW"),
            Level::High => write!(f, "HIGH"),
        }
    }
}

/// Failure to drive a pin
#[derive(Debug, Error)]
pub enum PinError {
    #[error("gpio line {line}: {action} failed")]
    Io {
        line: u32,
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("pin '{pin}' rejected write: {reason}")]
    Rejected { pin: String, reason: String },
}

/// A boolean-settable hardware output
///
/// Writes are idempotent: setting the current level again is allowed and has
/// no observable effect on the line.
pub trait OutputPin {
    fn set_level(&mut self, level: Level) -> Result<(), PinError>;

    /// Human readable identifier used in logs
    fn name(&self) -> String;
}

impl<P: OutputPin + ?Sized> OutputPin for Box<P> {
    fn set_level(&mut self, level: Level) -> Result<(), PinError> {
        (**self).set_level(level)
    }

    fn name(&self) -> String {
        (**self).name()
    }
}
