//! Adapter for `embedded-hal` output pins

use super::{Level, OutputPin, PinError};
use embedded_hal::digital::Error as _;

/// Wraps any `embedded_hal::digital::OutputPin`
pub struct EmbeddedPin<P> {
    name: String,
    inner: P,
}

impl<P> EmbeddedPin<P> {
    pub fn new(name: impl Into<String>, inner: P) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: embedded_hal::digital::OutputPin> OutputPin for EmbeddedPin<P> {
    fn set_level(&mut self, level: Level) -> Result<(), PinError> {
        let result = match level {
            Level::High => self.inner.set_high(),
            Level::Low => self.inner.set_low(),
        };
        result.map_err(|e| PinError::Rejected {
            pin: self.name.clone(),
            reason: format!("{:?}", e.kind()),
        })
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
