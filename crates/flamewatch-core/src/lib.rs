//! Flamewatch core primitives
//!
//! Hardware-facing building blocks of the detection loop: digital output pins,
//! the monotonic clock abstraction and the trigger/cooldown state machine.
//! Nothing here knows about images.

pub mod actuator;
pub mod clock;
pub mod pin;

pub use actuator::{Actuator, ActuatorState, Transition};
pub use clock::{Clock, ManualClock, SystemClock};
pub use pin::{Level, LogPin, MemoryPin, OutputPin, PinError, SysfsPin};

#[cfg(feature = "embedded-hal")]
pub use pin::EmbeddedPin;

// Error handling
pub type Result<T> = anyhow::Result<T>;
