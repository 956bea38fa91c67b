//! Pins without hardware behind them

use super::{Level, OutputPin, PinError};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct PinRecord {
    writes: Vec<Level>,
    failed_writes: usize,
    failing: bool,
}

/// Pin that records every successful write
///
/// Clones share the same record, so a test can keep a handle while the
/// actuator owns the pin.
#[derive(Debug, Clone)]
pub struct MemoryPin {
    name: String,
    record: Rc<RefCell<PinRecord>>,
}

impl MemoryPin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record: Rc::new(RefCell::new(PinRecord::default())),
        }
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.record.borrow_mut().failing = failing;
    }

    /// Successful writes in order
    pub fn writes(&self) -> Vec<Level> {
        self.record.borrow().writes.clone()
    }

    /// Number of writes that were rejected while failing
    pub fn failed_writes(&self) -> usize {
        self.record.borrow().failed_writes
    }

    /// Level of the last successful write, `None` if never written
    pub fn level(&self) -> Option<Level> {
        self.record.borrow().writes.last().copied()
    }

    /// LOW to HIGH transitions seen on the line
    pub fn rising_edges(&self) -> usize {
        let record = self.record.borrow();
        let mut previous = Level::Low;
        let mut edges = 0;
        for &level in &record.writes {
            if previous == Level::Low && level == Level::High {
                edges += 1;
            }
            previous = level;
        }
        edges
    }
}

impl OutputPin for MemoryPin {
    fn set_level(&mut self, level: Level) -> Result<(), PinError> {
        let mut record = self.record.borrow_mut();
        if record.failing {
            record.failed_writes += 1;
            return Err(PinError::Rejected {
                pin: self.name.clone(),
                reason: "simulated failure".to_string(),
            });
        }
        record.writes.push(level);
        Ok(())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Pin that only logs level changes, for dry runs
#[derive(Debug, Clone)]
pub struct LogPin {
    name: String,
    current: Option<Level>,
}

impl LogPin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current: None,
        }
    }
}

impl OutputPin for LogPin {
    fn set_level(&mut self, level: Level) -> Result<(), PinError> {
        if self.current != Some(level) {
            log::info!("[{}] -> {}", self.name, level);
            self.current = Some(level);
        }
        Ok(())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_pin_shares_record() {
        let probe = MemoryPin::new("test");
        let mut pin = probe.clone();
        pin.set_level(Level::Low).unwrap();
        pin.set_level(Level::High).unwrap();
        pin.set_level(Level::High).unwrap();
        pin.set_level(Level::Low).unwrap();

        assert_eq!(probe.writes().len(), 4);
        assert_eq!(probe.level(), Some(Level::Low));
        assert_eq!(probe.rising_edges(), 1);
    }

    #[test]
    fn test_memory_pin_failure_injection() {
        let mut pin = MemoryPin::new("flaky");
        pin.set_failing(true);
        assert!(pin.set_level(Level::High).is_err());
        assert_eq!(pin.failed_writes(), 1);
        assert_eq!(pin.level(), None);

        pin.set_failing(false);
        pin.set_level(Level::High).unwrap();
        assert_eq!(pin.level(), Some(Level::High));
    }

    #[test]
    fn test_log_pin_accepts_writes() {
        let mut pin = LogPin::new("dry-run");
        assert!(pin.set_level(Level::High).is_ok());
        assert!(pin.set_level(Level::High).is_ok());
        assert_eq!(pin.current, Some(Level::High));
    }
}
