//! Linux sysfs GPIO output

use super::{Level, OutputPin, PinError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

// udev fixes up permissions on a freshly exported line asynchronously
const PERMISSION_RETRIES: u32 = 20;
const PERMISSION_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Output line driven through `/sys/class/gpio`
///
/// The line is exported on open if needed and unexported on drop when this
/// handle exported it.
#[derive(Debug)]
pub struct SysfsPin {
    line: u32,
    root: PathBuf,
    active_low: bool,
    exported_by_us: bool,
}

impl SysfsPin {
    /// Open a BCM line under the standard sysfs root
    pub fn open(line: u32, active_low: bool) -> Result<Self, PinError> {
        Self::open_at(SYSFS_GPIO_ROOT, line, active_low)
    }

    /// Open a line under an arbitrary sysfs-like root
    pub fn open_at<P: AsRef<Path>>(root: P, line: u32, active_low: bool) -> Result<Self, PinError> {
        let root = root.as_ref().to_path_buf();
        let line_dir = root.join(format!("gpio{}", line));

        let mut exported_by_us = false;
        if !line_dir.exists() {
            fs::write(root.join("export"), line.to_string()).map_err(|source| PinError::Io {
                line,
                action: "export",
                source,
            })?;
            exported_by_us = true;
        }

        let direction = line_dir.join("direction");
        retry_permission_denied(PERMISSION_RETRIES, PERMISSION_RETRY_DELAY, || {
            fs::write(&direction, "out")
        })
        .map_err(|source| PinError::Io {
            line,
            action: "set direction",
            source,
        })?;

        log::debug!("Opened gpio{} (active_low: {})", line, active_low);

        Ok(Self {
            line,
            root,
            active_low,
            exported_by_us,
        })
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    fn value_path(&self) -> PathBuf {
        self.root.join(format!("gpio{}", self.line)).join("value")
    }
}

/// Run `op` until it stops failing with `PermissionDenied` or attempts run out
fn retry_permission_denied<F>(attempts: u32, delay: Duration, mut op: F) -> io::Result<()>
where
    F: FnMut() -> io::Result<()>,
{
    let mut attempt = 1;
    loop {
        match op() {
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied && attempt < attempts => {
                log::debug!("Permission denied (attempt {}), retrying", attempt);
                attempt += 1;
                thread::sleep(delay);
            }
            result => return result,
        }
    }
}

impl OutputPin for SysfsPin {
    fn set_level(&mut self, level: Level) -> Result<(), PinError> {
        let physical = if self.active_low { level.inverted() } else { level };
        let value = if physical.is_high() { "1" } else { "0" };

        fs::write(self.value_path(), value).map_err(|source| PinError::Io {
            line: self.line,
            action: "write value",
            source,
        })
    }

    fn name(&self) -> String {
        format!("gpio{}", self.line)
    }
}

impl Drop for SysfsPin {
    fn drop(&mut self) {
        if self.exported_by_us {
            if let Err(e) = fs::write(self.root.join("unexport"), self.line.to_string()) {
                log::warn!("Failed to unexport gpio{}: {}", self.line, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    fn fake_sysfs(line: u32) -> Result<tempfile::TempDir> {
        let root = tempfile::tempdir()?;
        let line_dir = root.path().join(format!("gpio{}", line));
        fs::create_dir_all(&line_dir)?;
        fs::write(line_dir.join("direction"), "in")?;
        fs::write(line_dir.join("value"), "0")?;
        Ok(root)
    }

    #[test]
    fn test_open_sets_direction() -> Result<()> {
        let root = fake_sysfs(17)?;
        let pin = SysfsPin::open_at(root.path(), 17, false)?;

        let direction = fs::read_to_string(root.path().join("gpio17/direction"))?;
        assert_eq!(direction, "out");
        assert_eq!(pin.name(), "gpio17");
        assert!(!pin.exported_by_us);
        Ok(())
    }

    #[test]
    fn test_write_levels() -> Result<()> {
        let root = fake_sysfs(17)?;
        let mut pin = SysfsPin::open_at(root.path(), 17, false)?;

        pin.set_level(Level::High)?;
        assert_eq!(fs::read_to_string(root.path().join("gpio17/value"))?, "1");
        pin.set_level(Level::Low)?;
        assert_eq!(fs::read_to_string(root.path().join("gpio17/value"))?, "0");
        Ok(())
    }

    #[test]
    fn test_active_low_inverts() -> Result<()> {
        let root = fake_sysfs(4)?;
        let mut pin = SysfsPin::open_at(root.path(), 4, true)?;

        pin.set_level(Level::High)?;
        assert_eq!(fs::read_to_string(root.path().join("gpio4/value"))?, "0");
        Ok(())
    }

    #[test]
    fn test_permission_denied_is_retried() {
        let mut calls = 0;
        let result = retry_permission_denied(5, Duration::ZERO, || {
            calls += 1;
            if calls < 3 {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            } else {
                Ok(())
            }
        });
        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retries_give_up() {
        let mut calls = 0;
        let result = retry_permission_denied(4, Duration::ZERO, || {
            calls += 1;
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        });
        assert_eq!(result.map_err(|e| e.kind()), Err(io::ErrorKind::PermissionDenied));
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let mut calls = 0;
        let result = retry_permission_denied(4, Duration::ZERO, || {
            calls += 1;
            Err(io::Error::from(io::ErrorKind::NotFound))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let result = SysfsPin::open_at("/nonexistent/gpio/root", 17, false);
        assert!(matches!(result, Err(PinError::Io { action: "export", .. })));
    }
}
