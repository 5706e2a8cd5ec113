//! Power service for targets without a proximity wake lock. Every request is refused, which leaves
//! [`crate::ProximityModule`] in its no-op mode.

use tracing::debug;

use crate::{Error, PowerManager, Result, WakeLock};

pub struct UnsupportedPowerManager;

impl PowerManager for UnsupportedPowerManager {
  fn new_wake_lock(&self, level: i32, tag: &str) -> Result<Box<dyn WakeLock>> {
    debug!(level, tag, "wake lock requested on unsupported platform");
    Err(Error::LockUnavailable(format!(
      "wake lock level {level} is not supported on {}",
      std::env::consts::OS
    )))
  }
}
