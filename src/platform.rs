use crate::Result;

/// A wake lock handed out by the platform's power service.
///
/// Implementations are only ever driven from the dispatch thread, but they must be `Send` to get
/// there.
pub trait WakeLock: Send {
  fn is_held(&self) -> bool;
  fn acquire(&mut self);
  fn release(&mut self);
}

/// The platform's power-management service.
pub trait PowerManager {
  /// Ask the platform for a wake lock of the given level, tagged with `tag` for diagnostics.
  ///
  /// Returns [`crate::Error::LockUnavailable`] when the platform can't provide the lock on this
  /// device.
  fn new_wake_lock(&self, level: i32, tag: &str) -> Result<Box<dyn WakeLock>>;
}

/// The power service for the build target.
pub fn platform_power_manager() -> Box<dyn PowerManager> {
  #[cfg(target_os = "android")]
  {
    Box::new(crate::android::AndroidPowerManager::new())
  }
  #[cfg(not(target_os = "android"))]
  {
    Box::new(crate::unsupported::UnsupportedPowerManager)
  }
}
