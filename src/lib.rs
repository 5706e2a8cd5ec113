#![warn(clippy::all)]

//! A bridge module that lets a host application runtime hold the proximity-sensor wake lock.
//!
//! While the lock is held, the OS ties the screen to the proximity sensor: an object near the
//! sensor dims the screen and disables touch. Platforms that cannot hand out that kind of lock turn
//! the module into a no-op.

pub mod bridge;
pub mod main_thread;
pub mod platform;

mod controller;

#[cfg(target_os = "android")]
pub mod android;
#[cfg(not(target_os = "android"))]
pub mod unsupported;

pub use bridge::{BridgeValue, ModuleRegistry, NativeModule};
pub use controller::ProximityModule;
pub use main_thread::{Dispatcher, MainThread, Task};
pub use platform::{platform_power_manager, PowerManager, WakeLock};

/// Name used both to register the module with the host runtime and to tag the wake lock.
pub const MODULE_NAME: &str = "Proximity";

/// `PowerManager.PROXIMITY_SCREEN_OFF_WAKE_LOCK`. The level predates its public constant, so the
/// raw value is used.
pub const PROXIMITY_SCREEN_OFF_WAKE_LOCK: i32 = 32;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("proximity wake lock unavailable: {0}")]
  LockUnavailable(String),

  #[error("main thread dispatch failed: {0}")]
  Dispatch(String),

  #[error("no module registered as {0:?}")]
  UnknownModule(String),

  #[error("a module named {0:?} is already registered")]
  DuplicateModule(String),

  #[error("module {module:?} has no method {method:?}")]
  UnknownMethod { module: String, method: String },

  #[error("invalid arguments for {method}: {reason}")]
  InvalidArguments { method: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
