use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::{
  bridge::{BridgeValue, NativeModule},
  Dispatcher, Error, PowerManager, Result, WakeLock, MODULE_NAME, PROXIMITY_SCREEN_OFF_WAKE_LOCK,
};

type SharedWakeLock = Arc<Mutex<Box<dyn WakeLock>>>;

/// Enables and disables the proximity-sensor screen-off wake lock.
///
/// There should be a single instance for the lifetime of the application. Every change to the lock
/// happens on the [`Dispatcher`]'s thread, never on the caller's.
pub struct ProximityModule {
  // None when the platform refused the lock; every call is then a no-op
  wake_lock: Option<SharedWakeLock>,
  dispatcher: Arc<dyn Dispatcher>,
}

impl ProximityModule {
  /// Requests the wake lock from `power`. A refusal is logged and leaves the module disabled.
  pub fn new(power: &dyn PowerManager, dispatcher: Arc<dyn Dispatcher>) -> Self {
    let wake_lock = match power.new_wake_lock(PROXIMITY_SCREEN_OFF_WAKE_LOCK, MODULE_NAME) {
      Ok(wake_lock) => Some(Arc::new(Mutex::new(wake_lock))),
      Err(e) => {
        debug!("{e}, proximity module disabled");
        None
      }
    };

    Self {
      wake_lock,
      dispatcher,
    }
  }

  pub fn name(&self) -> &'static str {
    MODULE_NAME
  }

  pub fn is_available(&self) -> bool {
    self.wake_lock.is_some()
  }

  /// Acquires (`true`) or releases (`false`) the wake lock. Returns as soon as the change is
  /// queued.
  pub fn set_enabled(&self, enabled: bool) {
    let Some(wake_lock) = &self.wake_lock else {
      return;
    };

    let wake_lock = wake_lock.clone();
    self
      .dispatcher
      .dispatch(Box::new(move || apply(&wake_lock, enabled)));
  }
}

fn apply(wake_lock: &Mutex<Box<dyn WakeLock>>, enabled: bool) {
  let mut wake_lock = wake_lock.lock().unwrap_or_else(PoisonError::into_inner);
  if enabled {
    if !wake_lock.is_held() {
      trace!("acquiring proximity wake lock");
      wake_lock.acquire();
    }
  } else if wake_lock.is_held() {
    trace!("releasing proximity wake lock");
    wake_lock.release();
  }
}

impl NativeModule for ProximityModule {
  fn name(&self) -> &str {
    MODULE_NAME
  }

  fn invoke(&self, method: &str, args: &[BridgeValue]) -> Result<()> {
    match method {
      "setEnabled" => match args {
        [BridgeValue::Bool(enabled)] => {
          self.set_enabled(*enabled);
          Ok(())
        }
        [other] => Err(Error::InvalidArguments {
          method: method.to_owned(),
          reason: format!("expected a boolean, got {}", other.type_name()),
        }),
        _ => Err(Error::InvalidArguments {
          method: method.to_owned(),
          reason: format!("expected 1 argument, got {}", args.len()),
        }),
      },
      _ => Err(Error::UnknownMethod {
        module: MODULE_NAME.to_owned(),
        method: method.to_owned(),
      }),
    }
  }
}

impl Drop for ProximityModule {
  fn drop(&mut self) {
    // don't leave the screen tied to the sensor once nobody can turn it off
    if let Some(wake_lock) = self.wake_lock.take() {
      self
        .dispatcher
        .dispatch(Box::new(move || apply(&wake_lock, false)));
    }
  }
}
