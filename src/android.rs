//! `android.os.PowerManager` through JNI.
//!
//! The `JavaVM` and application `Context` come from `ndk-context`, which the NDK glue (or the host
//! activity) initializes before any native code runs.

use jni::{
  objects::{GlobalRef, JObject, JValue},
  JNIEnv, JavaVM,
};
use tracing::{trace, warn};

use crate::{Error, PowerManager, Result, WakeLock};

const NEW_WAKE_LOCK_SIG: &str = "(ILjava/lang/String;)Landroid/os/PowerManager$WakeLock;";

fn unavailable(context: &str, e: impl std::fmt::Display) -> Error {
  Error::LockUnavailable(format!("{context}: {e}"))
}

fn java_vm() -> Result<JavaVM> {
  let ctx = ndk_context::android_context();
  // SAFETY: the pointer is the process-wide JavaVM registered by the NDK glue and outlives us
  unsafe { JavaVM::from_raw(ctx.vm().cast()) }.map_err(|e| unavailable("JavaVM", e))
}

// Leaves the env usable after a Java exception escaped a call.
fn clear_exception(env: &mut JNIEnv) {
  if env.exception_check().unwrap_or(false) {
    if let Err(e) = env.exception_clear() {
      warn!("failed to clear pending java exception: {e}");
    }
  }
}

pub struct AndroidPowerManager;

impl AndroidPowerManager {
  pub fn new() -> Self {
    Self
  }
}

impl Default for AndroidPowerManager {
  fn default() -> Self {
    Self::new()
  }
}

impl PowerManager for AndroidPowerManager {
  fn new_wake_lock(&self, level: i32, tag: &str) -> Result<Box<dyn WakeLock>> {
    let vm = java_vm()?;

    let context = ndk_context::android_context().context();
    if context.is_null() {
      return Err(Error::LockUnavailable("android context is not initialized".into()));
    }
    // SAFETY: ndk-context hands out a global reference to the application context
    let context = unsafe { JObject::from_raw(context.cast()) };

    let lock = {
      let mut env = vm
        .attach_current_thread_permanently()
        .map_err(|e| unavailable("attach thread", e))?;
      match request_wake_lock(&mut env, &context, level, tag) {
        Ok(lock) => lock,
        Err(e) => {
          clear_exception(&mut env);
          return Err(unavailable("PowerManager.newWakeLock", e));
        }
      }
    };

    trace!(level, tag, "android wake lock created");
    Ok(Box::new(AndroidWakeLock { vm, lock }))
  }
}

fn request_wake_lock(
  env: &mut JNIEnv,
  context: &JObject,
  level: i32,
  tag: &str,
) -> jni::errors::Result<GlobalRef> {
  let service = env.new_string("power")?;
  let power = env
    .call_method(
      context,
      "getSystemService",
      "(Ljava/lang/String;)Ljava/lang/Object;",
      &[JValue::Object(&service)],
    )?
    .l()?;
  if power.is_null() {
    return Err(jni::errors::Error::NullPtr("getSystemService(\"power\")"));
  }

  let tag = env.new_string(tag)?;
  let lock = env
    .call_method(
      &power,
      "newWakeLock",
      NEW_WAKE_LOCK_SIG,
      &[JValue::Int(level), JValue::Object(&tag)],
    )?
    .l()?;
  if lock.is_null() {
    return Err(jni::errors::Error::NullPtr("newWakeLock"));
  }

  env.new_global_ref(lock)
}

/// A `PowerManager.WakeLock` pinned with a global reference.
pub struct AndroidWakeLock {
  vm: JavaVM,
  lock: GlobalRef,
}

impl AndroidWakeLock {
  fn call(&self, method: &str, sig: &str) -> jni::errors::Result<jni::objects::JValueOwned<'_>> {
    let mut env = self.vm.attach_current_thread_permanently()?;
    let result = env.call_method(&self.lock, method, sig, &[]);
    if result.is_err() {
      clear_exception(&mut env);
    }
    result
  }
}

impl WakeLock for AndroidWakeLock {
  fn is_held(&self) -> bool {
    match self.call("isHeld", "()Z").and_then(|held| held.z()) {
      Ok(held) => held,
      Err(e) => {
        warn!("WakeLock.isHeld failed: {e}");
        false
      }
    }
  }

  fn acquire(&mut self) {
    if let Err(e) = self.call("acquire", "()V") {
      warn!("WakeLock.acquire failed: {e}");
    }
  }

  fn release(&mut self) {
    if let Err(e) = self.call("release", "()V") {
      warn!("WakeLock.release failed: {e}");
    }
  }
}
