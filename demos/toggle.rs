#![forbid(unsafe_code)]
#![warn(clippy::all)]

use std::{sync::Arc, time::Duration};

use proximity::{platform_power_manager, MainThread, ModuleRegistry, ProximityModule, MODULE_NAME};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), proximity::Error> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let main_thread = Arc::new(MainThread::spawn("proximity-main")?);
  let power = platform_power_manager();
  let module = ProximityModule::new(power.as_ref(), main_thread);
  if !module.is_available() {
    info!("no proximity wake lock on this device, calls will be ignored");
  }

  let mut registry = ModuleRegistry::new();
  registry.register(module)?;

  info!("toggling {MODULE_NAME} every two seconds. Ctrl-C to stop");
  let mut enabled = false;
  loop {
    tokio::select! {
      _ = tokio::signal::ctrl_c() => break,
      _ = tokio::time::sleep(Duration::from_secs(2)) => {
        enabled = !enabled;
        info!(enabled, "setEnabled");
        registry.invoke(MODULE_NAME, "setEnabled", &[enabled.into()])?;
      }
    }
  }

  info!("dropping registry");
  drop(registry);
  Ok(())
}
