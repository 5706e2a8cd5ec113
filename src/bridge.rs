//! The surface the host runtime sees: modules registered by name, invoked by method name with
//! loosely typed arguments.

use std::{collections::BTreeMap, fmt};

use tracing::{debug, trace};

use crate::{Error, Result};

/// An argument passed across the bridge from script code.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeValue {
  Null,
  Bool(bool),
  Number(f64),
  String(String),
}

impl BridgeValue {
  pub fn type_name(&self) -> &'static str {
    match self {
      BridgeValue::Null => "null",
      BridgeValue::Bool(_) => "boolean",
      BridgeValue::Number(_) => "number",
      BridgeValue::String(_) => "string",
    }
  }
}

impl From<bool> for BridgeValue {
  fn from(value: bool) -> Self {
    BridgeValue::Bool(value)
  }
}

impl From<f64> for BridgeValue {
  fn from(value: f64) -> Self {
    BridgeValue::Number(value)
  }
}

impl From<&str> for BridgeValue {
  fn from(value: &str) -> Self {
    BridgeValue::String(value.to_owned())
  }
}

/// A native capability the host runtime can call into.
///
/// Calls are fire-and-forget: nothing is handed back to script code. An `Err` only reports that
/// the call could not be routed.
pub trait NativeModule: Send + Sync {
  fn name(&self) -> &str;
  fn invoke(&self, method: &str, args: &[BridgeValue]) -> Result<()>;
}

#[derive(Default)]
pub struct ModuleRegistry {
  modules: BTreeMap<String, Box<dyn NativeModule>>,
}

impl ModuleRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register<M>(&mut self, module: M) -> Result<()>
  where
    M: NativeModule + 'static,
  {
    let name = module.name().to_owned();
    if self.modules.contains_key(&name) {
      return Err(Error::DuplicateModule(name));
    }
    debug!(module = %name, "registered native module");
    self.modules.insert(name, Box::new(module));
    Ok(())
  }

  pub fn get(&self, name: &str) -> Option<&dyn NativeModule> {
    self.modules.get(name).map(|module| module.as_ref())
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.modules.keys().map(String::as_str)
  }

  pub fn invoke(&self, module: &str, method: &str, args: &[BridgeValue]) -> Result<()> {
    trace!(module, method, ?args, "bridge call");
    self
      .get(module)
      .ok_or_else(|| Error::UnknownModule(module.to_owned()))?
      .invoke(method, args)
  }
}

impl fmt::Debug for ModuleRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.modules.keys()).finish()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;

  struct Echo {
    name: &'static str,
    calls: Mutex<Vec<(String, Vec<BridgeValue>)>>,
  }

  impl Echo {
    fn new(name: &'static str) -> Self {
      Self {
        name,
        calls: Mutex::new(Vec::new()),
      }
    }
  }

  impl NativeModule for Echo {
    fn name(&self) -> &str {
      self.name
    }

    fn invoke(&self, method: &str, args: &[BridgeValue]) -> Result<()> {
      self
        .calls
        .lock()
        .unwrap()
        .push((method.to_owned(), args.to_vec()));
      Ok(())
    }
  }

  #[test]
  fn routes_by_module_name() {
    let mut registry = ModuleRegistry::new();
    registry.register(Echo::new("A")).unwrap();
    registry.register(Echo::new("B")).unwrap();

    registry.invoke("B", "ping", &[true.into()]).unwrap();

    assert_eq!(registry.names().collect::<Vec<_>>(), ["A", "B"]);
    assert!(registry.get("A").is_some());
  }

  #[test]
  fn rejects_duplicates() {
    let mut registry = ModuleRegistry::new();
    registry.register(Echo::new("A")).unwrap();
    assert!(matches!(
      registry.register(Echo::new("A")),
      Err(Error::DuplicateModule(name)) if name == "A"
    ));
  }

  #[test]
  fn unknown_module() {
    let registry = ModuleRegistry::new();
    assert!(matches!(
      registry.invoke("Nope", "setEnabled", &[]),
      Err(Error::UnknownModule(_))
    ));
  }

  #[test]
  fn type_names() {
    assert_eq!(BridgeValue::Null.type_name(), "null");
    assert_eq!(BridgeValue::from(1.5).type_name(), "number");
    assert_eq!(BridgeValue::from("x").type_name(), "string");
  }
}
