//! Process-wide table of loadable modules.
//!
//! Each module is built on first load and then shared read-only by every
//! caller. The binding configuration is fixed by that first load.

use crate::binding::{Module, ModuleBuilder};
use crate::config::BindingConfig;
use crate::demo;
use crate::error::{BindError, BindResult};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Registration function for one module.
pub type ModuleInit = fn(&mut ModuleBuilder) -> BindResult<()>;

const BUILTINS: &[(&str, ModuleInit)] = &[
    ("mylib", demo::mylib::register),
    ("mylib_object", demo::mylib_object::register),
];

static CONFIG: OnceLock<BindingConfig> = OnceLock::new();
static LOADED: OnceLock<Mutex<HashMap<&'static str, Module>>> = OnceLock::new();

/// Set the configuration used by every module load.
///
/// Fails once a configuration is in effect, either from an earlier call or
/// from a load that fell back to the defaults.
pub fn configure(config: BindingConfig) -> BindResult<()> {
    CONFIG.set(config).map_err(|_| {
        BindError::registration("binding configuration is already in effect")
    })?;
    tracing::debug!(config = ?CONFIG.get(), "binding configuration set");
    Ok(())
}

/// The configuration in effect, fixing the defaults if none was set.
pub fn config() -> &'static BindingConfig {
    CONFIG.get_or_init(BindingConfig::default)
}

/// Names of the modules this library can load.
pub fn available() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _)| *name)
}

/// Load a module by name, building it on first use.
///
/// A failed build publishes nothing; the next call tries again.
pub fn load(name: &str) -> BindResult<Module> {
    let &(key, init) = BUILTINS
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| BindError::lookup(format!("no module named '{}'", name)))?;

    let table = LOADED.get_or_init(|| Mutex::new(HashMap::new()));
    let mut loaded = table.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(module) = loaded.get(key) {
        return Ok(module.clone());
    }

    let module = build(key, init, config().clone()).map_err(|err| {
        tracing::warn!(module = key, error = %err, "module load failed");
        err
    })?;
    loaded.insert(key, module.clone());
    Ok(module)
}

/// Build a module outside the shared table.
pub fn build(name: &str, init: ModuleInit, config: BindingConfig) -> BindResult<Module> {
    let mut builder = ModuleBuilder::with_config(name, config);
    init(&mut builder)?;
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_load_is_shared() {
        let a = load("mylib").unwrap();
        let b = load("mylib").unwrap();
        assert_eq!(a.name(), "mylib");
        assert_eq!(b.call("add", &[]).unwrap(), Value::Int(3));
        assert_eq!(a.doc(), b.doc());
    }

    #[test]
    fn test_unknown_module() {
        assert!(matches!(load("nope"), Err(BindError::Lookup(_))));
    }

    #[test]
    fn test_configure_after_load_fails() {
        load("mylib").unwrap();
        assert!(matches!(
            configure(BindingConfig::strict()),
            Err(BindError::Registration(_))
        ));
    }

    #[test]
    fn test_failed_build_publishes_nothing() {
        fn broken(m: &mut ModuleBuilder) -> BindResult<()> {
            m.attr("x", 1)?;
            m.attr("x", 2)?;
            Ok(())
        }
        let err = build("broken", broken, BindingConfig::default()).unwrap_err();
        assert!(matches!(err, BindError::Registration(_)));
    }

    #[test]
    fn test_available_modules() {
        let names: Vec<_> = available().collect();
        assert_eq!(names, vec!["mylib", "mylib_object"]);
    }

    #[test]
    fn test_concurrent_loads() {
        let workers: Vec<_> = (0..8i64)
            .map(|i| {
                std::thread::spawn(move || {
                    let mylib = load("mylib").unwrap();
                    let sum = mylib.call("add", &[Value::Int(i)]).unwrap().as_int();
                    let objects = load("mylib_object").unwrap();
                    let pet = objects.call("pet_store", &[]).unwrap();
                    (sum, pet.as_object().map(|p| p.type_name().to_string()))
                })
            })
            .collect();
        for (i, worker) in workers.into_iter().enumerate() {
            let (sum, pet_type) = worker.join().unwrap();
            assert_eq!(sum, Some(i as i64 + 2));
            assert_eq!(pet_type.as_deref(), Some("Dog"));
        }
        assert_eq!(load("mylib").unwrap().hazards().len(), 0);
    }
}
