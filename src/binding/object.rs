//! Instances of bound classes as seen by the host.

use super::class::{ClassDescriptor, ClassId, FieldAccess, Lens, Native};
use super::function::resolve;
use super::module::Module;
use crate::error::{BindError, BindResult};
use crate::value::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

enum Storage {
    /// The instance owns its native object.
    Owned(Mutex<Native>),
    /// The instance aliases a part of another instance's native object.
    Projected { parent: ObjectRef, path: Vec<Lens> },
}

pub(crate) struct Instance {
    id: u64,
    class: ClassId,
    module: Module,
    storage: Storage,
}

impl Drop for Instance {
    fn drop(&mut self) {
        self.module.dynamic_attrs().forget(self.id);
    }
}

/// A host reference to a bound class instance.
///
/// Clones share the instance; the native object is destroyed when the last
/// reference is dropped.
#[derive(Clone)]
pub struct ObjectRef(Arc<Instance>);

fn project<'a>(root: &'a mut dyn Any, path: &[Lens]) -> Option<&'a mut dyn Any> {
    let mut current = root;
    for lens in path {
        current = lens(current)?;
    }
    Some(current)
}

impl ObjectRef {
    pub(crate) fn owned(module: Module, class: ClassId, native: Native) -> Self {
        Self::with_storage(module, class, Storage::Owned(Mutex::new(native)))
    }

    pub(crate) fn projected(module: Module, class: ClassId, parent: ObjectRef, path: Vec<Lens>) -> Self {
        Self::with_storage(module, class, Storage::Projected { parent, path })
    }

    fn with_storage(module: Module, class: ClassId, storage: Storage) -> Self {
        Self(Arc::new(Instance {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            class,
            module,
            storage,
        }))
    }

    /// Identity of this instance, stable for its lifetime.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn class_id(&self) -> ClassId {
        self.0.class
    }

    /// Descriptor of the dynamic (most derived) class.
    pub fn class(&self) -> &ClassDescriptor {
        self.0.module.class_descriptor(self.0.class)
    }

    pub fn type_name(&self) -> &str {
        self.class().qualname()
    }

    pub fn module(&self) -> &Module {
        &self.0.module
    }

    /// Whether this instance's class is `qualname` or derives from it.
    pub fn is_instance(&self, qualname: &str) -> bool {
        let module = &self.0.module;
        module
            .class_chain(self.0.class)
            .any(|c| module.class_descriptor(c).qualname() == qualname)
    }

    /// Whether this handle aliases part of another instance.
    pub fn is_projection(&self) -> bool {
        matches!(self.0.storage, Storage::Projected { .. })
    }

    /// Run `f` on the native object viewed as `T`, upcasting through the
    /// class hierarchy when `T` is a base type.
    pub fn with_native<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> BindResult<R> {
        let module = &self.0.module;
        let wanted = TypeId::of::<T>();
        let target = module
            .class_chain(self.0.class)
            .find(|c| module.class_descriptor(*c).native == Some(wanted))
            .ok_or_else(|| {
                BindError::type_error(format!(
                    "'{}' cannot be viewed as {}",
                    self.type_name(),
                    std::any::type_name::<T>()
                ))
            })?;
        self.with_class_native(target, |native| native.downcast_mut::<T>().map(f))?
            .ok_or_else(|| BindError::type_error("native object has an unexpected type"))
    }

    /// Call a method, resolving overloads against positional arguments.
    pub fn call_method(&self, name: &str, args: &[Value]) -> BindResult<Value> {
        self.call_method_kw(name, args, &[])
    }

    pub fn call_method_kw(
        &self,
        name: &str,
        args: &[Value],
        kwargs: &[(&str, Value)],
    ) -> BindResult<Value> {
        let module = &self.0.module;
        let (owner, overloads) = module
            .lookup_method(self.0.class, name)
            .ok_or_else(|| self.no_attribute(name))?;
        let qualified = format!("{}.{}", module.class_descriptor(owner).qualname(), name);
        let (method, bound) = resolve(&qualified, &overloads, args, kwargs, module.config())?;
        self.with_class_native(owner, |native| method.invoke(native, &bound))?
    }

    /// Read a field, a dynamic attribute, or a value exported into the class scope.
    pub fn getattr(&self, name: &str) -> BindResult<Value> {
        let module = &self.0.module;
        if let Some((owner, field)) = module.lookup_field(self.0.class, name) {
            return match &field.access {
                FieldAccess::Copy { get, .. } => {
                    self.with_class_native(owner, |native| get(module, native))?
                }
                FieldAccess::Reference { native, lens, .. } => {
                    let class = module.class_by_type(*native).ok_or_else(|| {
                        BindError::type_error(format!(
                            "field '{}' has a type that is not bound in module '{}'",
                            name,
                            module.name()
                        ))
                    })?;
                    let mut path = module.upcast_path(self.0.class, owner)?;
                    path.push(Arc::clone(lens));
                    Ok(Value::Object(ObjectRef::projected(
                        module.clone(),
                        class,
                        self.clone(),
                        path,
                    )))
                }
            };
        }
        if let Some(value) = module.dynamic_attrs().get(self.0.id, name) {
            return Ok(value);
        }
        if let Some(value) = module.class_attr(self.0.class, name) {
            return Ok(value);
        }
        Err(self.no_attribute(name))
    }

    /// Write a field, or attach a dynamic attribute when the class allows it.
    ///
    /// A failed conversion leaves the native object untouched.
    pub fn setattr(&self, name: &str, value: impl Into<Value>) -> BindResult<()> {
        let value = value.into();
        let module = &self.0.module;
        if let Some((owner, field)) = module.lookup_field(self.0.class, name) {
            return match &field.access {
                FieldAccess::Copy { ty, set, .. } => {
                    let value = match ty {
                        Some(ty) => ty
                            .coerce(&value, module.config().implicit_conversions)
                            .ok_or_else(|| {
                                BindError::type_error(format!(
                                    "field '{}': expected {}, got {}",
                                    name,
                                    ty,
                                    value.type_name()
                                ))
                            })?,
                        None => value,
                    };
                    self.with_class_native(owner, |native| set(native, &value))?
                }
                FieldAccess::Reference { extract, store, .. } => {
                    // Copy the source out before locking the destination: the
                    // source may alias this very instance.
                    let incoming = extract(&value)?;
                    self.with_class_native(owner, move |native| store(native, incoming))?
                }
            };
        }
        if module.lookup_method(self.0.class, name).is_some() {
            return Err(BindError::attribute(format!(
                "'{}' object attribute '{}' is read-only",
                self.type_name(),
                name
            )));
        }
        let dynamic = module
            .class_chain(self.0.class)
            .any(|c| module.class_descriptor(c).dynamic_attr);
        if dynamic {
            module.dynamic_attrs().set(self.0.id, name, value);
            return Ok(());
        }
        Err(self.no_attribute(name))
    }

    /// Names of dynamic attributes attached to this instance.
    pub fn dynamic_attr_names(&self) -> Vec<String> {
        self.0.module.dynamic_attrs().names(self.0.id)
    }

    /// Host-facing representation: the nearest custom repr, or a default.
    pub fn repr(&self) -> String {
        let module = &self.0.module;
        let custom = module
            .class_chain(self.0.class)
            .find_map(|c| module.class_descriptor(c).repr.clone().map(|f| (c, f)));
        if let Some((owner, repr)) = custom {
            if let Ok(Some(text)) = self.with_class_native(owner, |native| repr(native)) {
                return text;
            }
        }
        format!("<{}.{} object #{}>", module.name(), self.type_name(), self.0.id)
    }

    fn no_attribute(&self, name: &str) -> BindError {
        BindError::attribute(format!(
            "'{}' object has no attribute '{}'",
            self.type_name(),
            name
        ))
    }

    /// Run `f` on the native object upcast to class `target`.
    fn with_class_native<R>(
        &self,
        target: ClassId,
        f: impl FnOnce(&mut dyn Any) -> R,
    ) -> BindResult<R> {
        let path = self.0.module.upcast_path(self.0.class, target)?;
        self.with_native_mut(|root| project(root, &path).map(f))?
            .ok_or_else(|| {
                BindError::type_error(format!(
                    "'{}' cannot be upcast to '{}'",
                    self.type_name(),
                    self.0.module.class_descriptor(target).qualname()
                ))
            })
    }

    fn with_native_mut<R>(&self, f: impl FnOnce(&mut dyn Any) -> R) -> BindResult<R> {
        let mut f = Some(f);
        let mut out = None;
        self.visit(&mut |native: &mut dyn Any| {
            if let Some(f) = f.take() {
                out = Some(f(native));
            }
        })?;
        out.ok_or_else(|| BindError::type_error("native object is unavailable"))
    }

    // Non-generic so that projections can recurse into their parent.
    fn visit(&self, visitor: &mut dyn FnMut(&mut dyn Any)) -> BindResult<()> {
        match &self.0.storage {
            Storage::Owned(cell) => {
                let mut guard = cell.lock().unwrap_or_else(PoisonError::into_inner);
                visitor(&mut **guard);
                Ok(())
            }
            Storage::Projected { parent, path } => {
                let mut reached = false;
                parent.visit(&mut |root: &mut dyn Any| {
                    if let Some(target) = project(root, path) {
                        reached = true;
                        visitor(target);
                    }
                })?;
                if reached {
                    Ok(())
                } else {
                    Err(BindError::type_error(format!(
                        "'{}' no longer aliases a member of '{}'",
                        self.type_name(),
                        parent.type_name()
                    )))
                }
            }
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({} #{})", self.type_name(), self.0.id)
    }
}

/// Extra attributes attached to instances, keyed by instance identity.
#[derive(Default)]
pub(crate) struct AttrTable {
    entries: Mutex<HashMap<u64, HashMap<String, Value>>>,
}

impl AttrTable {
    pub(crate) fn get(&self, id: u64, name: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(&id).and_then(|attrs| attrs.get(name)).cloned()
    }

    pub(crate) fn set(&self, id: u64, name: &str, value: Value) {
        let replaced = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries
                .entry(id)
                .or_default()
                .insert(name.to_string(), value)
        };
        // Dropped outside the lock: it may release the last reference to an
        // instance, whose own drop re-enters this table.
        drop(replaced);
    }

    pub(crate) fn names(&self, id: u64) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = entries
            .get(&id)
            .map(|attrs| attrs.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub(crate) fn forget(&self, id: u64) {
        let removed = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.remove(&id)
        };
        drop(removed);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_table_set_get_forget() {
        let table = AttrTable::default();
        table.set(7, "color", Value::from("brown"));
        table.set(7, "age", Value::Int(3));

        assert_eq!(table.get(7, "color"), Some(Value::from("brown")));
        assert_eq!(table.names(7), vec!["age".to_string(), "color".to_string()]);
        assert_eq!(table.get(8, "color"), None);

        table.forget(7);
        assert_eq!(table.get(7, "color"), None);
        assert_eq!(table.len(), 0);
    }
}
