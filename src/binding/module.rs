//! The module registrar and the published, read-only module handle.

use super::class::{ClassBuilder, ClassDescriptor, ClassId, Field, Lens, Method, Native};
use super::enumeration::{EnumBuilder, EnumDescriptor};
use super::function::{resolve, Function};
use super::object::{AttrTable, ObjectRef};
use crate::config::BindingConfig;
use crate::error::{BindError, BindResult};
use crate::value::{IntoValue, NativeEnum, TypeSpec, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub(crate) struct ModuleInner {
    name: String,
    doc: Option<String>,
    config: BindingConfig,
    functions: Vec<Function>,
    attributes: Vec<(String, Value)>,
    classes: Vec<ClassDescriptor>,
    class_index: HashMap<String, ClassId>,
    class_by_type: HashMap<TypeId, ClassId>,
    enums: Vec<(ClassId, Arc<EnumDescriptor>)>,
    enum_index: HashMap<String, usize>,
    enum_by_type: HashMap<TypeId, usize>,
    hazards: Vec<String>,
    dynamic_attrs: AttrTable,
}

/// Collects registrations in declaration order and publishes them as a [`Module`].
///
/// Nothing is visible to callers until [`ModuleBuilder::finish`] succeeds.
pub struct ModuleBuilder {
    inner: ModuleInner,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, BindingConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: BindingConfig) -> Self {
        Self {
            inner: ModuleInner {
                name: name.into(),
                doc: None,
                config,
                functions: Vec::new(),
                attributes: Vec::new(),
                classes: Vec::new(),
                class_index: HashMap::new(),
                class_by_type: HashMap::new(),
                enums: Vec::new(),
                enum_index: HashMap::new(),
                enum_by_type: HashMap::new(),
                hazards: Vec::new(),
                dynamic_attrs: AttrTable::default(),
            },
        }
    }

    pub fn doc(&mut self, doc: impl Into<String>) -> &mut Self {
        self.inner.doc = Some(doc.into());
        self
    }

    /// Register a free function. Several functions may share a name; they
    /// form an overload set tried in registration order.
    pub fn def(&mut self, function: Function) -> BindResult<&mut Self> {
        function
            .signature()
            .validate(&format!("{}.{}", self.inner.name, function.name()))?;
        tracing::debug!(
            module = %self.inner.name,
            function = function.name(),
            signature = %function.signature(),
            "registered function"
        );
        self.inner.functions.push(function);
        Ok(self)
    }

    /// Set a module attribute once.
    pub fn attr(&mut self, name: impl Into<String>, value: impl IntoValue) -> BindResult<&mut Self> {
        let name = name.into();
        if self.inner.attributes.iter().any(|(n, _)| *n == name) {
            return Err(BindError::registration(format!(
                "module '{}' already has attribute '{}'",
                self.inner.name, name
            )));
        }
        tracing::debug!(module = %self.inner.name, attribute = %name, "registered attribute");
        self.inner.attributes.push((name, value.into_value()));
        Ok(self)
    }

    /// Register a top-level class. Its base, if any, must already be registered.
    pub fn class<T>(&mut self, builder: ClassBuilder<T>) -> BindResult<ClassId> {
        self.register_class(None, builder)
    }

    /// Register a class scoped under `owner`, e.g. `Pet_EI.Attributes`.
    pub fn nested_class<T>(&mut self, owner: ClassId, builder: ClassBuilder<T>) -> BindResult<ClassId> {
        self.register_class(Some(owner), builder)
    }

    /// Register an enumeration scoped under `owner`.
    pub fn nested_enum<E: NativeEnum>(&mut self, owner: ClassId, builder: EnumBuilder<E>) -> BindResult<()> {
        let qualname = format!("{}.{}", self.owner_qualname(owner)?, builder.name());
        if self.inner.class_index.contains_key(&qualname)
            || self.inner.enum_index.contains_key(&qualname)
        {
            return Err(BindError::registration(format!(
                "'{}' is already registered",
                qualname
            )));
        }
        let native = TypeId::of::<E>();
        if self.inner.enum_by_type.contains_key(&native) {
            return Err(BindError::registration(format!(
                "native enum {} is bound twice",
                std::any::type_name::<E>()
            )));
        }

        let descriptor = builder.build(qualname.clone())?;
        let idx = self.inner.enums.len();
        tracing::debug!(
            module = %self.inner.name,
            enumeration = %qualname,
            exported = descriptor.exports_values(),
            "registered enumeration"
        );
        self.inner.enums.push((owner, Arc::new(descriptor)));
        self.inner.enum_index.insert(qualname, idx);
        self.inner.enum_by_type.insert(native, idx);
        Ok(())
    }

    fn owner_qualname(&self, owner: ClassId) -> BindResult<String> {
        self.inner
            .classes
            .get(owner.0)
            .map(|c| c.qualname.clone())
            .ok_or_else(|| BindError::registration(format!("unknown owner descriptor {:?}", owner)))
    }

    fn register_class<T>(&mut self, owner: Option<ClassId>, builder: ClassBuilder<T>) -> BindResult<ClassId> {
        let mut desc = builder.desc;
        let base_name = builder.base_name;

        if let Some(owner) = owner {
            desc.qualname = format!("{}.{}", self.owner_qualname(owner)?, desc.name);
            desc.owner = Some(owner);
        }
        if self.inner.class_index.contains_key(&desc.qualname)
            || self.inner.enum_index.contains_key(&desc.qualname)
        {
            return Err(BindError::registration(format!(
                "'{}' is already registered",
                desc.qualname
            )));
        }

        if let Some(base_name) = base_name {
            let base = *self.inner.class_index.get(&base_name).ok_or_else(|| {
                BindError::registration(format!(
                    "unknown base descriptor '{}' for class '{}'",
                    base_name, desc.qualname
                ))
            })?;
            let base_desc = &self.inner.classes[base.0];
            if desc.upcast.is_none() && !base_desc.polymorphic {
                return Err(BindError::registration(format!(
                    "class '{}' derives from '{}' without an upcast, but the base is not polymorphic",
                    desc.qualname, base_desc.qualname
                )));
            }
            desc.base = Some(base);
        }

        for signature in desc.signatures() {
            signature.validate(&desc.qualname)?;
        }

        if let Some(native) = desc.native {
            if let Some(existing) = self.inner.class_by_type.get(&native) {
                return Err(BindError::registration(format!(
                    "native type of '{}' is already bound as '{}'",
                    desc.qualname, self.inner.classes[existing.0].qualname
                )));
            }
        }

        let id = ClassId(self.inner.classes.len());
        tracing::debug!(
            module = %self.inner.name,
            class = %desc.qualname,
            base = ?desc.base.map(|b| self.inner.classes[b.0].qualname.as_str()),
            methods = desc.methods.len(),
            fields = desc.fields.len(),
            "registered class"
        );
        if let Some(native) = desc.native {
            self.inner.class_by_type.insert(native, id);
        }
        self.inner.class_index.insert(desc.qualname.clone(), id);
        self.inner.classes.push(desc);
        Ok(id)
    }

    fn check_type(&self, ty: &TypeSpec, context: &str) -> BindResult<()> {
        let known = match ty {
            TypeSpec::Class(name) => self.inner.class_index.contains_key(name),
            TypeSpec::Enum(name) => self.inner.enum_index.contains_key(name),
            _ => true,
        };
        if known {
            Ok(())
        } else {
            Err(BindError::registration(format!(
                "{} refers to unknown type '{}'",
                context, ty
            )))
        }
    }

    /// Validate cross references and publish the module.
    pub fn finish(mut self) -> BindResult<Module> {
        for function in &self.inner.functions {
            let context = format!("{}.{}", self.inner.name, function.name());
            for ty in function.signature().referenced_types() {
                self.check_type(ty, &context)?;
            }
            self.check_type(function.return_type(), &context)?;
        }
        for class in &self.inner.classes {
            for signature in class.signatures() {
                for ty in signature.referenced_types() {
                    self.check_type(ty, &class.qualname)?;
                }
            }
        }

        let mut hazards = Vec::new();
        for function in &self.inner.functions {
            let Some(produces) = function.produces() else {
                continue;
            };
            let declared_name = match function.return_type() {
                TypeSpec::Class(name) => name,
                other => {
                    return Err(BindError::registration(format!(
                        "factory '{}' must return a class, not {}",
                        function.name(),
                        other
                    )))
                }
            };
            let declared = self.inner.class_index[declared_name.as_str()];
            let produced = *self.inner.class_by_type.get(&produces).ok_or_else(|| {
                BindError::registration(format!(
                    "factory '{}' produces a type that is not bound in module '{}'",
                    function.name(),
                    self.inner.name
                ))
            })?;
            let derives = std::iter::successors(Some(produced), |c| self.inner.classes[c.0].base)
                .any(|c| c == declared);
            if !derives {
                return Err(BindError::registration(format!(
                    "factory '{}' produces '{}', which does not derive from '{}'",
                    function.name(),
                    self.inner.classes[produced.0].qualname,
                    declared_name
                )));
            }
            if produced != declared && !self.inner.classes[declared.0].polymorphic {
                let hazard = format!(
                    "{}: owns a '{}' through non-polymorphic base '{}'",
                    function.name(),
                    self.inner.classes[produced.0].qualname,
                    declared_name
                );
                tracing::warn!(module = %self.inner.name, "ownership hazard: {}", hazard);
                hazards.push(hazard);
            }
        }
        self.inner.hazards = hazards;

        tracing::debug!(
            module = %self.inner.name,
            functions = self.inner.functions.len(),
            classes = self.inner.classes.len(),
            enums = self.inner.enums.len(),
            "module published"
        );
        Ok(Module(Arc::new(self.inner)))
    }
}

/// A loaded module: the descriptor table plus the call adapters over it.
///
/// Cheap to clone; all clones share one read-only table.
#[derive(Clone)]
pub struct Module(Arc<ModuleInner>);

impl Module {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.0.doc.as_deref()
    }

    pub fn config(&self) -> &BindingConfig {
        &self.0.config
    }

    /// Factories that hand out derived instances through a non-polymorphic base.
    pub fn hazards(&self) -> &[String] {
        &self.0.hazards
    }

    /// Read a module attribute.
    pub fn attr(&self, name: &str) -> BindResult<Value> {
        self.0
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| {
                BindError::attribute(format!(
                    "module '{}' has no attribute '{}'",
                    self.0.name, name
                ))
            })
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.0.attributes.iter().map(|(n, _)| n.as_str())
    }

    /// All overloads registered under `name`.
    pub fn functions(&self, name: &str) -> Vec<&Function> {
        self.0.functions.iter().filter(|f| f.name() == name).collect()
    }

    pub fn call(&self, name: &str, args: &[Value]) -> BindResult<Value> {
        self.call_kw(name, args, &[])
    }

    /// Call a free function with positional and keyword arguments.
    pub fn call_kw(&self, name: &str, args: &[Value], kwargs: &[(&str, Value)]) -> BindResult<Value> {
        let overloads = self.functions(name);
        if overloads.is_empty() {
            return Err(BindError::attribute(format!(
                "module '{}' has no function '{}'",
                self.0.name, name
            )));
        }
        let (function, bound) = resolve(name, &overloads, args, kwargs, &self.0.config)?;
        function.invoke(self, &bound)
    }

    /// Look up a class by qualified name (`Pet`, `Pet_EI.Attributes`).
    pub fn class(&self, qualname: &str) -> BindResult<ClassRef<'_>> {
        self.0
            .class_index
            .get(qualname)
            .map(|id| ClassRef { module: self, id: *id })
            .ok_or_else(|| {
                BindError::attribute(format!(
                    "module '{}' has no class '{}'",
                    self.0.name, qualname
                ))
            })
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.0.classes.iter().map(|c| c.qualname.as_str())
    }

    /// Look up an enumeration by qualified name (`Pet_EI.Kind`).
    pub fn enumeration(&self, qualname: &str) -> BindResult<&Arc<EnumDescriptor>> {
        self.0
            .enum_index
            .get(qualname)
            .map(|idx| &self.0.enums[*idx].1)
            .ok_or_else(|| {
                BindError::attribute(format!(
                    "module '{}' has no enumeration '{}'",
                    self.0.name, qualname
                ))
            })
    }

    /// Host value for a native enum bound in this module.
    pub fn enum_value<E: NativeEnum>(&self, variant: E) -> BindResult<Value> {
        let idx = self.0.enum_by_type.get(&TypeId::of::<E>()).ok_or_else(|| {
            BindError::type_error(format!(
                "{} is not bound in module '{}'",
                std::any::type_name::<E>(),
                self.0.name
            ))
        })?;
        self.0.enums[*idx]
            .1
            .from_value(variant.to_repr())
            .map(Value::Enum)
    }

    /// Take ownership of a native object, typed by its dynamic class.
    pub fn adopt(&self, native: Native) -> BindResult<ObjectRef> {
        let concrete = {
            let any: &dyn Any = &*native;
            any.type_id()
        };
        let class = self.class_by_type(concrete).ok_or_else(|| {
            BindError::type_error(format!(
                "returned object's type is not bound in module '{}'",
                self.0.name
            ))
        })?;
        Ok(ObjectRef::owned(self.clone(), class, native))
    }

    /// Wrap a native value in a new host reference.
    pub fn wrap<T: Send + 'static>(&self, native: T) -> BindResult<ObjectRef> {
        self.adopt(Box::new(native))
    }

    pub(crate) fn class_descriptor(&self, id: ClassId) -> &ClassDescriptor {
        &self.0.classes[id.0]
    }

    pub(crate) fn class_by_type(&self, native: TypeId) -> Option<ClassId> {
        self.0.class_by_type.get(&native).copied()
    }

    /// `id` followed by its bases, most derived first.
    pub(crate) fn class_chain(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::successors(Some(id), move |c| self.0.classes[c.0].base)
    }

    pub(crate) fn is_subclass(&self, id: ClassId, base: ClassId) -> bool {
        self.class_chain(id).any(|c| c == base)
    }

    /// Lenses leading from `from`'s native object to its `to` subobject.
    pub(crate) fn upcast_path(&self, from: ClassId, to: ClassId) -> BindResult<Vec<Lens>> {
        let mut path = Vec::new();
        let mut current = from;
        while current != to {
            let desc = &self.0.classes[current.0];
            let base = desc.base.ok_or_else(|| {
                BindError::type_error(format!(
                    "'{}' does not derive from '{}'",
                    self.0.classes[from.0].qualname, self.0.classes[to.0].qualname
                ))
            })?;
            let lens = desc.upcast.clone().ok_or_else(|| {
                BindError::type_error(format!(
                    "'{}' has no native layout for its polymorphic base '{}'",
                    desc.qualname, self.0.classes[base.0].qualname
                ))
            })?;
            path.push(lens);
            current = base;
        }
        Ok(path)
    }

    /// Nearest class in the hierarchy defining method `name`, with its overloads.
    pub(crate) fn lookup_method(&self, class: ClassId, name: &str) -> Option<(ClassId, Vec<&Method>)> {
        self.class_chain(class).find_map(|c| {
            let overloads: Vec<&Method> = self.0.classes[c.0]
                .methods
                .iter()
                .filter(|m| m.name() == name)
                .collect();
            (!overloads.is_empty()).then_some((c, overloads))
        })
    }

    pub(crate) fn lookup_field(&self, class: ClassId, name: &str) -> Option<(ClassId, &Field)> {
        self.class_chain(class).find_map(|c| {
            self.0.classes[c.0]
                .fields
                .iter()
                .find(|f| f.name() == name)
                .map(|f| (c, f))
        })
    }

    /// Value exported into a class scope (or one of its bases) by an enumeration.
    pub(crate) fn class_attr(&self, class: ClassId, name: &str) -> Option<Value> {
        self.class_chain(class).find_map(|c| {
            self.0
                .enums
                .iter()
                .filter(|(owner, ty)| *owner == c && ty.exports_values())
                .find_map(|(_, ty)| ty.member(name).ok())
                .map(Value::Enum)
        })
    }

    pub(crate) fn dynamic_attrs(&self) -> &AttrTable {
        &self.0.dynamic_attrs
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.0.name)
            .field("functions", &self.0.functions.len())
            .field("attributes", &self.0.attributes.len())
            .field("classes", &self.0.classes.len())
            .field("enums", &self.0.enums.len())
            .finish()
    }
}

/// A class as seen from its module scope.
#[derive(Clone, Copy)]
pub struct ClassRef<'m> {
    module: &'m Module,
    id: ClassId,
}

impl<'m> ClassRef<'m> {
    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn descriptor(&self) -> &'m ClassDescriptor {
        self.module.class_descriptor(self.id)
    }

    pub fn name(&self) -> &'m str {
        self.descriptor().name()
    }

    pub fn qualname(&self) -> &'m str {
        self.descriptor().qualname()
    }

    pub fn base(&self) -> Option<ClassRef<'m>> {
        self.descriptor().base.map(|id| ClassRef {
            module: self.module,
            id,
        })
    }

    pub fn is_subclass_of(&self, qualname: &str) -> bool {
        self.module
            .0
            .class_index
            .get(qualname)
            .is_some_and(|base| self.module.is_subclass(self.id, *base))
    }

    pub fn construct(&self, args: &[Value]) -> BindResult<ObjectRef> {
        self.construct_kw(args, &[])
    }

    /// Construct an instance, resolving constructor overloads.
    pub fn construct_kw(&self, args: &[Value], kwargs: &[(&str, Value)]) -> BindResult<ObjectRef> {
        let desc = self.descriptor();
        if desc.ctors.is_empty() {
            return Err(BindError::type_error(format!(
                "{}: No constructor defined!",
                desc.qualname
            )));
        }
        let ctors: Vec<_> = desc.ctors.iter().collect();
        let (ctor, bound) = resolve(&desc.qualname, &ctors, args, kwargs, self.module.config())?;
        let native = ctor.construct(&bound)?;
        Ok(ObjectRef::owned(self.module.clone(), self.id, native))
    }

    /// Value exported into this class scope, e.g. `Pet_EI.Dog`.
    pub fn attr(&self, name: &str) -> BindResult<Value> {
        self.module.class_attr(self.id, name).ok_or_else(|| {
            BindError::attribute(format!(
                "type object '{}' has no attribute '{}'",
                self.qualname(),
                name
            ))
        })
    }

    /// Enumeration nested in this class, e.g. `Pet_EI.Kind`.
    pub fn enumeration(&self, name: &str) -> BindResult<&'m Arc<EnumDescriptor>> {
        self.module
            .enumeration(&format!("{}.{}", self.qualname(), name))
    }

    /// Class nested in this class, e.g. `Pet_EI.Attributes`.
    pub fn nested(&self, name: &str) -> BindResult<ClassRef<'m>> {
        self.module.class(&format!("{}.{}", self.qualname(), name))
    }

    /// Overload signatures registered for a method, for introspection.
    pub fn method_signatures(&self, name: &str) -> Vec<String> {
        self.module
            .lookup_method(self.id, name)
            .map(|(_, overloads)| {
                overloads
                    .iter()
                    .map(|m| format!("{}{}", name, m.signature()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::literals::ArgLiteral;
    use crate::binding::Opaque;

    #[derive(Clone)]
    struct Base {
        label: String,
    }

    struct Derived {
        base: Base,
    }

    fn base_class() -> ClassBuilder<Base> {
        ClassBuilder::<Base>::new("Base")
            .init(["label".typed(TypeSpec::Str)], |a| {
                Ok(Base {
                    label: a.get(0)?,
                })
            })
            .def("label", [], |b: &mut Base, _| Ok(b.label.clone()))
            .def_readwrite("label_field", |b: &mut Base| &mut b.label)
    }

    fn derived_class() -> ClassBuilder<Derived> {
        ClassBuilder::<Derived>::new("Derived")
            .extends("Base", |d: &mut Derived| &mut d.base)
            .init(["label".typed(TypeSpec::Str)], |a| {
                Ok(Derived {
                    base: Base { label: a.get(0)? },
                })
            })
    }

    #[test]
    fn test_forward_base_reference_is_rejected() {
        let mut m = ModuleBuilder::new("m");
        let err = m.class(derived_class()).unwrap_err();
        assert_eq!(
            err,
            BindError::registration("unknown base descriptor 'Base' for class 'Derived'")
        );
    }

    #[test]
    fn test_inherited_method_and_field() {
        let mut m = ModuleBuilder::new("m");
        m.class(base_class()).unwrap();
        m.class(derived_class()).unwrap();
        let module = m.finish().unwrap();

        let obj = module
            .class("Derived")
            .unwrap()
            .construct(&[Value::from("x")])
            .unwrap();
        assert!(obj.is_instance("Base"));
        assert_eq!(obj.call_method("label", &[]).unwrap(), Value::from("x"));

        obj.setattr("label_field", "y").unwrap();
        assert_eq!(obj.getattr("label_field").unwrap(), Value::from("y"));
        assert_eq!(obj.with_native::<Base, _>(|b| b.label.clone()).unwrap(), "y");
    }

    #[test]
    fn test_duplicate_registrations() {
        let mut m = ModuleBuilder::new("m");
        m.class(base_class()).unwrap();
        assert!(matches!(m.class(base_class()), Err(BindError::Registration(_))));

        m.attr("x", 1).unwrap();
        assert!(matches!(m.attr("x", 2), Err(BindError::Registration(_))));
    }

    #[test]
    fn test_dyn_base_must_be_polymorphic() {
        let mut m = ModuleBuilder::new("m");
        m.class(ClassBuilder::<Opaque>::abstract_class("Shape")).unwrap();
        let err = m
            .class(ClassBuilder::<Base>::new("Circle").extends_dyn("Shape"))
            .unwrap_err();
        assert!(matches!(err, BindError::Registration(_)));
    }

    #[test]
    fn test_abstract_class_cannot_be_constructed() {
        let mut m = ModuleBuilder::new("m");
        m.class(ClassBuilder::<Opaque>::abstract_class("Shape").polymorphic())
            .unwrap();
        let module = m.finish().unwrap();
        let err = module.class("Shape").unwrap().construct(&[]).unwrap_err();
        assert_eq!(err, BindError::type_error("Shape: No constructor defined!"));
    }

    #[test]
    fn test_factory_must_derive_from_declared_class() {
        let mut m = ModuleBuilder::new("m");
        m.class(base_class()).unwrap();
        m.class(ClassBuilder::<u32>::new("Unrelated")).unwrap();
        m.def(Function::factory("make", "Base", TypeId::of::<u32>(), || {
            Box::new(7u32) as Box<dyn Any + Send>
        }))
        .unwrap();
        assert!(matches!(m.finish(), Err(BindError::Registration(_))));
    }

    #[test]
    fn test_unknown_type_in_signature_fails_finish() {
        let mut m = ModuleBuilder::new("m");
        m.def(Function::new(
            "feed",
            ["pet".typed(TypeSpec::class("Ghost"))],
            |_| Ok(()),
        ))
        .unwrap();
        assert!(matches!(m.finish(), Err(BindError::Registration(_))));
    }

    #[test]
    fn test_nested_class_is_qualified_by_owner() {
        let mut m = ModuleBuilder::new("m");
        let owner = m.class(base_class()).unwrap();
        let inner = m
            .nested_class(owner, ClassBuilder::<u8>::new("Inner").init([], |_| Ok(0u8)))
            .unwrap();
        assert!(matches!(
            m.nested_class(ClassId(42), ClassBuilder::<u16>::new("Lost")),
            Err(BindError::Registration(_))
        ));
        let module = m.finish().unwrap();

        let class = module.class("Base").unwrap().nested("Inner").unwrap();
        assert_eq!(class.id(), inner);
        assert_eq!(class.qualname(), "Base.Inner");
        assert_eq!(class.descriptor().owner(), Some(owner));
        assert!(module.class("Inner").is_err());
    }

    #[test]
    fn test_unknown_function_and_attribute() {
        let module = ModuleBuilder::new("m").finish().unwrap();
        assert!(matches!(module.call("nope", &[]), Err(BindError::Attribute(_))));
        assert!(matches!(module.attr("nope"), Err(BindError::Attribute(_))));
    }
}
