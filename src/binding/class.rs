//! Class descriptors and the typed builder that produces them.

use super::function::{Args, Overload, Param, Signature};
use super::module::Module;
use crate::error::{BindError, BindResult};
use crate::value::{FromValue, IntoValue, NativeEnum, TypeSpec, Value};
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased native object storage.
pub(crate) type Native = Box<dyn Any + Send>;

/// Projection from an object to one of its parts (base subobject or member).
pub(crate) type Lens = Arc<dyn Fn(&mut dyn Any) -> Option<&mut dyn Any> + Send + Sync>;

type CtorFn = Arc<dyn Fn(&Args) -> BindResult<Native> + Send + Sync>;
type MethodFn = Arc<dyn Fn(&mut dyn Any, &Args) -> BindResult<Value> + Send + Sync>;
type ReprFn = Arc<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;
type GetFn = Arc<dyn Fn(&Module, &mut dyn Any) -> BindResult<Value> + Send + Sync>;
type SetFn = Arc<dyn Fn(&mut dyn Any, &Value) -> BindResult<()> + Send + Sync>;
type ExtractFn = Arc<dyn Fn(&Value) -> BindResult<Native> + Send + Sync>;
type StoreFn = Arc<dyn Fn(&mut dyn Any, Native) -> BindResult<()> + Send + Sync>;

fn lens<F>(f: F) -> Lens
where
    F: for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn downcast<T: 'static>(native: &mut dyn Any) -> BindResult<&mut T> {
    native.downcast_mut::<T>().ok_or_else(|| {
        BindError::type_error(format!(
            "self is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

/// Index of a class within its module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClassId(pub(crate) usize);

/// Marker for classes with no native layout of their own (abstract bases).
pub struct Opaque;

pub(crate) struct Constructor {
    signature: Signature,
    call: CtorFn,
}

impl Constructor {
    pub(crate) fn construct(&self, args: &Args) -> BindResult<Native> {
        (self.call)(args)
    }
}

impl Overload for Constructor {
    fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// One overload of a bound method.
pub struct Method {
    name: String,
    doc: Option<String>,
    signature: Signature,
    call: MethodFn,
}

impl Method {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn invoke(&self, native: &mut dyn Any, args: &Args) -> BindResult<Value> {
        (self.call)(native, args)
    }
}

impl Overload for Method {
    fn signature(&self) -> &Signature {
        &self.signature
    }
}

pub(crate) enum FieldAccess {
    /// Reads copy the member out; writes convert and store.
    Copy {
        ty: Option<TypeSpec>,
        get: GetFn,
        set: SetFn,
    },
    /// Reads hand out a handle that aliases the member inside its owner.
    Reference {
        native: TypeId,
        lens: Lens,
        extract: ExtractFn,
        store: StoreFn,
    },
}

/// A read-write field exposed on a class.
pub struct Field {
    name: String,
    pub(crate) access: FieldAccess,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether reads alias the native member rather than copying it.
    pub fn is_reference(&self) -> bool {
        matches!(self.access, FieldAccess::Reference { .. })
    }
}

/// Registered metadata for a bound class.
pub struct ClassDescriptor {
    pub(crate) name: String,
    pub(crate) qualname: String,
    pub(crate) doc: Option<String>,
    pub(crate) owner: Option<ClassId>,
    pub(crate) base: Option<ClassId>,
    pub(crate) upcast: Option<Lens>,
    pub(crate) native: Option<TypeId>,
    pub(crate) ctors: Vec<Constructor>,
    pub(crate) methods: Vec<Method>,
    pub(crate) fields: Vec<Field>,
    pub(crate) repr: Option<ReprFn>,
    pub(crate) dynamic_attr: bool,
    pub(crate) polymorphic: bool,
}

impl ClassDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Class this one is nested in, if any.
    pub fn owner(&self) -> Option<ClassId> {
        self.owner
    }

    pub fn base(&self) -> Option<ClassId> {
        self.base
    }

    pub fn is_polymorphic(&self) -> bool {
        self.polymorphic
    }

    pub fn has_dynamic_attr(&self) -> bool {
        self.dynamic_attr
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.ctors
            .iter()
            .map(|c| &c.signature)
            .chain(self.methods.iter().map(|m| &m.signature))
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("qualname", &self.qualname)
            .field("base", &self.base)
            .field("ctors", &self.ctors.len())
            .field("methods", &self.methods.len())
            .field("fields", &self.fields.len())
            .field("polymorphic", &self.polymorphic)
            .finish()
    }
}

/// Typed builder for a class wrapping native type `T`.
///
/// ```ignore
/// ClassBuilder::<Pet>::new("Pet")
///     .init(["name".typed(TypeSpec::Str)], |a| Ok(Pet::new(a.get::<String>(0)?)))
///     .def("getName", [], |p: &mut Pet, _| Ok(p.get_name().to_string()))
///     .def_readwrite("name", |p: &mut Pet| &mut p.name);
/// ```
pub struct ClassBuilder<T> {
    pub(crate) desc: ClassDescriptor,
    pub(crate) base_name: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ClassBuilder<T> {
    fn blank(name: String, native: Option<TypeId>) -> Self {
        Self {
            desc: ClassDescriptor {
                qualname: name.clone(),
                name,
                doc: None,
                owner: None,
                base: None,
                upcast: None,
                native,
                ctors: Vec::new(),
                methods: Vec::new(),
                fields: Vec::new(),
                repr: None,
                dynamic_attr: false,
                polymorphic: false,
            },
            base_name: None,
            _marker: PhantomData,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.desc.doc = Some(doc.into());
        self
    }

    /// Allow attaching attributes that the native type does not declare.
    pub fn dynamic_attr(mut self) -> Self {
        self.desc.dynamic_attr = true;
        self
    }

    /// Instances may be owned and destroyed through this class.
    pub fn polymorphic(mut self) -> Self {
        self.desc.polymorphic = true;
        self
    }

    /// Derive from a polymorphic base that has no native layout to upcast to.
    pub fn extends_dyn(mut self, base: impl Into<String>) -> Self {
        self.base_name = Some(base.into());
        self
    }
}

impl ClassBuilder<Opaque> {
    /// A class without native storage or constructor, usable only as a base.
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::blank(name.into(), None)
    }
}

impl<T: Send + 'static> ClassBuilder<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::blank(name.into(), Some(TypeId::of::<T>()))
    }

    /// Derive from `base`, reaching the base subobject through `project`.
    pub fn extends<B: 'static>(mut self, base: impl Into<String>, project: fn(&mut T) -> &mut B) -> Self {
        self.base_name = Some(base.into());
        self.desc.upcast = Some(lens(move |native| {
            native
                .downcast_mut::<T>()
                .map(|this| project(this) as &mut dyn Any)
        }));
        self
    }

    /// Add a constructor overload.
    pub fn init<F>(mut self, params: impl IntoIterator<Item = Param>, f: F) -> Self
    where
        F: Fn(&Args) -> BindResult<T> + Send + Sync + 'static,
    {
        self.desc.ctors.push(Constructor {
            signature: Signature::new(params),
            call: Arc::new(move |args: &Args| f(args).map(|this| Box::new(this) as Native)),
        });
        self
    }

    /// Add a method overload.
    pub fn def<R, F>(self, name: impl Into<String>, params: impl IntoIterator<Item = Param>, f: F) -> Self
    where
        R: IntoValue,
        F: Fn(&mut T, &Args) -> BindResult<R> + Send + Sync + 'static,
    {
        self.def_with_doc(name, None::<String>, params, f)
    }

    /// Add a method overload with a doc string.
    pub fn def_with_doc<R, F>(
        mut self,
        name: impl Into<String>,
        doc: Option<impl Into<String>>,
        params: impl IntoIterator<Item = Param>,
        f: F,
    ) -> Self
    where
        R: IntoValue,
        F: Fn(&mut T, &Args) -> BindResult<R> + Send + Sync + 'static,
    {
        self.desc.methods.push(Method {
            name: name.into(),
            doc: doc.map(Into::into),
            signature: Signature::new(params),
            call: Arc::new(move |native: &mut dyn Any, args: &Args| {
                f(downcast::<T>(native)?, args).map(IntoValue::into_value)
            }),
        });
        self
    }

    /// Expose a member by copy.
    pub fn def_readwrite<V>(mut self, name: impl Into<String>, member: fn(&mut T) -> &mut V) -> Self
    where
        V: IntoValue + FromValue + Clone + 'static,
    {
        self.desc.fields.push(Field {
            name: name.into(),
            access: FieldAccess::Copy {
                ty: Some(V::type_spec()),
                get: Arc::new(move |_module: &Module, native: &mut dyn Any| {
                    Ok(member(downcast::<T>(native)?).clone().into_value())
                }),
                set: Arc::new(move |native: &mut dyn Any, value: &Value| {
                    let v = V::from_value(value)?;
                    *member(downcast::<T>(native)?) = v;
                    Ok(())
                }),
            },
        });
        self
    }

    /// Expose an enum member.
    pub fn def_readwrite_enum<E: NativeEnum>(
        mut self,
        name: impl Into<String>,
        member: fn(&mut T) -> &mut E,
    ) -> Self {
        self.desc.fields.push(Field {
            name: name.into(),
            access: FieldAccess::Copy {
                ty: None,
                get: Arc::new(move |module: &Module, native: &mut dyn Any| {
                    let variant = *member(downcast::<T>(native)?);
                    module.enum_value(variant)
                }),
                set: Arc::new(move |native: &mut dyn Any, value: &Value| {
                    let variant = value
                        .as_enum()
                        .ok_or_else(|| {
                            BindError::type_error(format!(
                                "expected enumeration, got {}",
                                value.type_name()
                            ))
                        })?
                        .to_native::<E>()?;
                    *member(downcast::<T>(native)?) = variant;
                    Ok(())
                }),
            },
        });
        self
    }

    /// Expose a nested value-type member by reference.
    ///
    /// Reads return a handle aliasing the member, so writes through it land
    /// in the owner. Assigning copies the native value out of the source.
    pub fn def_readwrite_nested<N>(mut self, name: impl Into<String>, member: fn(&mut T) -> &mut N) -> Self
    where
        N: Clone + Send + 'static,
    {
        self.desc.fields.push(Field {
            name: name.into(),
            access: FieldAccess::Reference {
                native: TypeId::of::<N>(),
                lens: lens(move |native| {
                    native
                        .downcast_mut::<T>()
                        .map(|this| member(this) as &mut dyn Any)
                }),
                extract: Arc::new(|value: &Value| {
                    let source = value.as_object().ok_or_else(|| {
                        BindError::type_error(format!(
                            "expected {}, got {}",
                            std::any::type_name::<N>(),
                            value.type_name()
                        ))
                    })?;
                    let copy = source.with_native::<N, _>(|n| n.clone())?;
                    Ok(Box::new(copy) as Native)
                }),
                store: Arc::new(move |native: &mut dyn Any, incoming: Native| {
                    let copy = incoming.downcast::<N>().map_err(|_| {
                        BindError::type_error(format!(
                            "expected {}",
                            std::any::type_name::<N>()
                        ))
                    })?;
                    *member(downcast::<T>(native)?) = *copy;
                    Ok(())
                }),
            },
        });
        self
    }

    /// Custom representation used instead of the default one.
    pub fn repr(mut self, f: fn(&T) -> String) -> Self {
        self.desc.repr = Some(Arc::new(move |native: &dyn Any| {
            native.downcast_ref::<T>().map(f)
        }));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::literals::ArgLiteral;

    #[derive(Clone, Default)]
    struct Counter {
        hits: i64,
    }

    #[test]
    fn test_builder_records_members() {
        let builder = ClassBuilder::<Counter>::new("Counter")
            .init([], |_| Ok(Counter::default()))
            .def("hit", ["by".with_default(1)], |c: &mut Counter, a| {
                c.hits += a.get::<i64>(0)?;
                Ok(c.hits)
            })
            .def_readwrite("hits", |c: &mut Counter| &mut c.hits);

        assert_eq!(builder.desc.ctors.len(), 1);
        assert_eq!(builder.desc.methods[0].name(), "hit");
        assert_eq!(builder.desc.methods[0].signature().to_string(), "(by: int = 1)");
        assert!(!builder.desc.fields[0].is_reference());
        assert_eq!(builder.desc.native, Some(TypeId::of::<Counter>()));
    }

    #[test]
    fn test_method_rejects_foreign_receiver() {
        let builder = ClassBuilder::<Counter>::new("Counter")
            .def("hit", [], |c: &mut Counter, _| Ok(c.hits));
        let mut wrong: Box<dyn Any> = Box::new(5u8);
        let err = builder.desc.methods[0]
            .invoke(wrong.as_mut(), &Args::default())
            .unwrap_err();
        assert!(matches!(err, BindError::Type(_)));
    }

    #[test]
    fn test_abstract_class_has_no_native_type() {
        let builder = ClassBuilder::<Opaque>::abstract_class("Shape").polymorphic();
        assert!(builder.desc.native.is_none());
        assert!(builder.desc.is_polymorphic());
    }
}
