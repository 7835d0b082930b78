//! Function descriptors, argument binding and overload resolution.

use super::module::Module;
use crate::config::{BindingConfig, OverloadPolicy};
use crate::error::{BindError, BindResult};
use crate::value::{FromValue, IntoValue, TypeSpec, Value};
use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub(crate) type NativeFn = Arc<dyn Fn(&Module, &Args) -> BindResult<Value> + Send + Sync>;

/// A declared parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeSpec,
    pub default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeSpec) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn default(mut self, value: impl IntoValue) -> Self {
        self.default = Some(value.into_value());
        self
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)?;
        if let Some(default) = &self.default {
            write!(f, " = {}", default.repr())?;
        }
        Ok(())
    }
}

/// Ordered parameter list of one overload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new(params: impl IntoIterator<Item = Param>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Registration-time checks: unique names, defaults assignable to their type.
    pub(crate) fn validate(&self, owner: &str) -> BindResult<()> {
        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(param.name.as_str()) {
                return Err(BindError::registration(format!(
                    "{}: duplicate parameter '{}'",
                    owner, param.name
                )));
            }
            if let Some(default) = &param.default {
                if !param.ty.accepts(default, true) {
                    return Err(BindError::registration(format!(
                        "{}: default {} is not assignable to parameter '{}: {}'",
                        owner,
                        default.repr(),
                        param.name,
                        param.ty
                    )));
                }
            }
        }
        Ok(())
    }

    /// Match positional and keyword arguments against the parameters.
    pub fn bind(
        &self,
        args: &[Value],
        kwargs: &[(&str, Value)],
        implicit: bool,
    ) -> BindResult<Args> {
        if args.len() > self.params.len() {
            return Err(BindError::argument(format!(
                "takes at most {} positional arguments ({} given)",
                self.params.len(),
                args.len()
            )));
        }

        let mut slots: Vec<Option<Value>> = args.iter().cloned().map(Some).collect();
        slots.resize(self.params.len(), None);

        for (key, value) in kwargs {
            let idx = self
                .params
                .iter()
                .position(|p| p.name == *key)
                .ok_or_else(|| {
                    BindError::argument(format!("unexpected keyword argument '{}'", key))
                })?;
            if slots[idx].is_some() {
                return Err(BindError::argument(format!(
                    "got multiple values for argument '{}'",
                    key
                )));
            }
            slots[idx] = Some(value.clone());
        }

        let mut values = Vec::with_capacity(self.params.len());
        for (param, slot) in self.params.iter().zip(slots) {
            let value = match slot.or_else(|| param.default.clone()) {
                Some(v) => v,
                None => {
                    return Err(BindError::argument(format!(
                        "missing required argument '{}'",
                        param.name
                    )))
                }
            };
            let coerced = param.ty.coerce(&value, implicit).ok_or_else(|| {
                BindError::type_error(format!(
                    "argument '{}': expected {}, got {}",
                    param.name,
                    param.ty,
                    value.type_name()
                ))
            })?;
            values.push(coerced);
        }

        Ok(Args { values })
    }

    /// Every class or enum name this signature refers to.
    pub(crate) fn referenced_types(&self) -> impl Iterator<Item = &TypeSpec> {
        self.params
            .iter()
            .map(|p| &p.ty)
            .filter(|ty| matches!(ty, TypeSpec::Class(_) | TypeSpec::Enum(_)))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

/// Arguments after binding: one converted value per declared parameter.
#[derive(Clone, Debug, Default)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> BindResult<&Value> {
        self.values
            .get(index)
            .ok_or_else(|| BindError::argument(format!("no argument at position {}", index)))
    }

    /// Typed access to the argument at `index`.
    pub fn get<V: FromValue>(&self, index: usize) -> BindResult<V> {
        V::from_value(self.value(index)?)
    }

    /// Native enum argument.
    pub fn get_enum<E: crate::value::NativeEnum>(&self, index: usize) -> BindResult<E> {
        let value = self.value(index)?;
        value
            .as_enum()
            .ok_or_else(|| {
                BindError::type_error(format!("expected enumeration, got {}", value.type_name()))
            })?
            .to_native::<E>()
    }
}

/// Anything resolvable by signature: functions, methods, constructors.
pub(crate) trait Overload {
    fn signature(&self) -> &Signature;
}

/// Pick the overload accepting the arguments, trying them in declaration order.
pub(crate) fn resolve<'o, O: Overload>(
    name: &str,
    overloads: &[&'o O],
    args: &[Value],
    kwargs: &[(&str, Value)],
    config: &BindingConfig,
) -> BindResult<(&'o O, Args)> {
    let mut matched: Option<(usize, &'o O, Args)> = None;
    let mut errors = Vec::new();

    for (i, &overload) in overloads.iter().enumerate() {
        match overload
            .signature()
            .bind(args, kwargs, config.implicit_conversions)
        {
            Ok(bound) => {
                if let Some((first, ..)) = &matched {
                    return Err(BindError::type_error(format!(
                        "{}(): ambiguous call, overloads {} and {} both accept the arguments",
                        name,
                        first + 1,
                        i + 1
                    )));
                }
                matched = Some((i, overload, bound));
                if config.overload_policy == OverloadPolicy::FirstMatch {
                    break;
                }
            }
            Err(err) => errors.push(err),
        }
    }

    if let Some((i, overload, bound)) = matched {
        tracing::trace!(function = name, overload = i + 1, "overload selected");
        return Ok((overload, bound));
    }

    if overloads.len() == 1 {
        if let Some(err) = errors.pop() {
            return Err(err);
        }
    }

    let supported: Vec<String> = overloads
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}. {}{}", i + 1, name, o.signature()))
        .collect();
    let invoked: Vec<String> = args
        .iter()
        .map(Value::repr)
        .chain(kwargs.iter().map(|(k, v)| format!("{}={}", k, v.repr())))
        .collect();

    Err(BindError::type_error(format!(
        "{}(): incompatible function arguments. Supported: {}. Invoked with: {}",
        name,
        supported.join("; "),
        invoked.join(", ")
    )))
}

/// A free function exposed on a module.
#[derive(Clone)]
pub struct Function {
    name: String,
    doc: Option<String>,
    signature: Signature,
    returns: TypeSpec,
    produces: Option<TypeId>,
    call: NativeFn,
}

impl Function {
    /// Bind a native function whose result converts without module context.
    pub fn new<R, F>(name: impl Into<String>, params: impl IntoIterator<Item = Param>, f: F) -> Self
    where
        R: IntoValue,
        F: Fn(&Args) -> BindResult<R> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            doc: None,
            signature: Signature::new(params),
            returns: TypeSpec::Any,
            produces: None,
            call: Arc::new(move |_module: &Module, args: &Args| f(args).map(IntoValue::into_value)),
        }
    }

    /// Bind a factory that transfers ownership of a new instance to the host.
    ///
    /// `returns` is the declared class; `produces` is the native type the
    /// factory actually creates, which must be that class or a subclass.
    pub fn factory<F>(
        name: impl Into<String>,
        returns: impl Into<String>,
        produces: TypeId,
        f: F,
    ) -> Self
    where
        F: Fn() -> Box<dyn Any + Send> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            doc: None,
            signature: Signature::default(),
            returns: TypeSpec::Class(returns.into()),
            produces: Some(produces),
            call: Arc::new(move |module: &Module, _args: &Args| {
                module.adopt(f()).map(Value::Object)
            }),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn returns(mut self, ty: TypeSpec) -> Self {
        self.returns = ty;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc_str(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn return_type(&self) -> &TypeSpec {
        &self.returns
    }

    pub(crate) fn produces(&self) -> Option<TypeId> {
        self.produces
    }

    pub(crate) fn invoke(&self, module: &Module, args: &Args) -> BindResult<Value> {
        (self.call)(module, args)
    }
}

impl Overload for Function {
    fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} -> {}", self.name, self.signature, self.returns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_signature() -> Signature {
        Signature::new([
            Param::new("i", TypeSpec::Int).default(1i64),
            Param::new("j", TypeSpec::Int).default(2i64),
        ])
    }

    #[test]
    fn test_bind_fills_defaults() {
        let bound = add_signature().bind(&[], &[], true).unwrap();
        assert_eq!(bound.get::<i64>(0).unwrap(), 1);
        assert_eq!(bound.get::<i64>(1).unwrap(), 2);
    }

    #[test]
    fn test_bind_keyword_arguments() {
        let bound = add_signature()
            .bind(&[], &[("j", Value::Int(10))], true)
            .unwrap();
        assert_eq!(bound.get::<i64>(0).unwrap(), 1);
        assert_eq!(bound.get::<i64>(1).unwrap(), 10);
    }

    #[test]
    fn test_unknown_keyword_is_argument_error() {
        let err = add_signature()
            .bind(&[], &[("k", Value::Int(1))], true)
            .unwrap_err();
        assert!(matches!(err, BindError::Argument(_)));
    }

    #[test]
    fn test_duplicate_and_excess_arguments() {
        let sig = add_signature();
        assert!(matches!(
            sig.bind(&[Value::Int(1)], &[("i", Value::Int(2))], true),
            Err(BindError::Argument(_))
        ));
        assert!(matches!(
            sig.bind(&[Value::Int(1), Value::Int(2), Value::Int(3)], &[], true),
            Err(BindError::Argument(_))
        ));
    }

    #[test]
    fn test_missing_required_argument() {
        let sig = Signature::new([Param::new("name", TypeSpec::Str)]);
        assert_eq!(
            sig.bind(&[], &[], true).unwrap_err(),
            BindError::argument("missing required argument 'name'")
        );
    }

    #[test]
    fn test_wrong_type_is_type_error() {
        let err = add_signature()
            .bind(&[Value::from("one")], &[], true)
            .unwrap_err();
        assert!(matches!(err, BindError::Type(_)));
    }

    #[test]
    fn test_validate_rejects_bad_default() {
        let sig = Signature::new([Param::new("i", TypeSpec::Int).default("one")]);
        assert!(matches!(
            sig.validate("f"),
            Err(BindError::Registration(_))
        ));
    }

    #[test]
    fn test_signature_display() {
        assert_eq!(add_signature().to_string(), "(i: int = 1, j: int = 2)");
    }

    #[derive(Debug)]
    struct Candidate(Signature);

    impl Overload for Candidate {
        fn signature(&self) -> &Signature {
            &self.0
        }
    }

    fn float_then_int() -> Vec<Candidate> {
        vec![
            Candidate(Signature::new([Param::new("x", TypeSpec::Float)])),
            Candidate(Signature::new([Param::new("x", TypeSpec::Int)])),
        ]
    }

    #[test]
    fn test_first_match_wins() {
        let overloads = float_then_int();
        let refs: Vec<&Candidate> = overloads.iter().collect();
        let (chosen, bound) =
            resolve("f", &refs, &[Value::Int(5)], &[], &BindingConfig::default()).unwrap();
        assert!(std::ptr::eq(chosen, &overloads[0]));
        assert_eq!(bound.value(0).unwrap(), &Value::Float(5.0));
    }

    #[test]
    fn test_reject_ambiguous_policy() {
        let overloads = float_then_int();
        let refs: Vec<&Candidate> = overloads.iter().collect();
        let config = BindingConfig {
            overload_policy: OverloadPolicy::RejectAmbiguous,
            implicit_conversions: true,
        };
        let err = resolve("f", &refs, &[Value::Int(5)], &[], &config).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));

        // A float is only accepted by the first overload, so it is not ambiguous.
        assert!(resolve("f", &refs, &[Value::Float(1.5)], &[], &config).is_ok());
    }

    #[test]
    fn test_no_overload_matches() {
        let overloads = float_then_int();
        let refs: Vec<&Candidate> = overloads.iter().collect();
        let err = resolve("f", &refs, &[Value::from("x")], &[], &BindingConfig::default())
            .unwrap_err();
        assert!(matches!(err, BindError::Type(ref m) if m.contains("Supported")));
    }
}
