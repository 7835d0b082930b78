//! Conversions between native Rust values and host [`Value`]s.

use super::host_value::Value;
use super::type_spec::TypeSpec;
use crate::binding::{EnumValue, ObjectRef};
use crate::error::{BindError, BindResult};

/// Native value that converts to a host value without module context.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Native value that can be read back from a host value.
pub trait FromValue: Sized {
    /// Declared type used in signatures and field descriptors.
    fn type_spec() -> TypeSpec;

    fn from_value(value: &Value) -> BindResult<Self>;
}

/// A fieldless native enum with integral discriminants.
///
/// Host values for an enum are produced by the module that registered it,
/// see [`crate::binding::Module::enum_value`].
pub trait NativeEnum: Copy + Send + Sync + 'static {
    fn to_repr(self) -> i64;

    fn from_repr(value: i64) -> Option<Self>;
}

macro_rules! into_value_via_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                #[inline]
                fn into_value(self) -> Value {
                    Value::from(self)
                }
            }
        )*
    };
}

into_value_via_from!(bool, i32, i64, f32, f64, String, &str, EnumValue, ObjectRef);

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::None
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

fn mismatch(expected: &TypeSpec, value: &Value) -> BindError {
    BindError::type_error(format!(
        "expected {}, got {}",
        expected,
        value.type_name()
    ))
}

impl FromValue for bool {
    fn type_spec() -> TypeSpec {
        TypeSpec::Bool
    }

    fn from_value(value: &Value) -> BindResult<Self> {
        value
            .as_bool()
            .ok_or_else(|| mismatch(&Self::type_spec(), value))
    }
}

impl FromValue for i64 {
    fn type_spec() -> TypeSpec {
        TypeSpec::Int
    }

    fn from_value(value: &Value) -> BindResult<Self> {
        value
            .as_int()
            .ok_or_else(|| mismatch(&Self::type_spec(), value))
    }
}

impl FromValue for i32 {
    fn type_spec() -> TypeSpec {
        TypeSpec::Int
    }

    fn from_value(value: &Value) -> BindResult<Self> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide)
            .map_err(|_| BindError::type_error(format!("integer {} out of range for int32", wide)))
    }
}

impl FromValue for f64 {
    fn type_spec() -> TypeSpec {
        TypeSpec::Float
    }

    fn from_value(value: &Value) -> BindResult<Self> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(i) => Ok(*i as f64),
            other => Err(mismatch(&Self::type_spec(), other)),
        }
    }
}

impl FromValue for f32 {
    fn type_spec() -> TypeSpec {
        TypeSpec::Float
    }

    fn from_value(value: &Value) -> BindResult<Self> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl FromValue for String {
    fn type_spec() -> TypeSpec {
        TypeSpec::Str
    }

    fn from_value(value: &Value) -> BindResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(&Self::type_spec(), value))
    }
}

impl FromValue for Value {
    fn type_spec() -> TypeSpec {
        TypeSpec::Any
    }

    fn from_value(value: &Value) -> BindResult<Self> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_rejects_str() {
        let err = i64::from_value(&Value::from("Rex")).unwrap_err();
        assert_eq!(err, BindError::type_error("expected int, got str"));
    }

    #[test]
    fn test_i32_range_check() {
        assert_eq!(i32::from_value(&Value::Int(5)).unwrap(), 5);
        assert!(matches!(
            i32::from_value(&Value::Int(i64::MAX)),
            Err(BindError::Type(_))
        ));
    }

    #[test]
    fn test_float_accepts_int() {
        assert_eq!(f32::from_value(&Value::Int(2)).unwrap(), 2.0);
    }

    #[test]
    fn test_unit_is_none() {
        assert!(().into_value().is_none());
    }
}
