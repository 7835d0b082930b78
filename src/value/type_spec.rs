//! Declared parameter, return and field types.

use super::host_value::Value;
use std::fmt;

/// The type a descriptor declares for a parameter, return value or field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    /// Accepts anything.
    Any,
    /// Return type of functions with no result.
    None,
    Bool,
    Int,
    Float,
    Str,
    /// Enumeration, by qualified name (e.g. `Pet_EI.Kind`).
    Enum(String),
    /// Bound class, by qualified name. Accepts instances of subclasses.
    Class(String),
}

impl TypeSpec {
    pub fn class(qualname: impl Into<String>) -> Self {
        TypeSpec::Class(qualname.into())
    }

    pub fn enumeration(qualname: impl Into<String>) -> Self {
        TypeSpec::Enum(qualname.into())
    }

    /// Infer the declared type from a default value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::None => TypeSpec::Any,
            Value::Bool(_) => TypeSpec::Bool,
            Value::Int(_) => TypeSpec::Int,
            Value::Float(_) => TypeSpec::Float,
            Value::Str(_) => TypeSpec::Str,
            Value::Enum(e) => TypeSpec::Enum(e.qualname().to_string()),
            Value::Object(o) => TypeSpec::Class(o.type_name().to_string()),
        }
    }

    /// Convert `value` to this type, or `None` if it is not accepted.
    ///
    /// With `implicit` set, integers widen to floats. No other conversion is
    /// attempted: booleans are not integers and floats never truncate.
    pub fn coerce(&self, value: &Value, implicit: bool) -> Option<Value> {
        match (self, value) {
            (TypeSpec::Any, v) => Some(v.clone()),
            (TypeSpec::None, Value::None) => Some(Value::None),
            (TypeSpec::Bool, Value::Bool(_)) => Some(value.clone()),
            (TypeSpec::Int, Value::Int(_)) => Some(value.clone()),
            (TypeSpec::Float, Value::Float(_)) => Some(value.clone()),
            (TypeSpec::Float, Value::Int(i)) if implicit => Some(Value::Float(*i as f64)),
            (TypeSpec::Str, Value::Str(_)) => Some(value.clone()),
            (TypeSpec::Enum(name), Value::Enum(e)) if e.qualname() == name => Some(value.clone()),
            (TypeSpec::Class(name), Value::Object(o)) if o.is_instance(name) => Some(value.clone()),
            _ => None,
        }
    }

    #[inline]
    pub fn accepts(&self, value: &Value, implicit: bool) -> bool {
        self.coerce(value, implicit).is_some()
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Any => write!(f, "object"),
            TypeSpec::None => write!(f, "None"),
            TypeSpec::Bool => write!(f, "bool"),
            TypeSpec::Int => write!(f, "int"),
            TypeSpec::Float => write!(f, "float"),
            TypeSpec::Str => write!(f, "str"),
            TypeSpec::Enum(name) | TypeSpec::Class(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_widens_to_float_only_when_implicit() {
        assert_eq!(
            TypeSpec::Float.coerce(&Value::Int(2), true),
            Some(Value::Float(2.0))
        );
        assert!(!TypeSpec::Float.accepts(&Value::Int(2), false));
    }

    #[test]
    fn test_no_narrowing_or_bool_to_int() {
        assert!(!TypeSpec::Int.accepts(&Value::Float(2.0), true));
        assert!(!TypeSpec::Int.accepts(&Value::Bool(true), true));
    }

    #[test]
    fn test_infer_from_default() {
        assert_eq!(TypeSpec::of(&Value::Int(1)), TypeSpec::Int);
        assert_eq!(TypeSpec::of(&Value::from("x")), TypeSpec::Str);
    }
}
