//! Shorthand parameter declarations: `"i".with_default(1)`.

use super::function::Param;
use crate::value::{IntoValue, TypeSpec};

/// Declare a parameter straight from its name.
pub trait ArgLiteral {
    /// Parameter with a default; the declared type is inferred from it.
    fn with_default(self, value: impl IntoValue) -> Param;

    /// Required parameter of the given type.
    fn typed(self, ty: TypeSpec) -> Param;
}

impl ArgLiteral for &str {
    fn with_default(self, value: impl IntoValue) -> Param {
        let value = value.into_value();
        Param::new(self, TypeSpec::of(&value)).default(value)
    }

    fn typed(self, ty: TypeSpec) -> Param {
        Param::new(self, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_literal_matches_explicit_declaration() {
        let explicit = Param::new("i", TypeSpec::Int).default(1i64);
        assert_eq!("i".with_default(1i64), explicit);
        assert_eq!("i".with_default(1).default, Some(Value::Int(1)));
    }

    #[test]
    fn test_typed_has_no_default() {
        let p = "name".typed(TypeSpec::Str);
        assert_eq!(p.ty, TypeSpec::Str);
        assert!(p.default.is_none());
    }
}
