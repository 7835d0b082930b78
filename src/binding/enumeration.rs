//! Enumerations scoped under a bound class.

use crate::error::{BindError, BindResult};
use crate::value::NativeEnum;
use std::any::TypeId;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A registered enumeration: a closed set of named integral constants.
#[derive(Debug)]
pub struct EnumDescriptor {
    name: String,
    qualname: String,
    entries: Vec<(String, i64)>,
    export_values: bool,
    native: TypeId,
}

impl EnumDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name including the owning scope, e.g. `Pet_EI.Kind`.
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// Whether the entries are also visible in the owning scope.
    pub fn exports_values(&self) -> bool {
        self.export_values
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Look an entry up by name.
    pub fn member(self: &Arc<Self>, name: &str) -> BindResult<EnumValue> {
        self.entries
            .iter()
            .position(|(n, _)| n == name)
            .map(|index| EnumValue {
                ty: Arc::clone(self),
                index,
            })
            .ok_or_else(|| {
                BindError::lookup(format!("'{}' has no member '{}'", self.qualname, name))
            })
    }

    /// Look an entry up by its integral value.
    pub fn from_value(self: &Arc<Self>, value: i64) -> BindResult<EnumValue> {
        self.entries
            .iter()
            .position(|(_, v)| *v == value)
            .map(|index| EnumValue {
                ty: Arc::clone(self),
                index,
            })
            .ok_or_else(|| {
                BindError::lookup(format!("{} is not a valid {}", value, self.qualname))
            })
    }
}

/// One entry of a registered enumeration.
#[derive(Clone, Debug)]
pub struct EnumValue {
    ty: Arc<EnumDescriptor>,
    index: usize,
}

impl EnumValue {
    pub fn name(&self) -> &str {
        &self.ty.entries[self.index].0
    }

    pub fn value(&self) -> i64 {
        self.ty.entries[self.index].1
    }

    pub fn qualname(&self) -> &str {
        &self.ty.qualname
    }

    pub fn descriptor(&self) -> &Arc<EnumDescriptor> {
        &self.ty
    }

    pub fn repr(&self) -> String {
        format!("<{}: {}>", self, self.value())
    }

    /// Convert back to the native enum it was registered from.
    pub fn to_native<E: NativeEnum>(&self) -> BindResult<E> {
        if self.ty.native != TypeId::of::<E>() {
            return Err(BindError::type_error(format!(
                "{} is not a {}",
                self.ty.qualname,
                std::any::type_name::<E>()
            )));
        }
        E::from_repr(self.value()).ok_or_else(|| {
            BindError::type_error(format!("{} has no native variant for {}", self.ty.qualname, self.value()))
        })
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ty.name, self.name())
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ty, &other.ty) && self.value() == other.value()
    }
}

/// Builder for an enumeration bound from a native enum `E`.
pub struct EnumBuilder<E> {
    name: String,
    entries: Vec<(String, i64)>,
    export_values: bool,
    _marker: PhantomData<fn() -> E>,
}

impl<E: NativeEnum> EnumBuilder<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            export_values: false,
            _marker: PhantomData,
        }
    }

    pub fn value(mut self, name: impl Into<String>, variant: E) -> Self {
        self.entries.push((name.into(), variant.to_repr()));
        self
    }

    /// Also expose every entry as an attribute of the owning scope.
    pub fn export_values(mut self) -> Self {
        self.export_values = true;
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn build(self, qualname: String) -> BindResult<EnumDescriptor> {
        let mut seen = HashSet::new();
        for (name, _) in &self.entries {
            if !seen.insert(name.as_str()) {
                return Err(BindError::registration(format!(
                    "{}: duplicate entry '{}'",
                    qualname, name
                )));
            }
        }
        Ok(EnumDescriptor {
            name: self.name,
            qualname,
            entries: self.entries,
            export_values: self.export_values,
            native: TypeId::of::<E>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Color {
        Red = 0,
        Blue = 5,
    }

    impl NativeEnum for Color {
        fn to_repr(self) -> i64 {
            self as i64
        }

        fn from_repr(value: i64) -> Option<Self> {
            match value {
                0 => Some(Color::Red),
                5 => Some(Color::Blue),
                _ => None,
            }
        }
    }

    fn color() -> Arc<EnumDescriptor> {
        Arc::new(
            EnumBuilder::new("Color")
                .value("Red", Color::Red)
                .value("Blue", Color::Blue)
                .build("Paint.Color".to_string())
                .unwrap(),
        )
    }

    #[test]
    fn test_lookup_by_name_and_value() {
        let ty = color();
        assert_eq!(ty.member("Blue").unwrap().value(), 5);
        assert_eq!(ty.from_value(0).unwrap().name(), "Red");
        assert!(matches!(ty.member("Green"), Err(BindError::Lookup(_))));
        assert!(matches!(ty.from_value(3), Err(BindError::Lookup(_))));
    }

    #[test]
    fn test_display_and_native_round_trip() {
        let blue = color().member("Blue").unwrap();
        assert_eq!(blue.to_string(), "Color.Blue");
        assert_eq!(blue.repr(), "<Color.Blue: 5>");
        assert_eq!(blue.to_native::<Color>().unwrap(), Color::Blue);
    }

    #[test]
    fn test_equality_is_scoped_to_the_enumeration() {
        let a = color();
        let b = color();
        assert_eq!(a.member("Red").unwrap(), a.from_value(0).unwrap());
        assert_ne!(a.member("Red").unwrap(), b.member("Red").unwrap());
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let result = EnumBuilder::new("Color")
            .value("Red", Color::Red)
            .value("Red", Color::Blue)
            .build("Color".to_string());
        assert!(matches!(result, Err(BindError::Registration(_))));
    }
}
