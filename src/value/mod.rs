//! Dynamic host values and the native conversions around them.

pub mod convert;
pub mod host_value;
pub mod type_spec;

pub use convert::{FromValue, IntoValue, NativeEnum};
pub use host_value::Value;
pub use type_spec::TypeSpec;
