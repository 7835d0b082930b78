//! Registration API and the host-facing object model built from it.

mod class;
mod enumeration;
mod function;
mod literals;
mod module;
mod object;

pub use class::{ClassBuilder, ClassDescriptor, ClassId, Field, Method, Opaque};
pub use enumeration::{EnumBuilder, EnumDescriptor, EnumValue};
pub use function::{Args, Function, Param, Signature};
pub use literals::ArgLiteral;
pub use module::{ClassRef, Module, ModuleBuilder};
pub use object::ObjectRef;
