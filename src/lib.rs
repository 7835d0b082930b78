//! mylib - expose native Rust types and functions to a dynamic host.
//!
//! Modules are declared once through a typed registrar and published as
//! read-only descriptor tables:
//!
//! - Free functions with defaults, keyword arguments and overload sets
//! - Classes with constructors, method overloads and read-write fields
//! - Inheritance by composition (upcast lens) or through a trait object
//! - Enumerations and value types nested under a class
//! - Per-instance dynamic attributes
//! - FFI layer for Python (cffi) and other language bindings
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     FFI Layer (mylib.h)             │
//! │  status codes, value/module handles │
//! └─────────────────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────┐
//! │   Registry (lazy, read-only table)  │
//! └─────────────────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────┐
//! │           Binding Surface           │
//! │  ┌───────────┐  ┌───────────────┐  │
//! │  │ Registrar │  │ Call / Class  │  │
//! │  │ (Builder) │  │   Adapters    │  │
//! │  └───────────┘  └───────────────┘  │
//! │  ┌───────────┐  ┌───────────────┐  │
//! │  │   Enums   │  │  Host Values  │  │
//! │  └───────────┘  └───────────────┘  │
//! └─────────────────────────────────────┘
//! ```
//!
//! # FFI Usage
//!
//! ```c
//! // Load a module
//! ModuleHandle m;
//! mylib_module_load("mylib_object", &m);
//!
//! // Call a factory and a method
//! ValueHandle pet, sound;
//! mylib_module_call(m, "pet_store", NULL, 0, NULL, NULL, 0, &pet);
//! mylib_object_call_method(pet, "bark", NULL, 0, NULL, NULL, 0, &sound);
//!
//! // Cleanup
//! mylib_value_free(sound);
//! mylib_value_free(pet);
//! mylib_module_free(m);
//! ```
//!
//! # Rust Usage
//!
//! ```
//! use mylib::{registry, Value};
//!
//! let m = registry::load("mylib").unwrap();
//! assert_eq!(m.call("add", &[Value::Int(2)]).unwrap(), Value::Int(4));
//! ```

pub mod binding;
pub mod config;
pub mod demo;
pub mod error;
pub mod ffi;
pub mod registry;
pub mod value;

// Re-export commonly used items
pub use binding::{
    ArgLiteral, ClassBuilder, ClassRef, EnumBuilder, EnumValue, Function, Module, ModuleBuilder,
    ObjectRef, Opaque, Param,
};
pub use config::{BindingConfig, OverloadPolicy};
pub use error::{BindError, BindResult};
pub use value::{FromValue, IntoValue, NativeEnum, TypeSpec, Value};

// Re-export FFI types for cbindgen
pub use ffi::module::*;
pub use ffi::object::*;
pub use ffi::types::*;
pub use ffi::value::*;
