//! FFI (Foreign Function Interface) layer for C bindings.
//!
//! This module provides C-compatible functions that can be called from
//! Python via cffi, or from any other language that supports C FFI.
//! Failing calls return a non-`Ok` [`BindStatus`] and leave a message for
//! `mylib_last_error` on the calling thread.

pub mod module;
pub mod object;
pub mod types;
pub mod value;

pub use module::*;
pub use object::*;
pub use types::{BindStatus, CBindingConfig, CValueKind, ValueHandle};
pub use value::*;
