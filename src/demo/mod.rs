//! Demonstration modules registered with the built-in registry.

pub mod mylib;
pub mod mylib_object;
pub mod pets;
