//! Error taxonomy shared by the registrar and the call adapters.

use thiserror::Error;

/// Errors surfaced to host callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    /// Unknown keyword, missing required argument, or too many arguments.
    #[error("ArgumentError: {0}")]
    Argument(String),
    /// A value does not convert to the declared type, or no overload matches.
    #[error("TypeError: {0}")]
    Type(String),
    /// Module-load-time failure, e.g. a base class registered after its subclass.
    #[error("RegistrationError: {0}")]
    Registration(String),
    /// Unknown attribute, method or field.
    #[error("AttributeError: {0}")]
    Attribute(String),
    /// Unknown module, enumeration name or enumeration value.
    #[error("LookupError: {0}")]
    Lookup(String),
}

impl BindError {
    pub fn argument(msg: impl Into<String>) -> Self {
        BindError::Argument(msg.into())
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        BindError::Type(msg.into())
    }

    pub fn registration(msg: impl Into<String>) -> Self {
        BindError::Registration(msg.into())
    }

    pub fn attribute(msg: impl Into<String>) -> Self {
        BindError::Attribute(msg.into())
    }

    pub fn lookup(msg: impl Into<String>) -> Self {
        BindError::Lookup(msg.into())
    }
}

pub type BindResult<T> = Result<T, BindError>;
