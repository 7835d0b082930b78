//! C-compatible type definitions and shared FFI helpers.

use crate::config::{BindingConfig, OverloadPolicy};
use crate::error::BindError;
use crate::value::Value;
use libc::c_char;
use std::cell::RefCell;
use std::ffi::CStr;

/// Result status codes for FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer was passed.
    NullPointer = 1,
    /// Invalid UTF-8 string.
    InvalidUtf8 = 2,
    /// Bad argument count, unknown or duplicate keyword.
    ArgumentError = 3,
    /// Value not convertible to the declared type, or no overload matched.
    TypeError = 4,
    /// Module load failed.
    RegistrationError = 5,
    /// Unknown attribute, method or member.
    AttributeError = 6,
    /// Unknown module, enumeration entry or value.
    LookupError = 7,
}

impl From<&BindError> for BindStatus {
    fn from(err: &BindError) -> Self {
        match err {
            BindError::Argument(_) => BindStatus::ArgumentError,
            BindError::Type(_) => BindStatus::TypeError,
            BindError::Registration(_) => BindStatus::RegistrationError,
            BindError::Attribute(_) => BindStatus::AttributeError,
            BindError::Lookup(_) => BindStatus::LookupError,
        }
    }
}

/// Binding configuration passed to `mylib_configure`.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct CBindingConfig {
    /// Overload tie-break rule.
    pub overload_policy: OverloadPolicy,
    /// Accept integers where a float is declared.
    pub implicit_conversions: bool,
}

impl Default for CBindingConfig {
    fn default() -> Self {
        BindingConfig::default().into()
    }
}

impl From<CBindingConfig> for BindingConfig {
    fn from(c: CBindingConfig) -> Self {
        BindingConfig {
            overload_policy: c.overload_policy,
            implicit_conversions: c.implicit_conversions,
        }
    }
}

impl From<BindingConfig> for CBindingConfig {
    fn from(c: BindingConfig) -> Self {
        CBindingConfig {
            overload_policy: c.overload_policy,
            implicit_conversions: c.implicit_conversions,
        }
    }
}

/// Kind tag of a value handle.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CValueKind {
    None = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    Str = 4,
    Enum = 5,
    Object = 6,
}

impl From<&Value> for CValueKind {
    fn from(value: &Value) -> Self {
        match value {
            Value::None => CValueKind::None,
            Value::Bool(_) => CValueKind::Bool,
            Value::Int(_) => CValueKind::Int,
            Value::Float(_) => CValueKind::Float,
            Value::Str(_) => CValueKind::Str,
            Value::Enum(_) => CValueKind::Enum,
            Value::Object(_) => CValueKind::Object,
        }
    }
}

/// Opaque handle to a host value.
pub type ValueHandle = *mut Value;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(message: impl Into<String>) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message.into()));
}

pub(crate) fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Record `err` as the calling thread's last error.
pub(crate) fn fail(err: BindError) -> BindStatus {
    let status = BindStatus::from(&err);
    tracing::trace!(?status, error = %err, "ffi call failed");
    set_last_error(err.to_string());
    status
}

pub(crate) fn null_pointer(what: &str) -> BindStatus {
    set_last_error(format!("null pointer passed for {}", what));
    BindStatus::NullPointer
}

/// Borrow a C string argument.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, BindStatus> {
    if ptr.is_null() {
        return Err(null_pointer(what));
    }
    CStr::from_ptr(ptr).to_str().map_err(|_| {
        set_last_error(format!("{} is not valid UTF-8", what));
        BindStatus::InvalidUtf8
    })
}

/// Copy `text` into a caller buffer, truncating and NUL-terminating.
/// `out_len` receives the full length so callers can retry with more room.
///
/// # Safety
/// `buffer` must have room for `buffer_len` bytes; `out_len` must be valid.
pub(crate) unsafe fn write_str_buf(
    text: &str,
    buffer: *mut c_char,
    buffer_len: usize,
    out_len: *mut usize,
) -> BindStatus {
    if buffer.is_null() || out_len.is_null() {
        return null_pointer("output buffer");
    }
    if buffer_len > 0 {
        let bytes = text.as_bytes();
        let copy_len = bytes.len().min(buffer_len - 1);
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buffer as *mut u8, copy_len);
        *buffer.add(copy_len) = 0;
    }
    *out_len = text.len();
    BindStatus::Ok
}

/// Hand a value to the caller as a new handle.
///
/// # Safety
/// `out` must be valid.
pub(crate) unsafe fn emit(value: Value, out: *mut ValueHandle) -> BindStatus {
    *out = Box::into_raw(Box::new(value));
    BindStatus::Ok
}

/// Gather call arguments from parallel C arrays.
///
/// # Safety
/// `args` must hold `nargs` valid value handles; `kw_names` and `kw_values`
/// must each hold `nkw` entries.
pub(crate) unsafe fn collect_args<'a>(
    args: *const ValueHandle,
    nargs: usize,
    kw_names: *const *const c_char,
    kw_values: *const ValueHandle,
    nkw: usize,
) -> Result<(Vec<Value>, Vec<(&'a str, Value)>), BindStatus> {
    let mut positional = Vec::with_capacity(nargs);
    if nargs > 0 {
        if args.is_null() {
            return Err(null_pointer("args"));
        }
        for &handle in std::slice::from_raw_parts(args, nargs) {
            if handle.is_null() {
                return Err(null_pointer("argument value"));
            }
            positional.push((*handle).clone());
        }
    }

    let mut keywords = Vec::with_capacity(nkw);
    if nkw > 0 {
        if kw_names.is_null() || kw_values.is_null() {
            return Err(null_pointer("keyword arguments"));
        }
        let names = std::slice::from_raw_parts(kw_names, nkw);
        let values = std::slice::from_raw_parts(kw_values, nkw);
        for (&name, &handle) in names.iter().zip(values) {
            if handle.is_null() {
                return Err(null_pointer("keyword value"));
            }
            keywords.push((c_str(name, "keyword name")?, (*handle).clone()));
        }
    }
    Ok((positional, keywords))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BindStatus::from(&BindError::lookup("x")),
            BindStatus::LookupError
        );
        assert_eq!(fail(BindError::type_error("bad")), BindStatus::TypeError);
        assert_eq!(last_error().as_deref(), Some("TypeError: bad"));
    }

    #[test]
    fn test_write_str_buf_truncates() {
        let mut buf = [0 as c_char; 4];
        let mut len = 0usize;
        let status = unsafe { write_str_buf("World", buf.as_mut_ptr(), buf.len(), &mut len) };
        assert_eq!(status, BindStatus::Ok);
        assert_eq!(len, 5);
        let written = unsafe { CStr::from_ptr(buf.as_ptr()) };
        assert_eq!(written.to_str().unwrap(), "Wor");
    }

    #[test]
    fn test_config_round_trip() {
        let c: CBindingConfig = BindingConfig::strict().into();
        let back: BindingConfig = c.into();
        assert_eq!(back.overload_policy, OverloadPolicy::RejectAmbiguous);
        assert!(!back.implicit_conversions);
    }
}
