//! FFI functions for creating and inspecting value handles.

use super::types::{
    c_str, emit, fail, last_error, null_pointer, write_str_buf, BindStatus, CValueKind,
    ValueHandle,
};
use crate::error::BindError;
use crate::value::Value;
use libc::c_char;

/// # Safety
/// out_value must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_none(out_value: *mut ValueHandle) -> BindStatus {
    if out_value.is_null() {
        return null_pointer("out_value");
    }
    emit(Value::None, out_value)
}

/// # Safety
/// out_value must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_bool(value: bool, out_value: *mut ValueHandle) -> BindStatus {
    if out_value.is_null() {
        return null_pointer("out_value");
    }
    emit(Value::Bool(value), out_value)
}

/// # Safety
/// out_value must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_int(value: i64, out_value: *mut ValueHandle) -> BindStatus {
    if out_value.is_null() {
        return null_pointer("out_value");
    }
    emit(Value::Int(value), out_value)
}

/// # Safety
/// out_value must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_float(value: f64, out_value: *mut ValueHandle) -> BindStatus {
    if out_value.is_null() {
        return null_pointer("out_value");
    }
    emit(Value::Float(value), out_value)
}

/// Create a string value; the text is copied.
///
/// # Safety
/// text must be a valid C string; out_value must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_str(
    text: *const c_char,
    out_value: *mut ValueHandle,
) -> BindStatus {
    if out_value.is_null() {
        return null_pointer("out_value");
    }
    match c_str(text, "text") {
        Ok(s) => emit(Value::from(s), out_value),
        Err(status) => status,
    }
}

/// Free a value handle. Dropping the last handle to an object destroys it.
///
/// # Safety
/// Handle must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_free(handle: ValueHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// New handle to the same value; objects are shared, not copied.
///
/// # Safety
/// Both pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_clone(
    handle: ValueHandle,
    out_value: *mut ValueHandle,
) -> BindStatus {
    if handle.is_null() || out_value.is_null() {
        return null_pointer("value or out_value");
    }
    emit((*handle).clone(), out_value)
}

/// Kind tag of a value. A null handle reads as `None`.
///
/// # Safety
/// Handle must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_kind(handle: ValueHandle) -> CValueKind {
    if handle.is_null() {
        return CValueKind::None;
    }
    CValueKind::from(&*handle)
}

fn wrong_kind(expected: &str, value: &Value) -> BindStatus {
    fail(BindError::type_error(format!(
        "expected {}, got {}",
        expected,
        value.type_name()
    )))
}

/// # Safety
/// Both pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_as_bool(handle: ValueHandle, out: *mut bool) -> BindStatus {
    if handle.is_null() || out.is_null() {
        return null_pointer("value or out");
    }
    match (*handle).as_bool() {
        Some(b) => {
            *out = b;
            BindStatus::Ok
        }
        None => wrong_kind("bool", &*handle),
    }
}

/// Integral value of an int or an enumeration entry.
///
/// # Safety
/// Both pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_as_int(handle: ValueHandle, out: *mut i64) -> BindStatus {
    if handle.is_null() || out.is_null() {
        return null_pointer("value or out");
    }
    let value = &*handle;
    match value.as_int().or_else(|| value.as_enum().map(|e| e.value())) {
        Some(i) => {
            *out = i;
            BindStatus::Ok
        }
        None => wrong_kind("int", value),
    }
}

/// Float value; ints are widened.
///
/// # Safety
/// Both pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_as_float(handle: ValueHandle, out: *mut f64) -> BindStatus {
    if handle.is_null() || out.is_null() {
        return null_pointer("value or out");
    }
    let value = &*handle;
    match value.as_float().or_else(|| value.as_int().map(|i| i as f64)) {
        Some(x) => {
            *out = x;
            BindStatus::Ok
        }
        None => wrong_kind("float", value),
    }
}

/// Copy the host `str()` of a value into a buffer.
///
/// # Safety
/// Handle, buffer and out_len must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_str_buf(
    handle: ValueHandle,
    buffer: *mut c_char,
    buffer_len: usize,
    out_len: *mut usize,
) -> BindStatus {
    if handle.is_null() {
        return null_pointer("value");
    }
    write_str_buf(&(*handle).to_string(), buffer, buffer_len, out_len)
}

/// Copy the host `repr()` of a value into a buffer.
///
/// # Safety
/// Handle, buffer and out_len must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_repr_buf(
    handle: ValueHandle,
    buffer: *mut c_char,
    buffer_len: usize,
    out_len: *mut usize,
) -> BindStatus {
    if handle.is_null() {
        return null_pointer("value");
    }
    write_str_buf(&(*handle).repr(), buffer, buffer_len, out_len)
}

/// Whether two handles hold equal values (objects by identity).
///
/// # Safety
/// Both handles must be valid or null; a null handle equals nothing.
#[no_mangle]
pub unsafe extern "C" fn mylib_value_eq(a: ValueHandle, b: ValueHandle) -> bool {
    if a.is_null() || b.is_null() {
        return false;
    }
    *a == *b
}

/// Copy the calling thread's last error message into a buffer.
///
/// # Safety
/// buffer and out_len must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_last_error(
    buffer: *mut c_char,
    buffer_len: usize,
    out_len: *mut usize,
) -> BindStatus {
    write_str_buf(&last_error().unwrap_or_default(), buffer, buffer_len, out_len)
}
