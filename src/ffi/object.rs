//! FFI functions operating on object values.

use super::types::{
    c_str, collect_args, emit, fail, null_pointer, write_str_buf, BindStatus, ValueHandle,
};
use crate::binding::ObjectRef;
use crate::error::BindError;
use crate::value::Value;
use libc::c_char;

/// Borrow the object behind a value handle.
///
/// # Safety
/// handle must be valid or null.
unsafe fn object<'a>(handle: ValueHandle) -> Result<&'a ObjectRef, BindStatus> {
    if handle.is_null() {
        return Err(null_pointer("object"));
    }
    let value = &*handle;
    value.as_object().ok_or_else(|| {
        fail(BindError::type_error(format!(
            "expected a bound object, got {}",
            value.type_name()
        )))
    })
}

/// Call a method on an object.
///
/// # Safety
/// Same contract as `mylib_module_call`.
#[no_mangle]
pub unsafe extern "C" fn mylib_object_call_method(
    handle: ValueHandle,
    name: *const c_char,
    args: *const ValueHandle,
    nargs: usize,
    kw_names: *const *const c_char,
    kw_values: *const ValueHandle,
    nkw: usize,
    out_value: *mut ValueHandle,
) -> BindStatus {
    if out_value.is_null() {
        return null_pointer("out_value");
    }
    let obj = match object(handle) {
        Ok(o) => o,
        Err(status) => return status,
    };
    let name = match c_str(name, "method name") {
        Ok(s) => s,
        Err(status) => return status,
    };
    let (positional, keywords) = match collect_args(args, nargs, kw_names, kw_values, nkw) {
        Ok(collected) => collected,
        Err(status) => return status,
    };
    match obj.call_method_kw(name, &positional, &keywords) {
        Ok(value) => emit(value, out_value),
        Err(err) => fail(err),
    }
}

/// Read a field or attribute.
///
/// # Safety
/// All pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_object_getattr(
    handle: ValueHandle,
    name: *const c_char,
    out_value: *mut ValueHandle,
) -> BindStatus {
    if out_value.is_null() {
        return null_pointer("out_value");
    }
    let obj = match object(handle) {
        Ok(o) => o,
        Err(status) => return status,
    };
    let name = match c_str(name, "attribute name") {
        Ok(s) => s,
        Err(status) => return status,
    };
    match obj.getattr(name) {
        Ok(value) => emit(value, out_value),
        Err(err) => fail(err),
    }
}

/// Write a field or attribute. The value handle is borrowed.
///
/// # Safety
/// All pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_object_setattr(
    handle: ValueHandle,
    name: *const c_char,
    value: ValueHandle,
) -> BindStatus {
    if value.is_null() {
        return null_pointer("value");
    }
    let obj = match object(handle) {
        Ok(o) => o,
        Err(status) => return status,
    };
    let name = match c_str(name, "attribute name") {
        Ok(s) => s,
        Err(status) => return status,
    };
    let value: Value = (*value).clone();
    match obj.setattr(name, value) {
        Ok(()) => BindStatus::Ok,
        Err(err) => fail(err),
    }
}

/// Copy the dynamic type's qualified name into a buffer.
///
/// # Safety
/// Handle, buffer and out_len must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_object_type_name(
    handle: ValueHandle,
    buffer: *mut c_char,
    buffer_len: usize,
    out_len: *mut usize,
) -> BindStatus {
    match object(handle) {
        Ok(obj) => write_str_buf(obj.type_name(), buffer, buffer_len, out_len),
        Err(status) => status,
    }
}

/// Whether the object's class is `qualname` or derives from it.
///
/// # Safety
/// All pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_object_isinstance(
    handle: ValueHandle,
    qualname: *const c_char,
    out: *mut bool,
) -> BindStatus {
    if out.is_null() {
        return null_pointer("out");
    }
    let obj = match object(handle) {
        Ok(o) => o,
        Err(status) => return status,
    };
    match c_str(qualname, "class name") {
        Ok(q) => {
            *out = obj.is_instance(q);
            BindStatus::Ok
        }
        Err(status) => status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::module::{mylib_module_call, mylib_module_free, mylib_module_load, ModuleHandle};
    use crate::ffi::value::{mylib_value_free, mylib_value_int, mylib_value_str};
    use std::ffi::{CStr, CString};
    use std::ptr;

    #[test]
    fn test_pet_store_through_c_abi() {
        let module_name = CString::new("mylib_object").unwrap();
        let factory = CString::new("pet_store").unwrap();
        let bark = CString::new("bark").unwrap();
        let name = CString::new("name").unwrap();
        let pet_class = CString::new("Pet").unwrap();
        let rex = CString::new("Rex").unwrap();
        unsafe {
            let mut module: ModuleHandle = ptr::null_mut();
            assert_eq!(mylib_module_load(module_name.as_ptr(), &mut module), BindStatus::Ok);

            let mut pet = ptr::null_mut();
            let status = mylib_module_call(
                module,
                factory.as_ptr(),
                ptr::null(),
                0,
                ptr::null(),
                ptr::null(),
                0,
                &mut pet,
            );
            assert_eq!(status, BindStatus::Ok);

            let mut buf = [0 as c_char; 32];
            let mut len = 0usize;
            mylib_object_type_name(pet, buf.as_mut_ptr(), buf.len(), &mut len);
            assert_eq!(CStr::from_ptr(buf.as_ptr()).to_str().unwrap(), "Dog");

            let mut is_pet = false;
            mylib_object_isinstance(pet, pet_class.as_ptr(), &mut is_pet);
            assert!(is_pet);

            let mut woof = ptr::null_mut();
            let status = mylib_object_call_method(
                pet,
                bark.as_ptr(),
                ptr::null(),
                0,
                ptr::null(),
                ptr::null(),
                0,
                &mut woof,
            );
            assert_eq!(status, BindStatus::Ok);
            assert_eq!(*woof, Value::from("woof!"));

            let mut new_name = ptr::null_mut();
            mylib_value_str(rex.as_ptr(), &mut new_name);
            assert_eq!(mylib_object_setattr(pet, name.as_ptr(), new_name), BindStatus::Ok);
            let mut read_back = ptr::null_mut();
            mylib_object_getattr(pet, name.as_ptr(), &mut read_back);
            assert_eq!(*read_back, Value::from("Rex"));

            for handle in [woof, new_name, read_back, pet] {
                mylib_value_free(handle);
            }
            mylib_module_free(module);
        }
    }

    #[test]
    fn test_non_object_handle_is_type_error() {
        let name = CString::new("name").unwrap();
        unsafe {
            let mut value = ptr::null_mut();
            mylib_value_int(1, &mut value);
            let mut out = ptr::null_mut();
            assert_eq!(
                mylib_object_getattr(value, name.as_ptr(), &mut out),
                BindStatus::TypeError
            );
            mylib_value_free(value);
        }
    }
}
