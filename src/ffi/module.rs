//! FFI functions for module loading, free functions and classes.

use super::types::{
    c_str, collect_args, emit, fail, null_pointer, write_str_buf, BindStatus, CBindingConfig,
    ValueHandle,
};
use crate::binding::Module;
use crate::config::BindingConfig;
use crate::error::BindResult;
use crate::registry;
use crate::value::Value;
use libc::c_char;

/// Opaque handle to a loaded module.
pub type ModuleHandle = *mut Module;

/// Fix the binding configuration before the first module load.
///
/// # Safety
/// config must be valid or null (null selects the defaults).
#[no_mangle]
pub unsafe extern "C" fn mylib_configure(config: *const CBindingConfig) -> BindStatus {
    let cfg = if config.is_null() {
        BindingConfig::default()
    } else {
        (*config).clone().into()
    };
    match registry::configure(cfg) {
        Ok(()) => BindStatus::Ok,
        Err(err) => fail(err),
    }
}

/// Load a module by name.
///
/// # Safety
/// name must be a valid C string; out_handle must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn mylib_module_load(
    name: *const c_char,
    out_handle: *mut ModuleHandle,
) -> BindStatus {
    if out_handle.is_null() {
        return null_pointer("out_handle");
    }
    let name = match c_str(name, "module name") {
        Ok(s) => s,
        Err(status) => return status,
    };
    match registry::load(name) {
        Ok(module) => {
            *out_handle = Box::into_raw(Box::new(module));
            BindStatus::Ok
        }
        Err(err) => fail(err),
    }
}

/// Free a module handle. The module itself stays loaded.
///
/// # Safety
/// Handle must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn mylib_module_free(handle: ModuleHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Copy the module doc string into a buffer (empty when there is none).
///
/// # Safety
/// Handle and buffer must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_module_doc(
    handle: ModuleHandle,
    buffer: *mut c_char,
    buffer_len: usize,
    out_len: *mut usize,
) -> BindStatus {
    if handle.is_null() {
        return null_pointer("module");
    }
    write_str_buf((*handle).doc().unwrap_or(""), buffer, buffer_len, out_len)
}

/// Number of ownership hazards flagged when the module was built.
///
/// # Safety
/// Handle must be valid or null (null reports zero).
#[no_mangle]
pub unsafe extern "C" fn mylib_module_hazard_count(handle: ModuleHandle) -> usize {
    if handle.is_null() {
        return 0;
    }
    (*handle).hazards().len()
}

/// Read a module attribute.
///
/// # Safety
/// All pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_module_getattr(
    handle: ModuleHandle,
    name: *const c_char,
    out_value: *mut ValueHandle,
) -> BindStatus {
    if handle.is_null() || out_value.is_null() {
        return null_pointer("module or out_value");
    }
    let name = match c_str(name, "attribute name") {
        Ok(s) => s,
        Err(status) => return status,
    };
    match (*handle).attr(name) {
        Ok(value) => emit(value, out_value),
        Err(err) => fail(err),
    }
}

/// Call a free function with positional and keyword arguments.
///
/// Argument handles are borrowed; the result is a new handle.
///
/// # Safety
/// `args` holds `nargs` handles; `kw_names`/`kw_values` hold `nkw` entries.
#[no_mangle]
pub unsafe extern "C" fn mylib_module_call(
    handle: ModuleHandle,
    name: *const c_char,
    args: *const ValueHandle,
    nargs: usize,
    kw_names: *const *const c_char,
    kw_values: *const ValueHandle,
    nkw: usize,
    out_value: *mut ValueHandle,
) -> BindStatus {
    if handle.is_null() || out_value.is_null() {
        return null_pointer("module or out_value");
    }
    let name = match c_str(name, "function name") {
        Ok(s) => s,
        Err(status) => return status,
    };
    let (positional, keywords) = match collect_args(args, nargs, kw_names, kw_values, nkw) {
        Ok(collected) => collected,
        Err(status) => return status,
    };
    match (*handle).call_kw(name, &positional, &keywords) {
        Ok(value) => emit(value, out_value),
        Err(err) => fail(err),
    }
}

/// Construct an instance of a class given by qualified name.
///
/// # Safety
/// Same contract as `mylib_module_call`.
#[no_mangle]
pub unsafe extern "C" fn mylib_module_construct(
    handle: ModuleHandle,
    qualname: *const c_char,
    args: *const ValueHandle,
    nargs: usize,
    kw_names: *const *const c_char,
    kw_values: *const ValueHandle,
    nkw: usize,
    out_value: *mut ValueHandle,
) -> BindStatus {
    if handle.is_null() || out_value.is_null() {
        return null_pointer("module or out_value");
    }
    let qualname = match c_str(qualname, "class name") {
        Ok(s) => s,
        Err(status) => return status,
    };
    let (positional, keywords) = match collect_args(args, nargs, kw_names, kw_values, nkw) {
        Ok(collected) => collected,
        Err(status) => return status,
    };
    let result = (*handle)
        .class(qualname)
        .and_then(|class| class.construct_kw(&positional, &keywords));
    match result {
        Ok(object) => emit(Value::Object(object), out_value),
        Err(err) => fail(err),
    }
}

/// Look a name up in a class scope: an exported enumeration value
/// (`Pet_EI`, `Dog`) or a member of a nested enumeration (`Pet_EI`, `Kind.Cat`).
///
/// # Safety
/// All pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_class_getattr(
    handle: ModuleHandle,
    qualname: *const c_char,
    name: *const c_char,
    out_value: *mut ValueHandle,
) -> BindStatus {
    if handle.is_null() || out_value.is_null() {
        return null_pointer("module or out_value");
    }
    let (qualname, name) = match (c_str(qualname, "class name"), c_str(name, "attribute name")) {
        (Ok(q), Ok(n)) => (q, n),
        (Err(status), _) | (_, Err(status)) => return status,
    };
    match class_scope_lookup(&*handle, qualname, name) {
        Ok(value) => emit(value, out_value),
        Err(err) => fail(err),
    }
}

/// Convert an integer into a member of the enumeration `qualname`
/// (`Pet_EI.Kind`, 0 gives `Kind.Dog`). Unknown values are a `LookupError`.
///
/// # Safety
/// All pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn mylib_enum_from_value(
    handle: ModuleHandle,
    qualname: *const c_char,
    value: i64,
    out_value: *mut ValueHandle,
) -> BindStatus {
    if handle.is_null() || out_value.is_null() {
        return null_pointer("module or out_value");
    }
    let qualname = match c_str(qualname, "enumeration name") {
        Ok(s) => s,
        Err(status) => return status,
    };
    match enum_from_value(&*handle, qualname, value) {
        Ok(member) => emit(member, out_value),
        Err(err) => fail(err),
    }
}

fn enum_from_value(module: &Module, qualname: &str, value: i64) -> BindResult<Value> {
    module
        .enumeration(qualname)?
        .from_value(value)
        .map(Value::Enum)
}

fn class_scope_lookup(module: &Module, qualname: &str, name: &str) -> BindResult<Value> {
    let class = module.class(qualname)?;
    match name.split_once('.') {
        Some((enumeration, member)) => class
            .enumeration(enumeration)?
            .member(member)
            .map(Value::Enum),
        None => class.attr(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindError;
    use crate::ffi::value::{mylib_value_free, mylib_value_int};
    use std::ffi::CString;
    use std::ptr;

    fn load(name: &str) -> ModuleHandle {
        let name = CString::new(name).unwrap();
        let mut handle: ModuleHandle = ptr::null_mut();
        let status = unsafe { mylib_module_load(name.as_ptr(), &mut handle) };
        assert_eq!(status, BindStatus::Ok);
        handle
    }

    #[test]
    fn test_call_with_keywords() {
        let module = load("mylib");
        let name = CString::new("add").unwrap();
        let j = CString::new("j").unwrap();
        unsafe {
            let mut i_val = ptr::null_mut();
            let mut j_val = ptr::null_mut();
            mylib_value_int(4, &mut i_val);
            mylib_value_int(10, &mut j_val);

            let args = [i_val];
            let kw_names = [j.as_ptr()];
            let kw_values = [j_val];
            let mut out = ptr::null_mut();
            let status = mylib_module_call(
                module,
                name.as_ptr(),
                args.as_ptr(),
                1,
                kw_names.as_ptr(),
                kw_values.as_ptr(),
                1,
                &mut out,
            );
            assert_eq!(status, BindStatus::Ok);
            assert_eq!(*out, Value::Int(14));

            mylib_value_free(out);
            mylib_value_free(i_val);
            mylib_value_free(j_val);
            mylib_module_free(module);
        }
    }

    #[test]
    fn test_unknown_module_sets_last_error() {
        let name = CString::new("missing").unwrap();
        let mut handle: ModuleHandle = ptr::null_mut();
        let status = unsafe { mylib_module_load(name.as_ptr(), &mut handle) };
        assert_eq!(status, BindStatus::LookupError);
        assert!(handle.is_null());
        assert_eq!(
            super::super::types::last_error().as_deref(),
            Some("LookupError: no module named 'missing'")
        );
    }

    #[test]
    fn test_class_scope_lookup() {
        let module = registry::load("mylib_object").unwrap();
        let exported = class_scope_lookup(&module, "Pet_EI", "Dog").unwrap();
        let scoped = class_scope_lookup(&module, "Pet_EI", "Kind.Dog").unwrap();
        assert_eq!(exported, scoped);
        assert!(matches!(
            class_scope_lookup(&module, "Pet_EI", "Kind.Fish"),
            Err(BindError::Lookup(_))
        ));
        assert!(matches!(
            class_scope_lookup(&module, "Pet", "Dog"),
            Err(BindError::Attribute(_))
        ));
    }

    #[test]
    fn test_enum_from_value() {
        let module = registry::load("mylib_object").unwrap();
        let from_int = enum_from_value(&module, "Pet_EI.Kind", 0).unwrap();
        let by_name = class_scope_lookup(&module, "Pet_EI", "Kind.Dog").unwrap();
        assert_eq!(from_int, by_name);
        assert_eq!(
            enum_from_value(&module, "Pet_EI.Kind", 1).unwrap(),
            class_scope_lookup(&module, "Pet_EI", "Cat").unwrap()
        );
        assert!(matches!(
            enum_from_value(&module, "Pet_EI.Kind", 7),
            Err(BindError::Lookup(_))
        ));
        assert!(matches!(
            enum_from_value(&module, "Kind", 0),
            Err(BindError::Attribute(_))
        ));
    }

    #[test]
    fn test_enum_from_value_through_c_abi() {
        let module = load("mylib_object");
        let kind = CString::new("Pet_EI.Kind").unwrap();
        unsafe {
            let mut out = ptr::null_mut();
            let status = mylib_enum_from_value(module, kind.as_ptr(), 0, &mut out);
            assert_eq!(status, BindStatus::Ok);
            assert_eq!(
                *out,
                class_scope_lookup(&*module, "Pet_EI", "Kind.Dog").unwrap()
            );
            mylib_value_free(out);

            let mut missing = ptr::null_mut();
            let status = mylib_enum_from_value(module, kind.as_ptr(), 7, &mut missing);
            assert_eq!(status, BindStatus::LookupError);
            assert!(missing.is_null());
            mylib_module_free(module);
        }
    }
}
