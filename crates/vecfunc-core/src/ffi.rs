//! FFI exports
//!
//! C-compatible entry points for hosts that cannot link DataFusion directly:
//! the library version and the greeting computation.

use std::ffi::{c_char, CStr, CString};
use std::panic::catch_unwind;

use crate::greeting::greet;
use crate::{Error, Result};

/// Get the library version as a null-terminated string
/// Caller must NOT free this string (it's static)
#[no_mangle]
pub extern "C" fn vector_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

fn greet_c(name: &CStr) -> Result<CString> {
    let name = name.to_str().map_err(|e| Error::Ffi(e.to_string()))?;
    CString::new(greet(name)).map_err(|e| Error::Ffi(e.to_string()))
}

/// Greeting for a UTF-8 name (caller must free via vector_free_string)
/// Returns null if `name` is null or not valid UTF-8
///
/// # Safety
/// The caller must ensure that `name` is null or points to a valid null-terminated string.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn vector_greet(name: *const c_char) -> *mut c_char {
    if name.is_null() {
        return std::ptr::null_mut();
    }

    let result = catch_unwind(|| {
        let name = unsafe { CStr::from_ptr(name) };
        match greet_c(name) {
            Ok(greeting) => greeting.into_raw(),
            Err(err) => {
                tracing::warn!(error = %err, "vector_greet failed");
                std::ptr::null_mut()
            }
        }
    });

    result.unwrap_or(std::ptr::null_mut())
}

/// Free a string allocated by Rust
///
/// # Safety
/// The caller must ensure that `ptr` was allocated by a Rust function in this library (e.g., `vector_greet`).
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn vector_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
