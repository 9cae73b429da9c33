//! FFI bindings for the Momentum engine
//!
//! C-compatible entry points taking a snapshot as JSON plus a `YYYY-MM-DD`
//! reference date. All returned strings are allocated by Rust and must be
//! released with `momentum_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::EngineError;
use crate::insights::generate_insights;
use crate::report::ReportBuilder;
use crate::trend::trend_series;
use crate::types::{parse_day, Snapshot};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Decode arguments, run `f`, and hand back JSON or NULL with the error recorded
unsafe fn with_snapshot<F>(snapshot_json: *const c_char, date: *const c_char, f: F) -> *mut c_char
where
    F: FnOnce(&Snapshot, chrono::NaiveDate) -> Result<String, EngineError>,
{
    clear_last_error();

    let json_str = match cstr_to_string(snapshot_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid snapshot string pointer");
            return ptr::null_mut();
        }
    };

    let date_str = match cstr_to_string(date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid date string pointer");
            return ptr::null_mut();
        }
    };

    let result = Snapshot::from_json(&json_str)
        .and_then(|snapshot| parse_day(&date_str).map(|day| (snapshot, day)))
        .and_then(|(snapshot, day)| f(&snapshot, day));

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Build the full report for a snapshot.
///
/// # Safety
/// - `snapshot_json` and `date` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `momentum_free_string`.
/// - Returns NULL on error; call `momentum_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn momentum_report(
    snapshot_json: *const c_char,
    date: *const c_char,
) -> *mut c_char {
    with_snapshot(snapshot_json, date, |snapshot, day| {
        ReportBuilder::new().build_json(snapshot, day)
    })
}

/// Generate the insight list for a snapshot.
///
/// # Safety
/// Same contract as `momentum_report`.
#[no_mangle]
pub unsafe extern "C" fn momentum_insights(
    snapshot_json: *const c_char,
    date: *const c_char,
) -> *mut c_char {
    with_snapshot(snapshot_json, date, |snapshot, day| {
        Ok(serde_json::to_string(&generate_insights(&snapshot.habits, day))?)
    })
}

/// Build the 7-day trend series for a snapshot.
///
/// # Safety
/// Same contract as `momentum_report`.
#[no_mangle]
pub unsafe extern "C" fn momentum_trend(
    snapshot_json: *const c_char,
    date: *const c_char,
) -> *mut c_char {
    with_snapshot(snapshot_json, date, |snapshot, day| {
        Ok(serde_json::to_string(&trend_series(&snapshot.habits, day))?)
    })
}

/// Free a string returned by Momentum functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Momentum function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn momentum_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is valid until the next Momentum call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn momentum_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn momentum_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
