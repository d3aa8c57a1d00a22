// C ABI for host UIs. Strings cross the boundary as UTF-8 JSON and are
// released with `conscript_free_string`. Panics never unwind into C.
use crate::config::EngineConfig;
use crate::core::engine::ConscriptEngine;
use libc::c_char;
use serde::Serialize;
use std::ffi::{CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::{Mutex, MutexGuard};

static ENGINE: Mutex<Option<ConscriptEngine>> = Mutex::new(None);

fn engine_slot() -> MutexGuard<'static, Option<ConscriptEngine>> {
    ENGINE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Borrows a C string; null or invalid UTF-8 reads as empty.
///
/// # Safety
/// `s` must be null or point to a NUL-terminated string.
unsafe fn read_str<'a>(s: *const c_char) -> &'a str {
    if s.is_null() {
        return "";
    }
    CStr::from_ptr(s).to_str().unwrap_or("")
}

fn into_c_json(value: &impl Serialize) -> *mut c_char {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
    match CString::new(json) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn conscript_engine_init() -> bool {
    let result = catch_unwind(|| {
        let mut slot = engine_slot();
        if slot.is_none() {
            let config = EngineConfig::load();
            *slot = Some(ConscriptEngine::from_config(&config));
            tracing::info!("conscript engine initialized");
        }
    });
    if result.is_err() {
        tracing::error!("panic during engine initialization");
        *engine_slot() = None;
    }
    result.is_ok()
}

#[no_mangle]
pub extern "C" fn conscript_engine_destroy() {
    let _ = catch_unwind(|| {
        if let Some(engine) = engine_slot().take() {
            match engine.save() {
                Ok(()) => tracing::info!("lexicon saved on shutdown"),
                Err(err) => tracing::error!(%err, "failed to save lexicon on shutdown"),
            }
        }
    });
}

/// Strict spelling of `pronunciation` as JSON, or null when the engine is
/// not initialized.
///
/// # Safety
/// `pronunciation` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn conscript_resolve_spelling(pronunciation: *const c_char) -> *mut c_char {
    let pronunciation = read_str(pronunciation);
    catch_unwind(AssertUnwindSafe(|| match engine_slot().as_ref() {
        Some(engine) => into_c_json(&engine.resolve_spelling(pronunciation)),
        None => ptr::null_mut(),
    }))
    .unwrap_or_else(|_| {
        tracing::error!("panic in resolve_spelling");
        ptr::null_mut()
    })
}

/// Fallback spelling of `pronunciation` as JSON, or null when the engine is
/// not initialized.
///
/// # Safety
/// `pronunciation` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn conscript_resolve_spelling_with_fallback(
    pronunciation: *const c_char,
) -> *mut c_char {
    let pronunciation = read_str(pronunciation);
    catch_unwind(AssertUnwindSafe(|| match engine_slot().as_ref() {
        Some(engine) => into_c_json(&engine.resolve_spelling_with_fallback(pronunciation)),
        None => ptr::null_mut(),
    }))
    .unwrap_or_else(|_| {
        tracing::error!("panic in resolve_spelling_with_fallback");
        ptr::null_mut()
    })
}

/// 1 if linking would create a cycle, 0 if not, -1 without an engine.
#[no_mangle]
pub extern "C" fn conscript_would_create_cycle(child: u64, ancestor: u64) -> i32 {
    catch_unwind(|| match engine_slot().as_ref() {
        Some(engine) => i32::from(engine.would_create_cycle(child, ancestor)),
        None => -1,
    })
    .unwrap_or(-1)
}

/// # Safety
/// `s` must be null or a pointer returned by this library and not yet freed.
#[no_mangle]
pub unsafe extern "C" fn conscript_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
