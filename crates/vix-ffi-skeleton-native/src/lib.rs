#![allow(clippy::missing_safety_doc)]

//! Template for a new library on the vix-ffi ABI.
//!
//! Pattern: caller-allocated output buffer. `skeleton_ffi_process` returns 0 on
//! success and non-zero on error with `status_out` filled. Replace `process`
//! with the real logic; the exported wrappers stay as they are.

use std::borrow::Cow;
use std::ffi::CStr;

use vix_ffi::boundary::run_operation;
use vix_ffi::{vix_buf, vix_mut_buf, vix_status, vix_str, FfiResult};

const VERSION: &CStr = vix_ffi::package_version!();

/// Copies the input to the output unchanged.
pub fn process(input: &[u8]) -> FfiResult<Cow<'_, [u8]>> {
    Ok(Cow::Borrowed(input))
}

/// Static storage; the caller must not free it.
#[no_mangle]
pub extern "C" fn skeleton_ffi_version() -> vix_str {
    vix_str::from_static(VERSION)
}

#[no_mangle]
pub extern "C" fn skeleton_ffi_abi_version() -> u32 {
    vix_ffi::abi_version()
}

/// # Safety
/// `input` readable for `len` bytes, `output` writable for `cap` bytes,
/// `written_out` and `status_out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn skeleton_ffi_process(
    input: vix_buf,
    output: vix_mut_buf,
    written_out: *mut usize,
    status_out: *mut vix_status,
) -> i32 {
    run_operation(
        "skeleton_ffi_process",
        input,
        output,
        written_out,
        status_out,
        process,
    )
}
