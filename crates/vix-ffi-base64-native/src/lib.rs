#![allow(clippy::missing_safety_doc)]

//! Base64 (standard alphabet, padded, no line breaks) behind the vix-ffi
//! calling convention.
//!
//! Exports:
//! - `base64_ffi_version() -> vix_str` (static)
//! - `base64_ffi_abi_version() -> u32`
//! - `base64_encode` / `base64_decode`:
//!   `(vix_buf, vix_mut_buf, size_t *written_out, vix_status *status_out) -> int32`

use std::borrow::Cow;
use std::ffi::CStr;

use base64::engine::general_purpose::STANDARD;
use base64::{DecodeError, Engine as _};
use vix_ffi::boundary::run_operation;
use vix_ffi::{vix_buf, vix_mut_buf, vix_status, vix_str, FfiError, FfiResult};

const VERSION: &CStr = vix_ffi::package_version!();

/// `4 * ceil(n / 3)`, or `None` when that does not fit in `usize`.
pub fn encoded_len(n: usize) -> Option<usize> {
    base64::encoded_len(n, true)
}

pub fn encode(input: &[u8]) -> FfiResult<Vec<u8>> {
    let required =
        encoded_len(input.len()).ok_or(FfiError::invalid(c"input too large to encode"))?;
    let mut out = vec![0u8; required];
    let n = STANDARD
        .encode_slice(input, &mut out)
        .map_err(|_| FfiError::internal(c"encoder produced an unexpected length"))?;
    if n != required {
        return Err(FfiError::internal(c"encoder produced an unexpected length"));
    }
    Ok(out)
}

fn decode_error_message(err: &DecodeError) -> &'static CStr {
    match err {
        DecodeError::InvalidByte(_, b'=') => c"invalid base64 input: misplaced padding",
        DecodeError::InvalidByte(..) => c"invalid base64 input: symbol outside the alphabet",
        DecodeError::InvalidLastSymbol(..) => c"invalid base64 input: non-canonical trailing bits",
        _ => c"invalid base64 input: malformed padding",
    }
}

pub fn decode(input: &[u8]) -> FfiResult<Vec<u8>> {
    // Checked up front so the diagnostic names the length rule.
    if input.len() % 4 != 0 {
        return Err(FfiError::invalid(
            c"invalid base64 input: length is not a multiple of 4",
        ));
    }
    STANDARD
        .decode(input)
        .map_err(|err| FfiError::invalid(decode_error_message(&err)))
}

#[no_mangle]
pub extern "C" fn base64_ffi_version() -> vix_str {
    vix_str::from_static(VERSION)
}

#[no_mangle]
pub extern "C" fn base64_ffi_abi_version() -> u32 {
    vix_ffi::abi_version()
}

/// # Safety
/// `input` readable for `len` bytes, `output` writable for `cap` bytes,
/// `written_out` and `status_out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn base64_encode(
    input: vix_buf,
    output: vix_mut_buf,
    written_out: *mut usize,
    status_out: *mut vix_status,
) -> i32 {
    run_operation("base64_encode", input, output, written_out, status_out, |b| {
        encode(b).map(Cow::Owned)
    })
}

/// # Safety
/// Same as [`base64_encode`].
#[no_mangle]
pub unsafe extern "C" fn base64_decode(
    input: vix_buf,
    output: vix_mut_buf,
    written_out: *mut usize,
    status_out: *mut vix_status,
) -> i32 {
    run_operation("base64_decode", input, output, written_out, status_out, |b| {
        decode(b).map(Cow::Owned)
    })
}
