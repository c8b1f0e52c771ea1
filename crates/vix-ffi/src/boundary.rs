//! The calling convention shared by every exported operation:
//!
//! ```text
//! int32 op(vix_buf input, vix_mut_buf output, size_t *written_out, vix_status *status_out)
//! ```
//!
//! Order of checks, identical for all operations:
//! 1. `status_out` may be null; if present it is set to OK before anything else.
//! 2. `written_out` must be non-null; it is then zeroed.
//! 3. Views are checked for null/length consistency and for overlap.
//! 4. The operation computes its full output from the input.
//! 5. Short buffer: `*written_out = required`, BUFFER_TOO_SMALL, nothing written.
//! 6. Otherwise exactly `required` bytes are copied and `*written_out = required`.
//!
//! Panics never unwind past this module: they are reported as ERROR.
//! The process panic hook still runs first and, by default, prints to stderr.
//! Hosts that want silence install their own hook; this crate never sets one.

use std::any::Any;
use std::borrow::Cow;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{FfiError, FfiResult};
use crate::status::{vix_status, vix_status_ok};
use crate::types::{vix_buf, vix_mut_buf};

pub const RC_OK: i32 = 0;
pub const RC_FAIL: i32 = 1;

const MSG_PANIC: &core::ffi::CStr = c"native panic intercepted at ffi boundary";

/// Writes an OK status if the caller supplied a status slot.
///
/// # Safety
/// `status_out` is null or valid for writes.
#[inline]
pub unsafe fn set_ok(status_out: *mut vix_status) {
    if let Some(st) = status_out.as_mut() {
        *st = vix_status_ok();
    }
}

/// Flattens `err` into the caller's status slot and returns the failure code.
///
/// # Safety
/// `status_out` is null or valid for writes.
#[inline]
pub unsafe fn report(status_out: *mut vix_status, err: &FfiError) -> i32 {
    if let Some(st) = status_out.as_mut() {
        *st = vix_status {
            code: err.code().as_raw(),
            message: err.message_view(),
        };
    }
    RC_FAIL
}

/// Checks an input/output pair against the view rules.
pub fn validate_views(input: &vix_buf, output: &vix_mut_buf) -> FfiResult<()> {
    if !input.is_consistent() {
        return Err(FfiError::invalid(c"in_ptr is null but in_len != 0"));
    }
    if !output.is_consistent() {
        return Err(FfiError::invalid(c"out_ptr is null but out_cap != 0"));
    }
    if regions_overlap(input, output) {
        return Err(FfiError::invalid(c"input and output buffers overlap"));
    }
    Ok(())
}

fn regions_overlap(input: &vix_buf, output: &vix_mut_buf) -> bool {
    if input.len == 0 || output.cap == 0 {
        return false;
    }
    let in_start = input.ptr as usize;
    let out_start = output.ptr as usize;
    let in_end = in_start.saturating_add(input.len);
    let out_end = out_start.saturating_add(output.cap);
    in_start < out_end && out_start < in_end
}

fn panic_text(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Runs `op` under the shared calling convention.
///
/// `op` receives the validated input and returns the complete output. It must
/// be a pure function of the input.
///
/// # Safety
/// - `input.ptr` is valid for reads of `input.len` bytes (or null with len 0).
/// - `output.ptr` is valid for writes of `output.cap` bytes (or null with cap 0).
/// - `written_out` and `status_out` are each null or valid for writes.
pub unsafe fn run_operation<F>(
    name: &'static str,
    input: vix_buf,
    output: vix_mut_buf,
    written_out: *mut usize,
    status_out: *mut vix_status,
    op: F,
) -> i32
where
    F: for<'a> FnOnce(&'a [u8]) -> FfiResult<Cow<'a, [u8]>>,
{
    set_ok(status_out);

    let Some(written) = written_out.as_mut() else {
        tracing::debug!(operation = name, "rejected call: written_out is null");
        return report(status_out, &FfiError::invalid(c"out_len is null"));
    };
    *written = 0;

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        validate_views(&input, &output)?;
        let produced = op(input.as_slice())?;
        let required = produced.len();
        if output.cap < required {
            return Err(FfiError::too_small(required));
        }
        if required != 0 {
            output.as_mut_slice()[..required].copy_from_slice(&produced);
        }
        Ok(required)
    }));

    match outcome {
        Ok(Ok(n)) => {
            *written = n;
            RC_OK
        }
        Ok(Err(err)) => {
            if let FfiError::BufferTooSmall { required } = err {
                *written = required;
                tracing::debug!(
                    operation = name,
                    required,
                    capacity = output.cap,
                    "output buffer too small"
                );
            } else {
                tracing::debug!(operation = name, error = %err, "operation failed");
            }
            report(status_out, &err)
        }
        Err(payload) => {
            tracing::error!(
                operation = name,
                panic = panic_text(payload.as_ref()),
                "intercepted panic at ffi boundary"
            );
            report(status_out, &FfiError::internal(MSG_PANIC))
        }
    }
}

/// Runs a status-only entry point (no buffers) with panic interception.
///
/// # Safety
/// `status_out` is null or valid for writes.
pub unsafe fn run_guarded<F>(name: &'static str, status_out: *mut vix_status, f: F) -> i32
where
    F: FnOnce() -> FfiResult<()>,
{
    set_ok(status_out);
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => RC_OK,
        Ok(Err(err)) => {
            tracing::debug!(operation = name, error = %err, "operation failed");
            report(status_out, &err)
        }
        Err(payload) => {
            tracing::error!(
                operation = name,
                panic = panic_text(payload.as_ref()),
                "intercepted panic at ffi boundary"
            );
            report(status_out, &FfiError::internal(MSG_PANIC))
        }
    }
}
