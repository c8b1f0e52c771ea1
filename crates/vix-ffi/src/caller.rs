//! Caller side of the negotiation protocol, for Rust code driving an exported
//! operation through its raw function pointer.

use thiserror::Error;

use crate::status::{vix_status, vix_status_ok, StatusCode};
use crate::types::{vix_buf, vix_mut_buf, vix_str};

/// Signature every exported operation follows.
pub type RawOperation = unsafe extern "C" fn(
    input: vix_buf,
    output: vix_mut_buf,
    written_out: *mut usize,
    status_out: *mut vix_status,
) -> i32;

pub type RawVersion = unsafe extern "C" fn() -> vix_str;

/// A deterministic callee settles after the probe and one sized call; the extra
/// round only absorbs a callee whose output size drifts.
const MAX_ROUNDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {code})")]
pub struct StatusError {
    pub code: StatusCode,
    pub message: String,
    /// Value of the size out-parameter; the required size for BUFFER_TOO_SMALL.
    pub written: usize,
}

impl StatusError {
    /// # Safety
    /// `st.message` must be a valid view (it is, for any conforming callee).
    unsafe fn from_status(rc: i32, st: &vix_status, written: usize) -> Self {
        // A non-zero return with an OK status is still a failure.
        let code = match st.status_code() {
            StatusCode::Ok => StatusCode::Error,
            code => code,
        };
        let mut message = st.message.to_string_lossy();
        if message.is_empty() {
            message = format!("native error code={} rc={rc}", st.code);
        }
        StatusError {
            code,
            message,
            written,
        }
    }

    pub fn required_len(&self) -> Option<usize> {
        (self.code == StatusCode::BufferTooSmall).then_some(self.written)
    }
}

/// One call with a caller-sized output buffer. Returns the number of bytes
/// written into `out`.
///
/// # Safety
/// `op` must be a conforming operation.
pub unsafe fn call_into(op: RawOperation, input: &[u8], out: &mut [u8]) -> Result<usize, StatusError> {
    let mut written = 0usize;
    let mut st = vix_status_ok();
    let rc = op(
        vix_buf::from_slice(input),
        vix_mut_buf::from_slice_mut(out),
        &mut written,
        &mut st,
    );
    if rc != 0 || !st.is_ok() {
        return Err(StatusError::from_status(rc, &st, written));
    }
    Ok(written)
}

/// Probes for the output size with `(null, 0)`, then calls again with an
/// exactly sized buffer.
///
/// # Safety
/// `op` must be a conforming operation.
pub unsafe fn call_negotiated(op: RawOperation, input: &[u8]) -> Result<Vec<u8>, StatusError> {
    let mut out: Vec<u8> = Vec::new();
    let mut last = None;
    for _ in 0..MAX_ROUNDS {
        match call_into(op, input, &mut out) {
            Ok(n) => {
                out.truncate(n);
                return Ok(out);
            }
            Err(err) => match err.required_len() {
                Some(required) if required > out.len() => {
                    out.resize(required, 0);
                    last = Some(err);
                }
                _ => return Err(err),
            },
        }
    }
    Err(last.unwrap_or_else(|| StatusError {
        code: StatusCode::Error,
        message: "size negotiation did not converge".to_string(),
        written: 0,
    }))
}

/// Reads a library's static version string.
///
/// # Safety
/// `f` must return a valid (static) view.
pub unsafe fn read_version(f: RawVersion) -> String {
    f().to_string_lossy()
}
