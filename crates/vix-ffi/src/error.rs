//! Internal error type. Operations return `FfiResult`; only the boundary
//! flattens an `FfiError` into a `vix_status`.
//!
//! Diagnostics are `&'static CStr` so the status message outlives the call.

use core::ffi::CStr;

use thiserror::Error;

use crate::status::StatusCode;
use crate::types::vix_str;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FfiError {
    #[error("invalid argument: {}", .0.to_string_lossy())]
    InvalidArgument(&'static CStr),

    #[error("output buffer too small: {required} bytes required")]
    BufferTooSmall { required: usize },

    #[error("not supported: {}", .0.to_string_lossy())]
    NotSupported(&'static CStr),

    #[error("internal error: {}", .0.to_string_lossy())]
    Internal(&'static CStr),
}

pub type FfiResult<T> = Result<T, FfiError>;

impl FfiError {
    pub const fn invalid(msg: &'static CStr) -> Self {
        FfiError::InvalidArgument(msg)
    }

    pub const fn too_small(required: usize) -> Self {
        FfiError::BufferTooSmall { required }
    }

    pub const fn not_supported(msg: &'static CStr) -> Self {
        FfiError::NotSupported(msg)
    }

    pub const fn internal(msg: &'static CStr) -> Self {
        FfiError::Internal(msg)
    }

    pub fn code(&self) -> StatusCode {
        match self {
            FfiError::InvalidArgument(_) => StatusCode::InvalidArgument,
            FfiError::BufferTooSmall { .. } => StatusCode::BufferTooSmall,
            FfiError::NotSupported(_) => StatusCode::NotSupported,
            FfiError::Internal(_) => StatusCode::Error,
        }
    }

    pub fn message(&self) -> &'static CStr {
        match self {
            FfiError::InvalidArgument(msg)
            | FfiError::NotSupported(msg)
            | FfiError::Internal(msg) => msg,
            FfiError::BufferTooSmall { .. } => c"output buffer too small",
        }
    }

    pub fn message_view(&self) -> vix_str {
        vix_str::from_static(self.message())
    }
}
