use core::fmt;

use crate::types::vix_str;

// Keep in sync with the published header; values never change within ABI v1.
pub const VIX_STATUS_OK: i32 = 0;
pub const VIX_STATUS_ERROR: i32 = 1;
pub const VIX_STATUS_INVALID_ARG: i32 = 2;
pub const VIX_STATUS_BUFFER_TOO_SMALL: i32 = 3;
pub const VIX_STATUS_NOT_SUPPORTED: i32 = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct vix_status {
    pub code: i32,
    pub message: vix_str,
}

/// Success status: code OK, null message, zero length.
pub const fn vix_status_ok() -> vix_status {
    vix_status {
        code: VIX_STATUS_OK,
        message: vix_str::empty(),
    }
}

impl vix_status {
    pub fn is_ok(&self) -> bool {
        self.code == VIX_STATUS_OK
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_raw(self.code).unwrap_or(StatusCode::Error)
    }
}

impl Default for vix_status {
    fn default() -> Self {
        vix_status_ok()
    }
}

#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok = VIX_STATUS_OK,
    Error = VIX_STATUS_ERROR,
    InvalidArgument = VIX_STATUS_INVALID_ARG,
    BufferTooSmall = VIX_STATUS_BUFFER_TOO_SMALL,
    NotSupported = VIX_STATUS_NOT_SUPPORTED,
}

impl StatusCode {
    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            VIX_STATUS_OK => Some(StatusCode::Ok),
            VIX_STATUS_ERROR => Some(StatusCode::Error),
            VIX_STATUS_INVALID_ARG => Some(StatusCode::InvalidArgument),
            VIX_STATUS_BUFFER_TOO_SMALL => Some(StatusCode::BufferTooSmall),
            VIX_STATUS_NOT_SUPPORTED => Some(StatusCode::NotSupported),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Ok => "ok",
            StatusCode::Error => "error",
            StatusCode::InvalidArgument => "invalid_argument",
            StatusCode::BufferTooSmall => "buffer_too_small",
            StatusCode::NotSupported => "not_supported",
        }
    }

    /// Only a short buffer can succeed on a plain retry.
    pub fn is_retriable(self) -> bool {
        matches!(self, StatusCode::BufferTooSmall)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
