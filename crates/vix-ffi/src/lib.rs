//! Shared C ABI contract for native libraries.
//!
//! Every library in this workspace exposes its functions through the same
//! fixed-layout types and calling convention:
//! - [`vix_str`] / [`vix_buf`] / [`vix_mut_buf`]: non-owning views
//! - [`vix_status`]: numeric code + optional static diagnostic
//! - [`vix_allocator`]: optional caller-supplied allocator
//! - [`boundary::run_operation`]: validation, buffer negotiation and panic
//!   interception for `(vix_buf, vix_mut_buf, *mut usize, *mut vix_status) -> i32`
//!   operations
//!
//! Nothing in this crate holds global mutable state; every entry point is
//! re-entrant.

#![allow(non_camel_case_types)]
#![allow(clippy::missing_safety_doc)]

pub mod boundary;
pub mod caller;
pub mod error;
pub mod memory;
pub mod status;
pub mod types;

pub use error::{FfiError, FfiResult};
pub use memory::{vix_alloc_fn, vix_allocator, vix_free_fn, Allocate, Allocation, ForeignAllocator};
pub use status::{
    vix_status, vix_status_ok, StatusCode, VIX_STATUS_BUFFER_TOO_SMALL, VIX_STATUS_ERROR,
    VIX_STATUS_INVALID_ARG, VIX_STATUS_NOT_SUPPORTED, VIX_STATUS_OK,
};
pub use types::{vix_buf, vix_mut_buf, vix_str};

pub const VIX_FFI_ABI_VERSION_MAJOR: u32 = 1;
pub const VIX_FFI_ABI_VERSION_MINOR: u32 = 0;

/// Packed ABI version: `major << 16 | minor`.
pub const fn abi_version() -> u32 {
    (VIX_FFI_ABI_VERSION_MAJOR << 16) | VIX_FFI_ABI_VERSION_MINOR
}

/// True if a library reporting `packed` can be driven by this crate's contract.
///
/// Same major, and a minor no newer than ours.
pub const fn abi_is_compatible(packed: u32) -> bool {
    let major = packed >> 16;
    let minor = packed & 0xffff;
    major == VIX_FFI_ABI_VERSION_MAJOR && minor <= VIX_FFI_ABI_VERSION_MINOR
}

/// The calling crate's `CARGO_PKG_VERSION` as a `&'static CStr`.
///
/// Usable in const context, so exported version queries can return static data:
///
/// ```ignore
/// const VERSION: &core::ffi::CStr = vix_ffi::package_version!();
/// ```
#[macro_export]
macro_rules! package_version {
    () => {
        match ::core::ffi::CStr::from_bytes_with_nul(
            concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes(),
        ) {
            Ok(s) => s,
            Err(_) => panic!("package version contains a nul byte"),
        }
    };
}
