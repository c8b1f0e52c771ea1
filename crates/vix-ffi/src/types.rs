//! Fixed-layout, non-owning views that cross the boundary by value.
//!
//! `vix_str` and `vix_buf` are both `{ptr, len}`; the split only tells the
//! reader whether the bytes are text. `vix_mut_buf` is `{ptr, cap}` where `cap`
//! is a ceiling, not a content length.
//!
//! A view whose pointer is null must have a zero length. A non-null pointer
//! with a zero length is accepted: callers probing for a size may pass any
//! pointer together with `cap == 0`.

use core::ffi::{c_char, CStr};
use core::mem::{align_of, size_of};

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct vix_str {
    pub ptr: *const c_char,
    pub len: usize,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct vix_buf {
    pub ptr: *const u8,
    pub len: usize,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct vix_mut_buf {
    pub ptr: *mut u8,
    pub cap: usize,
}

const _: () = assert!(size_of::<vix_str>() == size_of::<*const ()>() + size_of::<usize>());
const _: () = assert!(align_of::<vix_str>() == align_of::<*const ()>());
const _: () = assert!(size_of::<vix_buf>() == size_of::<*const ()>() + size_of::<usize>());
const _: () = assert!(align_of::<vix_buf>() == align_of::<*const ()>());
const _: () = assert!(size_of::<vix_mut_buf>() == size_of::<*const ()>() + size_of::<usize>());
const _: () = assert!(align_of::<vix_mut_buf>() == align_of::<*const ()>());

#[inline]
fn consistent<T>(ptr: *const T, len: usize) -> bool {
    !ptr.is_null() || len == 0
}

impl vix_str {
    pub const fn empty() -> Self {
        vix_str {
            ptr: core::ptr::null(),
            len: 0,
        }
    }

    /// View over static, NUL-terminated text. `len` excludes the terminator,
    /// so callers reading either `len` bytes or up to the NUL see the same text.
    pub const fn from_static(s: &'static CStr) -> Self {
        vix_str {
            ptr: s.as_ptr(),
            len: s.to_bytes().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_consistent(&self) -> bool {
        consistent(self.ptr, self.len)
    }

    /// # Safety
    /// `ptr` must be valid for `len` bytes for the chosen lifetime.
    pub unsafe fn as_bytes<'a>(&self) -> &'a [u8] {
        if self.len == 0 || self.ptr.is_null() {
            return &[];
        }
        core::slice::from_raw_parts(self.ptr as *const u8, self.len)
    }

    /// # Safety
    /// Same as [`vix_str::as_bytes`].
    pub unsafe fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

impl Default for vix_str {
    fn default() -> Self {
        Self::empty()
    }
}

impl vix_buf {
    pub const fn empty() -> Self {
        vix_buf {
            ptr: core::ptr::null(),
            len: 0,
        }
    }

    pub fn from_slice(s: &[u8]) -> Self {
        if s.is_empty() {
            return Self::empty();
        }
        vix_buf {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        consistent(self.ptr, self.len)
    }

    /// # Safety
    /// `ptr` must be valid for reads of `len` bytes for the chosen lifetime.
    pub unsafe fn as_slice<'a>(&self) -> &'a [u8] {
        if self.len == 0 || self.ptr.is_null() {
            return &[];
        }
        core::slice::from_raw_parts(self.ptr, self.len)
    }
}

impl Default for vix_buf {
    fn default() -> Self {
        Self::empty()
    }
}

impl vix_mut_buf {
    pub const fn empty() -> Self {
        vix_mut_buf {
            ptr: core::ptr::null_mut(),
            cap: 0,
        }
    }

    pub fn from_slice_mut(s: &mut [u8]) -> Self {
        if s.is_empty() {
            return Self::empty();
        }
        vix_mut_buf {
            ptr: s.as_mut_ptr(),
            cap: s.len(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        consistent(self.ptr as *const u8, self.cap)
    }

    /// # Safety
    /// `ptr` must be valid for writes of `cap` bytes for the chosen lifetime and
    /// not aliased by any other live reference.
    pub unsafe fn as_mut_slice<'a>(&self) -> &'a mut [u8] {
        if self.cap == 0 || self.ptr.is_null() {
            return &mut [];
        }
        core::slice::from_raw_parts_mut(self.ptr, self.cap)
    }
}

impl Default for vix_mut_buf {
    fn default() -> Self {
        Self::empty()
    }
}
