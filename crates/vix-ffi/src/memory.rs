//! Allocator injection.
//!
//! ABI v1 rule: outputs go into caller-allocated buffers. A function that must
//! hand back memory it allocated takes a `*const vix_allocator` from the caller,
//! allocates exclusively through it, and documents which returned views the
//! caller releases with the same `free` and `user` token.
//!
//! No exported operation in this workspace returns allocator-sourced memory;
//! this module is the building block for libraries that do.

use core::ffi::c_void;
use core::mem::{align_of, size_of};
use core::ptr::NonNull;

use crate::error::{FfiError, FfiResult};
use crate::types::vix_buf;

pub type vix_alloc_fn = Option<unsafe extern "C" fn(size: usize, user: *mut c_void) -> *mut c_void>;
pub type vix_free_fn = Option<unsafe extern "C" fn(ptr: *mut c_void, user: *mut c_void)>;

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct vix_allocator {
    pub alloc: vix_alloc_fn,
    pub free: vix_free_fn,
    pub user: *mut c_void,
}

const _: () = assert!(size_of::<vix_allocator>() == 3 * size_of::<*const ()>());
const _: () = assert!(align_of::<vix_allocator>() == align_of::<*const ()>());

/// Allocation strategy injected into code that returns owned memory.
pub trait Allocate {
    fn allocate(&self, size: usize) -> FfiResult<NonNull<u8>>;

    /// # Safety
    /// `ptr` must come from `allocate` on this same allocator and not be
    /// released twice.
    unsafe fn release(&self, ptr: NonNull<u8>);
}

/// A validated, caller-supplied allocator.
#[derive(Clone, Copy, Debug)]
pub struct ForeignAllocator<'a> {
    raw: &'a vix_allocator,
}

impl<'a> ForeignAllocator<'a> {
    /// A null pointer means the caller supplied no allocator.
    ///
    /// # Safety
    /// A non-null `ptr` must point to a `vix_allocator` valid for `'a`.
    pub unsafe fn from_raw(ptr: *const vix_allocator) -> FfiResult<Option<Self>> {
        let Some(raw) = ptr.as_ref() else {
            return Ok(None);
        };
        Self::new(raw).map(Some)
    }

    pub fn new(raw: &'a vix_allocator) -> FfiResult<Self> {
        if raw.alloc.is_none() || raw.free.is_none() {
            return Err(FfiError::invalid(c"allocator is missing alloc or free"));
        }
        Ok(ForeignAllocator { raw })
    }

    pub fn user(&self) -> *mut c_void {
        self.raw.user
    }
}

impl Allocate for ForeignAllocator<'_> {
    fn allocate(&self, size: usize) -> FfiResult<NonNull<u8>> {
        let Some(alloc) = self.raw.alloc else {
            return Err(FfiError::invalid(c"allocator is missing alloc or free"));
        };
        let ptr = unsafe { alloc(size, self.raw.user) };
        NonNull::new(ptr as *mut u8).ok_or(FfiError::internal(c"allocator returned null"))
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        if let Some(free) = self.raw.free {
            free(ptr.as_ptr() as *mut c_void, self.raw.user);
        }
    }
}

/// Memory obtained from an [`Allocate`] that goes back to the same allocator
/// on drop, unless ownership is handed to the caller with [`Allocation::into_buf`].
pub struct Allocation<'a, A: Allocate + ?Sized> {
    alloc: &'a A,
    ptr: NonNull<u8>,
    len: usize,
}

impl<'a, A: Allocate + ?Sized> Allocation<'a, A> {
    /// A zero `len` never reaches the allocator; the pointer is dangling and
    /// nothing is released on drop.
    pub fn new(alloc: &'a A, len: usize) -> FfiResult<Self> {
        let ptr = if len == 0 {
            NonNull::dangling()
        } else {
            alloc.allocate(len)?
        };
        Ok(Allocation { alloc, ptr, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Transfers ownership to the caller, who must release it through the same
    /// allocator and user token.
    pub fn into_buf(self) -> vix_buf {
        let out = vix_buf {
            ptr: self.ptr.as_ptr(),
            len: self.len,
        };
        core::mem::forget(self);
        out
    }
}

impl<A: Allocate + ?Sized> Drop for Allocation<'_, A> {
    fn drop(&mut self) {
        if self.len != 0 {
            unsafe { self.alloc.release(self.ptr) }
        }
    }
}

/// Copies `bytes` into allocator-sourced memory owned by the caller.
///
/// Empty input yields an empty view and never touches the allocator.
pub fn copy_out<A: Allocate + ?Sized>(alloc: &A, bytes: &[u8]) -> FfiResult<vix_buf> {
    if bytes.is_empty() {
        return Ok(vix_buf::empty());
    }
    let mut out = Allocation::new(alloc, bytes.len())?;
    out.as_mut_slice().copy_from_slice(bytes);
    Ok(out.into_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        allocs: AtomicUsize,
        frees: AtomicUsize,
        bytes: AtomicUsize,
    }

    // Length-prefixed so `free` can rebuild the layout.
    unsafe extern "C" fn test_alloc(size: usize, user: *mut c_void) -> *mut c_void {
        let counters = &*(user as *const Counters);
        counters.allocs.fetch_add(1, Ordering::SeqCst);
        counters.bytes.fetch_add(size, Ordering::SeqCst);
        let mut v = vec![0u8; size + size_of::<usize>()];
        v[..size_of::<usize>()].copy_from_slice(&size.to_ne_bytes());
        let base = Box::into_raw(v.into_boxed_slice()) as *mut u8;
        base.add(size_of::<usize>()) as *mut c_void
    }

    unsafe extern "C" fn test_free(ptr: *mut c_void, user: *mut c_void) {
        let counters = &*(user as *const Counters);
        counters.frees.fetch_add(1, Ordering::SeqCst);
        let base = (ptr as *mut u8).sub(size_of::<usize>());
        let mut len = [0u8; size_of::<usize>()];
        len.copy_from_slice(core::slice::from_raw_parts(base, size_of::<usize>()));
        let total = usize::from_ne_bytes(len) + size_of::<usize>();
        drop(Box::from_raw(core::ptr::slice_from_raw_parts_mut(base, total)));
    }

    unsafe extern "C" fn null_alloc(_size: usize, _user: *mut c_void) -> *mut c_void {
        core::ptr::null_mut()
    }

    fn vtable_for(counters: &Counters) -> vix_allocator {
        vix_allocator {
            alloc: Some(test_alloc),
            free: Some(test_free),
            user: counters as *const Counters as *mut c_void,
        }
    }

    #[test]
    fn null_allocator_is_absent() {
        let got = unsafe { ForeignAllocator::from_raw(core::ptr::null()) };
        assert!(matches!(got, Ok(None)));
    }

    #[test]
    fn allocator_missing_free_is_invalid() {
        let vtable = vix_allocator {
            alloc: Some(test_alloc),
            free: None,
            user: core::ptr::null_mut(),
        };
        let err = unsafe { ForeignAllocator::from_raw(&vtable) }.unwrap_err();
        assert_eq!(err.code(), crate::StatusCode::InvalidArgument);
    }

    #[test]
    fn copy_out_uses_the_callers_allocator_and_token() {
        let counters = Counters::default();
        let vtable = vtable_for(&counters);
        let alloc = unsafe { ForeignAllocator::from_raw(&vtable) }.unwrap().unwrap();
        assert_eq!(alloc.user(), vtable.user);

        let buf = copy_out(&alloc, b"payload").unwrap();
        assert_eq!(unsafe { buf.as_slice() }, b"payload");
        assert_eq!(counters.allocs.load(Ordering::SeqCst), 1);
        assert_eq!(counters.bytes.load(Ordering::SeqCst), 7);
        assert_eq!(counters.frees.load(Ordering::SeqCst), 0);

        // The caller owns it now and releases with the same pair.
        unsafe { (vtable.free.unwrap())(buf.ptr as *mut c_void, vtable.user) };
        assert_eq!(counters.frees.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn copy_out_of_empty_input_skips_the_allocator() {
        let counters = Counters::default();
        let vtable = vtable_for(&counters);
        let alloc = ForeignAllocator::new(&vtable).unwrap();
        let buf = copy_out(&alloc, b"").unwrap();
        assert!(buf.ptr.is_null());
        assert_eq!(buf.len, 0);
        assert_eq!(counters.allocs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropped_allocation_is_released() {
        let counters = Counters::default();
        let vtable = vtable_for(&counters);
        let alloc = ForeignAllocator::new(&vtable).unwrap();
        {
            let mut a = Allocation::new(&alloc, 4).unwrap();
            a.as_mut_slice().copy_from_slice(b"abcd");
            assert_eq!(a.len(), 4);
        }
        assert_eq!(counters.allocs.load(Ordering::SeqCst), 1);
        assert_eq!(counters.frees.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_length_allocation_skips_the_allocator() {
        let vtable = vix_allocator {
            alloc: Some(null_alloc),
            free: Some(test_free),
            user: core::ptr::null_mut(),
        };
        let alloc = ForeignAllocator::new(&vtable).unwrap();
        let mut a = Allocation::new(&alloc, 0).unwrap();
        assert!(a.is_empty());
        assert!(a.as_mut_slice().is_empty());
        drop(a);

        let counters = Counters::default();
        let vtable = vtable_for(&counters);
        let alloc = ForeignAllocator::new(&vtable).unwrap();
        drop(Allocation::new(&alloc, 0).unwrap());
        assert_eq!(counters.allocs.load(Ordering::SeqCst), 0);
        assert_eq!(counters.frees.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn null_from_allocator_is_an_internal_error() {
        let vtable = vix_allocator {
            alloc: Some(null_alloc),
            free: Some(test_free),
            user: core::ptr::null_mut(),
        };
        let alloc = ForeignAllocator::new(&vtable).unwrap();
        let err = copy_out(&alloc, b"x").unwrap_err();
        assert_eq!(err.code(), crate::StatusCode::Error);
        assert_eq!(err.message(), c"allocator returned null");
    }
}
