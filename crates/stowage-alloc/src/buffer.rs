//! Scoped ownership of one raw block.

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use stowage_core::StowError;

use crate::allocator::RawAlloc;

/// Owner of a raw block of `capacity` element slots.
///
/// `RawBuf` knows nothing about which slots are initialized; it only
/// guarantees that the block is released exactly once, on every exit path
/// (including unwinding). Containers pair it with their own length
/// bookkeeping and destroy live elements before the buffer drops.
///
/// For zero-sized `T` the capacity is `usize::MAX` and nothing is ever
/// allocated.
pub struct RawBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
    _owns: PhantomData<T>,
}

// SAFETY: `RawBuf` uniquely owns its block; sending or sharing it is as
// safe as sending or sharing the `T`s stored in it.
unsafe impl<T: Send> Send for RawBuf<T> {}
// SAFETY: see `Send` above.
unsafe impl<T: Sync> Sync for RawBuf<T> {}

impl<T> RawBuf<T> {
    /// The empty buffer. Does not allocate.
    pub const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: if RawAlloc::<T>::IS_ZST { usize::MAX } else { 0 },
            _owns: PhantomData,
        }
    }

    /// A buffer with room for exactly `cap` elements.
    pub fn allocate(cap: usize) -> Result<Self, StowError> {
        if cap == 0 || RawAlloc::<T>::IS_ZST {
            return Ok(Self::empty());
        }
        let ptr = RawAlloc::<T>::allocate(cap)?;
        Ok(Self {
            ptr,
            cap,
            _owns: PhantomData,
        })
    }

    /// Reassemble a buffer from [`into_raw`](Self::into_raw) parts.
    ///
    /// # Safety
    ///
    /// `ptr` and `cap` must come from `into_raw` (or from
    /// `RawAlloc::<T>::allocate(cap)`) and must not be owned elsewhere.
    pub unsafe fn from_raw(ptr: NonNull<T>, cap: usize) -> Self {
        Self {
            ptr,
            cap,
            _owns: PhantomData,
        }
    }

    /// Give up ownership without releasing the block.
    pub fn into_raw(self) -> (NonNull<T>, usize) {
        let parts = (self.ptr, self.cap);
        mem::forget(self);
        parts
    }

    /// Start of the block.
    #[inline]
    pub fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Number of element slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Pointer to slot `index`.
    ///
    /// # Safety
    ///
    /// `index <= capacity()`.
    #[inline]
    pub unsafe fn slot(&self, index: usize) -> *mut T {
        debug_assert!(index <= self.cap);
        // SAFETY: in bounds of the block (or one past it) per the caller.
        unsafe { self.ptr.as_ptr().add(index) }
    }
}

impl<T> Default for RawBuf<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Drop for RawBuf<T> {
    fn drop(&mut self) {
        if RawAlloc::<T>::IS_ZST {
            return;
        }
        // SAFETY: `ptr`/`cap` were produced by `RawAlloc::allocate(cap)` (or
        // are the empty handle) and are released only here.
        unsafe { RawAlloc::deallocate(self.ptr, self.cap) };
    }
}

impl<T> fmt::Debug for RawBuf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuf")
            .field("ptr", &self.ptr)
            .field("cap", &self.cap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_has_no_capacity() {
        let buf = RawBuf::<u32>::empty();
        assert_eq!(buf.capacity(), 0);
        let zst = RawBuf::<()>::empty();
        assert_eq!(zst.capacity(), usize::MAX);
    }

    #[test]
    fn allocate_exact_capacity() {
        let buf = RawBuf::<u16>::allocate(17).unwrap();
        assert_eq!(buf.capacity(), 17);
        assert_eq!(buf.ptr() as usize % mem::align_of::<u16>(), 0);
    }

    #[test]
    fn raw_parts_round_trip() {
        let buf = RawBuf::<u8>::allocate(4).unwrap();
        let (ptr, cap) = buf.into_raw();
        // SAFETY: parts from `into_raw` above, owned nowhere else.
        let back = unsafe { RawBuf::from_raw(ptr, cap) };
        assert_eq!(back.capacity(), 4);
        assert_eq!(back.ptr(), ptr.as_ptr());
    }

    #[test]
    fn oversized_buffer_is_rejected() {
        assert!(RawBuf::<u32>::allocate(usize::MAX / 2).is_err());
    }
}
