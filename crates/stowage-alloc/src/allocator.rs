//! Stateless typed allocator.
//!
//! [`RawAlloc<T>`] is a namespace of associated functions: every operation
//! is a pure function of the element type and a count. Memory handed out is
//! raw (never zeroed); element lifetimes are managed separately with
//! [`construct`](RawAlloc::construct) and [`destroy`](RawAlloc::destroy).

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use log::{trace, warn};
use stowage_core::StowError;

/// Typed allocation primitives for element type `T`.
///
/// Never instantiated; all operations are associated functions.
#[derive(Debug)]
pub struct RawAlloc<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> RawAlloc<T> {
    /// `true` when `T` occupies no memory.
    pub const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Largest element count whose byte size fits in `isize`.
    pub const fn max_count() -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            isize::MAX as usize / mem::size_of::<T>()
        }
    }

    /// Layout of an array of `n` elements.
    ///
    /// Reports `LengthExceeded` when the byte size would overflow `isize`.
    pub fn layout(n: usize) -> Result<Layout, StowError> {
        Layout::array::<T>(n).map_err(|_| StowError::LengthExceeded {
            requested: n,
            max: Self::max_count(),
        })
    }

    /// Obtain raw storage for `n` elements.
    ///
    /// Returns a dangling (but aligned) pointer when `n == 0` or `T` is
    /// zero-sized; such a handle must never be dereferenced and releasing
    /// it is a no-op.
    pub fn allocate(n: usize) -> Result<NonNull<T>, StowError> {
        if n == 0 || Self::IS_ZST {
            return Ok(NonNull::dangling());
        }
        let layout = Self::layout(n)?;
        // SAFETY: `layout` has non-zero size because `n > 0` and `T` is not
        // zero-sized.
        let raw = unsafe { alloc::alloc(layout) };
        match NonNull::new(raw.cast::<T>()) {
            Some(block) => {
                trace!(
                    "allocated {} x {} ({} bytes) at {:p}",
                    n,
                    std::any::type_name::<T>(),
                    layout.size(),
                    block
                );
                Ok(block)
            }
            None => {
                warn!(
                    "allocator refused {} bytes (align {})",
                    layout.size(),
                    layout.align()
                );
                Err(StowError::alloc_failed(layout))
            }
        }
    }

    /// Release storage obtained from [`allocate`](Self::allocate).
    ///
    /// A no-op for the empty handle (`n == 0` or zero-sized `T`).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate(n)` with the same `n` and must not
    /// have been released already. Elements still alive in the block are
    /// not dropped.
    pub unsafe fn deallocate(ptr: NonNull<T>, n: usize) {
        if n == 0 || Self::IS_ZST {
            return;
        }
        // SAFETY: `allocate(n)` succeeded, so `size_of::<T>() * n` did not
        // overflow and the alignment is that of `T`.
        let layout =
            unsafe { Layout::from_size_align_unchecked(mem::size_of::<T>() * n, mem::align_of::<T>()) };
        trace!("released {} x {} at {:p}", n, std::any::type_name::<T>(), ptr);
        // SAFETY: caller guarantees `ptr` was allocated with this layout.
        unsafe { alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) };
    }

    /// Write `value` into the raw slot at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes and properly aligned. Any previous
    /// value in the slot is overwritten without being dropped.
    pub unsafe fn construct(ptr: *mut T, value: T) {
        // SAFETY: forwarded to the caller.
        unsafe { ptr.write(value) };
    }

    /// Build a value in place from `f`.
    ///
    /// If `f` panics the slot stays raw.
    ///
    /// # Safety
    ///
    /// Same as [`construct`](Self::construct).
    pub unsafe fn construct_with<F: FnOnce() -> T>(ptr: *mut T, f: F) {
        let value = f();
        // SAFETY: forwarded to the caller.
        unsafe { ptr.write(value) };
    }

    /// Run the destructor of the element at `ptr`, leaving the slot raw.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live element that is not used afterwards.
    pub unsafe fn destroy(ptr: *mut T) {
        // SAFETY: forwarded to the caller.
        unsafe { ptr::drop_in_place(ptr) };
    }

    /// Destroy `len` contiguous elements starting at `first`.
    ///
    /// # Safety
    ///
    /// Every slot in `[first, first + len)` must hold a live element.
    pub unsafe fn destroy_range(first: *mut T, len: usize) {
        if !mem::needs_drop::<T>() {
            return;
        }
        // SAFETY: forwarded to the caller.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, len)) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn zero_count_is_dangling_and_free_is_noop() {
        let p = RawAlloc::<u64>::allocate(0).unwrap();
        assert_eq!(p, NonNull::dangling());
        // SAFETY: empty handle from allocate(0).
        unsafe { RawAlloc::deallocate(p, 0) };
    }

    #[test]
    fn zero_sized_types_never_allocate() {
        let p = RawAlloc::<()>::allocate(1_000_000).unwrap();
        assert_eq!(p, NonNull::dangling());
        assert_eq!(RawAlloc::<()>::max_count(), usize::MAX);
    }

    #[test]
    fn oversized_request_reports_length() {
        let err = RawAlloc::<u64>::allocate(usize::MAX).unwrap_err();
        assert!(matches!(err, StowError::LengthExceeded { .. }));
    }

    #[test]
    fn construct_and_destroy_round_trip() {
        let drops = Rc::new(Cell::new(0));
        struct D(Rc<Cell<usize>>);
        impl Drop for D {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let block = RawAlloc::<D>::allocate(3).unwrap();
        let p = block.as_ptr();
        // SAFETY: three raw slots in a fresh block; each is constructed once
        // and destroyed once before the block is released.
        unsafe {
            RawAlloc::construct(p, D(drops.clone()));
            RawAlloc::construct_with(p.add(1), || D(drops.clone()));
            RawAlloc::construct(p.add(2), D(drops.clone()));
            RawAlloc::destroy(p);
            assert_eq!(drops.get(), 1);
            RawAlloc::destroy_range(p.add(1), 2);
            assert_eq!(drops.get(), 3);
            RawAlloc::deallocate(block, 3);
        }
    }
}
