//! Map and buffer management.
//!
//! The map is an array of buffer pointers. Slots `[start.node, finish.node]`
//! always hold buffers; every other slot is null, except transiently when a
//! reservation allocated buffers that an aborted insertion did not use.
//! Such spare buffers are reused by the next reservation on that side and
//! released by [`release_spare_buffers`](Deque::release_spare_buffers) or
//! on drop.
//!
//! ```text
//!   map:  [ ∅ | ∅ | b0 | b1 | b2 | ∅ | ∅ | ∅ ]
//!                  ▲          ▲
//!            start.node   finish.node
//! ```

#![allow(unsafe_code)]

use std::mem;
use std::ptr::{self, NonNull};

use log::{debug, trace};
use stowage_alloc::uninit::uninit_fill;
use stowage_alloc::{RawAlloc, RawBuf};
use stowage_core::StowError;

use crate::config;
use crate::deque::Deque;
use crate::seg::SegPtr;

impl<T, const B: usize> Deque<T, B> {
    pub(crate) const BUF: usize = SegPtr::<T, B>::BUF;

    // ── Buffers ─────────────────────────────────────────────────

    fn allocate_buffer() -> Result<*mut T, StowError> {
        RawAlloc::<T>::allocate(Self::BUF).map(NonNull::as_ptr)
    }

    /// # Safety
    ///
    /// `buffer` must be null or come from `allocate_buffer` and hold no
    /// live elements.
    unsafe fn release_buffer(buffer: *mut T) {
        if let Some(buffer) = NonNull::new(buffer) {
            // SAFETY: allocated with the same element count.
            unsafe { RawAlloc::deallocate(buffer, Self::BUF) };
        }
    }

    // ── Map slots ───────────────────────────────────────────────

    fn null_map(len: usize) -> Result<RawBuf<*mut T>, StowError> {
        let map = RawBuf::allocate(len)?;
        // SAFETY: `len` raw slots; raw pointers have no drop glue.
        unsafe { uninit_fill(map.ptr(), len, &ptr::null_mut()) };
        trace!("deque map of {len} slots at {:p}", map.ptr());
        Ok(map)
    }

    #[inline]
    pub(crate) fn map_len(&self) -> usize {
        self.map.capacity()
    }

    /// Index of map slot `node`.
    #[inline]
    fn slot_index(&self, node: *mut *mut T) -> usize {
        (node as usize - self.map.ptr() as usize) / mem::size_of::<*mut T>()
    }

    /// Buffers currently held by the map, spare ones included.
    pub(crate) fn buffer_count(&self) -> usize {
        (0..self.map_len())
            // SAFETY: every map slot is initialized.
            .filter(|&i| unsafe { !(*self.map.slot(i)).is_null() })
            .count()
    }

    /// Allocate the map and the buffers for `n` elements.
    ///
    /// Positions `start` at the first slot of the first buffer and `finish`
    /// `n` elements later. On failure every buffer allocated so far is
    /// released and `self` is unchanged.
    pub(crate) fn create_map_and_nodes(&mut self, n: usize) -> Result<(), StowError> {
        debug_assert_eq!(self.map_len(), 0, "map created twice");
        let nodes = n / Self::BUF + 1;
        let map = Self::null_map(config::initial_map_len(nodes))?;
        // SAFETY: `initial_map_len(nodes) >= nodes + 2`.
        let nstart = unsafe { map.slot((map.capacity() - nodes) / 2) };
        for i in 0..nodes {
            match Self::allocate_buffer() {
                // SAFETY: `nstart + i` is inside the map.
                Ok(buffer) => unsafe { *nstart.add(i) = buffer },
                Err(err) => {
                    for j in 0..i {
                        // SAFETY: slot `j` holds a fresh, empty buffer.
                        unsafe { Self::release_buffer(*nstart.add(j)) };
                    }
                    return Err(err);
                }
            }
        }
        self.map = map;
        // SAFETY: both slots hold buffers.
        unsafe {
            self.start.set_node(nstart);
            self.finish.set_node(nstart.add(nodes - 1));
        }
        self.start.cur = self.start.first;
        self.finish.cur = self.finish.first.wrapping_add(n % Self::BUF);
        Ok(())
    }

    /// Create the map on first use.
    pub(crate) fn ensure_map(&mut self) -> Result<(), StowError> {
        if self.map_len() == 0 {
            self.create_map_and_nodes(0)?;
        }
        Ok(())
    }

    fn reserve_map_at_back(&mut self, nodes_to_add: usize) -> Result<(), StowError> {
        let tail_room = self.map_len() - self.slot_index(self.finish.node);
        if nodes_to_add + 1 > tail_room {
            self.reallocate_map(nodes_to_add, false)?;
        }
        Ok(())
    }

    fn reserve_map_at_front(&mut self, nodes_to_add: usize) -> Result<(), StowError> {
        if nodes_to_add > self.slot_index(self.start.node) {
            self.reallocate_map(nodes_to_add, true)?;
        }
        Ok(())
    }

    /// Make room for `nodes_to_add` more buffers at one end.
    ///
    /// Recentres the live slots in place when the map is more than twice
    /// the size needed, otherwise moves them into a map of
    /// `len + max(len, nodes_to_add) + 2` slots. Buffers never move.
    fn reallocate_map(&mut self, nodes_to_add: usize, at_front: bool) -> Result<(), StowError> {
        self.release_spare_buffers();
        let old_nodes = self.finish.nodes_from(&self.start) as usize + 1;
        let new_nodes = old_nodes.saturating_add(nodes_to_add);
        let map_len = self.map_len();
        let shift = if at_front { nodes_to_add } else { 0 };

        let new_start = if map_len > new_nodes.saturating_mul(2) {
            let first = (map_len - new_nodes) / 2 + shift;
            // SAFETY: `first + old_nodes <= map_len`; `ptr::copy` allows
            // the old and new windows to overlap. Slots outside the new
            // window are then cleared.
            unsafe {
                let new_start = self.map.slot(first);
                ptr::copy(self.start.node, new_start, old_nodes);
                for i in (0..first).chain(first + old_nodes..map_len) {
                    *self.map.slot(i) = ptr::null_mut();
                }
                new_start
            }
        } else {
            let new_len = map_len
                .saturating_add(map_len.max(nodes_to_add))
                .saturating_add(2);
            let fresh = Self::null_map(new_len)?;
            debug!(
                "deque<{}> map {} -> {} slots",
                std::any::type_name::<T>(),
                map_len,
                new_len
            );
            let first = (new_len - new_nodes) / 2 + shift;
            // SAFETY: the windows live in different allocations and
            // `first + old_nodes <= new_len`.
            let new_start = unsafe {
                let new_start = fresh.slot(first);
                ptr::copy_nonoverlapping(self.start.node, new_start, old_nodes);
                new_start
            };
            self.map = fresh;
            new_start
        };

        // SAFETY: the moved window holds the same buffers; `cur` is kept.
        unsafe {
            self.start.set_node(new_start);
            self.finish.set_node(new_start.add(old_nodes - 1));
        }
        Ok(())
    }

    // ── Element reservations ────────────────────────────────────

    /// Make sure `n` raw slots exist before `start` and return the position
    /// `n` slots before it. `start` itself is not moved.
    pub(crate) fn reserve_elements_at_front(&mut self, n: usize) -> Result<SegPtr<T, B>, StowError> {
        self.ensure_map()?;
        let vacancies = self.start.room_before();
        if n > vacancies {
            let nodes = (n - vacancies).div_ceil(Self::BUF);
            self.reserve_map_at_front(nodes)?;
            // SAFETY: slots `start.node - nodes .. start.node` are in the map.
            unsafe { self.place_buffers(self.start.node, -1, nodes)? };
        }
        Ok(self.start.at(-(n as isize)))
    }

    /// Make sure `n` raw slots exist from `finish` on and return the
    /// position `n` slots after it. `finish` itself is not moved.
    pub(crate) fn reserve_elements_at_back(&mut self, n: usize) -> Result<SegPtr<T, B>, StowError> {
        self.ensure_map()?;
        let vacancies = self.finish.room_after() - 1;
        if n > vacancies {
            let nodes = (n - vacancies).div_ceil(Self::BUF);
            self.reserve_map_at_back(nodes)?;
            // SAFETY: slots `finish.node + 1 ..= finish.node + nodes` are in
            // the map.
            unsafe { self.place_buffers(self.finish.node, 1, nodes)? };
        }
        Ok(self.finish.at(n as isize))
    }

    /// Put a buffer in each of the `nodes` slots beyond `base` in direction
    /// `dir`, keeping any spare buffer already there.
    ///
    /// On failure the slots filled so far are released and cleared.
    ///
    /// # Safety
    ///
    /// `base + dir * k` must be a map slot for every `k` in `1..=nodes`.
    unsafe fn place_buffers(
        &self,
        base: *mut *mut T,
        dir: isize,
        nodes: usize,
    ) -> Result<(), StowError> {
        let nth = |k: usize| base.wrapping_offset(dir * k as isize);
        for i in 1..=nodes {
            let slot = nth(i);
            // SAFETY: `slot` is a map slot per the caller.
            if unsafe { !(*slot).is_null() } {
                continue;
            }
            match Self::allocate_buffer() {
                // SAFETY: as above.
                Ok(buffer) => unsafe { *slot = buffer },
                Err(err) => {
                    for k in 1..i {
                        // SAFETY: slot `k` holds an empty buffer outside
                        // the live window.
                        unsafe {
                            Self::release_buffer(*nth(k));
                            *nth(k) = ptr::null_mut();
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    // ── Releasing ───────────────────────────────────────────────

    /// Release every buffer outside `[start.node, finish.node]`.
    pub(crate) fn release_spare_buffers(&mut self) {
        if self.map_len() == 0 {
            return;
        }
        let lo = self.slot_index(self.start.node);
        let hi = self.slot_index(self.finish.node);
        for i in (0..lo).chain(hi + 1..self.map_len()) {
            // SAFETY: slots outside the live window hold no elements.
            unsafe {
                let slot = self.map.slot(i);
                Self::release_buffer(*slot);
                *slot = ptr::null_mut();
            }
        }
    }

    /// Move `start` forward by `n`, releasing the buffers it leaves.
    ///
    /// The `n` slots passed over must already be raw.
    pub(crate) fn forget_front(&mut self, n: usize) {
        let new_start = self.start.at(n as isize);
        let mut node = self.start.node;
        while node != new_start.node {
            // SAFETY: `node` is a live-window slot whose buffer holds no
            // live elements any more.
            unsafe {
                Self::release_buffer(*node);
                *node = ptr::null_mut();
                node = node.add(1);
            }
        }
        self.start = new_start;
    }

    /// Move `finish` back by `n`, releasing the buffers it leaves.
    ///
    /// The `n` slots passed over must already be raw.
    pub(crate) fn forget_back(&mut self, n: usize) {
        let new_finish = self.finish.at(-(n as isize));
        let mut node = self.finish.node;
        while node != new_finish.node {
            // SAFETY: as in `forget_front`.
            unsafe {
                Self::release_buffer(*node);
                *node = ptr::null_mut();
                node = node.sub(1);
            }
        }
        self.finish = new_finish;
    }

    /// Release every buffer the map holds. Elements must already be gone.
    pub(crate) fn release_all_buffers(&mut self) {
        for i in 0..self.map_len() {
            // SAFETY: no slot holds live elements.
            unsafe {
                let slot = self.map.slot(i);
                Self::release_buffer(*slot);
                *slot = ptr::null_mut();
            }
        }
    }
}
