//! Raw, uninitialized storage blocks.
//!
//! [`RawStorage`] owns a single heap allocation sized for a fixed number of
//! `T` slots and nothing more: it never constructs or destroys a `T`.
//! Element lifetime is the owning [`Sequence`](crate::Sequence)'s job, so
//! the split between "memory I hold" and "objects that live in it" stays
//! explicit at the type level.
//!
//! All `unsafe` in this module is allocation plumbing; each block carries a
//! `// SAFETY:` comment naming the invariant it relies on.

#![allow(unsafe_code)]

use std::alloc::{self, handle_alloc_error, Layout};
use std::mem;
use std::ptr::NonNull;

use crate::error::StorageError;

/// An owned, uninitialized block of memory with room for a fixed number of
/// `T` slots.
///
/// Capacity is fixed at construction; growth happens by constructing a new
/// block and [`swap`](RawStorage::swap)ping it in. The block is released on
/// drop.
///
/// # Element lifetime
///
/// No slot is ever assumed to hold a live `T`. Dropping a `RawStorage` only
/// deallocates — any live elements still inside are leaked, so the owner
/// must destroy them first. That precondition is documented, not enforced:
/// this type has no way of knowing which slots are live.
///
/// # Duplication
///
/// `RawStorage` is move-only. Cloning a block would mean deciding how to
/// duplicate whatever elements the owner keeps in it, and that policy
/// belongs to the owner, not the buffer.
pub struct RawStorage<T> {
    /// Start of the block, or a dangling (aligned, never dereferenced as a
    /// live element) pointer when no allocation exists.
    ptr: NonNull<T>,
    /// Slot count, not bytes.
    cap: usize,
}

// SAFETY: the block is exclusively owned and holds no live elements from
// the buffer's point of view; sending it across threads sends the whole
// allocation. Shared references expose only raw pointers and the capacity.
unsafe impl<T: Send> Send for RawStorage<T> {}
// SAFETY: see above — `&RawStorage` grants no access to element values.
unsafe impl<T: Sync> Sync for RawStorage<T> {}

impl<T> RawStorage<T> {
    /// Create an empty storage: capacity 0, no allocation.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
        }
    }

    /// Allocate a block with room for `cap` slots.
    ///
    /// Zero `cap` — and any `cap` when `T` is zero-sized — performs no
    /// allocation. Diverts through [`handle_alloc_error`] if the allocator
    /// cannot satisfy the request; panics if the byte size of the request
    /// is unrepresentable.
    pub fn with_capacity(cap: usize) -> Self {
        match Self::try_with_capacity(cap) {
            Ok(storage) => storage,
            Err(StorageError::AllocationFailed { .. }) => {
                let layout = Layout::array::<T>(cap)
                    .expect("layout was representable on the first attempt");
                handle_alloc_error(layout)
            }
            Err(err @ StorageError::CapacityOverflow { .. }) => panic!("{err}"),
        }
    }

    /// Fallible variant of [`with_capacity`](RawStorage::with_capacity).
    ///
    /// On failure nothing is allocated and nothing is leaked.
    pub fn try_with_capacity(cap: usize) -> Result<Self, StorageError> {
        if cap == 0 || mem::size_of::<T>() == 0 {
            // Zero-sized requests (and zero-sized element types) never
            // touch the allocator; the dangling pointer is aligned and the
            // capacity bookkeeping still applies.
            return Ok(Self {
                ptr: NonNull::dangling(),
                cap,
            });
        }
        let layout = Layout::array::<T>(cap)
            .map_err(|_| StorageError::CapacityOverflow { requested: cap })?;
        // SAFETY: cap > 0 and T is not zero-sized, so the layout has
        // non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        match NonNull::new(raw.cast::<T>()) {
            Some(ptr) => Ok(Self { ptr, cap }),
            None => Err(StorageError::AllocationFailed {
                bytes: layout.size(),
            }),
        }
    }

    /// Raw address of the slot at `offset`.
    ///
    /// `offset < capacity` is the caller's obligation (debug-asserted).
    /// The returned pointer addresses raw memory — the slot may or may not
    /// hold a live element, and only the caller knows which.
    pub fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(
            offset < self.cap,
            "slot offset {offset} out of bounds (capacity {})",
            self.cap
        );
        // SAFETY: offset is within the allocated block (caller contract),
        // so the add stays in bounds.
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Start of the block.
    ///
    /// Dangling (but aligned) when the capacity is zero; valid for
    /// zero-length reads and writes either way.
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Slot count of the block.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// O(1) exchange of the two blocks.
    ///
    /// No allocation, no element construction or destruction — live
    /// elements (wherever the owners keep them) travel with their block.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.cap, &mut other.cap);
    }
}

impl<T> Default for RawStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        if self.cap != 0 && mem::size_of::<T>() != 0 {
            let layout =
                Layout::array::<T>(self.cap).expect("layout was representable at allocation time");
            // SAFETY: the block was allocated with exactly this layout and
            // is released exactly once. No element destructors run here —
            // the owner destroyed any live elements already.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
        }
    }
}
