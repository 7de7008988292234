//! The growable sequence built on raw storage.
//!
//! [`Sequence`] pairs one [`RawStorage`] block with a live-element count.
//! The first `len` slots hold constructed elements; the rest are raw
//! memory. Every construction (`ptr::write`) and destruction
//! (`drop_in_place` / `ptr::read`) of an element happens in this module —
//! the storage layer never touches element lifetime.
//!
//! # Growth
//!
//! Implicit growth doubles the capacity (0 → 1 → 2 → 4 → …), which bounds
//! the total relocation work across `n` appends to O(n). Relocation itself
//! is a bitwise move of the live range into the new block: a Rust move
//! runs no user code and cannot fail, so the relocation step never unwinds.
//! The paths that must run user code — cloning, default construction, the
//! `*_with` closures — each document their unwinding guarantee.
//!
//! # Unwinding guarantees
//!
//! Guarantee tiers are deliberately non-uniform and stated per method:
//! growth and clone-construction paths are *strong* (a panic leaves the
//! sequence untouched and leaks nothing), while the slot-reuse half of
//! [`clone_from`](Clone::clone_from) and the growing half of
//! [`resize`](Sequence::resize) are *basic* (the sequence stays valid but
//! partially updated).

#![allow(unsafe_code)]

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::slice;

use crate::error::StorageError;
use crate::raw::RawStorage;

/// A growable, contiguous sequence of `T` with doubling growth.
///
/// Stores elements in one [`RawStorage`] block; the first
/// [`len`](Sequence::len) slots are live, slots `[len, capacity)` are raw
/// memory. Derefs to `[T]` over the live range, so indexing, slicing, and
/// iteration are the slice's.
///
/// # Example
///
/// ```
/// use talus::Sequence;
///
/// let mut seq = Sequence::new();
/// seq.push(1);
/// seq.push(2);
/// seq.push(3);
/// seq.insert(1, 9);
/// assert_eq!(seq, [1, 9, 2, 3]);
/// assert_eq!(seq.remove(2), Some(2));
/// assert_eq!(seq, [1, 9, 3]);
/// assert_eq!(seq.pop(), Some(3));
/// ```
pub struct Sequence<T> {
    buf: RawStorage<T>,
    /// Count of live elements. Invariant: `len <= buf.capacity()`.
    len: usize,
}

impl<T> Sequence<T> {
    /// Create an empty sequence with no allocation.
    pub const fn new() -> Self {
        Self {
            buf: RawStorage::new(),
            len: 0,
        }
    }

    /// Create an empty sequence with room for `cap` elements.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: RawStorage::with_capacity(cap),
            len: 0,
        }
    }

    /// Create a sequence of `n` default-constructed elements, with storage
    /// for exactly `n`.
    ///
    /// Strong guarantee: if a `default()` call panics midway, the elements
    /// constructed so far are dropped and the block is released.
    pub fn with_len(n: usize) -> Self
    where
        T: Default,
    {
        let mut seq = Self::with_capacity(n);
        // A panic here unwinds through `seq`'s Drop, which tears down the
        // constructed prefix before the storage frees itself.
        while seq.len < n {
            // SAFETY: len < n == capacity, so the slot is vacant and in
            // bounds. The write happens after `default()` returns.
            unsafe { ptr::write(seq.buf.slot(seq.len), T::default()) };
            seq.len += 1;
        }
        seq
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slot count of the current storage block.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The live range as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are live, contiguous, and owned by
        // `self`; for len 0 the (possibly dangling) base pointer is aligned.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// The live range as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as `as_slice`, with exclusive access through `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.buf.as_ptr(), self.len) }
    }

    /// Iterate over the live range.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterate mutably over the live range.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Grow the storage to exactly `n` slots.
    ///
    /// No-op when `n <= capacity`. Otherwise the live range is relocated
    /// into a fresh block of exactly `n` slots and the old block is
    /// released. Element addresses are stable until the next call that
    /// grows past `n`.
    ///
    /// Diverts through [`std::alloc::handle_alloc_error`] on allocator
    /// failure; see [`try_reserve`](Sequence::try_reserve) for the
    /// recoverable variant.
    pub fn reserve(&mut self, n: usize) {
        if n > self.buf.capacity() {
            self.adopt(RawStorage::with_capacity(n));
        }
    }

    /// Fallible variant of [`reserve`](Sequence::reserve).
    ///
    /// Strong guarantee: on `Err` the sequence is untouched and nothing
    /// was allocated.
    pub fn try_reserve(&mut self, n: usize) -> Result<(), StorageError> {
        if n > self.buf.capacity() {
            self.adopt(RawStorage::try_with_capacity(n)?);
        }
        Ok(())
    }

    /// Resize to exactly `n` live elements.
    ///
    /// Shrinking drops the trailing `len - n` elements and leaves the
    /// retained prefix untouched. Growing reserves first, then
    /// default-constructs the new tail in place — basic guarantee: a
    /// panicking `default()` keeps the elements constructed so far.
    pub fn resize(&mut self, n: usize)
    where
        T: Default,
    {
        self.reserve(n);
        if n < self.len {
            self.truncate(n);
        } else {
            while self.len < n {
                // SAFETY: len < n <= capacity after the reserve, so the
                // slot is vacant. `default()` runs before the write, so a
                // panic leaves `len` counting only live elements.
                unsafe { ptr::write(self.buf.slot(self.len), T::default()) };
                self.len += 1;
            }
        }
    }

    /// Drop every element past the first `n`. No-op when `n >= len`.
    /// Capacity is unchanged.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.len {
            return;
        }
        let tail = self.len - n;
        // Shrink the live range before dropping, so an unwinding element
        // drop cannot leave dead slots counted as live.
        self.len = n;
        // SAFETY: the `tail` slots starting at `n` were live and are now
        // outside the live range; they are dropped exactly once.
        unsafe {
            ptr::drop_in_place(slice::from_raw_parts_mut(self.buf.as_ptr().add(n), tail));
        }
    }

    /// Drop all elements. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Append an element, growing if needed. Amortized O(1).
    ///
    /// Strong guarantee: the value is already constructed, and relocation
    /// on the growth path cannot fail, so a failure to allocate leaves the
    /// sequence untouched.
    pub fn push(&mut self, value: T) {
        self.push_with(move || value);
    }

    /// Append the result of `make`, constructing it directly into its
    /// destination context. Returns a reference to the new element.
    ///
    /// Strong guarantee: with spare capacity a panicking `make` leaves the
    /// sequence untouched; at full capacity `make` runs against the new
    /// block *before* any relocation, so a panic tears down only the new
    /// block and the old storage remains authoritative.
    pub fn push_with<F>(&mut self, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        if self.len == self.buf.capacity() {
            let new_buf = RawStorage::with_capacity(self.grown_capacity());
            // SAFETY: len < the grown capacity, and the slot in the fresh
            // block is vacant. `make()` runs before the write; if it
            // panics, `new_buf` is dropped having constructed nothing.
            unsafe { ptr::write(new_buf.slot(self.len), make()) };
            self.adopt(new_buf);
        } else {
            // SAFETY: len < capacity, so the next slot is vacant and in
            // bounds.
            unsafe { ptr::write(self.buf.slot(self.len), make()) };
        }
        self.len += 1;
        // SAFETY: the slot at len - 1 was initialised just above.
        unsafe { &mut *self.buf.slot(self.len - 1) }
    }

    /// Remove and return the last element, or `None` when empty.
    /// Never panics; capacity is unchanged.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot held the last live element and is now outside
        // the live range, so ownership moves out exactly once.
        Some(unsafe { ptr::read(self.buf.slot(self.len)) })
    }

    /// Insert an element at `index`, shifting everything after it one slot
    /// toward the tail.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        self.insert_with(index, move || value);
    }

    /// Insert the result of `make` at `index`. Returns a reference to the
    /// new element.
    ///
    /// At full capacity the new element is constructed at its target
    /// offset in the fresh block before the prefix and suffix are
    /// relocated around it, so a panicking `make` leaves the sequence
    /// untouched (strong guarantee). With spare capacity `make` runs
    /// before the shift, with the same effect.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_with<F>(&mut self, index: usize, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        assert!(
            index <= self.len,
            "insert index {index} out of bounds (len {})",
            self.len
        );
        if self.len == self.buf.capacity() {
            let mut new_buf = RawStorage::with_capacity(self.grown_capacity());
            // SAFETY: index <= len < the grown capacity; the target slot
            // is vacant. A panic in `make()` drops `new_buf` with nothing
            // constructed in it.
            unsafe { ptr::write(new_buf.slot(index), make()) };
            // SAFETY: both blocks hold the required slots and are
            // disjoint; the prefix lands at the base and the suffix one
            // slot past the new element. The moved-out bytes in the old
            // block are released without running destructors.
            unsafe {
                ptr::copy_nonoverlapping(self.buf.as_ptr(), new_buf.as_ptr(), index);
                ptr::copy_nonoverlapping(
                    self.buf.as_ptr().add(index),
                    new_buf.as_ptr().add(index + 1),
                    self.len - index,
                );
            }
            self.buf.swap(&mut new_buf);
        } else {
            let value = make();
            // SAFETY: len < capacity, so `[index, len)` can shift one slot
            // toward the tail (overlapping copy); the vacated slot then
            // receives the new value.
            unsafe {
                let base = self.buf.as_ptr().add(index);
                ptr::copy(base, base.add(1), self.len - index);
                ptr::write(base, value);
            }
        }
        self.len += 1;
        // SAFETY: the slot at `index` was initialised above and is live.
        unsafe { &mut *self.buf.slot(index) }
    }

    /// Remove and return the element at `index`, shifting everything after
    /// it one slot toward the front. Relative order is preserved.
    ///
    /// Returns `None` when `index >= len` — removing from an empty
    /// sequence is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: index < len, so the slot is live. After the read, the
        // suffix shift reuses the vacated slot, and shrinking `len`
        // removes the stale duplicate at the tail from the live range.
        unsafe {
            let base = self.buf.slot(index);
            let value = ptr::read(base);
            ptr::copy(base.add(1), base, self.len - index - 1);
            self.len -= 1;
            Some(value)
        }
    }

    /// O(1) exchange of storage and length with `other`.
    ///
    /// No allocation, no element construction or destruction.
    pub fn swap_with(&mut self, other: &mut Self) {
        self.buf.swap(&mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Capacity after one implicit growth step: doubled, with 0 → 1.
    fn grown_capacity(&self) -> usize {
        let cap = self.buf.capacity();
        if cap == 0 {
            1
        } else {
            cap.checked_mul(2)
                .expect("capacity doubling overflowed usize")
        }
    }

    /// Relocate the live range into `new_buf` and make it the storage.
    ///
    /// This is the single relocation point: a bitwise move of `len`
    /// elements, which runs no user code and cannot fail. The old block is
    /// released without running destructors — its element bytes were moved
    /// out, so dropping them again would be a double drop.
    fn adopt(&mut self, mut new_buf: RawStorage<T>) {
        debug_assert!(new_buf.capacity() >= self.len);
        // SAFETY: both blocks hold at least `len` slots and are disjoint
        // allocations.
        unsafe { ptr::copy_nonoverlapping(self.buf.as_ptr(), new_buf.as_ptr(), self.len) };
        self.buf.swap(&mut new_buf);
    }
}

impl<T> Drop for Sequence<T> {
    fn drop(&mut self) {
        // SAFETY: exactly the live range is dropped; the storage block
        // releases itself afterwards.
        unsafe { ptr::drop_in_place(self.as_mut_slice() as *mut [T]) };
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Sequence<T> {
    /// Storage is sized to the source's length, and elements are cloned in
    /// order. Strong guarantee: a panicking clone drops the already-cloned
    /// prefix and releases the new block before propagating.
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity(self.len);
        for item in self.iter() {
            // SAFETY: out.len < capacity == self.len; the slot is vacant.
            // A panic in `clone()` unwinds through `out`'s Drop.
            unsafe { ptr::write(out.buf.slot(out.len), item.clone()) };
            out.len += 1;
        }
        out
    }

    /// When the source does not fit the current capacity, a full clone is
    /// built and swapped in (strong guarantee). Otherwise existing slots
    /// are reused: `clone_from` over the common prefix, then either the
    /// tail is dropped or the extras are clone-constructed in place. The
    /// reuse path is basic-guarantee only — a panic mid-prefix leaves a
    /// valid sequence with unspecified element values, and no rollback is
    /// attempted.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.buf.capacity() {
            let mut fresh = source.clone();
            self.swap_with(&mut fresh);
            return;
        }
        let common = self.len.min(source.len);
        for (dst, src) in self.as_mut_slice()[..common]
            .iter_mut()
            .zip(&source.as_slice()[..common])
        {
            dst.clone_from(src);
        }
        if source.len < self.len {
            self.truncate(source.len);
        } else {
            for item in &source.as_slice()[common..] {
                // SAFETY: len < source.len <= capacity; the slot is
                // vacant. `clone()` runs before the write, so a panic
                // leaves `len` counting only live elements.
                unsafe { ptr::write(self.buf.slot(self.len), item.clone()) };
                self.len += 1;
            }
        }
    }
}

impl<T> Deref for Sequence<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Sequence<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Sequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for Sequence<T> {}

impl<T: PartialEq> PartialEq<[T]> for Sequence<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for Sequence<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T> Extend<T> for Sequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        // Reserve only when the hint exceeds the spare capacity, and never
        // below one doubling step — exact-fit reservations on every call
        // would degrade repeated small extends to O(n²) relocation.
        if lower > self.buf.capacity() - self.len {
            if let Some(needed) = self.len.checked_add(lower) {
                self.reserve(needed.max(self.grown_capacity()));
            }
        }
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Sequence<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
