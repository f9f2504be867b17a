use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut, Index, IndexMut, Range};
use std::ptr;
use std::slice;

use crate::relocate;
use crate::{Error, RawMemory};

/// Contiguous growable array on top of `RawMemory`.
///
/// Slots `[0, size)` of the storage hold live values, everything past `size` is
/// uninitialized. All operations keep it that way, including when a `Clone`,
/// `Default` or construction closure panics half way through.
///
/// Positions are plain indices. Raw element addresses (see `as_ptr_range`) stay
/// valid until the next operation that reallocates or shifts elements.
pub struct Vector<T> {
    storage: RawMemory<T>,
    size: usize,
}

impl<T> Vector<T> {
    /// Empty vector, no allocation.
    pub const fn new() -> Vector<T> {
        Vector {
            storage: RawMemory::new(),
            size: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Vector<T> {
        Vector {
            storage: RawMemory::with_capacity(capacity),
            size: 0,
        }
    }

    /// Vector of `size` default values, with capacity for exactly that many.
    pub fn with_size(size: usize) -> Vector<T> where T: Default {
        match Vector::try_with_size(size) {
            Ok(vector) => vector,
            Err(e) => e.raise(),
        }
    }

    pub fn try_with_size(size: usize) -> Result<Vector<T>, Error> where T: Default {
        let mut storage = RawMemory::allocate(size)?;
        unsafe { relocate::fill_with(storage.as_mut_ptr(), size, T::default) };
        Ok(Vector {
            storage,
            size,
        })
    }

    /// Deep copy sized to hold exactly the live elements.
    ///
    /// A panicking `clone` drops the copies made so far and leaves `self` untouched.
    pub fn try_clone(&self) -> Result<Vector<T>, Error> where T: Clone {
        let mut storage = RawMemory::allocate(self.size)?;
        unsafe { relocate::clone_relocate(self.as_slice(), storage.as_mut_ptr()) };
        Ok(Vector {
            storage,
            size: self.size,
        })
    }

    /// Steals the storage in constant time, leaving this vector empty.
    pub fn take(&mut self) -> Vector<T> {
        let size = mem::replace(&mut self.size, 0);
        Vector {
            storage: self.storage.take(),
            size,
        }
    }

    /// Exchanges contents with `other` in constant time.
    ///
    /// This is move-assignment: `other` ends up holding the former contents of `self`.
    pub fn swap_with(&mut self, other: &mut Vector<T>) {
        self.storage.swap(&mut other.storage);
        mem::swap(&mut self.size, &mut other.size);
    }

    /// Makes this vector an element-wise copy of `rhs`.
    ///
    /// When `rhs` does not fit into the current capacity, a full copy is built first
    /// and swapped in, so a panicking `clone` leaves `self` as it was. Otherwise the
    /// existing storage is reused: shared positions are overwritten with
    /// `Clone::clone_from`, missing ones are cloned into the free slots and surplus
    /// ones are dropped.
    pub fn assign(&mut self, rhs: &Vector<T>) where T: Clone {
        if rhs.size > self.capacity() {
            let mut copy = rhs.clone();
            self.swap_with(&mut copy);
            return;
        }

        let common = self.size.min(rhs.size);
        for (dst, src) in self.as_mut_slice()[..common].iter_mut().zip(&rhs.as_slice()[..common]) {
            dst.clone_from(src);
        }
        if rhs.size > self.size {
            for src in &rhs.as_slice()[self.size..] {
                let value = src.clone();
                unsafe { self.storage.address_at_mut(self.size).write(value) };
                self.size += 1;
            }
        } else {
            self.truncate(rhs.size);
        }
    }

    /// Number of live elements.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// Begin and end addresses of the live range.
    pub fn as_ptr_range(&self) -> Range<*const T> {
        self.storage.address_at(0)..self.storage.address_at(self.size)
    }

    pub fn as_mut_ptr_range(&mut self) -> Range<*mut T> {
        let end = self.storage.address_at_mut(self.size);
        self.storage.as_mut_ptr()..end
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.size) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.storage.as_mut_ptr(), self.size) }
    }

    /// Element at `index` without a bounds check.
    ///
    /// The bound is only asserted in debug builds; `index >= size()` is undefined behaviour.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.size, "index {} out of range for size {}", index, self.size);
        &*self.storage.as_ptr().add(index)
    }

    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.size, "index {} out of range for size {}", index, self.size);
        &mut *self.storage.as_mut_ptr().add(index)
    }

    /// Ensures room for at least `capacity` elements, reallocating to exactly that many if needed.
    pub fn reserve(&mut self, capacity: usize) {
        if let Err(e) = self.try_reserve(capacity) {
            e.raise()
        }
    }

    /// Like `reserve`, but hands allocation failure back; the vector is unchanged in that case.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), Error> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        let mut block: RawMemory<T> = RawMemory::allocate(capacity)?;
        unsafe { relocate::move_relocate(self.storage.as_ptr(), block.as_mut_ptr(), self.size) };
        self.adopt(block);
        Ok(())
    }

    /// Grows or shrinks to exactly `size` elements, filling with `T::default()`.
    pub fn resize(&mut self, size: usize) where T: Default {
        self.resize_with(size, T::default)
    }

    /// Grows or shrinks to exactly `size` elements, filling with values produced by `f`.
    ///
    /// If `f` panics, the elements constructed so far stay in the vector.
    pub fn resize_with<F>(&mut self, size: usize, mut f: F) where F: FnMut() -> T {
        if size <= self.size {
            self.truncate(size);
            return;
        }
        self.reserve(size);
        while self.size < size {
            let value = f();
            unsafe { self.storage.address_at_mut(self.size).write(value) };
            self.size += 1;
        }
    }

    /// Drops the elements past `size`. Capacity is left alone.
    pub fn truncate(&mut self, size: usize) {
        if size >= self.size {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(self.storage.address_at_mut(size), self.size - size);
        self.size = size;
        unsafe { ptr::drop_in_place(tail) };
    }

    pub fn clear(&mut self) {
        self.truncate(0)
    }

    pub fn push_back(&mut self, value: T) {
        self.emplace_back(move || value);
    }

    /// Appends a clone of `value`.
    ///
    /// When the vector is full, the clone is made directly into the new block, so a
    /// panicking `clone` leaves size, capacity and contents unchanged.
    pub fn push_back_cloned(&mut self, value: &T) where T: Clone {
        self.emplace_back(|| value.clone());
    }

    /// Appends `value`, handing allocation failure back instead of aborting.
    ///
    /// On failure the vector is unchanged and `value` comes back with the error.
    pub fn try_push_back(&mut self, value: T) -> Result<(), (Error, T)> {
        if self.size == self.capacity() {
            if let Err(e) = self.grown_capacity().and_then(|capacity| self.try_reserve(capacity)) {
                return Err((e, value));
            }
        }
        unsafe { self.storage.address_at_mut(self.size).write(value) };
        self.size += 1;
        Ok(())
    }

    /// Constructs an element at the end from `f` and returns a reference to it.
    pub fn emplace_back<F>(&mut self, f: F) -> &mut T where F: FnOnce() -> T {
        let end = self.size;
        self.emplace(end, f);
        unsafe { self.get_unchecked_mut(end) }
    }

    /// Constructs an element from `f` at `pos`, shifting the tail one slot right.
    ///
    /// Returns the position of the new element. Panics if `pos > size()`.
    pub fn emplace<F>(&mut self, pos: usize, f: F) -> usize where F: FnOnce() -> T {
        if let Err(e) = self.try_emplace(pos, f) {
            e.raise()
        }
        pos
    }

    pub fn insert(&mut self, pos: usize, value: T) -> usize {
        self.emplace(pos, move || value)
    }

    pub fn insert_cloned(&mut self, pos: usize, value: &T) -> usize where T: Clone {
        self.emplace(pos, || value.clone())
    }

    /// Drops the element at `pos` and shifts the tail one slot left.
    ///
    /// Returns `pos`, which now holds the element that followed the erased one
    /// (or is the end position). Panics if `pos >= size()`.
    pub fn erase(&mut self, pos: usize) -> usize {
        drop(self.remove(pos));
        pos
    }

    /// Same as `erase`, but returns the element instead of dropping it.
    pub fn remove(&mut self, pos: usize) -> T {
        assert!(pos < self.size, "erase position {} out of range for size {}", pos, self.size);
        let tail = self.size - pos - 1;
        unsafe {
            let slot = self.storage.address_at_mut(pos);
            let removed = slot.read();
            ptr::copy(slot.add(1), slot, tail);
            self.size -= 1;
            removed
        }
    }

    /// Removes the last element, or returns `None` if there is none.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        self.size -= 1;
        Some(unsafe { self.storage.address_at(self.size).read() })
    }

    fn try_emplace<F>(&mut self, pos: usize, f: F) -> Result<(), Error> where F: FnOnce() -> T {
        assert!(pos <= self.size, "emplace position {} out of range for size {}", pos, self.size);

        if self.size == self.capacity() {
            // the new element goes into the new block first; if `f` panics, `block` is released on unwind
            let mut block: RawMemory<T> = RawMemory::allocate(self.grown_capacity()?)?;
            unsafe {
                block.address_at_mut(pos).write(f());
                let src = self.storage.as_ptr();
                let dst = block.as_mut_ptr();
                relocate::move_relocate(src, dst, pos);
                relocate::move_relocate(src.add(pos), dst.add(pos + 1), self.size - pos);
            }
            self.adopt(block);
        } else if pos == self.size {
            unsafe { self.storage.address_at_mut(pos).write(f()) };
        } else {
            let value = f();
            let tail = self.size - pos;
            unsafe {
                let slot = self.storage.address_at_mut(pos);
                ptr::copy(slot, slot.add(1), tail);
                slot.write(value);
            }
        }

        self.size += 1;
        Ok(())
    }

    /// Capacity after growing by one slot: double, but at least `size + 1`.
    fn grown_capacity(&self) -> Result<usize, Error> {
        let required = self.size.checked_add(1)
            .ok_or(Error::CapacityOverflow { requested: self.size })?;
        Ok(self.capacity().saturating_mul(2).max(required))
    }

    /// Switches to `block`, whose leading `size` slots already hold the relocated elements.
    fn adopt(&mut self, mut block: RawMemory<T>) {
        debug!("relocated {} elements from {} to {} slots", self.size, self.capacity(), block.capacity());
        self.storage.swap(&mut block);
        // `block` now owns the old storage, whose elements were moved out
    }

    /// Splits into storage and live element count without dropping anything.
    pub(crate) fn into_raw_parts(self) -> (RawMemory<T>, usize) {
        let mut this = ManuallyDrop::new(self);
        let size = this.size;
        (this.storage.take(), size)
    }
}

impl<T> Drop for Vector<T> {
    fn drop(&mut self) {
        unsafe { ptr::drop_in_place(self.as_mut_slice()) };
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Vector::new()
    }
}

impl<T: Clone> Clone for Vector<T> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(vector) => vector,
            Err(e) => e.raise(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source)
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        assert!(index < self.size, "index {} out of range for size {}", index, self.size);
        unsafe { self.get_unchecked(index) }
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(index < self.size, "index {} out of range for size {}", index, self.size);
        unsafe { self.get_unchecked_mut(index) }
    }
}

impl<T> Deref for Vector<T> {
    type Target = [T];

    #[inline(always)]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Vector<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for Vector<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for Vector<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, U> PartialEq<Vector<U>> for Vector<T> where T: PartialEq<U> {
    fn eq(&self, other: &Vector<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U> PartialEq<[U]> for Vector<T> where T: PartialEq<U> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<'a, T, U> PartialEq<&'a [U]> for Vector<T> where T: PartialEq<U> {
    fn eq(&self, other: &&'a [U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for Vector<T> where T: PartialEq<U> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<T: Eq> Eq for Vector<T> {}

impl<T: Hash> Hash for Vector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<'a, T: Clone> From<&'a [T]> for Vector<T> {
    fn from(items: &'a [T]) -> Self {
        let mut vector = Vector::with_capacity(items.len());
        unsafe { relocate::clone_relocate(items, vector.storage.as_mut_ptr()) };
        vector.size = items.len();
        vector
    }
}

impl<T> Extend<T> for Vector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(self.size.saturating_add(lower));
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for Vector<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        <Self as Extend<T>>::extend(self, iter.into_iter().copied())
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vector = Vector::new();
        vector.extend(iter);
        vector
    }
}
