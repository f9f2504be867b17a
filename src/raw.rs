use std::alloc::{self, Layout};
use std::fmt;
use std::mem::{self, MaybeUninit};
use std::ops::{Index, IndexMut};
use std::ptr::NonNull;

use crate::Error;

/// Uninitialized storage for a fixed number of `T` slots.
///
/// `RawMemory` never constructs or drops a `T`. It hands out slot addresses and
/// releases the block when dropped; knowing which slots hold live values is the
/// owner's job.
///
/// An empty `RawMemory` owns no block and reports a capacity of zero. Its pointer
/// is dangling and must never be dereferenced. Zero-sized element types never
/// touch the allocator at all, but still report the requested capacity.
pub struct RawMemory<T> {
    ptr: NonNull<T>,
    capacity: usize,
}

impl<T> RawMemory<T> {
    /// Storage without a block.
    pub const fn new() -> RawMemory<T> {
        RawMemory {
            ptr: NonNull::dangling(),
            capacity: 0,
        }
    }

    /// Requests a block for `capacity` slots from the global allocator.
    ///
    /// Returns empty storage when `capacity` is zero. On failure nothing is allocated.
    pub fn allocate(capacity: usize) -> Result<RawMemory<T>, Error> {
        if capacity == 0 {
            return Ok(RawMemory::new());
        }
        let layout = Self::layout(capacity)?;
        if layout.size() == 0 {
            return Ok(RawMemory {
                ptr: NonNull::dangling(),
                capacity,
            });
        }

        let ptr = unsafe { alloc::alloc(layout) } as *mut T;
        let ptr = NonNull::new(ptr).ok_or(Error::AllocFailed { layout })?;
        trace!("allocate {} slots ({} bytes) at {:?}", capacity, layout.size(), ptr);

        Ok(RawMemory {
            ptr,
            capacity,
        })
    }

    /// Same as `allocate`, but aborts through `handle_alloc_error` when the allocator gives up.
    pub fn with_capacity(capacity: usize) -> RawMemory<T> {
        match RawMemory::allocate(capacity) {
            Ok(memory) => memory,
            Err(e) => e.raise(),
        }
    }

    fn layout(capacity: usize) -> Result<Layout, Error> {
        Layout::array::<T>(capacity).map_err(|_| Error::CapacityOverflow { requested: capacity })
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if this storage owns a block (possibly a zero-byte one for zero-sized `T`).
    #[inline(always)]
    pub fn is_allocated(&self) -> bool {
        self.capacity != 0
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Address of slot `offset`.
    ///
    /// `offset == capacity` is allowed and yields the one-past-the-end address,
    /// which may be compared against but never read or written.
    #[inline]
    pub fn address_at(&self, offset: usize) -> *const T {
        assert!(offset <= self.capacity, "offset {} is past the end of {} slots", offset, self.capacity);
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Mutable variant of `address_at`.
    #[inline]
    pub fn address_at_mut(&mut self, offset: usize) -> *mut T {
        assert!(offset <= self.capacity, "offset {} is past the end of {} slots", offset, self.capacity);
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Exchanges blocks with `other` in constant time.
    pub fn swap(&mut self, other: &mut RawMemory<T>) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }

    /// Moves the block out, leaving this storage empty.
    pub fn take(&mut self) -> RawMemory<T> {
        let mut taken = RawMemory::new();
        taken.swap(self);
        taken
    }
}

impl<T> Default for RawMemory<T> {
    fn default() -> Self {
        RawMemory::new()
    }
}

impl<T> Index<usize> for RawMemory<T> {
    type Output = MaybeUninit<T>;

    #[inline]
    fn index(&self, index: usize) -> &MaybeUninit<T> {
        assert!(index < self.capacity, "slot {} out of range for {} slots", index, self.capacity);
        unsafe { &*(self.ptr.as_ptr().add(index) as *const MaybeUninit<T>) }
    }
}

impl<T> IndexMut<usize> for RawMemory<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut MaybeUninit<T> {
        assert!(index < self.capacity, "slot {} out of range for {} slots", index, self.capacity);
        unsafe { &mut *(self.ptr.as_ptr().add(index) as *mut MaybeUninit<T>) }
    }
}

impl<T> fmt::Debug for RawMemory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMemory")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> Drop for RawMemory<T> {
    fn drop(&mut self) {
        if self.capacity == 0 {
            return;
        }
        // the layout was valid when the block was allocated
        if let Ok(layout) = Self::layout(self.capacity) {
            if layout.size() != 0 {
                trace!("release {} slots at {:?}", self.capacity, self.ptr);
                unsafe { alloc::dealloc(self.ptr.as_ptr() as *mut u8, layout) };
            }
        }
    }
}
