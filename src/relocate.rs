//! Moving and cloning runs of elements into uninitialized slots.
//!
//! A Rust move is a bitwise copy that can not fail and leaves nothing behind to
//! destroy, so growing a block always goes through `move_relocate`. Cloning is
//! reserved for the cases where the source must stay intact, and runs behind an
//! `InitGuard` so that a panicking `clone` never leaves half a run alive.

use std::mem;
use std::ptr;

/// Moves `count` live elements from `src` into the uninitialized slots at `dst`.
///
/// Afterwards the source slots are logically uninitialized and must not be dropped.
/// The two ranges must not overlap.
#[inline]
pub(crate) unsafe fn move_relocate<T>(src: *const T, dst: *mut T, count: usize) {
    ptr::copy_nonoverlapping(src, dst, count);
}

/// Clones every element of `src` into the uninitialized slots starting at `dst`.
pub(crate) unsafe fn clone_relocate<T: Clone>(src: &[T], dst: *mut T) {
    let mut guard = InitGuard::new(dst);
    for item in src {
        guard.push(item.clone());
    }
    guard.finish();
}

/// Constructs `count` elements produced by `f` into the uninitialized slots starting at `dst`.
pub(crate) unsafe fn fill_with<T, F>(dst: *mut T, count: usize, mut f: F)
    where F: FnMut() -> T
{
    let mut guard = InitGuard::new(dst);
    for _ in 0..count {
        guard.push(f());
    }
    guard.finish();
}

/// Run of freshly constructed elements that is dropped again unless `finish` is reached.
pub(crate) struct InitGuard<T> {
    start: *mut T,
    initialized: usize,
}

impl<T> InitGuard<T> {
    pub unsafe fn new(start: *mut T) -> InitGuard<T> {
        InitGuard {
            start,
            initialized: 0,
        }
    }

    /// Writes `value` into the next slot; the caller guarantees the slot exists.
    #[inline(always)]
    pub unsafe fn push(&mut self, value: T) {
        self.start.add(self.initialized).write(value);
        self.initialized += 1;
    }

    /// Hands ownership of the run to the caller and returns its length.
    pub fn finish(self) -> usize {
        let initialized = self.initialized;
        mem::forget(self);
        initialized
    }
}

impl<T> Drop for InitGuard<T> {
    fn drop(&mut self) {
        trace!("unwinding {} partially constructed elements", self.initialized);
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start, self.initialized)) };
    }
}

#[cfg(test)]
mod relocate_tests {
    use super::{clone_relocate, fill_with, move_relocate, InitGuard};
    use crate::dropflag::{CloneBomb, DropFlag, Droppable};
    use crate::RawMemory;
    use std::cell::RefCell;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn move_relocate_transfers_without_dropping() {
        let flag = DropFlag::new(RefCell::new(0));
        let mut from = RawMemory::<Droppable>::allocate(3).unwrap();
        let mut to = RawMemory::<Droppable>::allocate(3).unwrap();
        for i in 0..3 {
            from[i].write(Droppable::new(i as i32, &flag));
        }

        unsafe { move_relocate(from.as_ptr(), to.as_mut_ptr(), 3) };
        drop(from);
        assert_eq!(0, *flag.borrow());

        for i in 0..3 {
            let item = unsafe { to[i].assume_init_read() };
            assert_eq!(i as i32, item.value);
        }
        assert_eq!(3, *flag.borrow());
    }

    #[test]
    fn clone_relocate_keeps_source() {
        let source = vec![String::from("a"), String::from("b")];
        let mut to = RawMemory::<String>::allocate(2).unwrap();

        unsafe { clone_relocate(&source, to.as_mut_ptr()) };

        assert_eq!(vec!["a", "b"], source);
        assert_eq!("a", unsafe { to[0].assume_init_read() });
        assert_eq!("b", unsafe { to[1].assume_init_read() });
    }

    #[test]
    fn panicking_clone_drops_partial_run() {
        let clones = DropFlag::new(RefCell::new(0));
        let drops = DropFlag::new(RefCell::new(0));
        let source: Vec<CloneBomb> = (0..4).map(|i| CloneBomb::new(i, 3, &clones, &drops)).collect();
        let mut to = RawMemory::<CloneBomb>::allocate(4).unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| unsafe { clone_relocate(&source, to.as_mut_ptr()) }));

        assert!(result.is_err());
        assert_eq!(3, *clones.borrow());
        assert_eq!(2, *drops.borrow(), "both finished clones are dropped");
        assert_eq!(4, source.len());
    }

    #[test]
    fn fill_with_constructs_in_order() {
        let mut to = RawMemory::<usize>::allocate(5).unwrap();
        let mut next = 0;
        unsafe {
            fill_with(to.as_mut_ptr(), 5, || {
                next += 1;
                next
            })
        };
        for i in 0..5 {
            assert_eq!(i + 1, unsafe { to[i].assume_init_read() });
        }
    }

    #[test]
    fn finished_guard_keeps_elements_alive() {
        let flag = DropFlag::new(RefCell::new(0));
        let mut to = RawMemory::<Droppable>::allocate(2).unwrap();
        let count = unsafe {
            let mut guard = InitGuard::new(to.as_mut_ptr());
            guard.push(Droppable::new(1, &flag));
            guard.push(Droppable::new(2, &flag));
            guard.finish()
        };
        assert_eq!(2, count);
        assert_eq!(0, *flag.borrow());
        unsafe {
            to[0].assume_init_drop();
            to[1].assume_init_drop();
        }
        assert_eq!(2, *flag.borrow());
    }
}
