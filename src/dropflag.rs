//! This module is for testing only

use std::cell::RefCell;
use std::rc::Rc;

pub type DropFlag<T> = Rc<RefCell<T>>;

/// Adds one to the shared flag every time a copy of it is dropped.
#[derive(Debug)]
pub struct Droppable {
    pub value: i32,
    pub dropflag: DropFlag<usize>,
}

impl Droppable {
    pub fn new(value: i32, dropflag: &DropFlag<usize>) -> Droppable {
        Droppable {
            value,
            dropflag: dropflag.clone(),
        }
    }
}

impl Clone for Droppable {
    fn clone(&self) -> Self {
        Droppable::new(self.value, &self.dropflag)
    }
}

impl PartialEq for Droppable {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Drop for Droppable {
    fn drop(&mut self) {
        *self.dropflag.borrow_mut() += 1;
    }
}

/// Panics on the `fuse`-th clone counted by the shared `clones` counter.
///
/// Drops are counted as well, so tests can check that no clone outlives a failed operation.
#[derive(Debug)]
pub struct CloneBomb {
    pub value: i32,
    pub fuse: usize,
    pub clones: DropFlag<usize>,
    pub drops: DropFlag<usize>,
}

impl CloneBomb {
    pub fn new(value: i32, fuse: usize, clones: &DropFlag<usize>, drops: &DropFlag<usize>) -> CloneBomb {
        CloneBomb {
            value,
            fuse,
            clones: clones.clone(),
            drops: drops.clone(),
        }
    }
}

impl Clone for CloneBomb {
    fn clone(&self) -> Self {
        let count = {
            let mut clones = self.clones.borrow_mut();
            *clones += 1;
            *clones
        };
        if count == self.fuse {
            panic!("clone bomb went off on clone {}", count);
        }
        CloneBomb::new(self.value, self.fuse, &self.clones, &self.drops)
    }
}

impl PartialEq for CloneBomb {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Drop for CloneBomb {
    fn drop(&mut self) {
        *self.drops.borrow_mut() += 1;
    }
}

#[test]
fn dropflag() {
    let flag = DropFlag::new(RefCell::new(0));
    let droppable = Droppable::new(7, &flag);
    let copy = droppable.clone();
    assert_eq!(0, *flag.borrow());
    std::mem::drop(droppable);
    assert_eq!(1, *flag.borrow());
    std::mem::drop(copy);
    assert_eq!(2, *flag.borrow());
}

#[test]
fn clone_bomb_goes_off_on_fuse() {
    let clones = DropFlag::new(RefCell::new(0));
    let drops = DropFlag::new(RefCell::new(0));
    let bomb = CloneBomb::new(1, 2, &clones, &drops);
    let first = bomb.clone();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| bomb.clone()));
    assert!(result.is_err());
    assert_eq!(2, *clones.borrow());
    assert_eq!(first, bomb);
}
