use std::alloc::Layout;
use std::fmt::{self, Display};

/// Failure to obtain storage for a block of elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested number of slots does not fit into the address space.
    CapacityOverflow { requested: usize },
    /// The global allocator could not satisfy the request.
    AllocFailed { layout: Layout },
}

impl Error {
    /// Escalates the error the way the standard collections do when no `Result` can be returned.
    pub(crate) fn raise(self) -> ! {
        match self {
            Error::CapacityOverflow { requested } => panic!("capacity overflow: {} slots requested", requested),
            Error::AllocFailed { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapacityOverflow { requested } => write!(f, "Capacity of {} slots overflows the address space", requested),
            Error::AllocFailed { layout } => write!(f, "Allocator failed to provide {} bytes aligned to {}", layout.size(), layout.align()),
        }
    }
}

impl std::error::Error for Error {}
