//! Error types shared by the list and the map.

use core::fmt;

/// Failure to obtain storage for a node, an entry or a bucket array.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AllocError {
    /// A capacity computation overflowed, or the slot arena is full.
    CapacityOverflow,
    /// The allocator refused a bucket array of this many buckets.
    OutOfMemory { buckets: usize },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::CapacityOverflow => f.write_str("capacity overflow"),
            AllocError::OutOfMemory { buckets } => {
                write!(f, "out of memory allocating {} buckets", buckets)
            }
        }
    }
}

impl std::error::Error for AllocError {}

/// `first`/`last` on a list with no elements.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EmptyError;

impl fmt::Display for EmptyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("container is empty")
    }
}

impl std::error::Error for EmptyError {}
