//! Resize policy for `ChainedHashMap`.

use crate::error::AllocError;

/// Load factor used until `set_load_factor` says otherwise.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// How many buckets the map has after a resize.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Growth {
    /// Add this many buckets per resize.
    Additive(usize),
    /// Multiply the bucket count by this factor per resize.
    Multiplicative(usize),
    /// Never resize; chains just get longer.
    Fixed,
}

impl Growth {
    /// Decode the signed offset convention: positive values add buckets,
    /// values below -1 multiply by `|off|`, and 0 or -1 disable resizing.
    pub fn from_offset(off: i32) -> Self {
        if off > 0 {
            Growth::Additive(off as usize)
        } else if off < -1 {
            Growth::Multiplicative(off.unsigned_abs() as usize)
        } else {
            Growth::Fixed
        }
    }

    /// The bucket count following `current`, or `None` when this policy does
    /// not grow from there.
    pub fn next_capacity(self, current: usize) -> Result<Option<usize>, AllocError> {
        let next = match self {
            Growth::Additive(0) | Growth::Multiplicative(0) | Growth::Multiplicative(1) => {
                return Ok(None)
            }
            Growth::Fixed => return Ok(None),
            Growth::Additive(n) => current.checked_add(n),
            Growth::Multiplicative(k) => current.checked_mul(k),
        };
        next.map(Some).ok_or(AllocError::CapacityOverflow)
    }
}

/// `floor(capacity * factor)`, saturating at `usize::MAX`.
pub(crate) fn threshold(capacity: usize, factor: f32) -> usize {
    (capacity as f64 * factor as f64) as usize
}
