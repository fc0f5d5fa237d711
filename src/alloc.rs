//! Fallible allocation helpers.
//!
//! `slotmap` has no fallible reserve, and its `insert` panics once the arena
//! would hold `u32::MAX` elements. `check_slot` turns that limit into an
//! `AllocError` ahead of time. Bucket arrays go through `try_reserve_exact`
//! so a refused allocation is reported instead of aborting.

use crate::error::AllocError;
use slotmap::{DefaultKey, SlotMap};

/// Largest number of live slots an arena may hold.
pub(crate) const MAX_SLOTS: usize = u32::MAX as usize - 1;

/// Ok if one more element fits in `slots`.
#[inline]
pub(crate) fn check_slot<T>(slots: &SlotMap<DefaultKey, T>) -> Result<(), AllocError> {
    if slots.len() >= MAX_SLOTS {
        return Err(AllocError::CapacityOverflow);
    }
    Ok(())
}

/// Allocate `n` empty chain heads.
pub(crate) fn bucket_array(n: usize) -> Result<Vec<Option<DefaultKey>>, AllocError> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(n)
        .map_err(|_| AllocError::OutOfMemory { buckets: n })?;
    buckets.resize(n, None);
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_array_is_all_empty() {
        let b = bucket_array(7).unwrap();
        assert_eq!(b.len(), 7);
        assert!(b.iter().all(Option::is_none));
    }

    #[test]
    fn impossible_bucket_array_is_reported() {
        match bucket_array(usize::MAX) {
            Err(AllocError::OutOfMemory { buckets }) => assert_eq!(buckets, usize::MAX),
            other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn empty_arena_has_room() {
        let slots: SlotMap<DefaultKey, u8> = SlotMap::new();
        assert!(check_slot(&slots).is_ok());
    }
}
