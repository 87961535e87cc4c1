/// Identifies one element of the array tracked by a pool.
///
/// A slot is returned by [`acquire()`][1] and is the handle used to access or retire the element.
/// Use [`index()`][2] to find the element in the array you handed to the pool.
///
/// Slots remember which pool issued them, so handing a slot to a different pool is detected and
/// reported as [`Error::ForeignSlot`][3] instead of silently affecting an unrelated element.
///
/// # Slot reuse
///
/// The same element position is handed out again after its slot has been retired. A copy of an
/// old slot then refers to the new occupant, just like an index into the array would.
///
/// # Example
///
/// ```rust
/// use array_pool::ArrayPool;
///
/// let mut names = [""; 3];
/// let mut pool = ArrayPool::new(&mut names).unwrap();
///
/// let slot = pool.acquire().unwrap();
/// assert_eq!(slot.index(), 0);
///
/// pool[slot] = "Alice";
/// assert_eq!(pool[slot], "Alice");
/// ```
///
/// [1]: crate::ArrayPool::acquire
/// [2]: Self::index
/// [3]: crate::Error::ForeignSlot
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Slot {
    index: usize,
    pool_id: u64,
}

impl Slot {
    pub(crate) const fn new(index: usize, pool_id: u64) -> Self {
        Self { index, pool_id }
    }

    /// The position of the element in the array tracked by the pool.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    pub(crate) const fn pool_id(&self) -> u64 {
        self.pool_id
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;
    use std::hash::Hash;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Slot: Copy, Send, Sync, Debug, Eq, Hash);

    #[test]
    fn slots_from_different_pools_are_distinct() {
        assert_ne!(Slot::new(1, 10), Slot::new(1, 11));
        assert_eq!(Slot::new(1, 10), Slot::new(1, 10));
        assert_eq!(Slot::new(1, 10).index(), 1);
    }

    #[test]
    fn stale_copy_refers_to_new_occupant() {
        let mut storage = [0_u32; 1];
        let mut pool = crate::ArrayPool::new(&mut storage).unwrap();

        let first = pool.acquire().unwrap();
        let stale = first;
        pool.retire(first).unwrap();

        let second = pool.acquire_with(|item| *item = 7).unwrap();

        // Not generational: the old copy is indistinguishable from the new slot.
        assert_eq!(stale, second);
        assert_eq!(pool[stale], 7);
        pool.retire(stale).unwrap();
        assert!(!pool.is_active(second));
    }
}
