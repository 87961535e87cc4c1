use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{ArrayPool, DropPolicy, Result};

/// Builder for creating an instance of [`ArrayPool`].
///
/// You only need to use this builder if you want to customize the pool configuration.
/// The default configuration used by [`ArrayPool::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use array_pool::{ArrayPool, DropPolicy};
///
/// let mut slots = [0_u16; 10];
///
/// let pool = ArrayPool::builder()
///     .drop_policy(DropPolicy::MayDropActiveSlots)
///     .build(&mut slots)
///     .unwrap();
/// ```
///
/// [1]: ArrayPool::new
#[must_use]
pub struct ArrayPoolBuilder<T> {
    drop_policy: DropPolicy,

    _item: PhantomData<T>,
}

impl<T> fmt::Debug for ArrayPoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayPoolBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("drop_policy", &self.drop_policy)
            .finish()
    }
}

impl<T> ArrayPoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            drop_policy: DropPolicy::default(),
            _item: PhantomData,
        }
    }

    /// Sets the [drop policy][DropPolicy] for the pool. This governs whether the pool may be
    /// destroyed while some of its elements are still in use.
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds a pool over `storage` with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`][1] if the tracking storage cannot be allocated.
    ///
    /// # Panics
    ///
    /// Panics if `storage` is empty.
    ///
    /// [1]: crate::Error::AllocationFailure
    pub fn build(self, storage: &mut [T]) -> Result<ArrayPool<'_, T>> {
        ArrayPool::new_inner(storage, self.drop_policy)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_policy_allows_dropping_active_slots() {
        let mut storage = [0_u8; 2];
        let mut pool = ArrayPool::builder().build(&mut storage).unwrap();

        pool.acquire().unwrap();

        drop(pool);
    }

    #[test]
    fn debug_shows_policy() {
        let builder = ArrayPool::<u64>::builder().drop_policy(DropPolicy::MustNotDropActiveSlots);

        let debug = format!("{builder:?}");

        assert!(debug.contains("MustNotDropActiveSlots"));
        assert!(debug.contains("u64"));
    }
}
