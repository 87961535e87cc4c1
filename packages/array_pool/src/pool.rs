use std::any::type_name;
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::{ArrayPoolBuilder, DropPolicy, Result, Slot, SlotTracker};

/// A fixed-capacity object pool over an array owned by the caller.
///
/// The pool borrows the array for its whole lifetime and tracks which elements are in use.
/// Acquiring hands out the element that has been unused the longest; retiring puts an element
/// back at the end of the line. Neither operation allocates or moves elements, and neither reads
/// or writes element contents: the pool only decides *which* element is yours.
///
/// Because the pool reuses elements instead of constructing new ones, an acquired element still
/// holds whatever its previous user left in it. Reset it before use, or use
/// [`acquire_with()`][1] to do that as part of acquiring.
///
/// # Example
///
/// ```rust
/// use array_pool::ArrayPool;
///
/// #[derive(Default)]
/// struct Missile {
///     time_to_live: u32,
/// }
///
/// let mut missiles: [Missile; 4] = Default::default();
/// let mut pool = ArrayPool::new(&mut missiles).unwrap();
///
/// let slot = pool.acquire_with(|m| m.time_to_live = 2).unwrap();
/// pool.acquire_with(|m| m.time_to_live = 5).unwrap();
///
/// // Update all active missiles, retiring the ones that expire.
/// let expired = pool.retire_if(|_, m| {
///     m.time_to_live -= 2;
///     m.time_to_live == 0
/// });
///
/// assert_eq!(expired, 1);
/// assert!(!pool.is_active(slot));
/// assert_eq!(pool.active_count(), 1);
/// ```
///
/// # Storage lifetime
///
/// The pool cannot outlive the array it tracks. Once the pool is gone (dropped, or explicitly
/// via [`destroy()`][2] which also hands back the borrow), the array is yours again to use or free.
///
/// # Misuse
///
/// Retiring a slot that is already free, or a slot that another pool handed out, is reported as
/// an error and leaves the pool unchanged. Element access with such a slot panics.
///
/// [1]: Self::acquire_with
/// [2]: Self::destroy
pub struct ArrayPool<'s, T> {
    storage: &'s mut [T],
    tracker: SlotTracker,
}

impl<T> fmt::Debug for ArrayPool<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayPool")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl<'s, T> ArrayPool<'s, T> {
    /// Creates a pool that tracks every element of `storage`, all of them initially unused.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`][1] if the tracking storage cannot be allocated.
    ///
    /// # Panics
    ///
    /// Panics if `storage` is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use array_pool::ArrayPool;
    ///
    /// let mut connections = vec![0_u64; 32];
    /// let pool = ArrayPool::new(&mut connections).unwrap();
    ///
    /// assert_eq!(pool.capacity(), 32);
    /// assert_eq!(pool.available(), 32);
    /// ```
    ///
    /// [1]: crate::Error::AllocationFailure
    pub fn new(storage: &'s mut [T]) -> Result<Self> {
        Self::builder().build(storage)
    }

    /// Starts building a new [`ArrayPool`].
    ///
    /// Use this when you want to customize the pool configuration beyond the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use array_pool::{ArrayPool, DropPolicy};
    ///
    /// let mut items = [0_u8; 4];
    ///
    /// let pool = ArrayPool::builder()
    ///     .drop_policy(DropPolicy::MustNotDropActiveSlots)
    ///     .build(&mut items)
    ///     .unwrap();
    ///
    /// assert_eq!(pool.active_count(), 0);
    /// ```
    pub fn builder() -> ArrayPoolBuilder<T> {
        ArrayPoolBuilder::new()
    }

    pub(crate) fn new_inner(storage: &'s mut [T], drop_policy: DropPolicy) -> Result<Self> {
        let tracker = SlotTracker::with_drop_policy(storage.len(), drop_policy)?;

        Ok(Self { storage, tracker })
    }

    /// The number of elements tracked by the pool, which is the length of the array.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tracker.capacity()
    }

    /// The number of unused elements.
    #[must_use]
    pub fn available(&self) -> usize {
        self.tracker.available()
    }

    /// The number of elements in use.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tracker.active_count()
    }

    /// Whether every element is in use.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.tracker.is_exhausted()
    }

    /// Whether any element is in use.
    #[must_use]
    pub fn has_active(&self) -> bool {
        self.tracker.has_active()
    }

    /// Whether `slot` was handed out by this pool and is still in use.
    #[must_use]
    pub fn is_active(&self, slot: Slot) -> bool {
        self.tracker.is_active(slot)
    }

    /// The slot tracker behind the pool, for cursor-style walks over the active slots.
    ///
    /// See [`SlotTracker`] for how to retire slots while walking.
    #[must_use]
    pub fn tracker(&self) -> &SlotTracker {
        &self.tracker
    }

    /// Marks the element that has been unused the longest as in use and returns its slot.
    ///
    /// The element is not modified. It still contains whatever its previous user left in it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`][1] if every element is in use. The pool is unchanged.
    ///
    /// [1]: crate::Error::Exhausted
    pub fn acquire(&mut self) -> Result<Slot> {
        self.tracker.acquire()
    }

    /// Acquires an element and lets `init` prepare it before the slot is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`][1] if every element is in use. The pool is unchanged and
    /// `init` is not called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use array_pool::ArrayPool;
    ///
    /// let mut names = [String::new(), String::new()];
    /// let mut pool = ArrayPool::new(&mut names).unwrap();
    ///
    /// let slot = pool.acquire_with(|name| *name = "Bob".to_string()).unwrap();
    ///
    /// assert_eq!(pool[slot], "Bob");
    /// ```
    ///
    /// [1]: crate::Error::Exhausted
    pub fn acquire_with<F>(&mut self, init: F) -> Result<Slot>
    where
        F: FnOnce(&mut T),
    {
        let slot = self.tracker.acquire()?;
        init(self.element_mut(slot.index()));
        Ok(slot)
    }

    /// Returns an element to the unused set. It will be the last one handed out again.
    ///
    /// The element is not modified.
    ///
    /// # Errors
    ///
    /// * [`Error::ForeignSlot`][1] if the slot was handed out by a different pool.
    /// * [`Error::SlotNotActive`][2] if the element is already unused.
    ///
    /// In both cases the pool is unchanged.
    ///
    /// [1]: crate::Error::ForeignSlot
    /// [2]: crate::Error::SlotNotActive
    pub fn retire(&mut self, slot: Slot) -> Result<()> {
        self.tracker.retire(slot)
    }

    /// Returns every element in use to the unused set.
    ///
    /// # Example
    ///
    /// ```rust
    /// use array_pool::ArrayPool;
    ///
    /// let mut items = [0_i32; 3];
    /// let mut pool = ArrayPool::new(&mut items).unwrap();
    /// pool.acquire().unwrap();
    /// pool.acquire().unwrap();
    ///
    /// pool.retire_all();
    ///
    /// assert!(!pool.has_active());
    /// ```
    pub fn retire_all(&mut self) {
        self.tracker.retire_all();
    }

    /// Visits every element in use, oldest first, and retires each one for which `predicate`
    /// returns `true`. Returns the number of elements retired.
    ///
    /// The predicate may modify the element, which makes this a natural fit for an update loop
    /// that also expires elements.
    pub fn retire_if<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(Slot, &mut T) -> bool,
    {
        let mut retired: usize = 0;
        let mut cursor = self.tracker.first_active();

        while let Some(slot) = cursor {
            // Must be obtained before retiring, which unlinks the slot from the active list.
            cursor = self.tracker.next_active(slot);

            if predicate(slot, self.element_mut(slot.index())) {
                self.tracker
                    .retire(slot)
                    .expect("slot was taken from the active list and not yet retired");

                retired = retired
                    .checked_add(1)
                    .expect("cannot retire more slots than the pool has");
            }
        }

        retired
    }

    /// Calls `f` with every element in use, oldest first.
    pub fn for_each_active_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(Slot, &mut T),
    {
        let mut cursor = self.tracker.first_active();

        while let Some(slot) = cursor {
            cursor = self.tracker.next_active(slot);
            f(slot, self.element_mut(slot.index()));
        }
    }

    /// Iterates over the elements in use, oldest first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use array_pool::ArrayPool;
    ///
    /// let mut items = [10, 20, 30];
    /// let mut pool = ArrayPool::new(&mut items).unwrap();
    ///
    /// let first = pool.acquire().unwrap();
    /// pool.acquire().unwrap();
    /// pool.retire(first).unwrap();
    /// pool.acquire().unwrap();
    ///
    /// let values = pool.iter_active().map(|(_, v)| *v).collect::<Vec<_>>();
    /// assert_eq!(values, vec![20, 30]);
    /// ```
    pub fn iter_active(&self) -> impl Iterator<Item = (Slot, &T)> + '_ {
        self.tracker
            .active_slots()
            .map(|slot| (slot, self.element(slot.index())))
    }

    /// The element for an active slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot was handed out by a different pool or is no longer active.
    #[must_use]
    pub fn get(&self, slot: Slot) -> &T {
        let index = self.expect_active(slot, "get");
        self.element(index)
    }

    /// The element for an active slot, for modification.
    ///
    /// # Panics
    ///
    /// Panics if the slot was handed out by a different pool or is no longer active.
    #[must_use]
    pub fn get_mut(&mut self, slot: Slot) -> &mut T {
        let index = self.expect_active(slot, "get_mut");
        self.element_mut(index)
    }

    /// Releases the tracking storage and returns the borrow of the array.
    ///
    /// Equivalent to dropping the pool, except that the caller can keep using the array through
    /// the returned reference without having to re-borrow it.
    ///
    /// # Panics
    ///
    /// Panics if elements are still in use and the pool was built with
    /// [`DropPolicy::MustNotDropActiveSlots`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use array_pool::ArrayPool;
    ///
    /// let mut items = [0_u32; 2];
    /// let mut pool = ArrayPool::new(&mut items).unwrap();
    ///
    /// let slot = pool.acquire().unwrap();
    /// pool[slot] = 7;
    ///
    /// let items = pool.destroy();
    /// assert_eq!(items, &[7, 0]);
    /// ```
    pub fn destroy(self) -> &'s mut [T] {
        let Self { storage, tracker } = self;
        tracker.destroy();
        storage
    }

    fn expect_active(&self, slot: Slot, operation: &str) -> usize {
        match self.tracker.active_index(slot) {
            Ok(index) => index,
            Err(error) => panic!(
                "{operation}({}) failed in pool of {}: {error}",
                slot.index(),
                type_name::<T>()
            ),
        }
    }

    fn element(&self, index: usize) -> &T {
        self.storage
            .get(index)
            .expect("tracker capacity always equals the storage length")
    }

    fn element_mut(&mut self, index: usize) -> &mut T {
        self.storage
            .get_mut(index)
            .expect("tracker capacity always equals the storage length")
    }
}

impl<T> Index<Slot> for ArrayPool<'_, T> {
    type Output = T;

    fn index(&self, slot: Slot) -> &Self::Output {
        self.get(slot)
    }
}

impl<T> IndexMut<Slot> for ArrayPool<'_, T> {
    fn index_mut(&mut self, slot: Slot) -> &mut Self::Output {
        self.get_mut(slot)
    }
}
