use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use tracing::{debug, trace};

use crate::{DropPolicy, Error, ListIter, Membership, Node, Result, Slot, SlotList};

/// Source of pool identities. Only used to stamp slots so that a slot can be traced back to the
/// pool that issued it; no pool state is shared between pools.
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(0);

/// Tracks which of a fixed number of slots are in use, without knowing anything about the
/// elements that live in those slots.
///
/// This is the engine behind [`ArrayPool`][1]. Use it directly when the element storage is not a
/// single `&mut [T]` (e.g. parallel arrays, GPU buffers, memory owned by another component) and
/// you only need to know which indices are free.
///
/// Every slot is either free or active:
///
/// * [`acquire()`][2] takes the free slot that has been free the longest and makes it active.
/// * [`retire()`][3] makes an active slot free again.
/// * [`retire_all()`][4] makes every active slot free.
///
/// All three are constant time per slot moved and none of them allocate memory. The only
/// allocation happens when the tracker is created.
///
/// # Ordering
///
/// Free slots are handed out first-in-first-out: immediately after creation in index order,
/// afterwards in the order they were retired. Active slots are visited in the order they were
/// acquired, oldest first.
///
/// # Retiring while iterating
///
/// [`active_slots()`][5] borrows the tracker, so it cannot be used while retiring. To retire
/// slots during a walk, use the cursor methods [`first_active()`][6] and [`next_active()`][7] and
/// obtain the next slot *before* retiring the current one:
///
/// ```rust
/// use array_pool::SlotTracker;
///
/// let mut tracker = SlotTracker::new(4).unwrap();
/// for _ in 0..4 {
///     tracker.acquire().unwrap();
/// }
///
/// let mut cursor = tracker.first_active();
/// while let Some(slot) = cursor {
///     cursor = tracker.next_active(slot);
///
///     if slot.index() % 2 == 0 {
///         tracker.retire(slot).unwrap();
///     }
/// }
///
/// assert_eq!(tracker.active_count(), 2);
/// ```
///
/// [1]: crate::ArrayPool
/// [2]: Self::acquire
/// [3]: Self::retire
/// [4]: Self::retire_all
/// [5]: Self::active_slots
/// [6]: Self::first_active
/// [7]: Self::next_active
pub struct SlotTracker {
    /// One tracking node per slot, index-parallel to the tracked array. Never resized after
    /// creation, so indices stay valid for the lifetime of the tracker.
    nodes: Vec<Node>,

    free: SlotList,
    active: SlotList,

    /// Number of nodes in the free list.
    available: usize,

    id: u64,

    drop_policy: DropPolicy,
}

impl fmt::Debug for SlotTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotTracker")
            .field("id", &self.id)
            .field("capacity", &self.capacity())
            .field("available", &self.available)
            .field("drop_policy", &self.drop_policy)
            .finish_non_exhaustive()
    }
}

impl SlotTracker {
    /// Creates a tracker for `capacity` slots, all of them free.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the tracking storage cannot be allocated.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use array_pool::SlotTracker;
    ///
    /// let tracker = SlotTracker::new(16).unwrap();
    ///
    /// assert_eq!(tracker.capacity(), 16);
    /// assert_eq!(tracker.available(), 16);
    /// ```
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_drop_policy(capacity, DropPolicy::default())
    }

    /// Creates a tracker for `capacity` slots with a specific [drop policy][DropPolicy].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the tracking storage cannot be allocated.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_drop_policy(capacity: usize, drop_policy: DropPolicy) -> Result<Self> {
        assert!(capacity > 0, "a pool must have non-zero capacity");

        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(capacity)
            .map_err(|source| Error::AllocationFailure { capacity, source })?;

        // Will not reallocate because we reserved exactly this much above.
        nodes.resize(capacity, Node::detached(Membership::Free));

        let mut free = SlotList::new();

        for index in 0..capacity {
            free.append(&mut nodes, index);
        }

        let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);

        debug!(pool_id = id, capacity, "created slot tracker");

        Ok(Self {
            nodes,
            free,
            active: SlotList::new(),
            available: capacity,
            id,
            drop_policy,
        })
    }

    /// The total number of slots, free or active. Fixed at creation.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// The number of free slots.
    #[must_use]
    pub fn available(&self) -> usize {
        self.available
    }

    /// The number of active slots.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.capacity()
            .checked_sub(self.available)
            .expect("the free count can never exceed the capacity")
    }

    /// Whether every slot is active, so that [`acquire()`][1] would fail.
    ///
    /// [1]: Self::acquire
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.available == 0
    }

    /// Whether any slot is active.
    #[must_use]
    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Makes the longest-free slot active and returns it.
    ///
    /// The tracker does not know what is stored in the slot. Whatever the previous occupant left
    /// behind is still there, so the caller is responsible for giving the element a valid state
    /// before relying on it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] if every slot is already active. The tracker is unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use array_pool::{Error, SlotTracker};
    ///
    /// let mut tracker = SlotTracker::new(2).unwrap();
    ///
    /// assert_eq!(tracker.acquire().unwrap().index(), 0);
    /// assert_eq!(tracker.acquire().unwrap().index(), 1);
    /// assert!(matches!(tracker.acquire(), Err(Error::Exhausted { .. })));
    /// ```
    pub fn acquire(&mut self) -> Result<Slot> {
        debug_assert_eq!(
            self.free.is_empty(),
            self.available == 0,
            "free count must agree with the free list"
        );

        if self.available < 1 {
            trace!(pool_id = self.id, "no free slot to acquire");

            return Err(Error::Exhausted {
                capacity: self.capacity(),
            });
        }

        let index = self
            .free
            .head()
            .expect("free count is non-zero so the free list cannot be empty");

        debug_assert_eq!(
            self.nodes.get(index).map(|node| node.membership),
            Some(Membership::Free),
            "the free list must only hold free nodes"
        );

        self.free.delete(&mut self.nodes, index);
        self.active.append(&mut self.nodes, index);
        self.node_mut(index).membership = Membership::Active;

        self.available = self
            .available
            .checked_sub(1)
            .expect("guarded by free count check above");

        trace!(pool_id = self.id, index, "acquired slot");

        Ok(Slot::new(index, self.id))
    }

    /// Makes an active slot free again. It becomes the last slot in line to be acquired.
    ///
    /// Other slots are not affected, so a slot obtained from [`next_active()`][1] before this
    /// call can still be used to continue walking the active slots.
    ///
    /// # Errors
    ///
    /// * [`Error::ForeignSlot`] if the slot was issued by a different pool.
    /// * [`Error::SlotNotActive`] if the slot is already free.
    ///
    /// In both cases the tracker is unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use array_pool::{Error, SlotTracker};
    ///
    /// let mut tracker = SlotTracker::new(2).unwrap();
    ///
    /// let slot = tracker.acquire().unwrap();
    /// tracker.retire(slot).unwrap();
    ///
    /// assert!(matches!(tracker.retire(slot), Err(Error::SlotNotActive { index: 0 })));
    /// ```
    pub fn retire(&mut self, slot: Slot) -> Result<()> {
        let index = self.active_index(slot)?;
        self.retire_index(index);
        Ok(())
    }

    /// Makes every active slot free. They join the free slots in the order they were acquired.
    ///
    /// # Example
    ///
    /// ```rust
    /// use array_pool::SlotTracker;
    ///
    /// let mut tracker = SlotTracker::new(3).unwrap();
    /// tracker.acquire().unwrap();
    /// tracker.acquire().unwrap();
    ///
    /// tracker.retire_all();
    ///
    /// assert_eq!(tracker.active_count(), 0);
    /// assert_eq!(tracker.available(), 3);
    /// ```
    pub fn retire_all(&mut self) {
        let retiring = self.active_count();

        while let Some(index) = self.active.head() {
            self.retire_index(index);
        }

        debug!(pool_id = self.id, retiring, "retired all active slots");
    }

    /// Releases the tracking storage.
    ///
    /// This is equivalent to dropping the tracker. The tracker is consumed, so it cannot be used
    /// afterwards.
    ///
    /// # Panics
    ///
    /// Panics if slots are still active and the tracker was created with
    /// [`DropPolicy::MustNotDropActiveSlots`].
    pub fn destroy(self) {
        drop(self);
    }

    /// Whether `slot` was issued by this tracker and is currently active.
    #[must_use]
    pub fn is_active(&self, slot: Slot) -> bool {
        self.active_index(slot).is_ok()
    }

    /// The oldest active slot, if any.
    #[must_use]
    pub fn first_active(&self) -> Option<Slot> {
        self.active.head().map(|index| self.slot(index))
    }

    /// The active slot acquired after `slot`, if any.
    ///
    /// Returns `None` if `slot` is the newest active slot, or if `slot` is not active in this
    /// tracker. Call this before retiring `slot` when walking the active slots.
    #[must_use]
    pub fn next_active(&self, slot: Slot) -> Option<Slot> {
        let index = self.active_index(slot).ok()?;

        SlotList::next(&self.nodes, index).map(|next| self.slot(next))
    }

    /// Iterates over the active slots, oldest first.
    pub fn active_slots(&self) -> Slots<'_> {
        Slots {
            inner: self.active.iter(&self.nodes),
            pool_id: self.id,
            remaining: self.active_count(),
        }
    }

    /// Iterates over the free slots in the order they will be acquired.
    pub fn free_slots(&self) -> Slots<'_> {
        Slots {
            inner: self.free.iter(&self.nodes),
            pool_id: self.id,
            remaining: self.available,
        }
    }

    /// Validates that `slot` belongs to this tracker and is active.
    pub(crate) fn active_index(&self, slot: Slot) -> Result<usize> {
        let index = slot.index();

        if slot.pool_id() != self.id {
            return Err(Error::ForeignSlot { index });
        }

        match self.nodes.get(index).map(|node| node.membership) {
            Some(Membership::Active) => Ok(index),
            Some(Membership::Free) => Err(Error::SlotNotActive { index }),
            None => Err(Error::ForeignSlot { index }),
        }
    }

    fn retire_index(&mut self, index: usize) {
        self.active.delete(&mut self.nodes, index);
        self.free.append(&mut self.nodes, index);
        self.node_mut(index).membership = Membership::Free;

        self.available = self
            .available
            .checked_add(1)
            .expect("an active node existed so the free count is below capacity");

        trace!(pool_id = self.id, index, "retired slot");
    }

    fn slot(&self, index: usize) -> Slot {
        Slot::new(index, self.id)
    }

    fn node_mut(&mut self, index: usize) -> &mut Node {
        self.nodes
            .get_mut(index)
            .expect("slot indexes are validated or come from our own lists")
    }

    /// Walks both lists and verifies that every node is in exactly one of them, that the counts
    /// add up and that the membership tags agree with the lists.
    ///
    /// This walks the whole tracker, so it is only ever called from tests.
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(test)]
    pub(crate) fn integrity_check(&self) {
        let capacity = self.capacity();

        // Bounded walks, so that a corrupted (cyclic) list fails the check instead of hanging.
        let free_walked = self.free.iter(&self.nodes).take(capacity.saturating_add(1));
        let active_walked = self.active.iter(&self.nodes).take(capacity.saturating_add(1));

        let mut free_count: usize = 0;
        let mut last_free = None;
        for index in free_walked {
            assert_eq!(
                self.nodes.get(index).map(|node| node.membership),
                Some(Membership::Free),
                "node {index} is in the free list but not tagged as free in pool {}",
                self.id
            );
            free_count = free_count
                .checked_add(1)
                .expect("bounded by the take() above");
            last_free = Some(index);
        }

        let mut active_count: usize = 0;
        let mut last_active = None;
        for index in active_walked {
            assert_eq!(
                self.nodes.get(index).map(|node| node.membership),
                Some(Membership::Active),
                "node {index} is in the active list but not tagged as active in pool {}",
                self.id
            );
            active_count = active_count
                .checked_add(1)
                .expect("bounded by the take() above");
            last_active = Some(index);
        }

        assert_eq!(
            self.free.tail(&self.nodes),
            last_free,
            "free list head does not link back to its tail in pool {}",
            self.id
        );
        assert_eq!(
            self.active.tail(&self.nodes),
            last_active,
            "active list head does not link back to its tail in pool {}",
            self.id
        );

        assert_eq!(
            free_count, self.available,
            "free list length does not match the free count in pool {}",
            self.id
        );
        assert_eq!(
            free_count.checked_add(active_count),
            Some(capacity),
            "free {free_count} and active {active_count} do not add up to capacity {capacity} in pool {}",
            self.id
        );

        let tagged_free = self
            .nodes
            .iter()
            .filter(|node| node.membership == Membership::Free)
            .count();

        assert_eq!(
            tagged_free, free_count,
            "nodes tagged as free do not match the free list in pool {}",
            self.id
        );
    }
}

impl Drop for SlotTracker {
    fn drop(&mut self) {
        let active = self.active_count();

        debug!(
            pool_id = self.id,
            capacity = self.capacity(),
            active,
            "destroying slot tracker"
        );

        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if self.drop_policy == DropPolicy::MustNotDropActiveSlots && !thread::panicking() {
            assert!(
                active == 0,
                "dropped a pool with {active} active slots with a policy that says no slots may be active when dropped"
            );
        }
    }
}

/// Iterator over the slots of one of the lists of a [`SlotTracker`].
///
/// Returned by [`SlotTracker::active_slots()`] and [`SlotTracker::free_slots()`].
#[derive(Clone)]
pub struct Slots<'a> {
    inner: ListIter<'a>,
    pool_id: u64,
    remaining: usize,
}

impl fmt::Debug for Slots<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slots")
            .field("pool_id", &self.pool_id)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

impl Iterator for Slots<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.inner.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(Slot::new(index, self.pool_id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Slots<'_> {}

impl FusedIterator for Slots<'_> {}
