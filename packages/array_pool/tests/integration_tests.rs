//! Integration tests for `array_pool`, exercising the public API only.

use std::thread;

use array_pool::{ArrayPool, DropPolicy, Error, Slot, SlotTracker};

fn active_indexes(tracker: &SlotTracker) -> Vec<usize> {
    tracker.active_slots().map(|slot| slot.index()).collect()
}

fn free_indexes(tracker: &SlotTracker) -> Vec<usize> {
    tracker.free_slots().map(|slot| slot.index()).collect()
}

fn assert_conserved(tracker: &SlotTracker) {
    let free = free_indexes(tracker);
    let active = active_indexes(tracker);

    assert_eq!(free.len(), tracker.available());
    assert_eq!(active.len(), tracker.active_count());
    assert_eq!(free.len() + active.len(), tracker.capacity());

    let mut all = free.iter().chain(&active).copied().collect::<Vec<_>>();
    all.sort_unstable();
    assert_eq!(all, (0..tracker.capacity()).collect::<Vec<_>>());
}

#[test]
fn capacity_four_scenario() {
    let mut items = [0_u32, 1, 2, 3];
    let mut pool = ArrayPool::new(&mut items).unwrap();

    let slots = (0..4).map(|_| pool.acquire().unwrap()).collect::<Vec<_>>();
    let labels = slots.iter().map(|&slot| pool[slot]).collect::<Vec<_>>();
    assert_eq!(labels, vec![0, 1, 2, 3]);

    assert!(matches!(pool.acquire(), Err(Error::Exhausted { capacity: 4 })));
    assert!(pool.is_exhausted());

    pool.retire(slots[2]).unwrap();
    let again = pool.acquire().unwrap();

    assert_eq!(again, slots[2]);
    assert_eq!(pool[again], 2);
}

#[test]
fn fifo_reuse_follows_retirement_order() {
    let mut items = [0_u32, 1, 2, 3];
    let mut pool = ArrayPool::new(&mut items).unwrap();

    let slots = (0..4).map(|_| pool.acquire().unwrap()).collect::<Vec<_>>();

    pool.retire(slots[1]).unwrap();
    pool.retire(slots[0]).unwrap();

    let first = pool.acquire().unwrap();
    let second = pool.acquire().unwrap();

    assert_eq!(pool[first], 1);
    assert_eq!(pool[second], 0);
}

#[test]
fn capacity_is_conserved_through_mixed_operations() {
    let mut tracker = SlotTracker::new(7).unwrap();
    let mut held: Vec<Slot> = Vec::new();

    // A deterministic pseudo-random walk through acquire/retire/retire_all.
    let mut state: u32 = 12345;
    for step in 0..500 {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
        let choice = (state >> 16) % 10;

        match choice {
            0..=4 => match tracker.acquire() {
                Ok(slot) => held.push(slot),
                Err(Error::Exhausted { .. }) => assert_eq!(held.len(), 7),
                Err(other) => panic!("unexpected error at step {step}: {other}"),
            },
            5..=8 if !held.is_empty() => {
                let position = usize::try_from(state >> 8).unwrap() % held.len();
                let victim = held.remove(position);
                tracker.retire(victim).unwrap();
            }
            9 => {
                tracker.retire_all();
                held.clear();
            }
            _ => {}
        }

        assert_eq!(tracker.active_count(), held.len());
        assert_conserved(&tracker);
    }
}

#[test]
fn exhausted_acquire_is_pure() {
    let mut tracker = SlotTracker::new(3).unwrap();
    let a = tracker.acquire().unwrap();
    tracker.acquire().unwrap();
    tracker.acquire().unwrap();
    tracker.retire(a).unwrap();
    tracker.acquire().unwrap();

    let free_before = free_indexes(&tracker);
    let active_before = active_indexes(&tracker);

    for _ in 0..3 {
        assert!(matches!(tracker.acquire(), Err(Error::Exhausted { .. })));
    }

    assert_eq!(free_indexes(&tracker), free_before);
    assert_eq!(active_indexes(&tracker), active_before);
    assert_eq!(tracker.available(), 0);
}

#[test]
fn retire_all_twice() {
    let mut tracker = SlotTracker::new(4).unwrap();
    tracker.acquire().unwrap();
    tracker.acquire().unwrap();

    tracker.retire_all();

    assert_eq!(tracker.active_count(), 0);
    assert_eq!(tracker.available(), 4);
    let free_after_first = free_indexes(&tracker);

    tracker.retire_all();

    assert_eq!(tracker.active_count(), 0);
    assert_eq!(tracker.available(), 4);
    assert_eq!(free_indexes(&tracker), free_after_first);
}

#[test]
fn acquire_retire_round_trip() {
    let mut tracker = SlotTracker::new(4).unwrap();
    tracker.acquire().unwrap();

    let available = tracker.available();
    let active = tracker.active_count();

    let slot = tracker.acquire().unwrap();
    tracker.retire(slot).unwrap();

    assert_eq!(tracker.available(), available);
    assert_eq!(tracker.active_count(), active);
    // The round-tripped slot is now last in line.
    assert_eq!(free_indexes(&tracker).last(), Some(&slot.index()));
}

#[test]
fn misuse_is_reported_and_harmless() {
    let mut tracker = SlotTracker::new(2).unwrap();
    let mut other = SlotTracker::new(2).unwrap();

    let slot = tracker.acquire().unwrap();
    let foreign = other.acquire().unwrap();

    assert!(matches!(
        tracker.retire(foreign),
        Err(Error::ForeignSlot { .. })
    ));

    tracker.retire(slot).unwrap();
    assert!(matches!(
        tracker.retire(slot),
        Err(Error::SlotNotActive { .. })
    ));

    assert_conserved(&tracker);
    assert_eq!(tracker.available(), 2);
}

#[test]
fn independent_pools_do_not_interfere() {
    let mut first_items = [0_u8; 3];
    let mut second_items = [0_u8; 3];
    let mut first = ArrayPool::new(&mut first_items).unwrap();
    let mut second = ArrayPool::new(&mut second_items).unwrap();

    first.acquire().unwrap();
    first.acquire().unwrap();
    second.acquire().unwrap();

    assert_eq!(first.active_count(), 2);
    assert_eq!(second.active_count(), 1);

    first.retire_all();

    assert_eq!(first.active_count(), 0);
    assert_eq!(second.active_count(), 1);
}

#[test]
fn update_loop_with_expiry() {
    #[derive(Clone, Copy, Default)]
    struct Item {
        id: usize,
        time_to_live: i32,
    }

    let mut items = [Item::default(); 4];
    for (id, item) in items.iter_mut().enumerate() {
        item.id = id;
    }

    let mut pool = ArrayPool::new(&mut items).unwrap();

    for time_to_live in [2, 1, 3] {
        pool.acquire_with(|item| item.time_to_live = time_to_live).unwrap();
    }

    let mut expired_per_tick = Vec::new();
    while pool.has_active() {
        let mut expired = Vec::new();
        pool.retire_if(|_, item| {
            item.time_to_live -= 1;
            let done = item.time_to_live < 1;
            if done {
                expired.push(item.id);
            }
            done
        });
        expired_per_tick.push(expired);
    }

    assert_eq!(expired_per_tick, vec![vec![1], vec![0], vec![2]]);
    assert_eq!(pool.available(), 4);
}

#[test]
fn pool_can_be_moved_to_another_thread() {
    let mut items = vec![0_u64; 8];
    let mut pool = ArrayPool::new(&mut items).unwrap();

    thread::scope(|scope| {
        scope.spawn(move || {
            let slot = pool.acquire().unwrap();
            pool[slot] = 77;
            pool.retire(slot).unwrap();
        });
    });

    assert_eq!(items[0], 77);
}

#[test]
#[should_panic]
fn strict_policy_catches_leaked_slot() {
    let mut items = [0_u8; 2];
    let mut pool = ArrayPool::builder()
        .drop_policy(DropPolicy::MustNotDropActiveSlots)
        .build(&mut items)
        .unwrap();

    pool.acquire().unwrap();
}
