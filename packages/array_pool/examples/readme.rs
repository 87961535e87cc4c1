//! Basic usage of the `array_pool` crate:
//!
//! * Creating a pool over an existing array.
//! * Acquiring elements.
//! * Retiring elements.
//! * Walking the active elements while retiring some of them.

use array_pool::ArrayPool;

fn main() {
    let mut connections = [0_u32; 8];
    let mut pool = ArrayPool::new(&mut connections).unwrap();

    // Acquiring gives you a slot that identifies the element you were given.
    let first = pool.acquire_with(|port| *port = 8080).unwrap();
    let second = pool.acquire_with(|port| *port = 8081).unwrap();
    let _third = pool.acquire_with(|port| *port = 8082).unwrap();

    println!(
        "Pool has {} active and {} available elements",
        pool.active_count(),
        pool.available()
    );

    // Elements are accessed by indexing the pool with the slot.
    println!("First element is at index {} with port {}", first.index(), pool[first]);

    pool.retire(second).unwrap();

    // The tracker exposes cursor-style iteration. Get the next slot before retiring the current.
    let mut cursor = pool.tracker().first_active();
    while let Some(slot) = cursor {
        cursor = pool.tracker().next_active(slot);

        if pool[slot] == 8082 {
            pool.retire(slot).unwrap();
        }
    }

    for (slot, port) in pool.iter_active() {
        println!("Still active: index {} with port {port}", slot.index());
    }
}
