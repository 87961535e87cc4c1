//! A small particle simulation driving an `ArrayPool`:
//!
//! * Each iteration tries to spawn a particle with a random time to live.
//! * Active particles age by one tick and expire when their time runs out.
//! * Halfway through, every particle is cleared at once.
//!
//! The pool is deliberately tiny so that you can see it run out of free elements.

use array_pool::{ArrayPool, Error};
use rand::Rng;

const POOL_SIZE: usize = 4;
const ITERATIONS: usize = 32;

/// Stop spawning this many iterations before the end, to show the pool draining.
const DRAIN_ITERATIONS: usize = 5;

#[derive(Debug, Default)]
struct Particle {
    id: usize,
    time_to_live: i32,
}

fn main() {
    let mut particles: [Particle; POOL_SIZE] = Default::default();

    for (id, particle) in particles.iter_mut().enumerate() {
        particle.id = id;
    }

    let mut pool = ArrayPool::new(&mut particles).expect("unable to create particle pool");
    let mut rng = rand::rng();

    for iteration in 1..=ITERATIONS {
        let manual_active_count = pool.iter_active().count();

        println!(
            "     iteration {iteration}   -   available {}, manual active count {manual_active_count}, balance {}",
            pool.available(),
            pool.capacity() - (manual_active_count + pool.available())
        );

        if iteration < ITERATIONS - DRAIN_ITERATIONS {
            let time_to_live = rng.random_range(2..=6);

            match pool.acquire_with(|particle| particle.time_to_live = time_to_live) {
                Ok(slot) => println!(
                    ">>>> Created a new particle (id {}) ttl={time_to_live}",
                    pool[slot].id
                ),
                Err(Error::Exhausted { .. }) => {
                    println!("!!!! Pool used up, could not grab a new particle");
                }
                Err(error) => panic!("unexpected pool error: {error}"),
            }
        }

        pool.retire_if(|_, particle| {
            particle.time_to_live -= 1;

            let expired = particle.time_to_live < 1;
            if expired {
                println!(
                    "<<<< Retiring particle id={} (ttl {})",
                    particle.id, particle.time_to_live
                );
            }

            expired
        });

        print!("     ids in active list  ");
        for (_, particle) in pool.iter_active() {
            print!("{}(ttl {})   ", particle.id, particle.time_to_live);
        }
        println!("\n-------------------------------------------------");

        if iteration == ITERATIONS / 2 {
            // Something happened that invalidates every particle, e.g. the player lost a life.
            println!("\n**** Clearing the whole pool of active particles\n");
            pool.retire_all();
        }
    }

    // The array is ours again once the pool is gone.
    let particles = pool.destroy();
    println!("Final particle states: {particles:?}");
}
