use std::collections::TryReserveError;

use thiserror::Error;

/// Errors reported by pool operations.
///
/// Where the classic C-style pool design leaves misuse (retiring a slot twice, retiring a slot
/// that belongs to another pool) as undefined behavior, this crate detects it and reports it
/// through [`ForeignSlot`][Error::ForeignSlot] and [`SlotNotActive`][Error::SlotNotActive],
/// leaving the pool unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The storage for the tracking nodes could not be allocated when the pool was created.
    #[error("unable to allocate tracking storage for a pool of {capacity} slots")]
    AllocationFailure {
        /// The capacity that was requested.
        capacity: usize,

        /// The underlying allocation error.
        #[source]
        source: TryReserveError,
    },

    /// Every slot of the pool is currently active. This is an expected condition rather than a
    /// fault: the pool is unchanged and a slot will become available once one is retired.
    #[error("all {capacity} slots of the pool are active")]
    Exhausted {
        /// The capacity of the pool.
        capacity: usize,
    },

    /// The slot was issued by a different pool.
    #[error("slot {index} does not belong to this pool")]
    ForeignSlot {
        /// The index carried by the slot.
        index: usize,
    },

    /// The slot belongs to this pool but is not active, typically because it was already retired.
    #[error("slot {index} is not active")]
    SlotNotActive {
        /// The index carried by the slot.
        index: usize,
    },
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
