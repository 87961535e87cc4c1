/// Determines what happens when a pool is destroyed while some of its slots are still active.
///
/// The pool never owns the elements it tracks, so destroying it never touches element contents.
/// The policy exists for callers that treat an active slot at teardown as a logic error, for
/// example because every acquired element must be explicitly retired after releasing resources
/// it refers to.
///
/// # Examples
///
/// ```
/// use array_pool::{ArrayPool, DropPolicy};
///
/// let mut particles = [0_u32; 8];
///
/// let pool = ArrayPool::builder()
///     .drop_policy(DropPolicy::MustNotDropActiveSlots)
///     .build(&mut particles)
///     .unwrap();
///
/// assert_eq!(pool.capacity(), 8);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The pool may be destroyed with active slots. This is the default.
    #[default]
    MayDropActiveSlots,

    /// The pool will panic if any slot is still active when it is destroyed.
    MustNotDropActiveSlots,
}
