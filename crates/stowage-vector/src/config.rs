//! Growth constants.

use stowage_alloc::RawAlloc;

/// Capacity multiplier applied when a vector runs out of room.
pub const GROWTH_FACTOR: usize = 2;

/// Largest element count a `Vector<T>` can hold.
///
/// `isize::MAX / size_of::<T>()`, or `isize::MAX` for zero-sized `T`.
pub const fn max_size<T>() -> usize {
    if RawAlloc::<T>::IS_ZST {
        isize::MAX as usize
    } else {
        RawAlloc::<T>::max_count()
    }
}

/// Capacity to grow to so that `len + additional` elements fit.
///
/// Never less than `len + additional` and never more than `max`.
pub(crate) fn grown_capacity(
    len: usize,
    capacity: usize,
    additional: usize,
    max: usize,
) -> Result<usize, stowage_core::StowError> {
    let required = stowage_core::StowError::grown_len(len, additional, max)?;
    let doubled = capacity.saturating_mul(GROWTH_FACTOR);
    Ok(required.max(doubled).max(1).min(max))
}
