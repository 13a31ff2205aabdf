//! Buffer and map sizing constants.

use std::mem;

use stowage_alloc::RawAlloc;

/// Target byte size of one buffer when the buffer length is not fixed.
pub const BUFFER_BYTES: usize = 512;

/// Smallest number of slots in a freshly created map.
pub const MIN_MAP_SLOTS: usize = 8;

/// Elements per buffer for element type `T`.
///
/// `configured` when non-zero, otherwise as many elements as fit in
/// [`BUFFER_BYTES`] (at least one).
pub const fn buffer_len<T>(configured: usize) -> usize {
    let size = mem::size_of::<T>();
    if configured != 0 {
        configured
    } else if size == 0 || size >= BUFFER_BYTES {
        1
    } else {
        BUFFER_BYTES / size
    }
}

/// Map slots for a new map spanning `nodes` buffers.
pub(crate) fn initial_map_len(nodes: usize) -> usize {
    nodes.saturating_add(2).max(MIN_MAP_SLOTS)
}

/// Largest element count a `Deque<T, _>` can hold.
pub const fn max_size<T>() -> usize {
    RawAlloc::<T>::max_count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_buffers_hold_512_bytes() {
        assert_eq!(buffer_len::<u8>(0), 512);
        assert_eq!(buffer_len::<u64>(0), 64);
        assert_eq!(buffer_len::<[u8; 200]>(0), 2);
        assert_eq!(buffer_len::<[u8; 512]>(0), 1);
        assert_eq!(buffer_len::<[u8; 4096]>(0), 1);
    }

    #[test]
    fn configured_length_wins() {
        assert_eq!(buffer_len::<u64>(4), 4);
        assert_eq!(buffer_len::<[u8; 4096]>(3), 3);
    }

    #[test]
    fn map_has_slack_on_both_ends() {
        assert_eq!(initial_map_len(1), MIN_MAP_SLOTS);
        assert_eq!(initial_map_len(6), 8);
        assert_eq!(initial_map_len(7), 9);
    }
}
