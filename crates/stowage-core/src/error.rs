//! Error types shared by the allocator, bulk operations, and containers.
//!
//! [`StowError`] covers storage-level failures that can happen before any
//! element is touched. [`BuildError`] adds the element-construction failure
//! reported by fallible builders, carrying how many elements had already
//! been constructed (and rolled back) when the builder gave up.

use std::alloc::Layout;
use std::error::Error;
use std::fmt;

/// Storage-level errors raised by the allocator and by container growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StowError {
    /// The platform allocator refused to supply memory.
    AllocFailed {
        /// Size of the refused request in bytes.
        bytes: usize,
        /// Alignment of the refused request.
        align: usize,
    },
    /// A requested element count exceeds the container's `max_size`.
    ///
    /// Always reported before any mutation takes place.
    LengthExceeded {
        /// The element count that was requested.
        requested: usize,
        /// The largest representable element count.
        max: usize,
    },
}

impl StowError {
    /// Build an [`StowError::AllocFailed`] from the refused layout.
    pub fn alloc_failed(layout: Layout) -> Self {
        Self::AllocFailed {
            bytes: layout.size(),
            align: layout.align(),
        }
    }

    /// Return `Err(LengthExceeded)` when `requested > max`.
    pub fn check_len(requested: usize, max: usize) -> Result<(), Self> {
        if requested > max {
            return Err(Self::LengthExceeded { requested, max });
        }
        Ok(())
    }

    /// `current + additional`, or `LengthExceeded` if the sum overflows or
    /// exceeds `max`.
    pub fn grown_len(current: usize, additional: usize, max: usize) -> Result<usize, Self> {
        match current.checked_add(additional) {
            Some(total) if total <= max => Ok(total),
            _ => Err(Self::LengthExceeded {
                requested: current.saturating_add(additional),
                max,
            }),
        }
    }

    /// Escalate the error from a context that cannot return `Result`
    /// (`Clone`, `FromIterator`, `Extend`).
    ///
    /// Allocation failures go through [`std::alloc::handle_alloc_error`];
    /// length violations panic, as the standard collections do.
    pub fn raise(self) -> ! {
        match self {
            Self::AllocFailed { bytes, align } => match Layout::from_size_align(bytes, align) {
                Ok(layout) => std::alloc::handle_alloc_error(layout),
                Err(_) => panic!("{self}"),
            },
            Self::LengthExceeded { .. } => panic!("{self}"),
        }
    }
}

impl fmt::Display for StowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocFailed { bytes, align } => {
                write!(f, "allocation failed: {bytes} bytes aligned to {align}")
            }
            Self::LengthExceeded { requested, max } => {
                write!(f, "length exceeded: requested {requested} elements, max {max}")
            }
        }
    }
}

impl Error for StowError {}

/// Failure of an operation that builds elements from a fallible source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError<E> {
    /// Storage for the new elements could not be obtained.
    Storage(StowError),
    /// An element builder returned an error.
    ///
    /// The operation destroyed the `constructed` elements it had built
    /// before propagating `source`; the target storage is raw again.
    Element {
        /// Number of elements successfully built before the failure.
        constructed: usize,
        /// The builder's error, unchanged.
        source: E,
    },
}

impl<E> BuildError<E> {
    /// Number of elements that had been constructed (and rolled back).
    ///
    /// Zero for storage failures.
    pub fn constructed(&self) -> usize {
        match self {
            Self::Storage(_) => 0,
            Self::Element { constructed, .. } => *constructed,
        }
    }

    /// The builder's error, if this was an element failure.
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::Storage(_) => None,
            Self::Element { source, .. } => Some(source),
        }
    }

    /// The storage error, if this was a storage failure.
    pub fn storage(&self) -> Option<StowError> {
        match self {
            Self::Storage(err) => Some(*err),
            Self::Element { .. } => None,
        }
    }
}

impl<E> From<StowError> for BuildError<E> {
    fn from(err: StowError) -> Self {
        Self::Storage(err)
    }
}

impl<E: fmt::Display> fmt::Display for BuildError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Element {
                constructed,
                source,
            } => {
                write!(
                    f,
                    "element construction failed after {constructed} elements: {source}"
                )
            }
        }
    }
}

impl<E: Error + 'static> Error for BuildError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Element { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_len_accepts_max() {
        assert!(StowError::check_len(10, 10).is_ok());
        assert_eq!(
            StowError::check_len(11, 10),
            Err(StowError::LengthExceeded {
                requested: 11,
                max: 10
            })
        );
    }

    #[test]
    fn grown_len_rejects_overflow() {
        let err = StowError::grown_len(usize::MAX, 1, usize::MAX).unwrap_err();
        assert!(matches!(err, StowError::LengthExceeded { .. }));
        assert_eq!(StowError::grown_len(3, 4, 7), Ok(7));
    }

    #[test]
    fn build_error_reports_constructed_count() {
        let err: BuildError<&str> = BuildError::Element {
            constructed: 2,
            source: "boom",
        };
        assert_eq!(err.constructed(), 2);
        assert_eq!(
            err.to_string(),
            "element construction failed after 2 elements: boom"
        );
        assert_eq!(err.into_source(), Some("boom"));
    }

    #[test]
    fn storage_error_converts() {
        let err: BuildError<()> = StowError::LengthExceeded {
            requested: 5,
            max: 4,
        }
        .into();
        assert_eq!(err.constructed(), 0);
        assert!(err.storage().is_some());
    }

    #[test]
    #[should_panic(expected = "length exceeded")]
    fn raise_panics_on_length() {
        StowError::LengthExceeded {
            requested: 2,
            max: 1,
        }
        .raise();
    }
}
