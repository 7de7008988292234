//! Storage-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while acquiring a storage block.
///
/// Returned by the fallible acquisition paths
/// ([`RawStorage::try_with_capacity`](crate::RawStorage::try_with_capacity),
/// [`Sequence::try_reserve`](crate::Sequence::try_reserve)). The infallible
/// entry points report the same conditions by panicking or by diverting to
/// [`std::alloc::handle_alloc_error`]. No operation leaves a partially
/// acquired block behind on failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// The requested slot count cannot be laid out in memory — the byte
    /// size overflows what an allocation can address.
    CapacityOverflow {
        /// Number of slots requested.
        requested: usize,
    },
    /// The allocator could not satisfy the request.
    AllocationFailed {
        /// Size of the failed request in bytes.
        bytes: usize,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested } => {
                write!(f, "storage capacity overflow: {requested} slots requested")
            }
            Self::AllocationFailed { bytes } => {
                write!(f, "allocation failed: {bytes} bytes requested")
            }
        }
    }
}

impl Error for StorageError {}
