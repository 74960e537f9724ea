//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use allocator_api2::alloc::AllocError;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The block source could not supply a block.
    OutOfMemory {
        /// Size of the block that was requested, in bytes.
        requested: usize,
        /// Alignment of the block that was requested.
        align: usize,
    },
    /// Growing would take the arena past its configured `size_limit`.
    CapacityExceeded {
        /// Number of bytes the new block would have needed.
        requested: usize,
        /// The configured limit on total block bytes.
        limit: usize,
    },
    /// A size/alignment pair that does not form a valid layout
    /// (alignment not a power of two, or size overflowing `isize`).
    InvalidLayout {
        /// Requested size in bytes.
        size: usize,
        /// Requested alignment.
        align: usize,
    },
    /// An [`ArenaConfig`](crate::ArenaConfig) invariant was violated.
    InvalidConfig {
        /// Description of which invariant was violated.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested, align } => {
                write!(
                    f,
                    "block source out of memory: requested {requested} bytes aligned to {align}"
                )
            }
            Self::CapacityExceeded { requested, limit } => {
                write!(
                    f,
                    "arena size limit exceeded: block of {requested} bytes, limit {limit} bytes"
                )
            }
            Self::InvalidLayout { size, align } => {
                write!(f, "invalid layout: size {size}, align {align}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid arena config: {reason}")
            }
        }
    }
}

impl Error for ArenaError {}

impl From<ArenaError> for AllocError {
    fn from(_: ArenaError) -> Self {
        AllocError
    }
}
