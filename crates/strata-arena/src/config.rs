//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for the arena's block growth policy.
///
/// Controls how large each new block is and how much memory the arena may
/// request in total. Validated when the arena is constructed; immutable after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Smallest block the arena will request from its source, in bytes.
    ///
    /// Default: 4096. Must be non-zero.
    pub min_block_size: usize,

    /// Largest block the growth policy will ever choose, in bytes.
    ///
    /// A single allocation larger than this still gets a block of its own,
    /// sized exactly to the request. Default: 1MB. Must be at least
    /// `min_block_size`.
    pub max_block_size: usize,

    /// Upper bound on the total bytes requested from the block source.
    ///
    /// `None` (the default) means unbounded; allocation then fails only when
    /// the block source itself runs out of memory.
    pub size_limit: Option<usize>,
}

impl ArenaConfig {
    /// Default minimum block size: one page.
    pub const DEFAULT_MIN_BLOCK_SIZE: usize = 4096;

    /// Default maximum block size: 1MB.
    pub const DEFAULT_MAX_BLOCK_SIZE: usize = 1024 * 1024;

    /// Create a config with default block sizes and no size limit.
    pub fn new() -> Self {
        Self {
            min_block_size: Self::DEFAULT_MIN_BLOCK_SIZE,
            max_block_size: Self::DEFAULT_MAX_BLOCK_SIZE,
            size_limit: None,
        }
    }

    /// Set the minimum block size.
    pub fn with_min_block_size(mut self, bytes: usize) -> Self {
        self.min_block_size = bytes;
        self
    }

    /// Set the maximum block size.
    pub fn with_max_block_size(mut self, bytes: usize) -> Self {
        self.max_block_size = bytes;
        self
    }

    /// Cap the total bytes the arena may request from its source.
    pub fn with_size_limit(mut self, bytes: usize) -> Self {
        self.size_limit = Some(bytes);
        self
    }

    /// Check the structural invariants of this config.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.min_block_size == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "min_block_size must be non-zero".into(),
            });
        }
        if self.max_block_size < self.min_block_size {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "max_block_size ({}) is smaller than min_block_size ({})",
                    self.max_block_size, self.min_block_size
                ),
            });
        }
        if let Some(limit) = self.size_limit {
            if limit < self.min_block_size {
                return Err(ArenaError::InvalidConfig {
                    reason: format!(
                        "size_limit ({limit}) cannot hold a single block of {} bytes",
                        self.min_block_size
                    ),
                });
            }
        }
        Ok(())
    }

    /// Size of the next block the policy would choose, in bytes.
    ///
    /// `total` is the number of bytes already requested from the source.
    /// The policy doubles the arena's footprint on each growth, clamped to
    /// `[min_block_size, max_block_size]`. It is non-decreasing in `total`.
    /// Callers take the max of this and the allocation size.
    pub fn next_block_size(&self, total: usize) -> usize {
        total.clamp(self.min_block_size, self.max_block_size)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
