//! Benchmark profiles for the Strata arena.
//!
//! - [`small_block_profile`]: small blocks, so growth shows up in the numbers
//! - [`default_profile`]: the arena's default growth policy
//! - [`mixed_sizes`]: deterministic request sizes for allocation churn

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strata_arena::ArenaConfig;

/// 256-byte minimum, 64 KiB maximum blocks.
pub fn small_block_profile() -> ArenaConfig {
    ArenaConfig::new()
        .with_min_block_size(256)
        .with_max_block_size(64 * 1024)
}

/// Default growth policy.
pub fn default_profile() -> ArenaConfig {
    ArenaConfig::default()
}

/// `count` request sizes between 1 and `max` bytes, reproducible from `seed`.
///
/// Uses a xorshift sequence; the distribution only needs to be stable
/// across runs.
pub fn mixed_sizes(count: usize, max: usize, seed: u64) -> Vec<usize> {
    let mut state = seed | 1;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % max.max(1) as u64) as usize + 1
        })
        .collect()
}
