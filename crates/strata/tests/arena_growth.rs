//! Integration test: arena growth, block lifecycle, and failure reporting.
//!
//! Uses recording block sources to check what the arena asks for and that
//! every block it receives is handed back exactly once.

use strata::arena::{Arena, ArenaConfig, ArenaError, Block};
use strata_test_utils::{CountingBlockSource, FailingBlockSource};

fn small_config() -> ArenaConfig {
    ArenaConfig::new()
        .with_min_block_size(1024)
        .with_max_block_size(16 * 1024)
}

#[test]
fn first_allocation_requests_exactly_one_block() {
    let source = CountingBlockSource::new();
    let arena = Arena::with_source(&source, small_config()).unwrap();
    arena.allocate(100, 8).unwrap();
    let requests = source.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].0 >= 100);
    assert!(requests[0].1 >= Block::MIN_ALIGN);
}

#[test]
fn oversized_request_gets_dedicated_block() {
    let source = CountingBlockSource::new();
    let arena = Arena::with_source(&source, small_config()).unwrap();
    arena.allocate(64 * 1024, 8).unwrap();
    assert_eq!(source.request_count(), 1);
    assert!(source.requests()[0].0 >= 64 * 1024);
}

#[test]
fn requests_fit_in_current_block_without_growth() {
    let source = CountingBlockSource::new();
    let arena = Arena::with_source(&source, small_config()).unwrap();
    for _ in 0..8 {
        arena.allocate(64, 8).unwrap();
    }
    assert_eq!(source.request_count(), 1);
    assert_eq!(arena.block_count(), 1);
}

#[test]
fn block_sizes_never_shrink() {
    let source = CountingBlockSource::new();
    let arena = Arena::with_source(&source, small_config()).unwrap();
    for _ in 0..64 {
        arena.allocate(700, 8).unwrap();
    }
    let sizes: Vec<usize> = source.requests().iter().map(|&(size, _)| size).collect();
    assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
    assert!(sizes.iter().all(|&s| s <= 16 * 1024));
}

#[test]
fn every_block_released_once_on_drop() {
    let source = CountingBlockSource::new();
    {
        let arena = Arena::with_source(&source, small_config()).unwrap();
        for i in 1..200 {
            arena.allocate(i * 3, 8).unwrap();
        }
        assert_eq!(source.released(), 0);
    }
    assert!(source.request_count() > 1);
    assert_eq!(source.released(), source.request_count());
}

#[test]
fn zero_sized_request_touches_no_block() {
    let source = CountingBlockSource::new();
    let arena = Arena::with_source(&source, small_config()).unwrap();
    let p = arena.allocate(0, 64).unwrap();
    assert_eq!(p.as_ptr() as usize % 64, 0);
    assert_eq!(source.request_count(), 0);
}

#[test]
fn source_refusal_surfaces_out_of_memory() {
    let arena = Arena::with_source(FailingBlockSource::after(1), small_config()).unwrap();
    arena.allocate(512, 8).unwrap();
    let err = arena.allocate(4096, 8).unwrap_err();
    assert!(matches!(err, ArenaError::OutOfMemory { .. }));
    // The arena stays usable for requests the current block can still serve.
    assert!(arena.allocate(16, 8).is_ok());
}

#[test]
fn size_limit_reports_capacity_exceeded() {
    let config = small_config().with_size_limit(2048);
    let arena = Arena::with_config(config).unwrap();
    arena.allocate(1000, 8).unwrap();
    let err = arena.allocate(4000, 8).unwrap_err();
    assert!(matches!(err, ArenaError::CapacityExceeded { limit: 2048, .. }));
}

#[test]
fn invalid_config_is_rejected() {
    let config = ArenaConfig::new()
        .with_min_block_size(4096)
        .with_max_block_size(1024);
    assert!(matches!(
        Arena::with_config(config),
        Err(ArenaError::InvalidConfig { .. })
    ));
}
