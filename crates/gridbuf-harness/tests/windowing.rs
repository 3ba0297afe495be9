#![forbid(unsafe_code)]

//! Window movement behavior under scripted scroll patterns.
//!
//! Uses [`InstantLoader`] (loads settle on the next executor turn) so each
//! test controls exactly when results land relative to reads, and asserts on
//! the load log to prove which requests hit cache.

use futures::executor::LocalPool;
use gridbuf::VirtualizedCollection;
use gridbuf_harness::{ChangeLog, InstantLoader};

const WINDOW: usize = 10;

fn collection(
    pool: &LocalPool,
    length: usize,
    loader: &InstantLoader,
) -> VirtualizedCollection<usize> {
    VirtualizedCollection::new(
        WINDOW,
        |i| i + 1_000_000,
        length,
        loader.clone(),
        pool.spawner(),
    )
}

#[test]
fn first_touch_recenters_and_loads_three_windows() {
    let pool = LocalPool::new();
    let loader = InstantLoader::new();
    let mut coll = collection(&pool, 100, &loader);

    coll.get_range(50, 60).unwrap();
    assert_eq!(coll.window_bounds(), [(35, 10), (45, 10), (55, 10)]);
    assert_eq!(loader.calls(), vec![(35, 10), (45, 10), (55, 10)]);
}

#[test]
fn covered_rereads_hit_cache() {
    let mut pool = LocalPool::new();
    let loader = InstantLoader::new();
    let mut coll = collection(&pool, 100, &loader);

    coll.get_range(50, 60).unwrap();
    pool.run_until_stalled();
    let settled = loader.call_count();

    // Everything inside the buffered envelope that does not trigger movement.
    for (start, end) in [(50, 60), (46, 54), (48, 62), (45, 55)] {
        let rows = coll.get_range(start, end).unwrap();
        assert_eq!(rows, (start..end).collect::<Vec<_>>());
    }
    assert_eq!(loader.call_count(), settled);
}

#[test]
fn sequential_scroll_down_loads_each_window_once() {
    let mut pool = LocalPool::new();
    let loader = InstantLoader::new();
    let mut coll = collection(&pool, 100, &loader);

    let mut pos = 0;
    while pos + WINDOW <= 100 {
        let rows = coll.get_range(pos, pos + WINDOW).unwrap();
        assert_eq!(rows.len(), WINDOW);
        pool.run_until_stalled();
        pos += WINDOW;
    }

    let calls = loader.calls();
    let mut offsets: Vec<usize> = calls.iter().map(|&(offset, _)| offset).collect();
    offsets.sort_unstable();
    offsets.dedup();
    // Ten distinct windows, none fetched twice.
    assert_eq!(offsets, (0..100).step_by(WINDOW).collect::<Vec<_>>());
    assert_eq!(calls.len(), offsets.len());
}

#[test]
fn scroll_up_reuses_buffered_rows() {
    let mut pool = LocalPool::new();
    let loader = InstantLoader::new();
    let mut coll = collection(&pool, 100, &loader);

    coll.get_range(50, 60).unwrap();
    pool.run_until_stalled();
    let settled = loader.call_count();

    // Entirely inside the prefetched window above the viewport: real rows,
    // one rotation, one load for the fresh prefetch.
    let rows = coll.get_range(38, 44).unwrap();
    assert_eq!(rows, (38..44).collect::<Vec<_>>());
    assert_eq!(coll.window_bounds(), [(25, 10), (35, 10), (45, 10)]);
    assert_eq!(loader.call_count(), settled + 1);
    assert_eq!(loader.calls()[settled], (25, 10));
}

#[test]
fn change_events_cover_the_requested_span() {
    let mut pool = LocalPool::new();
    let loader = InstantLoader::new();
    let log = ChangeLog::new();
    let mut coll = collection(&pool, 100, &loader);
    coll.set_changed_callback(log.sink());

    let rows = coll.get_range(30, 40).unwrap();
    assert!(rows.iter().all(|&r| r >= 1_000_000));

    pool.run_until_stalled();
    assert!(log.covers(30, 40));
    assert!(log.events().iter().all(|ev| ev.error.is_none()));

    let rows = coll.get_range(30, 40).unwrap();
    assert_eq!(rows, (30..40).collect::<Vec<_>>());
}

#[test]
fn boundary_requests_clamp_without_errors() {
    let mut pool = LocalPool::new();
    let loader = InstantLoader::new();
    let mut coll = collection(&pool, 100, &loader);

    coll.get_range(0, 5).unwrap();
    assert_eq!(coll.window_bounds(), [(0, 0), (0, 10), (10, 10)]);
    pool.run_until_stalled();

    coll.get_range(95, 100).unwrap();
    assert_eq!(coll.window_bounds(), [(80, 10), (90, 10), (100, 0)]);
    pool.run_until_stalled();

    let rows = coll.get_range(0, 100).unwrap();
    assert_eq!(rows.len(), 100);
    for &(offset, count) in &loader.calls() {
        assert!(offset + count <= 100);
    }
}

#[test]
fn length_growth_extends_reachable_windows() {
    let mut pool = LocalPool::new();
    let loader = InstantLoader::new();
    let mut coll = collection(&pool, 20, &loader);

    coll.get_range(10, 20).unwrap();
    assert_eq!(coll.window_bounds(), [(0, 5), (5, 10), (15, 5)]);
    pool.run_until_stalled();

    // The backing result set kept streaming in.
    coll.set_length(100);
    coll.get_range(20, 30).unwrap();
    assert_eq!(coll.window_bounds(), [(5, 10), (15, 10), (25, 10)]);
    pool.run_until_stalled();
    let rows = coll.get_range(20, 30).unwrap();
    assert_eq!(rows, (20..30).collect::<Vec<_>>());
}

#[test]
fn tiny_collections_fit_inside_one_envelope() {
    let mut pool = LocalPool::new();
    let loader = InstantLoader::new();
    let mut coll = collection(&pool, 7, &loader);

    let rows = coll.get_range(0, 7).unwrap();
    assert_eq!(rows.len(), 7);
    pool.run_until_stalled();
    let rows = coll.get_range(0, 7).unwrap();
    assert_eq!(rows, (0..7).collect::<Vec<_>>());
    for &(offset, count) in &loader.calls() {
        assert!(offset + count <= 7);
    }
}
