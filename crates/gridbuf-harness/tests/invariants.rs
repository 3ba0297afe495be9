#![forbid(unsafe_code)]

//! Property tests for the cache's structural invariants.
//!
//! Random request sequences (with interleaved length changes) must never
//! produce a wrong-sized result, a disordered window layout, or a load that
//! escapes the logical bounds.

use futures::executor::LocalPool;
use gridbuf::VirtualizedCollection;
use gridbuf_harness::InstantLoader;
use proptest::prelude::*;

const PLACEHOLDER_BASE: usize = 1_000_000;

fn collection(
    pool: &LocalPool,
    window: usize,
    length: usize,
    loader: &InstantLoader,
) -> VirtualizedCollection<usize> {
    VirtualizedCollection::new(
        window,
        |i| i + PLACEHOLDER_BASE,
        length,
        loader.clone(),
        pool.spawner(),
    )
}

proptest! {
    /// Every valid request yields exactly `end - start` rows, and every row
    /// is either the loaded value or the placeholder for its own index.
    #[test]
    fn reads_have_exact_size_and_consistent_rows(
        window in 1usize..40,
        length in 1usize..400,
        requests in prop::collection::vec((0usize..400, 0usize..60), 1..24),
    ) {
        let mut pool = LocalPool::new();
        let loader = InstantLoader::new();
        let mut coll = collection(&pool, window, length, &loader);

        for (s, n) in requests {
            let start = s % length;
            let end = (start + n).min(length);
            let rows = coll.get_range(start, end).unwrap();
            prop_assert_eq!(rows.len(), end - start);
            for (row, index) in rows.iter().zip(start..end) {
                prop_assert!(
                    *row == index || *row == index + PLACEHOLDER_BASE,
                    "row {} at index {} is neither loaded nor placeholder",
                    row,
                    index
                );
            }
            pool.run_until_stalled();
        }
    }

    /// The three windows stay contiguous and inside `[0, length)` no matter
    /// how the viewport moves.
    #[test]
    fn windows_stay_contiguous_and_clamped(
        window in 1usize..40,
        length in 1usize..400,
        requests in prop::collection::vec((0usize..400, 0usize..60), 1..24),
    ) {
        let mut pool = LocalPool::new();
        let loader = InstantLoader::new();
        let mut coll = collection(&pool, window, length, &loader);

        for (s, n) in requests {
            let start = s % length;
            let end = (start + n).min(length);
            coll.get_range(start, end).unwrap();
            pool.run_until_stalled();

            let [before, current, after] = coll.window_bounds();
            prop_assert_eq!(before.0 + before.1, current.0);
            prop_assert_eq!(current.0 + current.1, after.0);
            prop_assert!(after.0 + after.1 <= length);
        }
    }

    /// Loads never escape the length in force when they were issued, even
    /// with growth and shrink interleaved with requests.
    #[test]
    fn loads_respect_the_current_length(
        window in 1usize..32,
        script in prop::collection::vec(
            (0usize..1000, 0usize..64, prop::option::of(1usize..1000)),
            1..24,
        ),
    ) {
        let mut pool = LocalPool::new();
        let loader = InstantLoader::new();
        let mut coll = collection(&pool, window, 500, &loader);
        let mut length = 500;
        let mut seen = 0;

        for (s, n, resize) in script {
            if let Some(new_len) = resize {
                length = new_len;
                coll.set_length(new_len);
            }
            let start = s % length;
            let end = (start + n).min(length);
            coll.get_range(start, end).unwrap();
            pool.run_until_stalled();

            let calls = loader.calls();
            for &(offset, count) in &calls[seen..] {
                prop_assert!(
                    offset + count <= length,
                    "load {}+{} escaped length {}",
                    offset,
                    count,
                    length
                );
            }
            seen = calls.len();
        }
    }

    /// Requests outside `[0, length)` (or inverted) always fail fast and
    /// leave the windows where they were.
    #[test]
    fn invalid_requests_fail_without_side_effects(
        window in 1usize..40,
        length in 1usize..400,
        start in 0usize..1000,
        extra in 1usize..100,
    ) {
        let mut pool = LocalPool::new();
        let loader = InstantLoader::new();
        let mut coll = collection(&pool, window, length, &loader);

        coll.get_range(0, window.min(length)).unwrap();
        pool.run_until_stalled();
        let bounds = coll.window_bounds();
        let calls = loader.call_count();

        let bad_end = length + extra;
        prop_assert!(coll.get_range(start.min(length), bad_end).is_err());
        prop_assert!(coll.get_range(bad_end, bad_end + 1).is_err());
        prop_assert_eq!(coll.window_bounds(), bounds);
        prop_assert_eq!(loader.call_count(), calls);
    }
}
