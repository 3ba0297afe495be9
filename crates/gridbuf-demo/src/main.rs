#![forbid(unsafe_code)]

//! Scripted scroll session against the windowed cache.
//!
//! Simulates what a grid widget sees: a first paint full of placeholders, the
//! change notifications as window loads settle, and cache-hit scrolling once
//! the envelope is warm. Run with `RUST_LOG=gridbuf=trace` to watch window
//! loads being issued and superseded.

use futures::FutureExt;
use futures::executor::LocalPool;
use gridbuf::{CollectionAdapter, IndexedRows, LoadFuture, VirtualizedCollection};
use gridbuf_harness::ChangeLog;
use tracing_subscriber::EnvFilter;

const ROWS: usize = 100_000;
const WINDOW: usize = 50;
const PAGE: usize = 5;

fn load_rows(offset: usize, count: usize) -> LoadFuture<String> {
    async move {
        Ok((offset..offset + count)
            .map(|i| format!("order #{i:06} | qty {} | status shipped", i % 97))
            .collect())
    }
    .boxed_local()
}

fn print_page(label: &str, rows: &mut CollectionAdapter<String>, start: usize) {
    println!("-- {label} --");
    let page = rows
        .rows(start, (start + PAGE).min(rows.len()))
        .expect("scripted reads stay in bounds");
    for (i, row) in page.iter().enumerate() {
        println!("  {:>6}  {row}", start + i);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut pool = LocalPool::new();
    let collection = VirtualizedCollection::new(
        WINDOW,
        |i| format!("loading row {i}..."),
        ROWS,
        load_rows,
        pool.spawner(),
    );
    let mut grid = CollectionAdapter::new(collection);

    let log = ChangeLog::new();
    grid.set_changed_callback(log.sink());

    tracing::info!(rows = ROWS, window = WINDOW, "session start");

    // First paint: nothing is buffered yet.
    print_page("jump to row 50000 (cold)", &mut grid, 50_000);
    pool.run_until_stalled();
    for ev in log.events() {
        tracing::info!(start = ev.start, count = ev.count, "rows settled");
    }
    print_page("same viewport after loads settled", &mut grid, 50_000);

    // Sequential scroll: every page after the first is answered from cache
    // while the windows rotate ahead of the viewport.
    log.clear();
    for page in 1..=4 {
        let pos = 50_000 + page * PAGE;
        print_page(&format!("scroll down to {pos}"), &mut grid, pos);
        pool.run_until_stalled();
    }
    tracing::info!(settled = log.len(), "loads during sequential scroll");

    // A far jump throws the whole envelope away and recenters.
    log.clear();
    print_page("jump to row 10 (cold again)", &mut grid, 10);
    pool.run_until_stalled();
    print_page("row 10 after settling", &mut grid, 10);
    tracing::info!(settled = log.len(), "loads after far jump");

    grid.dispose();
    tracing::info!("session end");
}
