//! Bounded fan-out over async work.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Runs `f` over every item with at most `limit` futures in flight and
/// returns the outputs in input order. A `limit` of 0 runs one at a time.
///
/// There is no cancellation; dropping the returned future drops the work
/// still pending.
pub async fn map_bounded<I, T, F, Fut, O>(items: I, limit: usize, f: F) -> Vec<O>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = O>,
{
    stream::iter(items)
        .map(f)
        .buffered(limit.max(1))
        .collect()
        .await
}
