//! Batch scheduler for bounded render concurrency.

use std::future::Future;

use futures::future::join_all;

/// Runs work in fixed-size batches.
///
/// Every item of a batch is started together and the whole batch settles
/// before the next one starts, so at most `max_concurrent` items are ever
/// in flight. Everything runs on the caller's task.
#[derive(Debug, Clone, Copy)]
pub struct BatchScheduler {
    max_concurrent: usize,
}

impl BatchScheduler {
    /// Create a scheduler (0 is treated as 1).
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Maximum items in flight.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Split items into batches, in enumeration order.
    pub fn batches<'a, T>(&self, items: &'a [T]) -> std::slice::Chunks<'a, T> {
        items.chunks(self.max_concurrent)
    }

    /// Run `f` over every item, batch by batch.
    ///
    /// Results come back in enumeration order.
    pub async fn run<'a, T, F, Fut>(&self, items: &'a [T], mut f: F) -> Vec<Fut::Output>
    where
        F: FnMut(&'a T) -> Fut,
        Fut: Future,
    {
        let mut results = Vec::with_capacity(items.len());
        for batch in self.batches(items) {
            results.extend(join_all(batch.iter().map(&mut f)).await);
        }
        results
    }
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(1)
    }
}
