//! Bounded parallel execution of independent work items.
//!
//! A fixed set of scoped worker threads pulls item indices from a shared
//! counter until the queue is drained or the run is cancelled. Results come
//! back over a channel and are reassembled in input order once every worker
//! has joined, which is the completion barrier between pipeline stages.
//!
//! # Example
//!
//! ```ignore
//! use texpack::batch::{CancelToken, WorkerPool};
//!
//! let pool = WorkerPool::new(4).with_cancel(CancelToken::new());
//! let lengths = pool.run(&paths, |path| std::fs::metadata(path).map(|m| m.len()));
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

/// Shared flag that stops workers from picking up new items.
///
/// Items already running are allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Fixed-size worker pool.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    /// Number of worker threads
    jobs: usize,
    /// Stop dispatching when set
    cancel: CancelToken,
}

impl WorkerPool {
    /// Create a pool with `jobs` workers (at least one).
    pub fn new(jobs: usize) -> Self {
        Self { jobs: jobs.max(1), cancel: CancelToken::new() }
    }

    /// Share a cancellation token with the pool.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Get the number of workers.
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Run `work` over every item and block until all dispatched items finish.
    ///
    /// The result vector is in input order. `None` marks an item that was
    /// never dispatched because the pool was cancelled first.
    pub fn run<T, R, F>(&self, items: &[T], work: F) -> Vec<Option<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        let mut results: Vec<Option<R>> = items.iter().map(|_| None).collect();
        if items.is_empty() {
            return results;
        }

        // Single worker: no threads needed
        if self.jobs == 1 || items.len() == 1 {
            for (slot, item) in results.iter_mut().zip(items) {
                if self.cancel.is_cancelled() {
                    break;
                }
                *slot = Some(work(item));
            }
            return results;
        }

        let next_idx = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();
        let work = &work;
        let cancel = &self.cancel;

        std::thread::scope(|s| {
            let num_workers = self.jobs.min(items.len());

            for _ in 0..num_workers {
                let tx = tx.clone();
                let next_idx = &next_idx;

                s.spawn(move || loop {
                    if cancel.is_cancelled() {
                        break;
                    }

                    let idx = next_idx.fetch_add(1, Ordering::SeqCst);
                    if idx >= items.len() {
                        break;
                    }

                    if tx.send((idx, work(&items[idx]))).is_err() {
                        break;
                    }
                });
            }
        });
        drop(tx);

        for (idx, result) in rx {
            results[idx] = Some(result);
        }
        results
    }
}
