//! Scoped-thread executor.
//!
//! [`ScopedExecutor`] spawns up to `max_degree` short-lived worker threads per
//! batch inside a [`std::thread::scope`]. Workers pull items from a shared
//! queue until it is drained, so a slow item never holds back the others.
//! Because the threads are scoped, tasks may borrow from the caller's stack.

use std::{
    panic,
    sync::{Mutex, PoisonError},
    thread,
};

use crate::executor::TaskExecutor;

/// Executes each batch on freshly spawned scoped threads.
#[derive(Debug, Clone, Copy)]
pub struct ScopedExecutor {
    max_degree: usize,
}

impl ScopedExecutor {
    /// Creates an executor running at most `max_degree` tasks at once.
    /// Values below 1 are clamped to 1.
    pub fn new(max_degree: usize) -> ScopedExecutor {
        ScopedExecutor {
            max_degree: max_degree.max(1),
        }
    }

    /// Creates an executor sized to the number of available CPUs, falling
    /// back to 8 if that cannot be determined.
    pub fn with_default_threads() -> ScopedExecutor {
        let num_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(8);
        Self::new(num_threads)
    }
}

impl Default for ScopedExecutor {
    fn default() -> Self {
        Self::with_default_threads()
    }
}

impl TaskExecutor for ScopedExecutor {
    fn max_degree(&self) -> usize {
        self.max_degree
    }

    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        let len = items.len();
        if len <= 1 || self.max_degree <= 1 {
            return items.into_iter().map(f).collect();
        }

        let num_workers = self.max_degree.min(len);
        log::trace!("running {len} tasks on {num_workers} scoped workers");

        let queue = Mutex::new(items.into_iter().enumerate());
        let f = &f;
        let queue = &queue;
        let mut indexed = thread::scope(|scope| {
            let workers = (0..num_workers)
                .map(|_| {
                    scope.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let next = queue
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .next();
                            let Some((index, item)) = next else {
                                break;
                            };
                            done.push((index, f(item)));
                        }
                        done
                    })
                })
                .collect::<Vec<_>>();

            let mut indexed = Vec::with_capacity(len);
            for worker in workers {
                match worker.join() {
                    Ok(done) => indexed.extend(done),
                    Err(payload) => panic::resume_unwind(payload),
                }
            }
            indexed
        });

        indexed.sort_unstable_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }
}
