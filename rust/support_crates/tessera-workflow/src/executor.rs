//! The task-execution abstraction.
//!
//! Callers hand an executor a batch of independent work items and a function
//! to run on each; the executor decides how many threads to use and returns
//! the results in input order, regardless of completion order.

use crate::{rayon_executor::RayonExecutor, scoped::ScopedExecutor};

/// Runs batches of independent tasks and collects their results.
///
/// # Contract
///
/// - `f` is called exactly once per item;
/// - the returned vector has one result per item, in input order;
/// - the call returns only after every task has finished (join barrier).
///
/// A panic in a task is propagated to the caller after the barrier.
///
/// The trait has generic methods and is therefore used through generics or
/// through the [`Executor`] enum rather than as a trait object.
pub trait TaskExecutor: Send + Sync {
    /// Maximum number of tasks this executor runs at once.
    fn max_degree(&self) -> usize;

    /// Applies `f` to every item and returns the results in input order.
    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync;

    /// Like [`map`](Self::map) for fallible tasks.
    ///
    /// All tasks run to completion; if any failed, the error of the first
    /// failing item in input order is returned and all results are dropped.
    fn try_map<T, R, E, F>(&self, items: Vec<T>, f: F) -> Result<Vec<R>, E>
    where
        T: Send,
        R: Send,
        E: Send,
        F: Fn(T) -> Result<R, E> + Send + Sync,
    {
        self.map(items, f).into_iter().collect()
    }
}

/// Runs every task on the caller's thread, in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl TaskExecutor for SequentialExecutor {
    fn max_degree(&self) -> usize {
        1
    }

    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        items.into_iter().map(f).collect()
    }
}

/// Runtime-selected executor.
#[derive(Clone)]
pub enum Executor {
    Sequential(SequentialExecutor),
    Scoped(ScopedExecutor),
    Rayon(RayonExecutor),
}

impl Default for Executor {
    fn default() -> Self {
        Executor::Rayon(RayonExecutor::global())
    }
}

impl TaskExecutor for Executor {
    fn max_degree(&self) -> usize {
        match self {
            Executor::Sequential(e) => e.max_degree(),
            Executor::Scoped(e) => e.max_degree(),
            Executor::Rayon(e) => e.max_degree(),
        }
    }

    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        match self {
            Executor::Sequential(e) => e.map(items, f),
            Executor::Scoped(e) => e.map(items, f),
            Executor::Rayon(e) => e.map(items, f),
        }
    }
}

impl From<SequentialExecutor> for Executor {
    fn from(e: SequentialExecutor) -> Self {
        Executor::Sequential(e)
    }
}

impl From<ScopedExecutor> for Executor {
    fn from(e: ScopedExecutor) -> Self {
        Executor::Scoped(e)
    }
}

impl From<RayonExecutor> for Executor {
    fn from(e: RayonExecutor) -> Self {
        Executor::Rayon(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_order(executor: &impl TaskExecutor) {
        let items = (0..100u64).collect::<Vec<_>>();
        let results = executor.map(items, |i| {
            // Later items finish first.
            std::thread::sleep(std::time::Duration::from_micros(100 - i));
            i * 2
        });
        assert_eq!(results, (0..100u64).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_preserves_input_order() {
        check_order(&SequentialExecutor);
        check_order(&ScopedExecutor::new(4));
        check_order(&RayonExecutor::with_threads(3).unwrap());
        check_order(&Executor::default());
    }

    #[test]
    fn test_try_map_reports_first_error_in_input_order() {
        let executors: Vec<Executor> = vec![
            SequentialExecutor.into(),
            ScopedExecutor::new(8).into(),
            RayonExecutor::global().into(),
        ];
        for executor in &executors {
            let result = executor.try_map((0..20).collect(), |i: i32| {
                if i % 7 == 5 { Err(i) } else { Ok(i) }
            });
            assert_eq!(result, Err(5));

            let result = executor.try_map((0..20).collect(), |i: i32| Ok::<_, ()>(i + 1));
            assert_eq!(result.unwrap(), (1..21).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_empty_batch() {
        let scoped = ScopedExecutor::new(4);
        assert!(scoped.map(Vec::<u8>::new(), |x| x).is_empty());
        let rayon = RayonExecutor::global();
        assert!(rayon.map(Vec::<u8>::new(), |x| x).is_empty());
        assert_eq!(SequentialExecutor.max_degree(), 1);
    }
}
