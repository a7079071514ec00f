//! Executor backed by rayon's work-stealing thread pools.

use std::sync::Arc;

use rayon::prelude::*;

use crate::executor::TaskExecutor;

/// Runs batches on rayon, either on the global pool or on a dedicated pool.
#[derive(Clone)]
pub struct RayonExecutor {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl RayonExecutor {
    /// Uses rayon's global thread pool.
    pub fn global() -> RayonExecutor {
        RayonExecutor { pool: None }
    }

    /// Builds a dedicated pool with `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> Result<RayonExecutor, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads.max(1))
            .thread_name(|i| format!("tessera-worker-{i}"))
            .build()?;
        Ok(RayonExecutor {
            pool: Some(Arc::new(pool)),
        })
    }
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self::global()
    }
}

impl TaskExecutor for RayonExecutor {
    fn max_degree(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        if items.len() <= 1 {
            return items.into_iter().map(f).collect();
        }
        let run = move || items.into_par_iter().map(f).collect::<Vec<_>>();
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
