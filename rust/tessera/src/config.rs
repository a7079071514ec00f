//! Session configuration.

use tessera_common::{Result, error::Error};
use tessera_regroup::{RegroupOptions, RuleSetOptions};
use tessera_terms::TermProvidersOptions;
use tessera_workflow::{Executor, RayonExecutor, ScopedExecutor, SequentialExecutor};

/// Which task executor builds term providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutorKind {
    /// Everything on the calling thread.
    Sequential,
    /// Scoped worker threads spawned per batch.
    Scoped,
    /// Rayon thread pool.
    #[default]
    Rayon,
}

/// Options of a [`LocalSession`](crate::session::LocalSession).
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    rule_set: RuleSetOptions,
    regroup: RegroupOptions,
    term_providers: TermProvidersOptions,
    executor: ExecutorKind,
    threads: Option<usize>,
}

impl SessionOptions {
    pub fn new() -> SessionOptions {
        Default::default()
    }

    pub fn rule_set_options(mut self, options: RuleSetOptions) -> Self {
        self.rule_set = options;
        self
    }

    pub fn regroup_options(mut self, options: RegroupOptions) -> Self {
        self.regroup = options;
        self
    }

    pub fn term_providers_options(mut self, options: TermProvidersOptions) -> Self {
        self.term_providers = options;
        self
    }

    pub fn executor(mut self, kind: ExecutorKind) -> Self {
        self.executor = kind;
        self
    }

    /// Number of worker threads for the scoped or rayon executor. Without
    /// it, scoped executors size themselves to the CPU count and rayon uses
    /// its global pool.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn get_rule_set_options(&self) -> &RuleSetOptions {
        &self.rule_set
    }

    pub fn get_regroup_options(&self) -> &RegroupOptions {
        &self.regroup
    }

    pub fn get_term_providers_options(&self) -> &TermProvidersOptions {
        &self.term_providers
    }

    pub fn executor_kind(&self) -> ExecutorKind {
        self.executor
    }

    /// Instantiates the configured executor.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if a dedicated rayon pool cannot be created.
    pub fn create_executor(&self) -> Result<Executor> {
        Ok(match self.executor {
            ExecutorKind::Sequential => SequentialExecutor.into(),
            ExecutorKind::Scoped => self
                .threads
                .map(ScopedExecutor::new)
                .unwrap_or_default()
                .into(),
            ExecutorKind::Rayon => match self.threads {
                Some(threads) => RayonExecutor::with_threads(threads)
                    .map_err(|e| Error::invalid_operation(format!("create rayon pool: {e}")))?
                    .into(),
                None => RayonExecutor::global().into(),
            },
        })
    }
}
