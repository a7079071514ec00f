//! Workflow execution utilities for running independent tasks in parallel.
//!
//! # Key Components
//!
//! - [`executor::TaskExecutor`] - the "run N independent tasks, collect results in
//!   order" contract consumed by the term provider build
//! - [`executor::SequentialExecutor`] - runs everything on the caller's thread
//! - [`scoped::ScopedExecutor`] - bounded scoped worker threads per batch
//! - [`rayon_executor::RayonExecutor`] - rayon global or dedicated pools
//! - [`executor::Executor`] - runtime selection among the above
//!
//! Cancellation and timeouts are not part of the contract; a batch runs until
//! every task has finished.

pub mod executor;
pub mod rayon_executor;
pub mod scoped;

pub use executor::{Executor, SequentialExecutor, TaskExecutor};
pub use rayon_executor::RayonExecutor;
pub use scoped::ScopedExecutor;
