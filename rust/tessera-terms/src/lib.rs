//! Shard-aware term streams.
//!
//! For every requested field, a [`TermProvider`] merges the sorted term
//! cursors of all shards into one ascending stream of distinct terms, each
//! annotated with the per-shard postings it came from. [`TermProviders`]
//! builds the providers of several fields at once on a
//! [`TaskExecutor`](tessera_workflow::TaskExecutor).

pub mod merge;
pub mod term_provider;
pub mod term_providers;
pub mod term_source;

pub use merge::{MergedTerm, MergedTerms, ShardPostings};
pub use term_provider::TermProvider;
pub use term_providers::{TermProviders, TermProvidersOptions};
pub use term_source::TermSource;
