//! Tessera: document regrouping and shard-aware term streams.
//!
//! This crate is the facade over the component crates:
//!
//! - [`tessera_shard`] - the shard contract and the in-memory shard
//! - [`tessera_regroup`] - remap rules and the regroup engine
//! - [`tessera_terms`] - per-field merged term providers
//! - [`tessera_workflow`] - task executors used to build providers in parallel
//!
//! The [`api`] module holds the stateless entry points. [`LocalSession`]
//! keeps per-shard group assignments and registered rule sets across calls,
//! addressing rule sets through generational [`Handle`]s.

pub mod api;
pub mod config;
pub mod registry;
pub mod session;

pub use api::{build_rule_set, build_term_providers, regroup};
pub use config::{ExecutorKind, SessionOptions};
pub use registry::{Handle, Handles};
pub use session::{LocalSession, Sessions};

pub use tessera_common::{
    Result,
    error::{Error, ErrorKind},
};
pub use tessera_regroup::{
    ConditionKind, DEFAULT_GROUP, DocToGroup, GroupMultiRemapRule, GroupMultiRemapRuleSet,
    GroupRemapRule, MAX_GROUP, Operand, PositiveRule, RegroupCondition, RegroupEngine,
    RegroupOptions, RegroupStats, RuleSetOptions,
};
pub use tessera_shard::{
    FieldType, MemoryShard, Postings, Shard, ShardId, ShardRef, Term, TermIterator, TermRef,
};
pub use tessera_terms::{
    MergedTerm, MergedTerms, ShardPostings, TermProvider, TermProviders, TermProvidersOptions,
};
pub use tessera_workflow::{
    Executor, RayonExecutor, ScopedExecutor, SequentialExecutor, TaskExecutor,
};
