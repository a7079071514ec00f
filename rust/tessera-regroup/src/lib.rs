//! Regroup engine: predicate-based reassignment of documents to groups.
//!
//! A regroup request is a set of remap rules, one per source group. Each rule
//! lists `(positive group, condition)` pairs evaluated in order against the
//! document's field values, plus a negative group for documents matching none.
//!
//! # Key Components
//!
//! - [`RegroupCondition`] - equality / inequality predicate over one field
//! - [`GroupMultiRemapRule`] - ordered positives plus a negative group
//! - [`GroupMultiRemapRuleSet`] - rules sorted by source group, binary-searched
//! - [`DocToGroup`] - dense per-document group assignment of one shard
//! - [`RegroupEngine`] - applies a rule set to a shard's assignment

pub mod condition;
pub mod doc_to_group;
pub mod engine;
pub mod rule;
pub mod rule_set;

pub use condition::{ConditionKind, Operand, RegroupCondition};
pub use doc_to_group::{DEFAULT_GROUP, DocToGroup, MAX_GROUP};
pub use engine::{RegroupEngine, RegroupOptions, RegroupStats, regroup};
pub use rule::{GroupMultiRemapRule, GroupRemapRule, PositiveRule, Resolution};
pub use rule_set::{GroupMultiRemapRuleSet, RuleSetOptions};
