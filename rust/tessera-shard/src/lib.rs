//! Shard-side building blocks shared by the regroup engine and the term providers.
//!
//! This crate defines what the core needs from a shard and nothing more:
//!
//! - [`Shard`] - the collaborator contract: document count, per-document field
//!   values and per-field sorted term cursors
//! - [`Term`] / [`TermRef`] / [`FieldType`] - typed scalar column values
//! - [`Postings`] - sorted document ordinals of one term
//! - [`TermIterator`] - forward-only cursor over a field's sorted terms
//! - [`TermDictionary`] - sorted per-field term storage
//! - [`MemoryShard`] - an in-memory shard used by hosts and tests

pub mod dictionary;
pub mod memory;
pub mod postings;
pub mod shard;
pub mod term;
pub mod term_iterator;

pub use dictionary::{TermDictionary, TermDictionaryBuilder};
pub use memory::{MemoryShard, MemoryShardBuilder};
pub use postings::Postings;
pub use shard::{Shard, ShardId, ShardRef};
pub use term::{FieldType, Term, TermRef};
pub use term_iterator::{DictionaryTermIterator, TermIterator};
