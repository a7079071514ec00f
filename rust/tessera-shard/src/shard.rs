//! The shard collaborator contract.
//!
//! The regroup engine and the term providers never look at physical storage.
//! They see a shard only through the [`Shard`] trait: a document count, a
//! per-document field value accessor and a per-field sorted term cursor.

use std::{fmt, sync::Arc};

use tessera_common::Result;

use crate::{
    term::{FieldType, TermRef},
    term_iterator::TermIterator,
};

/// Identity of a shard, used to annotate merged terms with their provenance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShardId(Arc<str>);

impl ShardId {
    pub fn new(id: impl AsRef<str>) -> ShardId {
        ShardId(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShardId {
    fn from(value: &str) -> Self {
        ShardId::new(value)
    }
}

impl From<String> for ShardId {
    fn from(value: String) -> Self {
        ShardId::new(value)
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable partition of the document collection.
///
/// # Thread Safety
///
/// Shards are shared read-only across concurrent regroup passes and term
/// provider builds, hence the `Send + Sync` bound.
pub trait Shard: Send + Sync {
    fn id(&self) -> &ShardId;

    /// Number of documents in the shard. Document ordinals are `0..document_count()`.
    fn document_count(&self) -> usize;

    /// Declared type of `field`, or `None` if the shard has no such field.
    fn field_type(&self, field: &str) -> Option<FieldType>;

    /// Returns the value of `field` for document `doc`.
    ///
    /// # Errors
    ///
    /// `FieldNotFound` if the shard has no such field, `InvalidArgument` if
    /// `doc` is out of range.
    fn field_value(&self, doc: usize, field: &str) -> Result<TermRef<'_>>;

    /// Returns a fresh cursor over the sorted distinct terms of `field`.
    ///
    /// # Errors
    ///
    /// `FieldNotFound` if the shard has no such field.
    fn term_iterator(&self, field: &str) -> Result<Box<dyn TermIterator>>;
}

/// Shared handle to a shard.
pub type ShardRef = Arc<dyn Shard>;
