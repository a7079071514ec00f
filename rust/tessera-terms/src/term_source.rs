//! One shard's contribution to a field's merged term stream.

use tessera_common::Result;
use tessera_shard::{FieldType, Shard, ShardId, ShardRef, TermIterator};

/// Pairs a shard with its term cursor for one field.
///
/// The source owns the cursor state. The shard itself is shared: the source
/// keeps a reference so that merged terms can be annotated with provenance,
/// but never mutates it.
pub struct TermSource {
    shard: ShardRef,
    iterator: Box<dyn TermIterator>,
}

impl TermSource {
    pub fn new(shard: ShardRef, iterator: Box<dyn TermIterator>) -> TermSource {
        TermSource { shard, iterator }
    }

    /// Opens a source over `field` in `shard`.
    ///
    /// Returns `Ok(None)` when the shard has no such field or holds no terms
    /// for it; such shards contribute nothing to the merge.
    pub fn open(shard: &ShardRef, field: &str) -> Result<Option<TermSource>> {
        if shard.field_type(field).is_none() {
            return Ok(None);
        }
        let iterator = match shard.term_iterator(field) {
            Ok(iterator) => iterator,
            Err(e) if e.is_field_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        if iterator.is_exhausted() {
            return Ok(None);
        }
        Ok(Some(TermSource::new(shard.clone(), iterator)))
    }

    pub fn shard(&self) -> &ShardRef {
        &self.shard
    }

    pub fn shard_id(&self) -> &ShardId {
        self.shard.id()
    }

    pub fn field_type(&self) -> FieldType {
        self.iterator.field_type()
    }

    pub fn iterator(&self) -> &dyn TermIterator {
        self.iterator.as_ref()
    }

    pub fn iterator_mut(&mut self) -> &mut dyn TermIterator {
        self.iterator.as_mut()
    }

    pub fn into_parts(self) -> (ShardRef, Box<dyn TermIterator>) {
        (self.shard, self.iterator)
    }
}

impl std::fmt::Debug for TermSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermSource")
            .field("shard", self.shard.id())
            .field("field_type", &self.field_type())
            .finish_non_exhaustive()
    }
}
