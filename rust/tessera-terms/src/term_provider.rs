//! Per-field term provider over a set of shards.

use tessera_common::{Result, error::Error, verify_arg};
use tessera_shard::{FieldType, Shard, ShardId, ShardRef};

use crate::{
    merge::{MergedTerm, MergedTerms},
    term_source::TermSource,
};

/// The term sources of one field, one per shard that has terms for it.
///
/// A provider is consumed by its merged iteration: term cursors are
/// forward-only, so [`merged_terms`](Self::merged_terms) takes `self`.
#[derive(Debug)]
pub struct TermProvider {
    field: String,
    field_type: Option<FieldType>,
    sources: Vec<TermSource>,
}

impl TermProvider {
    /// Builds the provider of `field` over `shards`.
    ///
    /// Shards lacking the field, or holding no terms for it, are omitted. The
    /// remaining sources keep the order of `shards`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if two shards declare the field with different types,
    /// or any error raised by a shard while opening its term cursor.
    pub fn build(field: &str, shards: &[ShardRef]) -> Result<TermProvider> {
        let mut field_type: Option<FieldType> = None;
        let mut sources = Vec::with_capacity(shards.len());
        for shard in shards {
            let Some(declared) = shard.field_type(field) else {
                continue;
            };
            match field_type {
                None => field_type = Some(declared),
                Some(expected) if expected != declared => {
                    return Err(Error::type_mismatch(
                        field,
                        expected.name(),
                        format!("{} in shard {}", declared.name(), shard.id()),
                    ));
                }
                Some(_) => (),
            }
            if let Some(source) = TermSource::open(shard, field)? {
                sources.push(source);
            }
        }

        log::debug!(
            "term provider '{field}': {} of {} shards contribute terms",
            sources.len(),
            shards.len()
        );
        Ok(TermProvider {
            field: field.to_string(),
            field_type,
            sources,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Declared type of the field, or `None` when no shard has it.
    pub fn field_type(&self) -> Option<FieldType> {
        self.field_type
    }

    pub fn sources(&self) -> &[TermSource] {
        &self.sources
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn shard_ids(&self) -> impl Iterator<Item = &ShardId> {
        self.sources.iter().map(TermSource::shard_id)
    }

    /// Merged term stream across all sources, in ascending term order.
    pub fn merged_terms(self) -> MergedTerms {
        MergedTerms::new(self.sources)
    }

    /// The terms of split `split` out of `num_splits`, in ascending order.
    ///
    /// Every distinct term lands in exactly one split, chosen by a stable
    /// hash of the term.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `num_splits` is zero or `split >= num_splits`.
    pub fn merged_terms_in_split(
        self,
        split: usize,
        num_splits: usize,
    ) -> Result<impl Iterator<Item = MergedTerm>> {
        verify_arg!(num_splits, num_splits > 0);
        verify_arg!(split, split < num_splits);
        Ok(self
            .merged_terms()
            .filter(move |term| term.split_index(num_splits) == split))
    }
}
