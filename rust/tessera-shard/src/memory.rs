//! In-memory shard implementation.
//!
//! [`MemoryShard`] keeps each field as a dense column plus a sorted term
//! dictionary built once, when the shard is built. Field names are resolved
//! to column slots through a hash map populated at the same time, so field
//! lookups during a regroup pass never rescan the layout.

use std::sync::Arc;

use ahash::AHashMap;
use tessera_common::{Result, error::Error, verify_arg};

use crate::{
    dictionary::{TermDictionary, TermDictionaryBuilder},
    shard::{Shard, ShardId},
    term::{FieldType, TermRef},
    term_iterator::{DictionaryTermIterator, TermIterator},
};

enum ColumnData {
    Int(Vec<i64>),
    Str(Vec<String>),
}

impl ColumnData {
    fn field_type(&self) -> FieldType {
        match self {
            ColumnData::Int(_) => FieldType::Int,
            ColumnData::Str(_) => FieldType::Str,
        }
    }

    fn len(&self) -> usize {
        match self {
            ColumnData::Int(values) => values.len(),
            ColumnData::Str(values) => values.len(),
        }
    }

    fn value_at(&self, doc: usize) -> TermRef<'_> {
        match self {
            ColumnData::Int(values) => TermRef::Int(values[doc]),
            ColumnData::Str(values) => TermRef::Str(&values[doc]),
        }
    }
}

struct Column {
    data: ColumnData,
    dictionary: Arc<TermDictionary>,
}

/// A shard whose columns and term dictionaries live in memory.
pub struct MemoryShard {
    id: ShardId,
    document_count: usize,
    columns: Vec<Column>,
    field_slots: AHashMap<String, usize>,
}

impl MemoryShard {
    pub fn builder(id: impl Into<ShardId>, document_count: usize) -> MemoryShardBuilder {
        MemoryShardBuilder {
            id: id.into(),
            document_count,
            fields: Vec::new(),
        }
    }

    /// Names of the fields in this shard, in the order they were added.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        let mut names = self
            .field_slots
            .iter()
            .map(|(name, &slot)| (slot, name.as_str()))
            .collect::<Vec<_>>();
        names.sort_unstable_by_key(|&(slot, _)| slot);
        names.into_iter().map(|(_, name)| name)
    }

    /// Returns the sorted term dictionary of `field`.
    pub fn dictionary(&self, field: &str) -> Result<&Arc<TermDictionary>> {
        self.column(field).map(|column| &column.dictionary)
    }

    fn column(&self, field: &str) -> Result<&Column> {
        self.field_slots
            .get(field)
            .map(|&slot| &self.columns[slot])
            .ok_or_else(|| Error::field_not_found(field))
    }
}

impl Shard for MemoryShard {
    fn id(&self) -> &ShardId {
        &self.id
    }

    fn document_count(&self) -> usize {
        self.document_count
    }

    fn field_type(&self, field: &str) -> Option<FieldType> {
        self.column(field).ok().map(|c| c.data.field_type())
    }

    fn field_value(&self, doc: usize, field: &str) -> Result<TermRef<'_>> {
        let column = self.column(field)?;
        verify_arg!(doc, doc < self.document_count);
        Ok(column.data.value_at(doc))
    }

    fn term_iterator(&self, field: &str) -> Result<Box<dyn TermIterator>> {
        let column = self.column(field)?;
        let dictionary = Arc::clone(&column.dictionary);
        Ok(Box::new(DictionaryTermIterator::new(dictionary)))
    }
}

/// Collects columns for a [`MemoryShard`].
pub struct MemoryShardBuilder {
    id: ShardId,
    document_count: usize,
    fields: Vec<(String, ColumnData)>,
}

impl MemoryShardBuilder {
    pub fn int_field(mut self, name: impl Into<String>, values: Vec<i64>) -> Self {
        self.fields.push((name.into(), ColumnData::Int(values)));
        self
    }

    pub fn str_field<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.fields.push((name.into(), ColumnData::Str(values)));
        self
    }

    /// Validates the columns and builds their term dictionaries.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if a column length differs from the document count,
    /// if a field name repeats, or if the document count exceeds the `u32`
    /// ordinal space.
    pub fn build(self) -> Result<MemoryShard> {
        verify_arg!(document_count, self.document_count <= u32::MAX as usize);

        let mut columns = Vec::with_capacity(self.fields.len());
        let mut field_slots = AHashMap::with_capacity(self.fields.len());
        for (name, data) in self.fields {
            if data.len() != self.document_count {
                return Err(Error::invalid_arg(
                    "values",
                    format!(
                        "field '{name}' has {} values, shard '{}' has {} documents",
                        data.len(),
                        self.id,
                        self.document_count
                    ),
                ));
            }
            if field_slots.contains_key(&name) {
                return Err(Error::invalid_arg(
                    "name",
                    format!("field '{name}' added twice to shard '{}'", self.id),
                ));
            }

            let mut builder = TermDictionaryBuilder::new(&name, data.field_type());
            for doc in 0..data.len() {
                builder.push(doc as u32, data.value_at(doc))?;
            }
            let dictionary = Arc::new(builder.finish());
            log::trace!(
                "shard {}: field '{name}' has {} distinct terms",
                self.id,
                dictionary.len()
            );

            field_slots.insert(name, columns.len());
            columns.push(Column { data, dictionary });
        }

        log::debug!(
            "built memory shard {} with {} documents and {} fields",
            self.id,
            self.document_count,
            columns.len()
        );
        Ok(MemoryShard {
            id: self.id,
            document_count: self.document_count,
            columns,
            field_slots,
        })
    }
}
