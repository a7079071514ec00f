//! Sorted per-field term dictionaries.

use ahash::AHashMap;
use tessera_common::{Result, error::Error};

use crate::{
    postings::Postings,
    term::{FieldType, Term, TermRef},
};

/// The distinct terms of one field within one shard, in ascending order,
/// each paired with the postings of the documents holding that term.
///
/// Invariants:
/// - every term has the dictionary's field type;
/// - terms are strictly ascending (no duplicates);
/// - `terms.len() == postings.len()`.
#[derive(Debug, Clone)]
pub struct TermDictionary {
    field_type: FieldType,
    terms: Vec<Term>,
    postings: Vec<Postings>,
}

impl TermDictionary {
    pub fn empty(field_type: FieldType) -> TermDictionary {
        TermDictionary {
            field_type,
            terms: Vec::new(),
            postings: Vec::new(),
        }
    }

    /// Creates a dictionary from entries that are expected to be sorted by term.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if an entry's term does not have `field_type`, and
    /// `InvalidArgument` if the terms are not strictly ascending.
    pub fn from_sorted_entries(
        field: &str,
        field_type: FieldType,
        entries: impl IntoIterator<Item = (Term, Postings)>,
    ) -> Result<TermDictionary> {
        let mut dictionary = TermDictionary::empty(field_type);
        for (term, postings) in entries {
            if term.field_type() != field_type {
                return Err(Error::type_mismatch(
                    field,
                    field_type.name(),
                    term.field_type().name(),
                ));
            }
            if let Some(last) = dictionary.terms.last() {
                if *last >= term {
                    return Err(Error::invalid_arg(
                        "entries",
                        format!("terms of field '{field}' are not strictly ascending at {term}"),
                    ));
                }
            }
            dictionary.terms.push(term);
            dictionary.postings.push(postings);
        }
        Ok(dictionary)
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term_at(&self, index: usize) -> &Term {
        &self.terms[index]
    }

    pub fn postings_at(&self, index: usize) -> &Postings {
        &self.postings[index]
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Looks up a term by binary search and returns its postings.
    pub fn find(&self, term: TermRef) -> Option<&Postings> {
        self.terms
            .binary_search_by(|t| t.as_term_ref().cmp(&term))
            .ok()
            .map(|index| &self.postings[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Postings)> {
        self.terms.iter().zip(self.postings.iter())
    }
}

/// Accumulates `(document, value)` pairs of one column and produces a sorted
/// [`TermDictionary`].
///
/// Terms are mapped to dense ids on first sight; document ordinals are
/// appended to the per-id list, so feeding documents in ascending order
/// yields sorted postings without a final sort.
pub struct TermDictionaryBuilder {
    field: String,
    field_type: FieldType,
    ids: AHashMap<Term, u32>,
    terms: Vec<Term>,
    docs: Vec<Vec<u32>>,
    last_doc: Option<u32>,
}

impl TermDictionaryBuilder {
    pub fn new(field: impl Into<String>, field_type: FieldType) -> TermDictionaryBuilder {
        TermDictionaryBuilder {
            field: field.into(),
            field_type,
            ids: AHashMap::new(),
            terms: Vec::new(),
            docs: Vec::new(),
            last_doc: None,
        }
    }

    /// Records that document `doc` holds `value`.
    ///
    /// Documents must be pushed in strictly ascending order.
    pub fn push(&mut self, doc: u32, value: TermRef) -> Result<()> {
        if value.field_type() != self.field_type {
            return Err(Error::type_mismatch(
                &self.field,
                self.field_type.name(),
                value.field_type().name(),
            ));
        }
        if self.last_doc.is_some_and(|last| last >= doc) {
            return Err(Error::invalid_arg(
                "doc",
                format!(
                    "document {doc} pushed out of order for field '{}'",
                    self.field
                ),
            ));
        }
        self.last_doc = Some(doc);

        let term = value.to_term();
        let id = match self.ids.get(&term) {
            Some(&id) => id,
            None => {
                let id = self.terms.len() as u32;
                self.ids.insert(term.clone(), id);
                self.terms.push(term);
                self.docs.push(Vec::new());
                id
            }
        };
        self.docs[id as usize].push(doc);
        Ok(())
    }

    /// Returns the number of distinct terms seen so far.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn finish(self) -> TermDictionary {
        let mut entries = self.terms.into_iter().zip(self.docs).collect::<Vec<_>>();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut dictionary = TermDictionary::empty(self.field_type);
        dictionary.terms.reserve(entries.len());
        dictionary.postings.reserve(entries.len());
        for (term, docs) in entries {
            dictionary.terms.push(term);
            dictionary.postings.push(Postings::from_sorted(docs));
        }
        dictionary
    }
}
