//! Forward-only cursors over a shard's sorted terms for one field.

use std::sync::Arc;

use crate::{
    dictionary::TermDictionary,
    postings::Postings,
    term::{FieldType, Term, TermRef},
};

/// A forward-only, sorted cursor over the distinct terms of one field in one
/// shard.
///
/// Terms are produced in strictly ascending order, each with its postings.
/// Once [`advance`](Self::advance) has returned `None` the cursor stays
/// exhausted: further calls keep returning `None`. To rescan a field, obtain
/// a fresh iterator from the shard.
///
/// Cursors are stateful and single-threaded; they are `Send` so that a cursor
/// created on one worker can be handed to another, but never advanced from two
/// threads at once.
pub trait TermIterator: Send {
    /// Declared type of the field this cursor scans.
    fn field_type(&self) -> FieldType;

    /// Returns the term that the next call to [`advance`](Self::advance) will
    /// produce, without consuming it.
    fn peek_term(&self) -> Option<TermRef<'_>>;

    /// Consumes and returns the next term and its postings.
    fn advance(&mut self) -> Option<(Term, Postings)>;

    fn is_exhausted(&self) -> bool {
        self.peek_term().is_none()
    }

    /// Upper bound on the number of terms still to be produced, if known.
    fn remaining_hint(&self) -> Option<usize> {
        None
    }
}

/// A [`TermIterator`] over a shared, in-memory [`TermDictionary`].
pub struct DictionaryTermIterator {
    dictionary: Arc<TermDictionary>,
    position: usize,
}

impl DictionaryTermIterator {
    pub fn new(dictionary: Arc<TermDictionary>) -> DictionaryTermIterator {
        DictionaryTermIterator {
            dictionary,
            position: 0,
        }
    }
}

impl TermIterator for DictionaryTermIterator {
    fn field_type(&self) -> FieldType {
        self.dictionary.field_type()
    }

    fn peek_term(&self) -> Option<TermRef<'_>> {
        self.dictionary
            .terms()
            .get(self.position)
            .map(Term::as_term_ref)
    }

    fn advance(&mut self) -> Option<(Term, Postings)> {
        if self.position >= self.dictionary.len() {
            return None;
        }
        let index = self.position;
        self.position += 1;
        Some((
            self.dictionary.term_at(index).clone(),
            self.dictionary.postings_at(index).clone(),
        ))
    }

    fn remaining_hint(&self) -> Option<usize> {
        Some(self.dictionary.len() - self.position)
    }
}

impl Iterator for DictionaryTermIterator {
    type Item = (Term, Postings);

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dictionary.len() - self.position;
        (remaining, Some(remaining))
    }
}
