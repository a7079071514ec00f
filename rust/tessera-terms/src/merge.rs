//! K-way merge of per-shard term cursors.
//!
//! Each source is already sorted, so the merge keeps one pending entry per
//! source in a min-heap keyed by `(term, source index)`. Every step pops the
//! minimum term together with all other sources positioned at the same term,
//! emits them as one [`MergedTerm`] and refills the heap from the sources that
//! were consumed. Ordering by source index on ties keeps the per-shard list of
//! an emission in shard order.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use tessera_shard::{Postings, ShardId, Term};

use crate::term_source::TermSource;

/// Postings of one term within one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPostings {
    pub shard: ShardId,
    pub postings: Postings,
}

/// One distinct term of a field across all shards that contain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTerm {
    term: Term,
    shards: Vec<ShardPostings>,
}

impl MergedTerm {
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Per-shard postings, in source order. Never empty.
    pub fn shards(&self) -> &[ShardPostings] {
        &self.shards
    }

    pub fn shard_ids(&self) -> impl Iterator<Item = &ShardId> {
        self.shards.iter().map(|s| &s.shard)
    }

    /// Total number of documents holding the term, summed over shards.
    pub fn document_count(&self) -> usize {
        self.shards.iter().map(|s| s.postings.len()).sum()
    }

    /// Stable split assignment of this term for a field partitioned into
    /// `num_splits` splits. Callers validate that `num_splits` is non-zero.
    pub(crate) fn split_index(&self, num_splits: usize) -> usize {
        debug_assert!(num_splits > 0);
        (self.term.hash64() % num_splits as u64) as usize
    }

    pub fn into_parts(self) -> (Term, Vec<ShardPostings>) {
        (self.term, self.shards)
    }
}

struct Pending {
    term: Term,
    source: usize,
    postings: Postings,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.term
            .cmp(&other.term)
            .then_with(|| self.source.cmp(&other.source))
    }
}

/// Lazy merged term stream of one field, in ascending term order.
pub struct MergedTerms {
    sources: Vec<TermSource>,
    heap: BinaryHeap<Reverse<Pending>>,
}

impl MergedTerms {
    pub fn new(mut sources: Vec<TermSource>) -> MergedTerms {
        let mut heap = BinaryHeap::with_capacity(sources.len());
        for (source, s) in sources.iter_mut().enumerate() {
            if let Some((term, postings)) = s.iterator_mut().advance() {
                heap.push(Reverse(Pending {
                    term,
                    source,
                    postings,
                }));
            }
        }
        MergedTerms { sources, heap }
    }

    /// Number of sources that still have terms to contribute.
    pub fn active_sources(&self) -> usize {
        self.heap.len()
    }

    fn shard_postings(&self, source: usize, postings: Postings) -> ShardPostings {
        ShardPostings {
            shard: self.sources[source].shard_id().clone(),
            postings,
        }
    }

    fn refill(&mut self, source: usize, previous: &Term) {
        if let Some((term, postings)) = self.sources[source].iterator_mut().advance() {
            debug_assert!(
                &term > previous,
                "term cursor of shard {} is not strictly ascending",
                self.sources[source].shard_id()
            );
            self.heap.push(Reverse(Pending {
                term,
                source,
                postings,
            }));
        }
    }
}

impl Iterator for MergedTerms {
    type Item = MergedTerm;

    fn next(&mut self) -> Option<MergedTerm> {
        let Reverse(first) = self.heap.pop()?;
        let mut consumed = vec![first.source];
        let mut shards = vec![self.shard_postings(first.source, first.postings)];

        while self.heap.peek().is_some_and(|p| p.0.term == first.term) {
            let Some(Reverse(next)) = self.heap.pop() else {
                break;
            };
            consumed.push(next.source);
            shards.push(self.shard_postings(next.source, next.postings));
        }

        for source in consumed {
            self.refill(source, &first.term);
        }

        Some(MergedTerm {
            term: first.term,
            shards,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = self
            .sources
            .iter()
            .map(|s| s.iterator().remaining_hint())
            .try_fold(self.heap.len(), |acc, hint| hint.map(|h| acc + h));
        (usize::from(!self.heap.is_empty()), upper)
    }
}
