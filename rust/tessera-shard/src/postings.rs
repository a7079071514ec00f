use std::sync::Arc;

/// Sorted, distinct document ordinals associated with one term in one shard.
///
/// `Postings` is cheap to clone: clones share the same immutable buffer, so a
/// term iterator can hand out postings without copying the dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Postings(Arc<[u32]>);

impl Postings {
    /// Creates postings from a vector of document ordinals that is already
    /// sorted in ascending order without duplicates.
    pub fn from_sorted(docs: Vec<u32>) -> Postings {
        debug_assert!(docs.windows(2).all(|w| w[0] < w[1]));
        Postings(docs.into())
    }

    /// Creates postings from arbitrary document ordinals, sorting and
    /// removing duplicates.
    pub fn from_unsorted(mut docs: Vec<u32>) -> Postings {
        docs.sort_unstable();
        docs.dedup();
        Postings(docs.into())
    }

    pub fn empty() -> Postings {
        Postings(Arc::from(Vec::new()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, doc: u32) -> bool {
        self.0.binary_search(&doc).is_ok()
    }
}

impl Default for Postings {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postings_from_unsorted() {
        let postings = Postings::from_unsorted(vec![9, 2, 5, 2, 0]);
        assert_eq!(postings.as_slice(), &[0, 2, 5, 9]);
        assert_eq!(postings.len(), 4);
        assert!(postings.contains(5));
        assert!(!postings.contains(3));
    }

    #[test]
    fn test_postings_share_buffer() {
        let postings = Postings::from_sorted(vec![1, 4, 8]);
        let clone = postings.clone();
        assert_eq!(postings, clone);
        assert!(std::ptr::eq(postings.as_slice(), clone.as_slice()));
        assert!(Postings::empty().is_empty());
    }
}
