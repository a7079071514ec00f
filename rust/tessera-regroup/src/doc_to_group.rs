//! Dense per-document group assignment of one shard.

use tessera_common::{Result, verify_arg};

/// Group assigned to every document of a freshly created [`DocToGroup`].
pub const DEFAULT_GROUP: i32 = 0;

/// Largest assignable group id. `num_groups()` is one past the largest id in
/// use and must itself fit in an `i32`.
pub const MAX_GROUP: i32 = i32::MAX - 1;

/// A dense array of group ids indexed by document ordinal.
///
/// Group ids lie in `0..=MAX_GROUP`; [`DEFAULT_GROUP`] means "ungrouped".
/// `num_groups()` is one past the largest group id in use. It is tracked
/// incrementally on every [`set`](Self::set), which can only raise it; call
/// [`recount_groups`](Self::recount_groups) after bulk changes that may
/// lower it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocToGroup {
    groups: Vec<i32>,
    num_groups: i32,
}

impl DocToGroup {
    /// Creates an assignment with every document in [`DEFAULT_GROUP`].
    pub fn new(num_docs: usize) -> DocToGroup {
        DocToGroup {
            groups: vec![DEFAULT_GROUP; num_docs],
            num_groups: if num_docs == 0 { 0 } else { DEFAULT_GROUP + 1 },
        }
    }

    /// Creates an assignment from existing per-document groups.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any group id is negative or above [`MAX_GROUP`].
    pub fn from_groups(groups: Vec<i32>) -> Result<DocToGroup> {
        verify_arg!(
            groups,
            groups.iter().all(|&group| (0..=MAX_GROUP).contains(&group))
        );
        let mut doc_to_group = DocToGroup {
            groups,
            num_groups: 0,
        };
        doc_to_group.recount_groups();
        Ok(doc_to_group)
    }

    pub fn num_docs(&self) -> usize {
        self.groups.len()
    }

    /// One past the largest group id in use, 0 for an empty shard.
    pub fn num_groups(&self) -> i32 {
        self.num_groups
    }

    #[inline]
    pub fn get(&self, doc: usize) -> i32 {
        self.groups[doc]
    }

    /// Assigns `group` to document `doc`.
    ///
    /// # Panics
    ///
    /// Panics if `doc` is out of range. Groups outside `0..=MAX_GROUP` are a
    /// caller bug and are caught by a debug assertion.
    #[inline]
    pub fn set(&mut self, doc: usize, group: i32) {
        debug_assert!((0..=MAX_GROUP).contains(&group), "invalid group {group}");
        self.groups[doc] = group;
        if group >= self.num_groups {
            self.num_groups = group.saturating_add(1);
        }
    }

    /// Recomputes `num_groups()` exactly from the current assignment.
    pub fn recount_groups(&mut self) -> i32 {
        self.num_groups = self
            .groups
            .iter()
            .copied()
            .max()
            .map_or(0, |max| max.saturating_add(1));
        self.num_groups
    }

    pub fn groups(&self) -> &[i32] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<i32> {
        self.groups
    }

    /// Number of documents in each group, indexed by group id.
    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.num_groups.max(0) as usize];
        for &group in &self.groups {
            sizes[group as usize] += 1;
        }
        sizes
    }

    /// Document ordinals currently assigned to `group`, ascending.
    pub fn docs_in_group(&self, group: i32) -> impl Iterator<Item = usize> + '_ {
        self.groups
            .iter()
            .enumerate()
            .filter(move |&(_, &g)| g == group)
            .map(|(doc, _)| doc)
    }
}
