//! Applies a remap rule set to one shard's group assignment.

use tessera_common::{Result, error::Error};
use tessera_shard::Shard;

use crate::{doc_to_group::DocToGroup, rule::Resolution, rule_set::GroupMultiRemapRuleSet};

/// Options controlling a regroup pass.
#[derive(Debug, Clone, Default)]
pub struct RegroupOptions {
    error_on_collisions: bool,
}

impl RegroupOptions {
    /// Sets whether a document matching two or more positives of its rule
    /// fails the pass with `AmbiguousRegroup` instead of taking the first match.
    pub fn error_on_collisions(mut self, error_on_collisions: bool) -> Self {
        self.error_on_collisions = error_on_collisions;
        self
    }

    pub fn errors_on_collisions(&self) -> bool {
        self.error_on_collisions
    }
}

/// Counters collected during a regroup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegroupStats {
    /// Documents visited.
    pub docs_examined: usize,
    /// Documents whose current group had a rule.
    pub docs_remapped: usize,
    /// Remapped documents that matched no positive condition.
    pub docs_to_negative: usize,
    /// `num_groups()` of the assignment after the pass.
    pub num_groups: i32,
}

/// Rewrites a shard's [`DocToGroup`] according to a rule set.
///
/// The pass is sequential over the shard's documents. The engine is the only
/// writer of the assignment for the duration of [`apply`](Self::apply); callers
/// must not run two passes over the same `DocToGroup` concurrently. Passes over
/// different shards are independent.
pub struct RegroupEngine<'a> {
    rule_set: &'a GroupMultiRemapRuleSet,
    options: RegroupOptions,
}

impl<'a> RegroupEngine<'a> {
    pub fn new(rule_set: &'a GroupMultiRemapRuleSet, options: RegroupOptions) -> Self {
        RegroupEngine { rule_set, options }
    }

    /// Applies the rule set to every document of `shard`, mutating
    /// `doc_to_group` in place.
    ///
    /// Documents whose current group has no rule keep their group. The others
    /// move to the group of their rule's first matching positive, or to the
    /// rule's negative group when none matches.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `doc_to_group` and `shard` disagree on the
    ///   document count (nothing is mutated in that case);
    /// - `FieldNotFound` / `TypeMismatch` from condition evaluation;
    /// - `AmbiguousRegroup` when collision detection is enabled and a document
    ///   matches more than one positive.
    ///
    /// On error the assignment may be partially rewritten and must be
    /// discarded. Callers needing atomicity apply to a copy and swap on success.
    pub fn apply<S>(&self, doc_to_group: &mut DocToGroup, shard: &S) -> Result<RegroupStats>
    where
        S: Shard + ?Sized,
    {
        if doc_to_group.num_docs() != shard.document_count() {
            return Err(Error::invalid_arg(
                "doc_to_group",
                format!(
                    "assignment covers {} documents, shard '{}' has {}",
                    doc_to_group.num_docs(),
                    shard.id(),
                    shard.document_count()
                ),
            ));
        }

        let detect_collisions = self.options.error_on_collisions;
        let mut stats = RegroupStats::default();
        for doc in 0..doc_to_group.num_docs() {
            stats.docs_examined += 1;
            let current = doc_to_group.get(doc);
            let Some(rule) = self.rule_set.rule_for(current) else {
                continue;
            };
            stats.docs_remapped += 1;

            let resolution = rule.resolve_with(
                |condition| shard.field_value(doc, condition.field()),
                detect_collisions,
            )?;
            let group = match resolution {
                Resolution::Positive { group, .. } => group,
                Resolution::Negative { group } => {
                    stats.docs_to_negative += 1;
                    group
                }
                Resolution::Ambiguous { first, second } => {
                    log::debug!(
                        "document {doc} of shard {} matches positives {first} and {second}",
                        shard.id()
                    );
                    return Err(Error::ambiguous_regroup(doc, current));
                }
            };
            doc_to_group.set(doc, group);
        }

        stats.num_groups = doc_to_group.recount_groups();
        log::debug!(
            "regrouped shard {}: {} docs examined, {} remapped, {} to negative groups, {} groups",
            shard.id(),
            stats.docs_examined,
            stats.docs_remapped,
            stats.docs_to_negative,
            stats.num_groups
        );
        Ok(stats)
    }
}

/// Regroups a shard starting from the default assignment (every document in
/// group 0) and returns the new assignment.
pub fn regroup<S>(
    rule_set: &GroupMultiRemapRuleSet,
    shard: &S,
    error_on_collisions: bool,
) -> Result<DocToGroup>
where
    S: Shard + ?Sized,
{
    let mut doc_to_group = DocToGroup::new(shard.document_count());
    let options = RegroupOptions::default().error_on_collisions(error_on_collisions);
    RegroupEngine::new(rule_set, options).apply(&mut doc_to_group, shard)?;
    Ok(doc_to_group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        condition::RegroupCondition,
        rule::{GroupMultiRemapRule, PositiveRule},
        rule_set::RuleSetOptions,
    };
    use tessera_common::error::ErrorKind;
    use tessera_shard::MemoryShard;

    fn example_rule_set() -> GroupMultiRemapRuleSet {
        let rule = GroupMultiRemapRule::new(
            0,
            vec![
                PositiveRule::new(2, RegroupCondition::int_equality("x", 5)),
                PositiveRule::new(3, RegroupCondition::int_inequality("x", 10)),
            ],
        )
        .unwrap();
        GroupMultiRemapRuleSet::build(vec![(1, rule)], &RuleSetOptions::default()).unwrap()
    }

    fn shard(values: Vec<i64>) -> MemoryShard {
        MemoryShard::builder("s", values.len())
            .int_field("x", values)
            .build()
            .unwrap()
    }

    #[test]
    fn test_example_rules() {
        let shard = shard(vec![5, 12, 1]);
        let mut dtg = DocToGroup::from_groups(vec![1, 1, 1]).unwrap();
        let rules = example_rule_set();
        let stats = RegroupEngine::new(&rules, RegroupOptions::default())
            .apply(&mut dtg, &shard)
            .unwrap();
        assert_eq!(dtg.groups(), &[2, 3, 0]);
        assert_eq!(
            stats,
            RegroupStats {
                docs_examined: 3,
                docs_remapped: 3,
                docs_to_negative: 1,
                num_groups: 4,
            }
        );
    }

    #[test]
    fn test_documents_without_rule_keep_group() {
        let shard = shard(vec![5, 5, 12, 12]);
        let mut dtg = DocToGroup::from_groups(vec![1, 4, 1, 0]).unwrap();
        let rules = example_rule_set();
        RegroupEngine::new(&rules, RegroupOptions::default())
            .apply(&mut dtg, &shard)
            .unwrap();
        assert_eq!(dtg.groups(), &[2, 4, 3, 0]);
    }

    #[test]
    fn test_regroup_from_default_assignment() {
        let shard = shard(vec![5, 12, 1]);
        // Every document starts in group 0, which has no rule here.
        let dtg = regroup(&example_rule_set(), &shard, false).unwrap();
        assert_eq!(dtg.groups(), &[0, 0, 0]);

        let condition = RegroupCondition::int_inequality("x", 5);
        let positives = vec![PositiveRule::new(1, condition)];
        let rule = GroupMultiRemapRule::new(9, positives).unwrap();
        let rules =
            GroupMultiRemapRuleSet::build(vec![(0, rule)], &RuleSetOptions::default()).unwrap();
        let dtg = regroup(&rules, &shard, false).unwrap();
        assert_eq!(dtg.groups(), &[1, 1, 9]);
        assert_eq!(dtg.num_groups(), 10);
    }

    #[test]
    fn test_collisions() {
        let rule = GroupMultiRemapRule::new(
            0,
            vec![
                PositiveRule::new(2, RegroupCondition::int_inequality("x", 0)),
                PositiveRule::new(3, RegroupCondition::int_inequality("x", 10)),
            ],
        )
        .unwrap();
        let rules =
            GroupMultiRemapRuleSet::build(vec![(0, rule)], &RuleSetOptions::default()).unwrap();
        let shard = shard(vec![1, 2, 11, 3]);

        let dtg = regroup(&rules, &shard, false).unwrap();
        assert_eq!(dtg.groups(), &[2, 2, 2, 2]);

        let err = regroup(&rules, &shard, true).unwrap_err();
        match err.kind() {
            ErrorKind::AmbiguousRegroup { doc, source_group } => {
                assert_eq!(*doc, 2);
                assert_eq!(*source_group, 0);
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn test_condition_errors_propagate() {
        let shard = MemoryShard::builder("s", 2)
            .str_field("x", ["a", "b"])
            .build()
            .unwrap();
        let mut dtg = DocToGroup::from_groups(vec![1, 1]).unwrap();
        let rules = example_rule_set();
        let err = RegroupEngine::new(&rules, RegroupOptions::default())
            .apply(&mut dtg, &shard)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));

        let shard = MemoryShard::builder("s", 2)
            .int_field("y", vec![1, 2])
            .build()
            .unwrap();
        let mut dtg = DocToGroup::from_groups(vec![1, 1]).unwrap();
        let err = RegroupEngine::new(&rules, RegroupOptions::default())
            .apply(&mut dtg, &shard)
            .unwrap_err();
        assert!(err.is_field_not_found());
    }

    #[test]
    fn test_document_count_mismatch() {
        let shard = shard(vec![1, 2, 3]);
        let mut dtg = DocToGroup::from_groups(vec![1, 1]).unwrap();
        let rules = example_rule_set();
        let err = RegroupEngine::new(&rules, RegroupOptions::default())
            .apply(&mut dtg, &shard)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert_eq!(dtg.groups(), &[1, 1]);
    }

    #[test]
    fn test_empty_shard() {
        let shard = shard(Vec::new());
        let dtg = regroup(&example_rule_set(), &shard, true).unwrap();
        assert_eq!(dtg.num_docs(), 0);
        assert_eq!(dtg.num_groups(), 0);
    }
}
