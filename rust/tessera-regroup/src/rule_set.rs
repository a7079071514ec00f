//! Sorted collections of remap rules keyed by source group.

use tessera_common::{Result, error::Error};

use crate::rule::{GroupMultiRemapRule, GroupRemapRule};

/// Options controlling rule set construction.
#[derive(Debug, Clone)]
pub struct RuleSetOptions {
    validate_targets: bool,
}

impl Default for RuleSetOptions {
    fn default() -> Self {
        RuleSetOptions {
            validate_targets: true,
        }
    }
}

impl RuleSetOptions {
    /// Sets whether repeated source groups are rejected with
    /// `DuplicateTargetGroup`. When disabled, the caller vouches for
    /// uniqueness and the first rule of a repeated group wins lookups.
    pub fn validate_targets(mut self, validate: bool) -> Self {
        self.validate_targets = validate;
        self
    }

    pub fn validates_targets(&self) -> bool {
        self.validate_targets
    }
}

/// Remap rules sorted ascending by source group.
///
/// A rule set is read-only once built; it can be shared across concurrent
/// per-shard regroup passes.
#[derive(Debug, Clone, Default)]
pub struct GroupMultiRemapRuleSet {
    rules: Vec<(i32, GroupMultiRemapRule)>,
}

impl GroupMultiRemapRuleSet {
    /// Builds a rule set from `(source_group, rule)` pairs in any order.
    ///
    /// # Errors
    ///
    /// `DuplicateTargetGroup` if target validation is enabled and a source
    /// group repeats; `InvalidArgument` if a source group is negative.
    pub fn build(
        rules: impl IntoIterator<Item = (i32, GroupMultiRemapRule)>,
        options: &RuleSetOptions,
    ) -> Result<Self> {
        let mut rules = rules.into_iter().collect::<Vec<_>>();
        if let Some((source, _)) = rules.iter().find(|(source, _)| *source < 0) {
            return Err(Error::invalid_arg(
                "source_group",
                format!("group id must be non-negative, got {source}"),
            ));
        }
        // Stable sort: with validation off, the first of a repeated group wins.
        rules.sort_by_key(|(source, _)| *source);
        if options.validate_targets {
            if let Some(pair) = rules.windows(2).find(|pair| pair[0].0 == pair[1].0) {
                return Err(Error::duplicate_target_group(pair[0].0));
            }
        }
        log::debug!("built remap rule set with {} rules", rules.len());
        Ok(GroupMultiRemapRuleSet { rules })
    }

    /// Builds a rule set from exactly `num_rules` rules taken from `rules`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `rules` yields fewer than `num_rules` items, plus
    /// the errors of [`build`](Self::build).
    pub fn from_counted(
        num_rules: usize,
        rules: impl IntoIterator<Item = (i32, GroupMultiRemapRule)>,
        options: &RuleSetOptions,
    ) -> Result<Self> {
        let taken = rules.into_iter().take(num_rules).collect::<Vec<_>>();
        if taken.len() < num_rules {
            return Err(Error::invalid_arg(
                "num_rules",
                format!(
                    "num_rules is {num_rules} but iterator only had {} rules",
                    taken.len()
                ),
            ));
        }
        Self::build(taken, options)
    }

    /// Builds a rule set from single-condition remap rules.
    pub fn from_single_rules(
        rules: impl IntoIterator<Item = GroupRemapRule>,
        options: &RuleSetOptions,
    ) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(GroupRemapRule::into_multi)
            .collect::<Result<Vec<_>>>()?;
        Self::build(rules, options)
    }

    /// Returns the rule for `source_group`, or `None` when documents of that
    /// group should keep their current assignment.
    pub fn rule_for(&self, source_group: i32) -> Option<&GroupMultiRemapRule> {
        let index = self
            .rules
            .partition_point(|(source, _)| *source < source_group);
        self.rules
            .get(index)
            .filter(|(source, _)| *source == source_group)
            .map(|(_, rule)| rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates the `(source_group, rule)` pairs in ascending source order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &GroupMultiRemapRule)> {
        self.rules.iter().map(|(source, rule)| (*source, rule))
    }

    /// Largest group id any rule can assign, or `None` for an empty set.
    pub fn max_target_group(&self) -> Option<i32> {
        self.rules.iter().map(|(_, rule)| rule.max_group()).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::RegroupCondition;
    use crate::rule::PositiveRule;
    use tessera_common::error::ErrorKind;

    fn rule(negative: i32) -> GroupMultiRemapRule {
        GroupMultiRemapRule::unconditional(negative).unwrap()
    }

    #[test]
    fn test_lookup_by_source_group() {
        let set = GroupMultiRemapRuleSet::build(
            vec![(7, rule(70)), (1, rule(10)), (4, rule(40))],
            &RuleSetOptions::default(),
        )
        .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.iter().map(|(g, _)| g).collect::<Vec<_>>(),
            vec![1, 4, 7]
        );
        assert_eq!(set.rule_for(1).unwrap().negative_group(), 10);
        assert_eq!(set.rule_for(4).unwrap().negative_group(), 40);
        assert_eq!(set.rule_for(7).unwrap().negative_group(), 70);
        for absent in [0, 2, 3, 5, 8, i32::MAX, i32::MIN] {
            assert!(set.rule_for(absent).is_none());
        }
        assert_eq!(set.max_target_group(), Some(70));
    }

    #[test]
    fn test_lookup_random_sets() {
        fastrand::seed(9_177_223);
        for _ in 0..50 {
            let mut groups = (0..fastrand::usize(0..40))
                .map(|_| fastrand::i32(0..100))
                .collect::<Vec<_>>();
            groups.sort_unstable();
            groups.dedup();
            fastrand::shuffle(&mut groups);

            let set = GroupMultiRemapRuleSet::build(
                groups.iter().map(|&g| (g, rule(g + 1000))),
                &RuleSetOptions::default(),
            )
            .unwrap();
            for g in -5..105 {
                match set.rule_for(g) {
                    Some(rule) => {
                        assert!(groups.contains(&g));
                        assert_eq!(rule.negative_group(), g + 1000);
                    }
                    None => assert!(!groups.contains(&g)),
                }
            }
        }
    }

    #[test]
    fn test_duplicate_source_group() {
        let err = GroupMultiRemapRuleSet::build(
            vec![(3, rule(1)), (5, rule(2)), (3, rule(4))],
            &RuleSetOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DuplicateTargetGroup { group: 3 }));

        let set = GroupMultiRemapRuleSet::build(
            vec![(3, rule(1)), (5, rule(2)), (3, rule(4))],
            &RuleSetOptions::default().validate_targets(false),
        )
        .unwrap();
        assert_eq!(set.rule_for(3).unwrap().negative_group(), 1);
    }

    #[test]
    fn test_negative_source_group() {
        let options = RuleSetOptions::default();
        let err = GroupMultiRemapRuleSet::build(vec![(-1, rule(1))], &options).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
    }

    #[test]
    fn test_from_counted() {
        let rules = vec![(1, rule(1)), (2, rule(2)), (3, rule(3))];
        let options = RuleSetOptions::default();
        let set = GroupMultiRemapRuleSet::from_counted(2, rules.clone(), &options).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.rule_for(3).is_none());

        let err = GroupMultiRemapRuleSet::from_counted(4, rules, &options).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument num_rules: num_rules is 4 but iterator only had 3 rules"
        );
    }

    #[test]
    fn test_from_single_rules() {
        let condition = RegroupCondition::int_equality("x", 3);
        let single = GroupRemapRule {
            source_group: 1,
            condition: condition.clone(),
            negative_group: 0,
            positive_group: 2,
        };
        let options = RuleSetOptions::default();
        let set = GroupMultiRemapRuleSet::from_single_rules(vec![single], &options).unwrap();
        let rule = set.rule_for(1).unwrap();
        assert_eq!(rule.positives(), &[PositiveRule::new(2, condition)]);
    }

    #[test]
    fn test_empty_set() {
        let set = GroupMultiRemapRuleSet::build(Vec::new(), &RuleSetOptions::default()).unwrap();
        assert!(set.is_empty());
        assert!(set.rule_for(0).is_none());
        assert_eq!(set.max_target_group(), None);
    }
}
