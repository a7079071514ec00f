//! Remap rules: how documents of one source group are redistributed.

use tessera_common::{Result, error::Error};
use tessera_shard::TermRef;

use crate::{condition::RegroupCondition, doc_to_group::MAX_GROUP};

/// One `(positive group, condition)` pair of a [`GroupMultiRemapRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositiveRule {
    pub group: i32,
    pub condition: RegroupCondition,
}

impl PositiveRule {
    pub fn new(group: i32, condition: RegroupCondition) -> PositiveRule {
        PositiveRule { group, condition }
    }
}

/// Outcome of evaluating a rule against one document.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The positive at `index` matched first.
    Positive { index: usize, group: i32 },
    /// No positive matched.
    Negative { group: i32 },
    /// Collision detection found at least two matching positives.
    Ambiguous { first: usize, second: usize },
}

/// The rewrite rule of one source group.
///
/// Positives are evaluated in declaration order and the first match wins;
/// conditions need not be mutually exclusive, so rule authors control
/// precedence through ordering. A document matching none of the positives
/// goes to `negative_group`. A rule with no positives is an unconditional
/// reassignment to `negative_group`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMultiRemapRule {
    negative_group: i32,
    positives: Vec<PositiveRule>,
}

impl GroupMultiRemapRule {
    /// Creates a rule.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any group id is negative or above [`MAX_GROUP`].
    pub fn new(negative_group: i32, positives: Vec<PositiveRule>) -> Result<Self> {
        check_group("negative_group", negative_group)?;
        for positive in &positives {
            check_group("positive_group", positive.group)?;
        }
        Ok(GroupMultiRemapRule {
            negative_group,
            positives,
        })
    }

    /// Creates a rule from parallel arrays of positive groups and conditions,
    /// the shape in which hosts usually deliver them.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the arrays differ in length or a group is negative.
    pub fn from_parallel(
        negative_group: i32,
        positive_groups: &[i32],
        conditions: Vec<RegroupCondition>,
    ) -> Result<Self> {
        if positive_groups.len() != conditions.len() {
            return Err(Error::invalid_arg(
                "conditions",
                format!(
                    "positive groups length ({}) != conditions length ({})",
                    positive_groups.len(),
                    conditions.len()
                ),
            ));
        }
        let positives = positive_groups
            .iter()
            .zip(conditions)
            .map(|(&group, condition)| PositiveRule::new(group, condition))
            .collect();
        Self::new(negative_group, positives)
    }

    /// A rule that moves every document of its source group to `group`.
    pub fn unconditional(group: i32) -> Result<Self> {
        Self::new(group, Vec::new())
    }

    pub fn negative_group(&self) -> i32 {
        self.negative_group
    }

    pub fn positives(&self) -> &[PositiveRule] {
        &self.positives
    }

    pub fn is_unconditional(&self) -> bool {
        self.positives.is_empty()
    }

    /// Largest group id this rule can assign.
    pub fn max_group(&self) -> i32 {
        self.positives
            .iter()
            .map(|p| p.group)
            .fold(self.negative_group, i32::max)
    }

    /// Resolves the target group for a document whose conditions all read the
    /// same `value`.
    pub fn resolve(&self, value: TermRef) -> Result<i32> {
        for positive in &self.positives {
            if positive.condition.matches(value)? {
                return Ok(positive.group);
            }
        }
        Ok(self.negative_group)
    }

    /// Resolves the target group for a document, reading each condition's
    /// field through `value_of`.
    ///
    /// With `detect_collisions` off, evaluation stops at the first matching
    /// positive. With it on, the remaining positives are evaluated too and
    /// [`Resolution::Ambiguous`] is returned as soon as a second one matches.
    pub fn resolve_with<'v, F>(
        &self,
        mut value_of: F,
        detect_collisions: bool,
    ) -> Result<Resolution>
    where
        F: FnMut(&RegroupCondition) -> Result<TermRef<'v>>,
    {
        let mut first_match: Option<usize> = None;
        for (index, positive) in self.positives.iter().enumerate() {
            let value = value_of(&positive.condition)?;
            if !positive.condition.matches(value)? {
                continue;
            }
            match first_match {
                None if !detect_collisions => {
                    return Ok(Resolution::Positive {
                        index,
                        group: positive.group,
                    });
                }
                None => first_match = Some(index),
                Some(first) => {
                    return Ok(Resolution::Ambiguous {
                        first,
                        second: index,
                    });
                }
            }
        }
        Ok(match first_match {
            Some(index) => Resolution::Positive {
                index,
                group: self.positives[index].group,
            },
            None => Resolution::Negative {
                group: self.negative_group,
            },
        })
    }
}

/// A single-condition remap rule: documents of `source_group` matching
/// `condition` go to `positive_group`, the rest to `negative_group`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRemapRule {
    pub source_group: i32,
    pub condition: RegroupCondition,
    pub negative_group: i32,
    pub positive_group: i32,
}

impl GroupRemapRule {
    /// Converts into a `(source_group, rule)` pair with a single positive.
    pub fn into_multi(self) -> Result<(i32, GroupMultiRemapRule)> {
        let rule = GroupMultiRemapRule::new(
            self.negative_group,
            vec![PositiveRule::new(self.positive_group, self.condition)],
        )?;
        Ok((self.source_group, rule))
    }
}

fn check_group(name: &str, group: i32) -> Result<()> {
    if !(0..=MAX_GROUP).contains(&group) {
        return Err(Error::invalid_arg(
            name,
            format!("group id must be in 0..={MAX_GROUP}, got {group}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_common::error::ErrorKind;

    fn example_rule() -> GroupMultiRemapRule {
        GroupMultiRemapRule::new(
            0,
            vec![
                PositiveRule::new(2, RegroupCondition::int_equality("x", 5)),
                PositiveRule::new(3, RegroupCondition::int_inequality("x", 10)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let rule = example_rule();
        assert_eq!(rule.resolve(TermRef::Int(5)).unwrap(), 2);
        assert_eq!(rule.resolve(TermRef::Int(12)).unwrap(), 3);
        assert_eq!(rule.resolve(TermRef::Int(1)).unwrap(), 0);
        assert_eq!(rule.max_group(), 3);
    }

    #[test]
    fn test_resolve_overlapping_conditions() {
        let rule = GroupMultiRemapRule::new(
            7,
            vec![
                PositiveRule::new(4, RegroupCondition::int_inequality("x", 0)),
                PositiveRule::new(5, RegroupCondition::int_inequality("x", 10)),
            ],
        )
        .unwrap();
        // Both positives match 15; declaration order decides.
        assert_eq!(rule.resolve(TermRef::Int(15)).unwrap(), 4);

        let resolution = rule.resolve_with(|_| Ok(TermRef::Int(15)), false).unwrap();
        assert_eq!(resolution, Resolution::Positive { index: 0, group: 4 });

        let resolution = rule.resolve_with(|_| Ok(TermRef::Int(15)), true).unwrap();
        let ambiguous = Resolution::Ambiguous {
            first: 0,
            second: 1,
        };
        assert_eq!(resolution, ambiguous);

        let resolution = rule.resolve_with(|_| Ok(TermRef::Int(3)), true).unwrap();
        assert_eq!(resolution, Resolution::Positive { index: 0, group: 4 });

        let resolution = rule.resolve_with(|_| Ok(TermRef::Int(-1)), true).unwrap();
        assert_eq!(resolution, Resolution::Negative { group: 7 });
    }

    #[test]
    fn test_resolve_with_multiple_fields() {
        let rule = GroupMultiRemapRule::new(
            1,
            vec![
                PositiveRule::new(2, RegroupCondition::str_equality("country", "us")),
                PositiveRule::new(3, RegroupCondition::int_inequality("age", 30)),
            ],
        )
        .unwrap();
        let values = |cond: &RegroupCondition| -> Result<TermRef<'static>> {
            match cond.field() {
                "country" => Ok(TermRef::Str("de")),
                "age" => Ok(TermRef::Int(42)),
                other => Err(Error::field_not_found(other)),
            }
        };
        assert_eq!(
            rule.resolve_with(values, false).unwrap(),
            Resolution::Positive { index: 1, group: 3 }
        );
    }

    #[test]
    fn test_unconditional_rule() {
        let rule = GroupMultiRemapRule::unconditional(9).unwrap();
        assert!(rule.is_unconditional());
        assert_eq!(rule.resolve(TermRef::Int(1)).unwrap(), 9);
        assert_eq!(
            rule.resolve_with(|_| unreachable!(), true).unwrap(),
            Resolution::Negative { group: 9 }
        );
    }

    #[test]
    fn test_from_parallel_length_mismatch() {
        let err = GroupMultiRemapRule::from_parallel(
            0,
            &[1, 2],
            vec![RegroupCondition::int_equality("x", 1)],
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));

        let rule = GroupMultiRemapRule::from_parallel(
            0,
            &[1],
            vec![RegroupCondition::int_equality("x", 1)],
        )
        .unwrap();
        assert_eq!(rule.positives().len(), 1);
    }

    #[test]
    fn test_negative_group_rejected() {
        assert!(GroupMultiRemapRule::new(-1, Vec::new()).is_err());
        let condition = RegroupCondition::int_equality("x", 1);
        let positives = vec![PositiveRule::new(-3, condition)];
        assert!(GroupMultiRemapRule::new(0, positives).is_err());
    }

    #[test]
    fn test_group_id_upper_bound() {
        let condition = RegroupCondition::int_equality("x", 5);
        assert!(GroupMultiRemapRule::new(i32::MAX, Vec::new()).is_err());
        let positives = vec![PositiveRule::new(i32::MAX, condition.clone())];
        assert!(GroupMultiRemapRule::new(0, positives).is_err());

        let positives = vec![PositiveRule::new(MAX_GROUP, condition)];
        let rule = GroupMultiRemapRule::new(0, positives).unwrap();
        assert_eq!(rule.resolve(TermRef::Int(5)).unwrap(), MAX_GROUP);
    }

    #[test]
    fn test_group_remap_rule_conversion() {
        let (source, rule) = GroupRemapRule {
            source_group: 4,
            condition: RegroupCondition::str_equality("c", "us"),
            negative_group: 5,
            positive_group: 6,
        }
        .into_multi()
        .unwrap();
        assert_eq!(source, 4);
        assert_eq!(rule.resolve(TermRef::Str("us")).unwrap(), 6);
        assert_eq!(rule.resolve(TermRef::Str("fr")).unwrap(), 5);
    }
}
