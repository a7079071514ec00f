//! Naive models used as test oracles.
//!
//! They favor obviousness over speed: rules are found by linear search,
//! conditions are re-evaluated from scratch and merged terms are collected by
//! scanning every document of every shard.

use std::collections::BTreeMap;

use tessera_regroup::{ConditionKind, GroupMultiRemapRule, Operand, RegroupCondition};
use tessera_shard::{Shard, ShardRef, Term, TermRef};

fn holds(condition: &RegroupCondition, value: TermRef) -> bool {
    match (condition.operand(), value) {
        (Operand::Int(operand), TermRef::Int(v)) => match condition.kind() {
            ConditionKind::Equality => v == *operand,
            ConditionKind::Inequality => v >= *operand,
        },
        (Operand::Str(operand), TermRef::Str(v)) => match condition.kind() {
            ConditionKind::Equality => v.as_bytes() == operand.as_bytes(),
            ConditionKind::Inequality => v.as_bytes() >= operand.as_bytes(),
        },
        _ => panic!("condition {condition} evaluated against {value}"),
    }
}

/// Outcome of [`naive_regroup`] for one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NaiveOutcome {
    Groups(Vec<i32>),
    /// The first document that matched two positives of its rule.
    Collision { doc: usize, source_group: i32 },
}

/// Regroups `initial` over `shard` with `rules` (source groups assumed
/// unique), checking collisions when `error_on_collisions` is set.
pub fn naive_regroup(
    rules: &[(i32, GroupMultiRemapRule)],
    shard: &dyn Shard,
    initial: &[i32],
    error_on_collisions: bool,
) -> NaiveOutcome {
    let mut groups = initial.to_vec();
    for (doc, group) in groups.iter_mut().enumerate() {
        let Some((_, rule)) = rules.iter().find(|(source, _)| *source == *group) else {
            continue;
        };
        let matching = rule
            .positives()
            .iter()
            .filter(|p| {
                let value = shard
                    .field_value(doc, p.condition.field())
                    .expect("field value");
                holds(&p.condition, value)
            })
            .map(|p| p.group)
            .collect::<Vec<_>>();
        if error_on_collisions && matching.len() > 1 {
            return NaiveOutcome::Collision {
                doc,
                source_group: *group,
            };
        }
        *group = matching.first().copied().unwrap_or(rule.negative_group());
    }
    NaiveOutcome::Groups(groups)
}

/// Term of `field` mapped to the `(shard id, sorted docs)` pairs holding it,
/// shards in input order.
pub type NaiveMerge = BTreeMap<Term, Vec<(String, Vec<u32>)>>;

/// Collects the merged terms of `field` by scanning every document.
pub fn naive_merge(shards: &[ShardRef], field: &str) -> NaiveMerge {
    let mut merged = NaiveMerge::new();
    for shard in shards {
        if shard.field_type(field).is_none() {
            continue;
        }
        let mut local = BTreeMap::<Term, Vec<u32>>::new();
        for doc in 0..shard.document_count() {
            let value = shard.field_value(doc, field).expect("field value");
            local.entry(value.to_term()).or_default().push(doc as u32);
        }
        for (term, docs) in local {
            merged
                .entry(term)
                .or_default()
                .push((shard.id().to_string(), docs));
        }
    }
    merged
}
