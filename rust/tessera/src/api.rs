//! Entry points offered to the host runtime.
//!
//! These are thin, default-configured wrappers over the component crates.
//! Hosts needing non-default options or stateful group assignments use
//! [`LocalSession`](crate::session::LocalSession) instead.

use tessera_common::Result;
use tessera_regroup::{
    DocToGroup, GroupMultiRemapRule, GroupMultiRemapRuleSet, PositiveRule, RuleSetOptions,
};
use tessera_shard::{Shard, ShardRef};
use tessera_terms::{TermProviders, TermProvidersOptions};
use tessera_workflow::TaskExecutor;

/// Builds a validated rule set from `(source_group, negative_group,
/// positives)` triples.
///
/// # Errors
///
/// `DuplicateTargetGroup` if a source group repeats, `InvalidArgument` for
/// negative group ids.
pub fn build_rule_set<I>(rules: I) -> Result<GroupMultiRemapRuleSet>
where
    I: IntoIterator<Item = (i32, i32, Vec<PositiveRule>)>,
{
    let rules = rules
        .into_iter()
        .map(|(source, negative, positives)| {
            GroupMultiRemapRule::new(negative, positives).map(|rule| (source, rule))
        })
        .collect::<Result<Vec<_>>>()?;
    GroupMultiRemapRuleSet::build(rules, &RuleSetOptions::default())
}

/// Regroups every document of `shard`, starting from the default grouping,
/// and returns the new assignment.
pub fn regroup(
    rule_set: &GroupMultiRemapRuleSet,
    shard: &dyn Shard,
    error_on_collisions: bool,
) -> Result<DocToGroup> {
    tessera_regroup::regroup(rule_set, shard, error_on_collisions)
}

/// Builds one term provider per field of `fields` over `shards`, one task per
/// field on `executor`.
pub fn build_term_providers<S: AsRef<str>>(
    shards: &[ShardRef],
    fields: &[S],
    executor: &impl TaskExecutor,
) -> Result<TermProviders> {
    TermProviders::build(shards, fields, &TermProvidersOptions::default(), executor)
}
