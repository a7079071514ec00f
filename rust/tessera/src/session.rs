//! Stateful regrouping over a fixed set of shards.

use tessera_common::{Result, error::Error};
use tessera_regroup::{
    DocToGroup, GroupMultiRemapRule, GroupMultiRemapRuleSet, GroupRemapRule, RegroupEngine,
    RegroupOptions, RegroupStats,
};
use tessera_shard::{Shard, ShardRef};
use tessera_terms::TermProviders;
use tessera_workflow::Executor;

use crate::{
    config::SessionOptions,
    registry::{Handle, Handles},
};

/// A set of shards, their current group assignments and the rule sets
/// registered against them.
///
/// Every shard starts with all documents in the default group. Each regroup
/// call rewrites the assignment of one shard (or of all shards) from its
/// current state. A failed regroup leaves the assignments untouched.
pub struct LocalSession {
    shards: Vec<ShardRef>,
    groups: Vec<DocToGroup>,
    rule_sets: Handles<GroupMultiRemapRuleSet>,
    options: SessionOptions,
    executor: Executor,
}

impl LocalSession {
    pub fn new(shards: Vec<ShardRef>, options: SessionOptions) -> Result<LocalSession> {
        let executor = options.create_executor()?;
        let groups = shards
            .iter()
            .map(|shard| DocToGroup::new(shard.document_count()))
            .collect();
        log::debug!("opened local session over {} shards", shards.len());
        Ok(LocalSession {
            shards,
            groups,
            rule_sets: Handles::new(),
            options,
            executor,
        })
    }

    pub fn shards(&self) -> &[ShardRef] {
        &self.shards
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn doc_to_group(&self, shard_index: usize) -> Result<&DocToGroup> {
        self.groups
            .get(shard_index)
            .ok_or_else(|| self.shard_out_of_range(shard_index))
    }

    /// Largest `num_groups()` across the session's shards.
    pub fn num_groups(&self) -> i32 {
        self.groups
            .iter()
            .map(DocToGroup::num_groups)
            .max()
            .unwrap_or(0)
    }

    /// Puts every document of every shard back in the default group.
    pub fn reset_groups(&mut self) {
        for (groups, shard) in self.groups.iter_mut().zip(&self.shards) {
            *groups = DocToGroup::new(shard.document_count());
        }
    }

    /// Registers a rule set and returns its handle.
    pub fn get_rules(
        &mut self,
        rules: impl IntoIterator<Item = (i32, GroupMultiRemapRule)>,
    ) -> Result<Handle> {
        let rule_set = GroupMultiRemapRuleSet::build(rules, self.options.get_rule_set_options())?;
        self.rule_sets.insert(rule_set)
    }

    /// Registers exactly `num_rules` rules taken from `rules`.
    pub fn get_counted_rules(
        &mut self,
        num_rules: usize,
        rules: impl IntoIterator<Item = (i32, GroupMultiRemapRule)>,
    ) -> Result<Handle> {
        let rule_set = GroupMultiRemapRuleSet::from_counted(
            num_rules,
            rules,
            self.options.get_rule_set_options(),
        )?;
        self.rule_sets.insert(rule_set)
    }

    /// Registers a rule set of single-condition rules.
    pub fn get_single_rules(
        &mut self,
        rules: impl IntoIterator<Item = GroupRemapRule>,
    ) -> Result<Handle> {
        let rule_set =
            GroupMultiRemapRuleSet::from_single_rules(rules, self.options.get_rule_set_options())?;
        self.rule_sets.insert(rule_set)
    }

    pub fn rules(&self, handle: Handle) -> Result<&GroupMultiRemapRuleSet> {
        self.rule_sets.get(handle)
    }

    /// Releases a rule set. Releasing the same handle twice fails with
    /// `InvalidHandle`.
    pub fn release_rules(&mut self, handle: Handle) -> Result<()> {
        self.rule_sets.remove(handle).map(drop)
    }

    /// Regroups one shard with a registered rule set and returns the shard's
    /// new `num_groups()`.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for an unknown rule set, `InvalidArgument` for an
    /// out-of-range shard, or any regroup error. The shard's assignment is
    /// unchanged on error.
    pub fn regroup(
        &mut self,
        rules: Handle,
        shard_index: usize,
        error_on_collisions: bool,
    ) -> Result<i32> {
        let options = self
            .options
            .get_regroup_options()
            .clone()
            .error_on_collisions(error_on_collisions);
        let stats = self.regroup_shard(rules, shard_index, options)?;
        Ok(stats.num_groups)
    }

    /// Regroups every shard with the session's regroup options and returns
    /// the session-wide [`num_groups`](Self::num_groups).
    ///
    /// Either every shard is regrouped or, on the first error, none is.
    pub fn regroup_all(&mut self, rules: Handle) -> Result<i32> {
        let rule_set = self.rule_sets.get(rules)?;
        let engine = RegroupEngine::new(rule_set, self.options.get_regroup_options().clone());
        let mut scratch = self.groups.clone();
        for (groups, shard) in scratch.iter_mut().zip(&self.shards) {
            engine.apply(groups, shard.as_ref())?;
        }
        self.groups = scratch;
        Ok(self.num_groups())
    }

    fn regroup_shard(
        &mut self,
        rules: Handle,
        shard_index: usize,
        options: RegroupOptions,
    ) -> Result<RegroupStats> {
        let rule_set = self.rule_sets.get(rules)?;
        let current = self
            .groups
            .get(shard_index)
            .ok_or_else(|| self.shard_out_of_range(shard_index))?;
        let mut scratch = current.clone();
        let stats = RegroupEngine::new(rule_set, options)
            .apply(&mut scratch, self.shards[shard_index].as_ref())?;
        self.groups[shard_index] = scratch;
        Ok(stats)
    }

    fn shard_out_of_range(&self, shard_index: usize) -> Error {
        Error::invalid_arg(
            "shard_index",
            format!(
                "{shard_index} out of range for {} shards",
                self.shards.len()
            ),
        )
    }

    /// Builds term providers for `fields` over the session's shards on the
    /// session's executor.
    pub fn term_providers<S: AsRef<str>>(&self, fields: &[S]) -> Result<TermProviders> {
        TermProviders::build(
            &self.shards,
            fields,
            self.options.get_term_providers_options(),
            &self.executor,
        )
    }
}

/// Open sessions addressed by handle.
#[derive(Default)]
pub struct Sessions {
    sessions: Handles<LocalSession>,
}

impl Sessions {
    pub fn new() -> Sessions {
        Default::default()
    }

    pub fn open(&mut self, shards: Vec<ShardRef>, options: SessionOptions) -> Result<Handle> {
        let session = LocalSession::new(shards, options)?;
        self.sessions.insert(session)
    }

    pub fn get(&self, handle: Handle) -> Result<&LocalSession> {
        self.sessions.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut LocalSession> {
        self.sessions.get_mut(handle)
    }

    pub fn close(&mut self, handle: Handle) -> Result<()> {
        let session = self.sessions.remove(handle)?;
        log::debug!(
            "closed local session {handle} over {} shards",
            session.shards().len()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
