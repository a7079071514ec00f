//! Deterministic random shards and remap rules.
//!
//! Every generator takes a seeded [`fastrand::Rng`] so that a failing
//! randomized test can be replayed from its seed.

use std::sync::Arc;

use tessera_regroup::{GroupMultiRemapRule, PositiveRule, RegroupCondition};
use tessera_shard::{MemoryShard, ShardRef};

/// Integer field with values in `0..INT_RANGE`.
pub const INT_FIELD: &str = "x";
/// Integer field with negative and positive values.
pub const SIGNED_FIELD: &str = "y";
/// String field drawn from [`WORDS`].
pub const STR_FIELD: &str = "s";

pub const INT_RANGE: i64 = 20;

pub const WORDS: &[&str] = &[
    "", "alpha", "beta", "de", "delta", "fr", "gamma", "us", "zeta", "\u{e9}t\u{e9}",
];

/// Builds a shard with `num_docs` documents and the fields [`INT_FIELD`],
/// [`SIGNED_FIELD`] and [`STR_FIELD`].
pub fn random_shard(rng: &mut fastrand::Rng, id: &str, num_docs: usize) -> MemoryShard {
    let ints = (0..num_docs).map(|_| rng.i64(0..INT_RANGE)).collect();
    let signed = (0..num_docs).map(|_| rng.i64(-5..=5)).collect();
    let words = (0..num_docs)
        .map(|_| WORDS[rng.usize(..WORDS.len())])
        .collect::<Vec<_>>();
    MemoryShard::builder(id, num_docs)
        .int_field(INT_FIELD, ints)
        .int_field(SIGNED_FIELD, signed)
        .str_field(STR_FIELD, words)
        .build()
        .expect("random shard")
}

/// Builds `count` shards named `shard-0`, `shard-1`, ..., each with up to
/// `max_docs` documents (possibly none).
pub fn random_shards(seed: u64, count: usize, max_docs: usize) -> Vec<ShardRef> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..count)
        .map(|i| {
            let num_docs = rng.usize(..=max_docs);
            Arc::new(random_shard(&mut rng, &format!("shard-{i}"), num_docs)) as ShardRef
        })
        .collect()
}

/// A random condition over one of the generated fields.
pub fn random_condition(rng: &mut fastrand::Rng) -> RegroupCondition {
    match rng.u8(..4) {
        0 => RegroupCondition::int_equality(INT_FIELD, rng.i64(0..INT_RANGE)),
        1 => RegroupCondition::int_inequality(INT_FIELD, rng.i64(0..INT_RANGE)),
        2 => RegroupCondition::int_inequality(SIGNED_FIELD, rng.i64(-6..=6)),
        _ => {
            let word = WORDS[rng.usize(..WORDS.len())];
            if rng.bool() {
                RegroupCondition::str_equality(STR_FIELD, word)
            } else {
                RegroupCondition::str_inequality(STR_FIELD, word)
            }
        }
    }
}

/// A random rule with up to `max_positives` positives and target groups in
/// `0..=max_group`.
pub fn random_rule(
    rng: &mut fastrand::Rng,
    max_positives: usize,
    max_group: i32,
) -> GroupMultiRemapRule {
    let positives = (0..rng.usize(..=max_positives))
        .map(|_| PositiveRule::new(rng.i32(0..=max_group), random_condition(rng)))
        .collect();
    GroupMultiRemapRule::new(rng.i32(0..=max_group), positives).expect("random rule")
}

/// Rules for a random subset of the source groups `0..num_source_groups`,
/// each source group appearing at most once, in random order.
pub fn random_rules(
    rng: &mut fastrand::Rng,
    num_source_groups: i32,
    max_group: i32,
) -> Vec<(i32, GroupMultiRemapRule)> {
    let mut rules = Vec::new();
    for source in 0..num_source_groups {
        if rng.u8(..4) != 0 {
            rules.push((source, random_rule(rng, 4, max_group)));
        }
    }
    rng.shuffle(&mut rules);
    rules
}
