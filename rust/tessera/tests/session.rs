use std::sync::Arc;

use tessera::{
    ErrorKind, ExecutorKind, GroupMultiRemapRule, GroupRemapRule, Handle, LocalSession,
    MemoryShard, PositiveRule, RegroupCondition, RegroupOptions, SessionOptions, Sessions,
    ShardRef, Term,
};

fn shards() -> Vec<ShardRef> {
    vec![
        Arc::new(
            MemoryShard::builder("s0", 3)
                .int_field("x", vec![5, 12, 1])
                .str_field("c", ["us", "de", "us"])
                .build()
                .unwrap(),
        ),
        Arc::new(
            MemoryShard::builder("s1", 4)
                .int_field("x", vec![10, 5, 0, 7])
                .str_field("c", ["fr", "us", "de", "us"])
                .build()
                .unwrap(),
        ),
    ]
}

fn split_rule() -> GroupMultiRemapRule {
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
fn test_regroup_from_current_grouping() {
    let mut session = LocalSession::new(shards(), SessionOptions::default()).unwrap();
    assert_eq!(session.num_groups(), 1);

    // Everything starts in group 0; move it to group 1 first.
    let to_one = session
        .get_rules([(0, GroupMultiRemapRule::unconditional(1).unwrap())])
        .unwrap();
    assert_eq!(session.regroup_all(to_one).unwrap(), 2);

    let split = session.get_rules([(1, split_rule())]).unwrap();
    assert_eq!(session.regroup(split, 0, false).unwrap(), 4);
    assert_eq!(session.doc_to_group(0).unwrap().groups(), &[2, 3, 0]);
    assert_eq!(session.doc_to_group(1).unwrap().groups(), &[1, 1, 1, 1]);

    assert_eq!(session.regroup(split, 1, false).unwrap(), 4);
    assert_eq!(session.doc_to_group(1).unwrap().groups(), &[3, 2, 0, 0]);

    session.reset_groups();
    assert_eq!(session.doc_to_group(1).unwrap().groups(), &[0, 0, 0, 0]);
}

#[test]
fn test_failed_regroup_leaves_groups_untouched() {
    let mut session = LocalSession::new(shards(), SessionOptions::default()).unwrap();
    let to_one = session
        .get_rules([(0, GroupMultiRemapRule::unconditional(1).unwrap())])
        .unwrap();
    session.regroup_all(to_one).unwrap();

    // Document 1 of shard 1 has x = 5 and c = "us": two positives match.
    let colliding = GroupMultiRemapRule::new(
        0,
        vec![
            PositiveRule::new(4, RegroupCondition::int_equality("x", 5)),
            PositiveRule::new(5, RegroupCondition::str_equality("c", "us")),
        ],
    )
    .unwrap();
    let handle = session.get_rules([(1, colliding)]).unwrap();
    let err = session.regroup(handle, 1, true).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::AmbiguousRegroup {
            doc: 1,
            source_group: 1
        }
    ));
    assert_eq!(session.doc_to_group(1).unwrap().groups(), &[1, 1, 1, 1]);

    // Without collision detection the first match wins.
    assert_eq!(session.regroup(handle, 1, false).unwrap(), 6);
    assert_eq!(session.doc_to_group(1).unwrap().groups(), &[0, 4, 0, 5]);
}

#[test]
fn test_regroup_all_is_atomic() {
    let options = SessionOptions::new()
        .regroup_options(RegroupOptions::default().error_on_collisions(true));
    let mut session = LocalSession::new(shards(), options).unwrap();
    let rule = GroupMultiRemapRule::new(
        0,
        vec![
            PositiveRule::new(1, RegroupCondition::str_inequality("c", "a")),
            PositiveRule::new(2, RegroupCondition::int_equality("x", 0)),
        ],
    )
    .unwrap();
    let handle = session.get_rules([(0, rule)]).unwrap();
    // Shard 0 regroups cleanly, shard 1 collides on document 2.
    let err = session.regroup_all(handle).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::AmbiguousRegroup { doc: 2, .. }));
    assert_eq!(session.doc_to_group(0).unwrap().groups(), &[0, 0, 0]);
}

#[test]
fn test_rule_handles() {
    let mut session = LocalSession::new(shards(), SessionOptions::default()).unwrap();
    let handle = session.get_rules([(1, split_rule())]).unwrap();
    assert_eq!(session.rules(handle).unwrap().len(), 1);
    session.release_rules(handle).unwrap();

    let err = session.release_rules(handle).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidHandle { .. }));
    let err = session.regroup(handle, 0, false).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidHandle { .. }));
    let unknown = Handle::from_raw(12345);
    let err = session.regroup(unknown, 0, false).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidHandle { .. }));

    let err = session
        .get_rules([(1, split_rule()), (1, split_rule())])
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::DuplicateTargetGroup { group: 1 }));

    let err = session
        .get_counted_rules(3, [(1, split_rule())])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid argument num_rules: num_rules is 3 but iterator only had 1 rules"
    );

    let handle = session.get_rules([(0, split_rule())]).unwrap();
    let err = session.regroup(handle, 2, false).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
}

#[test]
fn test_single_condition_rules() {
    let mut session = LocalSession::new(shards(), SessionOptions::default()).unwrap();
    let handle = session
        .get_single_rules([GroupRemapRule {
            source_group: 0,
            condition: RegroupCondition::str_equality("c", "us"),
            negative_group: 1,
            positive_group: 2,
        }])
        .unwrap();
    assert_eq!(session.regroup(handle, 1, false).unwrap(), 3);
    assert_eq!(session.doc_to_group(1).unwrap().groups(), &[1, 2, 1, 2]);
}

#[test]
fn test_session_term_providers() {
    for kind in [
        ExecutorKind::Sequential,
        ExecutorKind::Scoped,
        ExecutorKind::Rayon,
    ] {
        let options = SessionOptions::new().executor(kind).threads(2);
        let session = LocalSession::new(shards(), options).unwrap();
        let mut providers = session.term_providers(&["c", "x"]).unwrap();
        assert_eq!(providers.field_names().collect::<Vec<_>>(), vec!["c", "x"]);

        let provider = providers.take("c").unwrap();
        let merged = provider.merged_terms().collect::<Vec<_>>();
        let summary = merged
            .iter()
            .map(|m| (m.term().clone(), m.shard_ids().count()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                (Term::from("de"), 2),
                (Term::from("fr"), 1),
                (Term::from("us"), 2),
            ]
        );
    }
}

#[test]
fn test_sessions_registry() {
    let mut sessions = Sessions::new();
    let options = SessionOptions::default();
    let a = sessions.open(shards(), options.clone()).unwrap();
    let b = sessions.open(Vec::new(), options).unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions.get(b).unwrap().num_groups(), 0);

    let rules = sessions
        .get_mut(a)
        .unwrap()
        .get_rules([(0, split_rule())])
        .unwrap();
    let session = sessions.get_mut(a).unwrap();
    assert_eq!(session.regroup(rules, 0, false).unwrap(), 4);

    sessions.close(a).unwrap();
    assert!(sessions.get(a).is_err());
    assert!(sessions.close(a).is_err());
    assert_eq!(sessions.len(), 1);
}
