//! Integration test: administrative layer operations.

use routewise_core::{AmountMsat, ConstraintKind};
use routewise_integration_tests::*;
use routewise_oracle::{Layer, OracleError};

#[test]
fn test_constraint_last_write_wins() {
    let mut layer = Layer::new("l");
    let key = scidd(1, 0);

    layer.update_constraint(key, ConstraintKind::Min, 200, AmountMsat(10));
    layer.update_constraint(key, ConstraintKind::Min, 100, AmountMsat(20));
    let found = layer.find_constraint(&key, ConstraintKind::Min).unwrap();
    assert_eq!((found.timestamp, found.limit), (100, AmountMsat(20)));

    layer.update_constraint(key, ConstraintKind::Min, 300, AmountMsat(5));
    let found = layer.find_constraint(&key, ConstraintKind::Min).unwrap();
    assert_eq!((found.timestamp, found.limit), (300, AmountMsat(5)));

    // MIN and MAX on the same key are independent.
    assert!(layer.find_constraint(&key, ConstraintKind::Max).is_none());
}

#[test]
fn test_trim_removes_exactly_older_entries() {
    let mut layer = Layer::new("l");
    layer.update_constraint(scidd(1, 0), ConstraintKind::Max, 99, AmountMsat(1));
    layer.update_constraint(scidd(1, 1), ConstraintKind::Max, 100, AmountMsat(2));
    layer.update_constraint(scidd(2, 0), ConstraintKind::Min, 101, AmountMsat(3));

    assert_eq!(layer.trim_constraints(100), 1);
    assert!(layer.find_constraint(&scidd(1, 0), ConstraintKind::Max).is_none());
    assert!(layer.find_constraint(&scidd(1, 1), ConstraintKind::Max).is_some());
    assert!(layer.find_constraint(&scidd(2, 0), ConstraintKind::Min).is_some());

    assert_eq!(layer.trim_constraints(100), 0);
    assert_eq!(layer.constraints().len(), 2);
}

#[test]
fn test_age_through_oracle() {
    let mut oracle = oracle();
    oracle.inform_channel(&max_bound("l", 1, 0, 500)).unwrap();
    oracle.inform_channel(&max_bound("l", 2, 0, 500)).unwrap();

    let result = oracle.age("l", 0).unwrap();
    assert_eq!(result.num_removed, 0);

    let result = oracle.age("l", u64::MAX).unwrap();
    assert_eq!((result.layer.as_str(), result.num_removed), ("l", 2));
    assert_eq!(oracle.age("l", u64::MAX).unwrap().num_removed, 0);
}

#[test]
fn test_age_unknown_layer_is_an_error() {
    let mut oracle = oracle();
    let err = oracle.age("missing", 0).unwrap_err();
    assert!(matches!(err, OracleError::UnknownLayer(ref name) if name == "missing"));
    assert!(err.is_not_found());
}

#[test]
fn test_conflicting_local_channel_rejected() {
    let mut oracle = oracle();
    oracle
        .create_channel(&local_channel("l", 50, node(1), node(4), 1_000))
        .unwrap();

    // Same scid, different endpoints.
    let err = oracle
        .create_channel(&local_channel("l", 50, node(1), node(5), 1_000))
        .unwrap_err();
    assert!(matches!(err, OracleError::ChannelConflict { .. }));

    // The same channel in a different layer is independent.
    oracle
        .create_channel(&local_channel("other", 50, node(1), node(5), 1_000))
        .unwrap();
}

#[test]
fn test_self_loop_rejected() {
    let mut oracle = oracle();
    let err = oracle
        .create_channel(&local_channel("l", 50, node(1), node(1), 1_000))
        .unwrap_err();
    assert!(err.is_bad_input());
}

#[test]
fn test_list_layers_reflects_admin_calls() {
    let mut oracle = oracle();
    oracle
        .create_channel(&local_channel("b", 50, node(1), node(4), 1_000))
        .unwrap();
    oracle.disable_node("a", node(3)).unwrap();
    oracle.inform_channel(&min_bound("a", 1, 1, 10)).unwrap();

    let all = oracle.list_layers(None);
    let names: Vec<&str> = all.iter().map(|l| l.layer.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(all[0].disabled_nodes, vec![node(3)]);
    assert_eq!(all[0].num_constraints, 1);
    // The local channel seeded a MAX bound at its capacity.
    assert_eq!(all[1].num_local_channels, 1);
    assert_eq!(all[1].constraints[0].kind, ConstraintKind::Max);
    assert_eq!(all[1].constraints[0].limit, AmountMsat(1_000));

    let only = oracle.list_layers(Some("b"));
    assert_eq!(only.len(), 1);
    assert!(oracle.list_layers(Some("zzz")).is_empty());

    let json = serde_json::to_value(&only[0]).unwrap();
    assert_eq!(json["layer"], "b");
    assert!(json["local_channels"][0]["short_channel_id"].is_string());
}
