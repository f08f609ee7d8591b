//! Integration test: usable ranges seen by route queries as layers,
//! constraints and reservations combine.

use routewise_core::{AmountMsat, OracleConfig};
use routewise_graph::MemoryGraph;
use routewise_integration_tests::*;
use routewise_oracle::{
    CapacityTable, GetRoutes, LayerStore, OracleError, PathFinder, PathSearch,
    ReservationLedger, RouteOracle, RouteQueryContext,
};

// =========================================================================
// Local channel lifecycle in layer "test"
// =========================================================================

#[test]
fn test_local_channel_reserve_then_constrain() {
    let mut oracle = oracle();
    // node(1) < node(4), so the channel runs in direction 0.
    oracle
        .create_channel(&local_channel("test", 100, node(1), node(4), 100_000_000))
        .unwrap();

    assert_eq!(
        usable_range(&mut oracle, &["test"], 100, 0),
        (AmountMsat(0), AmountMsat(100_000_000))
    );

    oracle.reserve(&[hop(100, 0, 40_000_000)]).unwrap();
    assert_eq!(
        usable_range(&mut oracle, &["test"], 100, 0),
        (AmountMsat(0), AmountMsat(60_000_000))
    );

    oracle.inform_channel(&max_bound("test", 100, 0, 30_000_000)).unwrap();
    assert_eq!(
        usable_range(&mut oracle, &["test"], 100, 0),
        (AmountMsat(0), AmountMsat(0))
    );
}

#[test]
fn test_local_channel_routes_only_within_its_layer() {
    let mut oracle = oracle();
    oracle
        .create_channel(&local_channel("test", 100, node(1), node(4), 100_000_000))
        .unwrap();

    let req = GetRoutes {
        source: node(1),
        destination: node(4),
        amount_msat: AmountMsat(50_000_000),
        layers: layers(&["test"]),
    };
    let routes = oracle.get_routes(&req).unwrap();
    assert_eq!(routes[0].path.len(), 1);
    assert_eq!(routes[0].path[0].short_channel_id, scid(100));
    assert_eq!(routes[0].amount_delivered(), AmountMsat(50_000_000));

    let without = GetRoutes {
        layers: Vec::new(),
        ..req
    };
    assert!(matches!(
        oracle.get_routes(&without),
        Err(OracleError::NoRoute { .. })
    ));
    // The layer's channel was detached again after each query.
    assert!(oracle.graph().find_channel(&scid(100)).is_none());
}

// =========================================================================
// Layer composition
// =========================================================================

#[test]
fn test_layers_intersect() {
    let mut oracle = oracle();
    oracle.inform_channel(&max_bound("a", 1, 0, 500)).unwrap();
    oracle.inform_channel(&max_bound("b", 1, 0, 300)).unwrap();

    assert_eq!(usable_range(&mut oracle, &["a", "b"], 1, 0).1, AmountMsat(300));
    assert_eq!(usable_range(&mut oracle, &["b", "a"], 1, 0).1, AmountMsat(300));
    assert_eq!(usable_range(&mut oracle, &["a"], 1, 0).1, AmountMsat(500));
    // Without either layer the public capacity applies.
    assert_eq!(
        usable_range(&mut oracle, &[], 1, 0).1,
        AmountMsat(BASE_CAPACITY_SAT * 1_000)
    );
}

#[test]
fn test_unknown_layers_are_empty() {
    let mut oracle = oracle();
    oracle.inform_channel(&max_bound("a", 1, 0, 500)).unwrap();

    assert_eq!(
        usable_range(&mut oracle, &["a", "nonexistent"], 1, 0).1,
        AmountMsat(500)
    );
    assert!(oracle.layers().find("nonexistent").is_none());
}

#[test]
fn test_min_bound_is_reported() {
    let mut oracle = oracle();
    oracle.inform_channel(&min_bound("hints", 2, 1, 250_000)).unwrap();

    let (min, max) = usable_range(&mut oracle, &["hints"], 2, 1);
    assert_eq!(min, AmountMsat(250_000));
    assert_eq!(max, AmountMsat(BASE_CAPACITY_SAT * 1_000));
    // The other direction is unaffected.
    assert_eq!(usable_range(&mut oracle, &["hints"], 2, 0).0, AmountMsat(0));
}

// =========================================================================
// Reservations only ever shrink the usable range
// =========================================================================

#[test]
fn test_reservation_is_monotonic() {
    let mut oracle = oracle();
    oracle.inform_channel(&min_bound("l", 1, 0, 300_000_000)).unwrap();

    let mut previous = usable_range(&mut oracle, &["l"], 1, 0);
    for step in [1u64, 100_000_000, 400_000_000, 700_000_000, 5_000_000_000] {
        oracle.reserve(&[hop(1, 0, step)]).unwrap();
        let current = usable_range(&mut oracle, &["l"], 1, 0);
        assert!(current.1 <= previous.1, "max grew after reserving {step}");
        assert!(current.0 <= previous.0, "min grew after reserving {step}");
        previous = current;
    }
    assert_eq!(previous, (AmountMsat(0), AmountMsat(0)));
}

#[test]
fn test_reserving_on_inexact_capacity_never_raises_max() {
    // 1,000,000 sat does not fit the capacity cache exactly.
    let mut graph = MemoryGraph::new();
    add_channel_with_capacity(&mut graph, 1, node(1), node(2), 1_000_000);
    let mut oracle = RouteOracle::new(Box::new(graph), OracleConfig::default());

    let before = usable_range(&mut oracle, &[], 1, 0);
    oracle.reserve(&[hop(1, 0, 1)]).unwrap();
    let after = usable_range(&mut oracle, &[], 1, 0);
    assert!(after.1 <= before.1, "max rose from {} to {}", before.1, after.1);
    assert_eq!(after.1, AmountMsat(before.1 .0 - 1));

    // A layer bound on the other direction also forces the slow path.
    oracle.inform_channel(&min_bound("l", 1, 1, 5)).unwrap();
    assert_eq!(usable_range(&mut oracle, &["l"], 1, 1).1, before.1);
}

#[test]
fn test_reservation_on_unconstrained_public_channel() {
    let mut oracle = oracle();
    oracle.reserve(&[hop(2, 0, 1_000)]).unwrap();
    assert_eq!(
        usable_range(&mut oracle, &[], 2, 0),
        (AmountMsat(0), AmountMsat(BASE_CAPACITY_SAT * 1_000 - 1_000))
    );
    // Only the reserved direction shrinks.
    assert_eq!(
        usable_range(&mut oracle, &[], 2, 1).1,
        AmountMsat(BASE_CAPACITY_SAT * 1_000)
    );
}

// =========================================================================
// Disabled nodes
// =========================================================================

#[test]
fn test_disabled_node_excludes_channels_added_later() {
    let mut graph = base_graph();
    let mut capacities = CapacityTable::build(&graph);
    let mut store = LayerStore::new();
    store.find_or_create("block").add_disabled_node(node(3));
    let reserves = ReservationLedger::new();

    // Gossip brings in a new channel after the node was disabled.
    add_public_channel(&mut graph, 7, node(3), node(4));

    let finder = PathFinder::with_defaults();
    {
        let ctx = RouteQueryContext::new(
            &mut graph,
            &mut capacities,
            &store,
            &layers(&["block"]),
            &reserves,
        )
        .unwrap();
        let channel = ctx.graph().find_channel(&scid(7)).unwrap();
        assert!(channel.half.iter().flatten().all(|h| !h.enabled));
        assert!(ctx.is_disabled(&node(3)));
        assert!(finder
            .find_routes(&ctx, &node(2), &node(4), AmountMsat(1_000))
            .is_err());
    }

    // Without the layer the same channel routes normally.
    let ctx = RouteQueryContext::new(&mut graph, &mut capacities, &store, &[], &reserves).unwrap();
    let routes = finder
        .find_routes(&ctx, &node(2), &node(4), AmountMsat(1_000))
        .unwrap();
    assert_eq!(routes[0].path.len(), 2);
}

#[test]
fn test_query_context_detaches_on_drop() {
    let mut graph: MemoryGraph = base_graph();
    let mut capacities = CapacityTable::build(&graph);
    let mut store = LayerStore::new();
    store.find_or_create("block").add_disabled_node(node(2));
    let reserves = ReservationLedger::new();

    {
        let ctx = RouteQueryContext::new(
            &mut graph,
            &mut capacities,
            &store,
            &layers(&["block"]),
            &reserves,
        )
        .unwrap();
        assert!(ctx.local_mods().is_disabled(&node(2)));
    }
    assert!(!graph.has_local_mods());
    let channel = routewise_graph::GraphView::find_channel(&graph, &scid(1)).unwrap();
    assert!(channel.half.iter().flatten().all(|h| h.enabled));
}
