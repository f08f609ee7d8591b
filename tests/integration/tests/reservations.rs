//! Integration test: the reservation ledger through the oracle and on its
//! own.

use routewise_core::AmountMsat;
use routewise_integration_tests::*;
use routewise_oracle::{OracleError, Reservation, ReservationLedger};

#[test]
fn test_reserve_unreserve_round_trip_restores_ledger() {
    let ledger = ReservationLedger::new();
    ledger.add(&[hop(1, 0, 700)]);
    let before = (ledger.find(&scidd(1, 0)), ledger.find(&scidd(2, 1)));

    let path = [hop(1, 0, 1_000), hop(2, 1, 990)];
    assert_eq!(ledger.add(&path), 2);
    assert_eq!(
        ledger.find(&scidd(1, 0)),
        Some(Reservation {
            amount: AmountMsat(1_700),
            num_htlcs: 2
        })
    );
    assert_eq!(ledger.remove(&path), 2);

    assert_eq!(
        (ledger.find(&scidd(1, 0)), ledger.find(&scidd(2, 1))),
        before
    );
    assert_eq!(before.1, None);
}

#[test]
fn test_partial_reserve_keeps_prefix() {
    let ledger = ReservationLedger::new();
    ledger.add(&[hop(2, 0, u64::MAX - 10)]);

    let path = [hop(1, 0, 100), hop(2, 0, 100), hop(3, 0, 100)];
    assert_eq!(ledger.add(&path), 1);

    // Hop 0 took effect, hops 1.. did not.
    assert_eq!(ledger.find(&scidd(1, 0)).unwrap().amount, AmountMsat(100));
    assert_eq!(
        ledger.find(&scidd(2, 0)).unwrap().amount,
        AmountMsat(u64::MAX - 10)
    );
    assert!(ledger.find(&scidd(3, 0)).is_none());
}

#[test]
fn test_partial_unreserve_keeps_prefix() {
    let ledger = ReservationLedger::new();
    ledger.add(&[hop(1, 0, 100), hop(2, 0, 50)]);

    let path = [hop(1, 0, 100), hop(2, 0, 80), hop(3, 0, 1)];
    assert_eq!(ledger.remove(&path), 1);
    assert!(ledger.find(&scidd(1, 0)).is_none());
    assert_eq!(ledger.find(&scidd(2, 0)).unwrap().amount, AmountMsat(50));
}

#[test]
fn test_oracle_reports_failing_hop() {
    let oracle = oracle();
    oracle.reserve(&[hop(2, 1, u64::MAX)]).unwrap();

    let err = oracle
        .reserve(&[hop(1, 0, 5), hop(2, 1, 5)])
        .unwrap_err();
    match err {
        OracleError::ReserveOverflow {
            index,
            scidd: failed,
            reserved,
            ..
        } => {
            assert_eq!(index, 1);
            assert_eq!(failed, scidd(2, 1));
            assert_eq!(reserved, Some(AmountMsat(u64::MAX)));
        }
        other => panic!("unexpected error: {other}"),
    }

    // The caller compensates for the applied prefix.
    oracle.unreserve(&[hop(1, 0, 5)]).unwrap();
    assert!(oracle.reserves().find(&scidd(1, 0)).is_none());
}

#[test]
fn test_oracle_unreserve_unknown_is_underflow() {
    let oracle = oracle();
    let err = oracle.unreserve(&[hop(1, 0, 5)]).unwrap_err();
    assert!(matches!(
        err,
        OracleError::ReserveUnderflow {
            index: 0,
            num_htlcs: 0,
            reserved: None,
            ..
        }
    ));
    assert!(err.is_bad_input());
}

#[test]
fn test_status_tracks_reservations() {
    let oracle = oracle();
    oracle
        .reserve(&[hop(1, 0, 1_000), hop(2, 0, 2_000)])
        .unwrap();
    let status = oracle.status();
    assert_eq!(status.reservations, 2);
    assert_eq!(status.reserved_msat, AmountMsat(3_000));

    oracle
        .unreserve(&[hop(1, 0, 1_000), hop(2, 0, 2_000)])
        .unwrap();
    assert_eq!(oracle.status().reservations, 0);
}
