use bigdecimal::{BigDecimal, Zero};
use pretty_assertions::assert_eq;

use hrms_be::database::models::{
    BalanceOperation, BalanceValidation, LeaveBalance, UtilizationRow,
};
use hrms_be::error::AppError;

mod common;
use common::{balance, days, half};

fn assert_invariant(balance: &LeaveBalance) {
    let expected =
        &balance.allocated + &balance.carry_forward - &balance.used - &balance.pending;
    assert_eq!(balance.remaining, expected, "remaining must equal the formula");
    assert!(balance.used >= BigDecimal::zero());
    assert!(balance.pending >= BigDecimal::zero());
    assert!(balance.remaining >= BigDecimal::zero());
}

#[test]
fn submit_then_approve_walks_the_ledger_once() {
    // Employee with sick balance {allocated: 10, used: 2, remaining: 8}.
    let mut b = balance(10, 2, 0);
    assert_eq!(b.remaining, days(8));
    assert_invariant(&b);

    // Submitting a 3-day request reserves the days.
    b.apply_reserve(&days(3)).unwrap();
    assert_eq!(b.pending, days(3));
    assert_eq!(b.remaining, days(5));
    assert_invariant(&b);

    // Approval commits without touching remaining.
    let report = b.apply_commit(&days(3));
    assert!(report.is_clean());
    assert_eq!(b.used, days(5));
    assert_eq!(b.pending, days(0));
    assert_eq!(b.remaining, days(5));
    assert_invariant(&b);
}

#[test]
fn oversized_submission_is_rejected_before_any_mutation() {
    let mut b = balance(10, 2, 0);

    let validation = b.validate_requested(&days(9));
    assert!(!validation.is_valid);
    assert_eq!(validation.available, days(8));
    assert_eq!(validation.shortfall, days(1));

    let err = b.apply_reserve(&days(9)).unwrap_err();
    assert!(matches!(err, AppError::InsufficientBalance { .. }));
    assert_eq!(b.pending, days(0));
    assert_eq!(b.remaining, days(8));
    assert_invariant(&b);
}

#[test]
fn rejecting_a_pending_request_returns_the_reserved_days() {
    let mut b = balance(10, 2, 4);
    let remaining_before = b.remaining.clone();

    b.apply_release(&days(4));
    assert_eq!(b.pending, days(0));
    assert_eq!(b.remaining, remaining_before + days(4));
    assert_invariant(&b);
}

#[test]
fn reserve_then_release_is_a_round_trip() {
    let mut b = balance(15, 5, 2);
    let before = (b.pending.clone(), b.remaining.clone());

    b.apply_reserve(&days(6)).unwrap();
    b.apply_release(&days(6));

    assert_eq!((b.pending.clone(), b.remaining.clone()), before);
    assert_invariant(&b);
}

#[test]
fn half_day_request_moves_exactly_half_a_day() {
    let mut b = balance(10, 0, 0);

    b.apply_reserve(&half()).unwrap();
    assert_eq!(b.pending, half());
    assert_eq!(b.remaining, days(10) - half());

    b.apply_commit(&half());
    assert_eq!(b.used, half());
    assert_eq!(b.pending, days(0));
    assert_eq!(b.remaining, days(10) - half());
    assert_invariant(&b);
}

#[test]
fn invariant_survives_a_mixed_operation_sequence() {
    let mut b = balance(20, 0, 0);
    b.carry_forward = days(3);
    b.recompute_remaining();
    assert_invariant(&b);

    b.apply_reserve(&days(5)).unwrap();
    assert_invariant(&b);

    b.apply_adjustment(BalanceOperation::AddAllocated, &days(2));
    assert_invariant(&b);

    b.apply_commit(&days(5));
    assert_invariant(&b);

    b.apply_adjustment(BalanceOperation::SubtractUsed, &days(1));
    assert_invariant(&b);

    b.apply_assignment(&days(25), &days(3));
    assert_invariant(&b);

    assert_eq!(b.used, days(4));
    assert_eq!(b.remaining, days(24));
}

#[test]
fn double_release_clamps_instead_of_going_negative() {
    let mut b = balance(10, 0, 3);

    b.apply_release(&days(3));
    let report = b.apply_release(&days(3));

    assert!(!report.is_clean());
    assert!(report.fields().contains(&"pending"));
    assert_eq!(b.pending, days(0));
    assert_invariant(&b);
}

#[test]
fn missing_balance_row_validates_as_full_shortfall() {
    let validation = BalanceValidation::missing(days(3));
    assert!(!validation.is_valid);
    assert_eq!(validation.available, days(0));
    assert_eq!(validation.shortfall, days(3));
}

#[test]
fn utilization_report_reflects_entitlement_and_usage() {
    let mut b = balance(10, 5, 0);
    b.carry_forward = days(10);
    b.recompute_remaining();

    let row = UtilizationRow::from_balance(&b);
    assert_eq!(row.utilization_percent, "25.0".parse::<BigDecimal>().unwrap());
    assert_eq!(row.remaining, days(15));

    let untouched = balance(0, 0, 0);
    let row = UtilizationRow::from_balance(&untouched);
    assert_eq!(row.utilization_percent, days(0));
}
