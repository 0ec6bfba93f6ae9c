use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::leave::LeaveType;
use super::macros::string_enum;
use crate::error::AppError;

/// Per-employee, per-type, per-year leave bookkeeping. Outside an in-flight
/// mutation the row always satisfies
/// `remaining = allocated + carry_forward - used - pending`, with every
/// quantity non-negative. `version` backs the optimistic write check; callers
/// never read-mutate-save rows themselves.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub year: i32,
    pub allocated: BigDecimal,
    pub used: BigDecimal,
    pub pending: BigDecimal,
    pub remaining: BigDecimal,
    pub carry_forward: BigDecimal,
    #[serde(skip)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields that had to be clamped to zero during a transition. A non-clean
/// report is a data-consistency signal the caller must log loudly; the
/// arithmetic itself never goes negative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClampReport {
    fields: Vec<&'static str>,
}

impl ClampReport {
    fn note(&mut self, field: &'static str) {
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }

    fn absorb(&mut self, other: ClampReport) {
        for field in other.fields {
            self.note(field);
        }
    }

    pub fn is_clean(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }
}

impl LeaveBalance {
    /// The single recomputation used by every mutation path:
    /// `remaining = allocated + carry_forward - used - pending`, clamping
    /// would-be-negative quantities to zero.
    pub fn recompute_remaining(&mut self) -> ClampReport {
        let mut report = ClampReport::default();
        let zero = BigDecimal::zero();

        for (field, value) in [
            ("allocated", &mut self.allocated),
            ("used", &mut self.used),
            ("pending", &mut self.pending),
        ] {
            if *value < zero {
                report.note(field);
                *value = zero.clone();
            }
        }

        let remaining = &self.allocated + &self.carry_forward - &self.used - &self.pending;
        if remaining < zero {
            report.note("remaining");
            self.remaining = zero;
        } else {
            self.remaining = remaining;
        }
        report
    }

    /// Submission: move days into `pending`. Fails before mutating anything
    /// if `remaining` does not cover the request.
    pub fn apply_reserve(&mut self, days: &BigDecimal) -> Result<ClampReport, AppError> {
        if self.remaining < *days {
            return Err(AppError::insufficient_balance(
                self.remaining.clone(),
                days.clone(),
            ));
        }
        self.pending = &self.pending + days;
        Ok(self.recompute_remaining())
    }

    /// Approval: `pending -= days` (clamped), `used += days`. On a consistent
    /// row the recompute leaves `remaining` exactly where the reservation put
    /// it; approval never debits twice.
    pub fn apply_commit(&mut self, days: &BigDecimal) -> ClampReport {
        let mut report = ClampReport::default();
        let new_pending = &self.pending - days;
        if new_pending < BigDecimal::zero() {
            report.note("pending");
            self.pending = BigDecimal::zero();
        } else {
            self.pending = new_pending;
        }
        self.used = &self.used + days;
        report.absorb(self.recompute_remaining());
        report
    }

    /// Rejection or cancellation of a pending request: hand the reserved days
    /// back.
    pub fn apply_release(&mut self, days: &BigDecimal) -> ClampReport {
        let mut report = ClampReport::default();
        let new_pending = &self.pending - days;
        if new_pending < BigDecimal::zero() {
            report.note("pending");
            self.pending = BigDecimal::zero();
        } else {
            self.pending = new_pending;
        }
        report.absorb(self.recompute_remaining());
        report
    }

    /// Administrative correction. `remaining` is always recomputed from the
    /// invariant formula, never adjusted incrementally.
    pub fn apply_adjustment(&mut self, operation: BalanceOperation, days: &BigDecimal) -> ClampReport {
        match operation {
            BalanceOperation::AddAllocated => self.allocated = &self.allocated + days,
            BalanceOperation::SubtractAllocated => self.allocated = &self.allocated - days,
            BalanceOperation::AddUsed => self.used = &self.used + days,
            BalanceOperation::SubtractUsed => self.used = &self.used - days,
            BalanceOperation::SetAllocated => self.allocated = days.clone(),
            BalanceOperation::SetUsed => self.used = days.clone(),
        }
        self.recompute_remaining()
    }

    /// Yearly assignment upsert: replaces the entitlement, preserves
    /// `used`/`pending` accumulated so far.
    pub fn apply_assignment(&mut self, allocated: &BigDecimal, carry_forward: &BigDecimal) -> ClampReport {
        self.allocated = allocated.clone();
        self.carry_forward = carry_forward.clone();
        self.recompute_remaining()
    }

    pub fn validate_requested(&self, requested: &BigDecimal) -> BalanceValidation {
        BalanceValidation::from_available(self.remaining.clone(), requested.clone())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceValidation {
    pub is_valid: bool,
    pub available: BigDecimal,
    pub requested: BigDecimal,
    pub shortfall: BigDecimal,
}

impl BalanceValidation {
    pub fn from_available(available: BigDecimal, requested: BigDecimal) -> Self {
        let is_valid = available >= requested;
        let shortfall = if is_valid {
            BigDecimal::zero()
        } else {
            &requested - &available
        };
        BalanceValidation {
            is_valid,
            available,
            requested,
            shortfall,
        }
    }

    /// No balance row assigned at all: invalid, nothing available.
    pub fn missing(requested: BigDecimal) -> Self {
        Self::from_available(BigDecimal::zero(), requested)
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum BalanceChangeType {
        Reserve => "reserve",
        Commit => "commit",
        Release => "release",
        Adjustment => "adjustment",
        Assignment => "assignment",
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BalanceOperation {
    AddAllocated,
    SubtractAllocated,
    AddUsed,
    SubtractUsed,
    SetAllocated,
    SetUsed,
}

impl std::fmt::Display for BalanceOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BalanceOperation::AddAllocated => "add_allocated",
            BalanceOperation::SubtractAllocated => "subtract_allocated",
            BalanceOperation::AddUsed => "add_used",
            BalanceOperation::SubtractUsed => "subtract_used",
            BalanceOperation::SetAllocated => "set_allocated",
            BalanceOperation::SetUsed => "set_used",
        };
        f.write_str(s)
    }
}

/// Append-only record of every ledger mutation, written in the same
/// transaction as the balance row it describes.
#[derive(Debug, Clone)]
pub struct NewBalanceHistory {
    pub balance_id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub year: i32,
    pub change_type: BalanceChangeType,
    pub days_changed: BigDecimal,
    pub previous_remaining: BigDecimal,
    pub new_remaining: BigDecimal,
    pub description: Option<String>,
    pub related_request_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalanceHistory {
    pub id: i64,
    pub balance_id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub year: i32,
    pub change_type: BalanceChangeType,
    pub days_changed: BigDecimal,
    pub previous_remaining: BigDecimal,
    pub new_remaining: BigDecimal,
    pub description: Option<String>,
    pub related_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAdjustmentInput {
    pub operation: BalanceOperation,
    pub days: BigDecimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationInput {
    pub allocated: BigDecimal,
    #[serde(default)]
    pub carry_forward: BigDecimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAssignmentInput {
    pub employee_id: Uuid,
    pub year: i32,
    pub allocations: HashMap<LeaveType, AllocationInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationRow {
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub year: i32,
    pub allocated: BigDecimal,
    pub carry_forward: BigDecimal,
    pub used: BigDecimal,
    pub pending: BigDecimal,
    pub remaining: BigDecimal,
    pub utilization_percent: BigDecimal,
}

impl UtilizationRow {
    pub fn from_balance(balance: &LeaveBalance) -> Self {
        let entitled = &balance.allocated + &balance.carry_forward;
        let utilization_percent = if entitled.is_zero() {
            BigDecimal::zero()
        } else {
            (&balance.used * BigDecimal::from(100) / entitled)
                .with_scale_round(1, bigdecimal::RoundingMode::HalfUp)
        };
        UtilizationRow {
            employee_id: balance.employee_id,
            leave_type: balance.leave_type,
            year: balance.year,
            allocated: balance.allocated.clone(),
            carry_forward: balance.carry_forward.clone(),
            used: balance.used.clone(),
            pending: balance.pending.clone(),
            remaining: balance.remaining.clone(),
            utilization_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn days(n: i32) -> BigDecimal {
        BigDecimal::from(n)
    }

    fn half() -> BigDecimal {
        "0.5".parse().unwrap()
    }

    fn balance(allocated: i32, used: i32, pending: i32) -> LeaveBalance {
        let mut b = LeaveBalance {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            leave_type: LeaveType::Sick,
            year: 2025,
            allocated: days(allocated),
            used: days(used),
            pending: days(pending),
            remaining: BigDecimal::zero(),
            carry_forward: BigDecimal::zero(),
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        b.recompute_remaining();
        b
    }

    #[test]
    fn reserve_moves_days_into_pending() {
        let mut b = balance(10, 2, 0);
        assert_eq!(b.remaining, days(8));

        let report = b.apply_reserve(&days(3)).unwrap();
        assert!(report.is_clean());
        assert_eq!(b.pending, days(3));
        assert_eq!(b.remaining, days(5));
    }

    #[test]
    fn reserve_rejects_shortfall_without_mutating() {
        let mut b = balance(10, 2, 0);
        let err = b.apply_reserve(&days(9)).unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance { .. }));
        assert_eq!(b.pending, days(0));
        assert_eq!(b.remaining, days(8));
    }

    #[test]
    fn commit_leaves_remaining_untouched() {
        let mut b = balance(10, 2, 0);
        b.apply_reserve(&days(3)).unwrap();

        let report = b.apply_commit(&days(3));
        assert!(report.is_clean());
        assert_eq!(b.used, days(5));
        assert_eq!(b.pending, days(0));
        assert_eq!(b.remaining, days(5));
    }

    #[test]
    fn release_restores_pre_reservation_state() {
        let mut b = balance(12, 4, 0);
        let before = (b.pending.clone(), b.remaining.clone());

        b.apply_reserve(&days(4)).unwrap();
        let report = b.apply_release(&days(4));

        assert!(report.is_clean());
        assert_eq!((b.pending, b.remaining), before);
    }

    #[test]
    fn release_of_rejected_request_returns_days() {
        let mut b = balance(10, 2, 4);
        assert_eq!(b.remaining, days(4));

        b.apply_release(&days(4));
        assert_eq!(b.pending, days(0));
        assert_eq!(b.remaining, days(8));
    }

    #[test]
    fn commit_clamps_pending_and_reports_it() {
        let mut b = balance(10, 0, 1);
        let report = b.apply_commit(&days(3));
        assert!(!report.is_clean());
        assert!(report.fields().contains(&"pending"));
        assert_eq!(b.pending, days(0));
        assert_eq!(b.used, days(3));
    }

    #[test]
    fn half_day_amounts_flow_through() {
        let mut b = balance(10, 0, 0);
        b.apply_reserve(&half()).unwrap();
        assert_eq!(b.remaining, "9.5".parse::<BigDecimal>().unwrap());

        b.apply_commit(&half());
        assert_eq!(b.used, half());
        assert_eq!(b.remaining, "9.5".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn carry_forward_counts_toward_remaining() {
        let mut b = balance(10, 2, 0);
        b.carry_forward = days(5);
        b.recompute_remaining();
        assert_eq!(b.remaining, days(13));
    }

    #[test]
    fn adjustment_recomputes_from_formula() {
        let mut b = balance(10, 2, 3);
        assert_eq!(b.remaining, days(5));

        b.apply_adjustment(BalanceOperation::AddAllocated, &days(2));
        assert_eq!(b.remaining, days(7));

        b.apply_adjustment(BalanceOperation::SetUsed, &days(0));
        assert_eq!(b.remaining, days(9));
    }

    #[test]
    fn subtract_beyond_zero_clamps_loudly() {
        let mut b = balance(10, 1, 0);
        let report = b.apply_adjustment(BalanceOperation::SubtractUsed, &days(4));
        assert!(report.fields().contains(&"used"));
        assert_eq!(b.used, days(0));
        assert_eq!(b.remaining, days(10));
    }

    #[test]
    fn assignment_preserves_used_and_pending() {
        let mut b = balance(10, 3, 2);
        b.apply_assignment(&days(15), &days(1));
        assert_eq!(b.used, days(3));
        assert_eq!(b.pending, days(2));
        assert_eq!(b.remaining, days(11));
    }

    #[test]
    fn validation_reports_shortfall() {
        let b = balance(10, 2, 0);
        let v = b.validate_requested(&days(9));
        assert!(!v.is_valid);
        assert_eq!(v.available, days(8));
        assert_eq!(v.shortfall, days(1));

        let missing = BalanceValidation::missing(days(3));
        assert!(!missing.is_valid);
        assert_eq!(missing.shortfall, days(3));
    }

    #[test]
    fn utilization_percent_rounds_half_up() {
        let mut b = balance(12, 4, 0);
        b.recompute_remaining();
        let row = UtilizationRow::from_balance(&b);
        assert_eq!(
            row.utilization_percent,
            "33.3".parse::<BigDecimal>().unwrap()
        );
    }
}
