use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Resolved classification of a single calendar date. Exactly one status per
/// date; the resolver guarantees weekend > holiday > leave > working
/// precedence.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    pub date: NaiveDate,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: i16,
    pub day_name: &'static str,
    pub status: DayStatusKind,
    pub attendance_required: bool,
    pub reason: &'static str,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayStatusKind {
    Weekend,
    Holiday,
    Leave,
    Working,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total_days: u32,
    pub working_days: u32,
    pub weekend_days: u32,
    pub holiday_days: u32,
    pub leave_days: u32,
    pub attendance_required_days: u32,
}

/// Day-count breakdown for a leave range. `total_days` is the inclusive
/// calendar count (0.5 for half-day requests); the partition buckets are only
/// populated when an exclusion flag asks for the walk.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDuration {
    pub total_days: BigDecimal,
    pub working_days: BigDecimal,
    pub weekend_days: BigDecimal,
    pub holiday_days: BigDecimal,
}
