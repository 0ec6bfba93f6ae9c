use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: BigDecimal,
    pub is_half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
    pub status: LeaveStatus,
    pub reason: String,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Label written to the attendance record when this request is approved.
    /// Derived from the leave type and half-day fields only, never from the
    /// free-text reason, so attendance trails stay uniform.
    pub fn attendance_reason(&self) -> String {
        let label = self.leave_type.label();
        match (self.is_half_day, self.half_day_period) {
            (true, Some(period)) => format!("{} - Half day ({} half)", label, period),
            (true, None) => format!("{} - Half day", label),
            (false, _) => label.to_string(),
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveType {
        Sick => "sick",
        Annual => "annual",
        Personal => "personal",
        Maternity => "maternity",
        Paternity => "paternity",
        Emergency => "emergency",
        Unpaid => "unpaid",
    }
}

impl LeaveType {
    pub fn label(&self) -> &'static str {
        match self {
            LeaveType::Sick => "Sick leave",
            LeaveType::Annual => "Annual leave",
            LeaveType::Personal => "Personal leave",
            LeaveType::Maternity => "Maternity leave",
            LeaveType::Paternity => "Paternity leave",
            LeaveType::Emergency => "Emergency leave",
            LeaveType::Unpaid => "Unpaid leave",
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum HalfDayPeriod {
        Morning => "morning",
        Afternoon => "afternoon",
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestInput {
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionInput {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapCheck {
    pub has_overlap: bool,
    pub conflicting_request: Option<LeaveRequest>,
}

/// Dry-run result for a candidate application: what would be counted,
/// whether it collides, and whether the balance covers it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveValidationReport {
    pub duration: super::calendar::LeaveDuration,
    pub overlap: OverlapCheck,
    pub balance: super::balance::BalanceValidation,
}
