#![allow(dead_code)]

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use uuid::Uuid;

use hrms_be::database::models::{
    HalfDayPeriod, Holiday, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType, WorkingRuleConfig,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn days(n: i32) -> BigDecimal {
    BigDecimal::from(n)
}

pub fn half() -> BigDecimal {
    "0.5".parse().unwrap()
}

pub fn balance(allocated: i32, used: i32, pending: i32) -> LeaveBalance {
    balance_for(Uuid::new_v4(), LeaveType::Sick, 2025, allocated, used, pending)
}

pub fn balance_for(
    employee_id: Uuid,
    leave_type: LeaveType,
    year: i32,
    allocated: i32,
    used: i32,
    pending: i32,
) -> LeaveBalance {
    let mut balance = LeaveBalance {
        id: Uuid::new_v4(),
        employee_id,
        leave_type,
        year,
        allocated: days(allocated),
        used: days(used),
        pending: days(pending),
        remaining: BigDecimal::zero(),
        carry_forward: BigDecimal::zero(),
        version: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    balance.recompute_remaining();
    balance
}

pub fn standard_rule() -> WorkingRuleConfig {
    WorkingRuleConfig::builtin_default()
}

pub fn custom_rule(
    name: &str,
    effective_from: NaiveDate,
    effective_to: Option<NaiveDate>,
    working_weekdays: Vec<i16>,
    weekend_weekdays: Vec<i16>,
    is_default: bool,
) -> WorkingRuleConfig {
    WorkingRuleConfig {
        id: Uuid::new_v4(),
        name: name.to_string(),
        effective_from,
        effective_to,
        working_weekdays,
        weekend_weekdays,
        is_default,
        created_at: DateTime::<Utc>::MIN_UTC,
    }
}

pub fn holiday_on(date: NaiveDate, name: &str) -> Holiday {
    Holiday {
        id: Uuid::new_v4(),
        date,
        name: name.to_string(),
        is_active: true,
        is_optional: false,
        is_paid: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn approved_leave(
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    leave_type: LeaveType,
) -> LeaveRequest {
    let total = (end - start).num_days() + 1;
    LeaveRequest {
        id: Uuid::new_v4(),
        employee_id,
        leave_type,
        start_date: start,
        end_date: end,
        total_days: BigDecimal::from(total),
        is_half_day: false,
        half_day_period: None,
        status: LeaveStatus::Approved,
        reason: Sentence(3..8).fake(),
        reviewed_by: Some(Uuid::new_v4()),
        reviewed_at: Some(Utc::now()),
        rejection_reason: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn half_day_request(
    employee_id: Uuid,
    date: NaiveDate,
    leave_type: LeaveType,
    period: HalfDayPeriod,
) -> LeaveRequest {
    LeaveRequest {
        id: Uuid::new_v4(),
        employee_id,
        leave_type,
        start_date: date,
        end_date: date,
        total_days: half(),
        is_half_day: true,
        half_day_period: Some(period),
        status: LeaveStatus::Pending,
        reason: Sentence(3..8).fake(),
        reviewed_by: None,
        reviewed_at: None,
        rejection_reason: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
