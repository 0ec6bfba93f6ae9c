use std::collections::HashSet;

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;

use super::date_rules::{select_active_rule, DateRuleResolver};
use crate::database::models::LeaveDuration;
use crate::database::repositories::HolidayRepository;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default)]
pub struct DurationOptions {
    pub is_half_day: bool,
    pub exclude_weekends: bool,
    pub exclude_holidays: bool,
}

impl DurationOptions {
    /// Plain inclusive calendar count, the basis for ledger reservations.
    pub fn calendar(is_half_day: bool) -> Self {
        DurationOptions {
            is_half_day,
            ..Default::default()
        }
    }

    /// Full partition into working/weekend/holiday buckets.
    pub fn partitioned(is_half_day: bool) -> Self {
        DurationOptions {
            is_half_day,
            exclude_weekends: true,
            exclude_holidays: true,
        }
    }
}

/// Turns a date range into day counts. Classification uses only the
/// weekend/holiday checks, never the full day-status resolver, so no
/// employee context is required here.
#[derive(Clone)]
pub struct LeaveDurationCalculator {
    date_rules: DateRuleResolver,
    holiday_repository: HolidayRepository,
}

impl LeaveDurationCalculator {
    pub fn new(date_rules: DateRuleResolver, holiday_repository: HolidayRepository) -> Self {
        Self {
            date_rules,
            holiday_repository,
        }
    }

    pub async fn duration(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        options: DurationOptions,
    ) -> Result<LeaveDuration, AppError> {
        if start > end {
            return Err(AppError::InvalidRange { start, end });
        }

        let rules = self.date_rules.rule_set().await?;
        let holidays: HashSet<NaiveDate> = if options.exclude_holidays {
            self.holiday_repository
                .list_active_between(start, end)
                .await?
                .into_iter()
                .map(|h| h.date)
                .collect()
        } else {
            HashSet::new()
        };

        calculate(
            start,
            end,
            options,
            |date| select_active_rule(&rules, date).is_weekend_date(date),
            &holidays,
        )
    }
}

pub fn half_day_amount() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(2)
}

/// Pure day-count core. `is_weekend` captures the rule configuration;
/// `holidays` holds the active holiday dates inside the range (only
/// consulted when `exclude_holidays` is set).
pub fn calculate(
    start: NaiveDate,
    end: NaiveDate,
    options: DurationOptions,
    is_weekend: impl Fn(NaiveDate) -> bool,
    holidays: &HashSet<NaiveDate>,
) -> Result<LeaveDuration, AppError> {
    if start > end {
        return Err(AppError::InvalidRange { start, end });
    }

    // A half-day request consumes 0.5 regardless of the supplied range; it
    // is tied to the start date alone.
    if options.is_half_day {
        let total = half_day_amount();
        let mut duration = LeaveDuration {
            total_days: total.clone(),
            working_days: BigDecimal::zero(),
            weekend_days: BigDecimal::zero(),
            holiday_days: BigDecimal::zero(),
        };
        if options.exclude_weekends && is_weekend(start) {
            duration.weekend_days = total;
        } else if options.exclude_holidays && holidays.contains(&start) {
            duration.holiday_days = total;
        } else {
            duration.working_days = total;
        }
        return Ok(duration);
    }

    let mut total: i64 = 0;
    let mut weekend: i64 = 0;
    let mut holiday: i64 = 0;
    for date in start.iter_days().take_while(|d| *d <= end) {
        total += 1;
        if options.exclude_weekends && is_weekend(date) {
            weekend += 1;
        } else if options.exclude_holidays && holidays.contains(&date) {
            holiday += 1;
        }
    }

    let total_days = BigDecimal::from(total);
    if !options.exclude_weekends && !options.exclude_holidays {
        // Pure calendar count: every day in range counts as requested.
        return Ok(LeaveDuration {
            working_days: total_days.clone(),
            total_days,
            weekend_days: BigDecimal::zero(),
            holiday_days: BigDecimal::zero(),
        });
    }

    Ok(LeaveDuration {
        working_days: BigDecimal::from(total - weekend - holiday),
        total_days,
        weekend_days: BigDecimal::from(weekend),
        holiday_days: BigDecimal::from(holiday),
    })
}
