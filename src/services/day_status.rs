use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use moka::future::Cache;
use uuid::Uuid;

use super::date_rules::DateRuleResolver;
use crate::database::models::working_rule::{weekday_index, weekday_name};
use crate::database::models::{
    DayStatus, DayStatusKind, Holiday, LeaveRequest, MonthlySummary, WorkingRuleConfig,
};
use crate::database::repositories::{HolidayRepository, LeaveRequestRepository};
use crate::error::AppError;

/// The one canonical resolver for the weekend > holiday > leave > working
/// priority chain. Calendar views and leave validation both go through here;
/// no second implementation of this ordering may exist.
#[derive(Clone)]
pub struct DayStatusResolver {
    date_rules: DateRuleResolver,
    holiday_repository: HolidayRepository,
    leave_repository: LeaveRequestRepository,
    holiday_cache: Cache<i32, Arc<HashMap<NaiveDate, Holiday>>>,
}

impl DayStatusResolver {
    pub fn new(
        date_rules: DateRuleResolver,
        holiday_repository: HolidayRepository,
        leave_repository: LeaveRequestRepository,
    ) -> Self {
        let holiday_cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(Duration::from_secs(300))
            .build();
        Self {
            date_rules,
            holiday_repository,
            leave_repository,
            holiday_cache,
        }
    }

    pub async fn day_status(
        &self,
        date: NaiveDate,
        employee_id: Option<Uuid>,
    ) -> Result<DayStatus, AppError> {
        let rule = self.date_rules.active_rule(date).await?;
        let holiday = self.holiday_for(date).await?;
        let leave = match employee_id {
            Some(id) => {
                self.leave_repository
                    .find_approved_covering(id, date)
                    .await?
            }
            None => None,
        };

        Ok(classify(date, &rule, holiday.as_ref(), leave.as_ref()))
    }

    /// One status per date, start through end inclusive.
    pub async fn date_range_status(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        employee_id: Option<Uuid>,
    ) -> Result<Vec<DayStatus>, AppError> {
        if start > end {
            return Err(AppError::InvalidRange { start, end });
        }

        let rules = self.date_rules.rule_set().await?;
        let leaves = match employee_id {
            Some(id) => {
                self.leave_repository
                    .find_approved_between(id, start, end)
                    .await?
            }
            None => Vec::new(),
        };

        let mut statuses = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            let rule = super::date_rules::select_active_rule(&rules, date);
            let holiday = self.holiday_for(date).await?;
            let leave = leaves
                .iter()
                .find(|r| r.start_date <= date && date <= r.end_date);
            statuses.push(classify(date, &rule, holiday.as_ref(), leave));
        }

        Ok(statuses)
    }

    pub async fn monthly_summary(
        &self,
        year: i32,
        month: u32,
        employee_id: Option<Uuid>,
    ) -> Result<MonthlySummary, AppError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid month: {}-{}", year, month)))?;
        let last = last_day_of_month(year, month)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid month: {}-{}", year, month)))?;

        let statuses = self.date_range_status(first, last, employee_id).await?;
        Ok(summarize(year, month, &statuses))
    }

    async fn holiday_for(&self, date: NaiveDate) -> Result<Option<Holiday>, AppError> {
        let by_date = self.holidays_for_year(date.year()).await?;
        Ok(by_date.get(&date).cloned())
    }

    async fn holidays_for_year(
        &self,
        year: i32,
    ) -> Result<Arc<HashMap<NaiveDate, Holiday>>, AppError> {
        let repository = self.holiday_repository.clone();
        self.holiday_cache
            .try_get_with(year, async move {
                let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| {
                    AppError::internal_server_error_message(format!("invalid year {}", year))
                })?;
                let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| {
                    AppError::internal_server_error_message(format!("invalid year {}", year))
                })?;
                let holidays = repository
                    .list_active_between(start, end)
                    .await
                    .map_err(AppError::from)?;
                Ok::<_, AppError>(Arc::new(
                    holidays.into_iter().map(|h| (h.date, h)).collect(),
                ))
            })
            .await
            .map_err(|err: Arc<AppError>| AppError::internal_server_error_message(err.to_string()))
    }

    /// Called by the holiday admin handlers after any write.
    pub fn invalidate_holidays(&self) {
        self.holiday_cache.invalidate_all();
    }
}

/// Priority chain for a single date. Order is load-bearing: a holiday on a
/// weekend reports as weekend, a holiday during approved leave reports as
/// holiday. The supplied holiday must already be an active one.
pub fn classify(
    date: NaiveDate,
    rule: &WorkingRuleConfig,
    holiday: Option<&Holiday>,
    leave: Option<&LeaveRequest>,
) -> DayStatus {
    let day_of_week = weekday_index(date);
    let day_name = weekday_name(date);

    if rule.is_weekend_date(date) {
        return DayStatus {
            date,
            day_of_week,
            day_name,
            status: DayStatusKind::Weekend,
            attendance_required: false,
            reason: "Weekend",
            detail: Some(rule.name.clone()),
        };
    }

    if let Some(holiday) = holiday {
        return DayStatus {
            date,
            day_of_week,
            day_name,
            status: DayStatusKind::Holiday,
            attendance_required: false,
            reason: "Holiday",
            detail: Some(holiday.name.clone()),
        };
    }

    if let Some(leave) = leave {
        return DayStatus {
            date,
            day_of_week,
            day_name,
            status: DayStatusKind::Leave,
            attendance_required: false,
            reason: "Approved leave",
            detail: Some(leave.leave_type.label().to_string()),
        };
    }

    DayStatus {
        date,
        day_of_week,
        day_name,
        status: DayStatusKind::Working,
        attendance_required: true,
        reason: "Working day",
        detail: None,
    }
}

pub fn summarize(year: i32, month: u32, statuses: &[DayStatus]) -> MonthlySummary {
    let mut summary = MonthlySummary {
        year,
        month,
        total_days: statuses.len() as u32,
        working_days: 0,
        weekend_days: 0,
        holiday_days: 0,
        leave_days: 0,
        attendance_required_days: 0,
    };
    for status in statuses {
        match status.status {
            DayStatusKind::Working => summary.working_days += 1,
            DayStatusKind::Weekend => summary.weekend_days += 1,
            DayStatusKind::Holiday => summary.holiday_days += 1,
            DayStatusKind::Leave => summary.leave_days += 1,
        }
        if status.attendance_required {
            summary.attendance_required_days += 1;
        }
    }
    summary
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month_first.and_then(|d| d.pred_opt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{HalfDayPeriod, LeaveStatus, LeaveType};
    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn standard_rule() -> WorkingRuleConfig {
        WorkingRuleConfig::builtin_default()
    }

    fn holiday_on(d: NaiveDate, name: &str) -> Holiday {
        Holiday {
            id: Uuid::new_v4(),
            date: d,
            name: name.to_string(),
            is_active: true,
            is_optional: false,
            is_paid: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn approved_leave(start: NaiveDate, end: NaiveDate, leave_type: LeaveType) -> LeaveRequest {
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            leave_type,
            start_date: start,
            end_date: end,
            total_days: BigDecimal::from(1),
            is_half_day: false,
            half_day_period: None::<HalfDayPeriod>,
            status: LeaveStatus::Approved,
            reason: "test".to_string(),
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn weekend_wins_over_holiday() {
        // 2025-03-08 is a Saturday.
        let d = date(2025, 3, 8);
        let holiday = holiday_on(d, "Founders Day");
        let status = classify(d, &standard_rule(), Some(&holiday), None);

        assert_eq!(status.status, DayStatusKind::Weekend);
        assert!(!status.attendance_required);
    }

    #[test]
    fn holiday_wins_over_approved_leave() {
        // 2025-03-10 is a Monday.
        let d = date(2025, 3, 10);
        let holiday = holiday_on(d, "Spring Holiday");
        let leave = approved_leave(date(2025, 3, 9), date(2025, 3, 12), LeaveType::Annual);
        let status = classify(d, &standard_rule(), Some(&holiday), Some(&leave));

        assert_eq!(status.status, DayStatusKind::Holiday);
        assert_eq!(status.detail.as_deref(), Some("Spring Holiday"));
    }

    #[test]
    fn approved_leave_on_a_plain_working_day() {
        let d = date(2025, 3, 11);
        let leave = approved_leave(date(2025, 3, 9), date(2025, 3, 12), LeaveType::Sick);
        let status = classify(d, &standard_rule(), None, Some(&leave));

        assert_eq!(status.status, DayStatusKind::Leave);
        assert_eq!(status.detail.as_deref(), Some("Sick leave"));
        assert!(!status.attendance_required);
    }

    #[test]
    fn working_day_requires_attendance() {
        let d = date(2025, 3, 12);
        let status = classify(d, &standard_rule(), None, None);

        assert_eq!(status.status, DayStatusKind::Working);
        assert!(status.attendance_required);
        assert_eq!(status.detail, None);
    }

    #[test]
    fn saturday_resolves_as_weekend_regardless_of_other_data() {
        // 2026-01-03 is a Saturday; day_of_week uses 0 = Sunday indexing.
        let d = date(2026, 1, 3);
        let status = classify(d, &standard_rule(), None, None);

        assert_eq!(status.status, DayStatusKind::Weekend);
        assert_eq!(status.day_of_week, 6);
        assert_eq!(status.day_name, "Saturday");
    }

    #[test]
    fn summary_counts_every_status_once() {
        let rule = standard_rule();
        let holiday = holiday_on(date(2025, 3, 10), "Spring Holiday");
        let statuses: Vec<DayStatus> = date(2025, 3, 8)
            .iter_days()
            .take_while(|d| *d <= date(2025, 3, 12))
            .map(|d| {
                let h = (d == holiday.date).then_some(&holiday);
                classify(d, &rule, h, None)
            })
            .collect();

        let summary = summarize(2025, 3, &statuses);
        assert_eq!(summary.total_days, 5);
        assert_eq!(summary.weekend_days, 2); // Sat 8th, Sun 9th
        assert_eq!(summary.holiday_days, 1); // Mon 10th
        assert_eq!(summary.working_days, 2); // Tue 11th, Wed 12th
        assert_eq!(summary.attendance_required_days, 2);
    }

    #[test]
    fn month_end_arithmetic() {
        assert_eq!(last_day_of_month(2025, 2), Some(date(2025, 2, 28)));
        assert_eq!(last_day_of_month(2024, 2), Some(date(2024, 2, 29)));
        assert_eq!(last_day_of_month(2025, 12), Some(date(2025, 12, 31)));
        assert_eq!(last_day_of_month(2025, 13), None);
    }
}
