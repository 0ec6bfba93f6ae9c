use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Versioned working-day configuration. Rows are append-only: a new rule
/// supersedes an old one by starting later, so dates in the past keep
/// resolving against the rule that governed them at the time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkingRuleConfig {
    pub id: Uuid,
    pub name: String,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    /// Weekday indices, 0 = Sunday through 6 = Saturday.
    pub working_weekdays: Vec<i16>,
    pub weekend_weekdays: Vec<i16>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl WorkingRuleConfig {
    /// Window containment; an open-ended rule has no upper bound.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.is_none_or(|to| date <= to)
    }

    pub fn is_weekend_date(&self, date: NaiveDate) -> bool {
        self.weekend_weekdays.contains(&weekday_index(date))
    }

    pub fn is_working_date(&self, date: NaiveDate) -> bool {
        self.working_weekdays.contains(&weekday_index(date))
    }

    /// Hardcoded Monday-Friday rule, applied when no configured rule matches
    /// and no default rule exists.
    pub fn builtin_default() -> Self {
        WorkingRuleConfig {
            id: Uuid::nil(),
            name: "Standard week".to_string(),
            effective_from: NaiveDate::MIN,
            effective_to: None,
            working_weekdays: vec![1, 2, 3, 4, 5],
            weekend_weekdays: vec![0, 6],
            is_default: true,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}

/// 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingRuleInput {
    pub name: String,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub working_weekdays: Vec<i16>,
    pub weekend_weekdays: Vec<i16>,
    #[serde(default)]
    pub is_default: bool,
}

impl WorkingRuleInput {
    /// Rejects indices outside 0..=6 and weekdays claimed by both sets.
    pub fn validate(&self) -> Result<(), String> {
        let all = self
            .working_weekdays
            .iter()
            .chain(self.weekend_weekdays.iter());
        for &day in all {
            if !(0..=6).contains(&day) {
                return Err(format!("weekday index out of range: {}", day));
            }
        }
        if let Some(day) = self
            .working_weekdays
            .iter()
            .find(|d| self.weekend_weekdays.contains(d))
        {
            return Err(format!(
                "weekday {} is listed as both working and weekend",
                day
            ));
        }
        if let Some(to) = self.effective_to {
            if to < self.effective_from {
                return Err("effectiveTo precedes effectiveFrom".to_string());
            }
        }
        Ok(())
    }
}
