use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache;

use crate::database::models::WorkingRuleConfig;
use crate::database::repositories::WorkingRuleRepository;
use crate::error::AppError;

const RULE_SET_KEY: u8 = 0;

/// Resolves which working-day rule governs a given date. Read-only; the rule
/// set is small and changes rarely, so it is held in a short-TTL cache that
/// admin writes invalidate explicitly.
#[derive(Clone)]
pub struct DateRuleResolver {
    repository: WorkingRuleRepository,
    cache: Cache<u8, Arc<Vec<WorkingRuleConfig>>>,
}

impl DateRuleResolver {
    pub fn new(repository: WorkingRuleRepository) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(300))
            .build();
        Self { repository, cache }
    }

    pub(crate) async fn rule_set(&self) -> Result<Arc<Vec<WorkingRuleConfig>>, AppError> {
        let repository = self.repository.clone();
        self.cache
            .try_get_with(RULE_SET_KEY, async move {
                let rules = repository.list_all().await.map_err(AppError::from)?;
                Ok::<_, AppError>(Arc::new(rules))
            })
            .await
            .map_err(|err: Arc<AppError>| AppError::internal_server_error_message(err.to_string()))
    }

    pub async fn active_rule(&self, date: NaiveDate) -> Result<WorkingRuleConfig, AppError> {
        let rules = self.rule_set().await?;
        Ok(select_active_rule(&rules, date))
    }

    pub async fn is_weekend(&self, date: NaiveDate) -> Result<bool, AppError> {
        Ok(self.active_rule(date).await?.is_weekend_date(date))
    }

    pub async fn is_working_day(&self, date: NaiveDate) -> Result<bool, AppError> {
        Ok(self.active_rule(date).await?.is_working_date(date))
    }

    /// Called by admin writes so new rules take effect immediately.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

/// Three-tier fallback. A past date must never be reclassified because the
/// configuration was edited later, hence the expired-rule tier before the
/// default tiers:
/// 1. rule whose window contains the date, most recently started first;
/// 2. most recently expired rule;
/// 3. the designated default rule;
/// 4. the hardcoded Monday-Friday week.
pub fn select_active_rule(rules: &[WorkingRuleConfig], date: NaiveDate) -> WorkingRuleConfig {
    if let Some(rule) = rules
        .iter()
        .filter(|r| r.contains(date))
        .max_by_key(|r| r.effective_from)
    {
        return rule.clone();
    }

    if let Some(rule) = rules
        .iter()
        .filter(|r| r.effective_to.is_some_and(|to| to < date))
        .max_by_key(|r| r.effective_to)
    {
        return rule.clone();
    }

    if let Some(rule) = rules.iter().find(|r| r.is_default) {
        return rule.clone();
    }

    WorkingRuleConfig::builtin_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule(
        name: &str,
        from: NaiveDate,
        to: Option<NaiveDate>,
        is_default: bool,
    ) -> WorkingRuleConfig {
        WorkingRuleConfig {
            id: Uuid::new_v4(),
            name: name.to_string(),
            effective_from: from,
            effective_to: to,
            working_weekdays: vec![1, 2, 3, 4, 5],
            weekend_weekdays: vec![0, 6],
            is_default,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn prefers_the_most_recently_started_containing_rule() {
        let rules = vec![
            rule("old", date(2024, 1, 1), None, false),
            rule("new", date(2025, 1, 1), None, false),
        ];
        let selected = select_active_rule(&rules, date(2025, 6, 1));
        assert_eq!(selected.name, "new");
    }

    #[test]
    fn falls_back_to_the_most_recently_expired_rule() {
        let rules = vec![
            rule("first", date(2023, 1, 1), Some(date(2023, 12, 31)), false),
            rule("second", date(2024, 1, 1), Some(date(2024, 6, 30)), false),
        ];
        // No rule covers this date; the 2024 rule expired most recently.
        let selected = select_active_rule(&rules, date(2025, 3, 1));
        assert_eq!(selected.name, "second");
    }

    #[test]
    fn expired_rule_wins_over_designated_default() {
        let rules = vec![
            rule("expired", date(2023, 1, 1), Some(date(2023, 12, 31)), false),
            rule("default", date(2030, 1, 1), None, true),
        ];
        let selected = select_active_rule(&rules, date(2024, 5, 1));
        assert_eq!(selected.name, "expired");
    }

    #[test]
    fn default_rule_applies_before_any_rule_started() {
        let rules = vec![
            rule("future", date(2030, 1, 1), None, false),
            rule("default", date(2031, 1, 1), None, true),
        ];
        let selected = select_active_rule(&rules, date(2025, 1, 1));
        assert_eq!(selected.name, "default");
    }

    #[test]
    fn builtin_week_is_the_last_resort() {
        let selected = select_active_rule(&[], date(2025, 1, 1));
        assert!(selected.is_default);
        assert_eq!(selected.working_weekdays, vec![1, 2, 3, 4, 5]);
        assert_eq!(selected.weekend_weekdays, vec![0, 6]);
    }
}
