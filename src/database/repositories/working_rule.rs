use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;

use crate::database::models::{WorkingRuleConfig, WorkingRuleInput};
use crate::database::utils::sql;

#[derive(Clone)]
pub struct WorkingRuleRepository {
    pool: PgPool,
}

impl WorkingRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rules are append-only; superseding a rule means inserting a new row.
    pub async fn create(&self, input: &WorkingRuleInput) -> Result<WorkingRuleConfig> {
        let now = Utc::now();

        let rule = sqlx::query_as::<_, WorkingRuleConfig>(&sql(r#"
            INSERT INTO
                working_rules (
                    name,
                    effective_from,
                    effective_to,
                    working_weekdays,
                    weekend_weekdays,
                    is_default,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                name,
                effective_from,
                effective_to,
                working_weekdays,
                weekend_weekdays,
                is_default,
                created_at
        "#))
        .bind(&input.name)
        .bind(input.effective_from)
        .bind(input.effective_to)
        .bind(&input.working_weekdays)
        .bind(&input.weekend_weekdays)
        .bind(input.is_default)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(rule)
    }

    /// The full rule set, newest window first. Rule selection for a given
    /// date is a pure function over this list.
    pub async fn list_all(&self) -> Result<Vec<WorkingRuleConfig>> {
        let rules = sqlx::query_as::<_, WorkingRuleConfig>(&sql(r#"
            SELECT
                id,
                name,
                effective_from,
                effective_to,
                working_weekdays,
                weekend_weekdays,
                is_default,
                created_at
            FROM
                working_rules
            ORDER BY
                effective_from DESC
        "#))
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }
}
