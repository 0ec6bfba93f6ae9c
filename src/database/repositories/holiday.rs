use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Holiday, HolidayInput};
use crate::database::utils::sql;

#[derive(Clone)]
pub struct HolidayRepository {
    pool: PgPool,
}

impl HolidayRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &HolidayInput) -> Result<Holiday> {
        let now = Utc::now();

        let holiday = sqlx::query_as::<_, Holiday>(&sql(r#"
            INSERT INTO
                holidays (date, name, is_active, is_optional, is_paid, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                date,
                name,
                is_active,
                is_optional,
                is_paid,
                created_at,
                updated_at
        "#))
        .bind(input.date)
        .bind(&input.name)
        .bind(input.is_active)
        .bind(input.is_optional)
        .bind(input.is_paid)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(holiday)
    }

    pub async fn update(&self, id: Uuid, input: &HolidayInput) -> Result<Option<Holiday>> {
        let now = Utc::now();

        let holiday = sqlx::query_as::<_, Holiday>(&sql(r#"
            UPDATE
                holidays
            SET
                date = ?,
                name = ?,
                is_active = ?,
                is_optional = ?,
                is_paid = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                id,
                date,
                name,
                is_active,
                is_optional,
                is_paid,
                created_at,
                updated_at
        "#))
        .bind(input.date)
        .bind(&input.name)
        .bind(input.is_active)
        .bind(input.is_optional)
        .bind(input.is_paid)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(holiday)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(&sql("DELETE FROM holidays WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The engine only ever sees active holidays.
    pub async fn find_active_by_date(&self, date: NaiveDate) -> Result<Option<Holiday>> {
        let holiday = sqlx::query_as::<_, Holiday>(&sql(r#"
            SELECT
                id,
                date,
                name,
                is_active,
                is_optional,
                is_paid,
                created_at,
                updated_at
            FROM
                holidays
            WHERE
                date = ?
                AND is_active
        "#))
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(holiday)
    }

    pub async fn list_active_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Holiday>> {
        let holidays = sqlx::query_as::<_, Holiday>(&sql(r#"
            SELECT
                id,
                date,
                name,
                is_active,
                is_optional,
                is_paid,
                created_at,
                updated_at
            FROM
                holidays
            WHERE
                date >= ?
                AND date <= ?
                AND is_active
            ORDER BY
                date
        "#))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(holidays)
    }

    pub async fn list_all(&self) -> Result<Vec<Holiday>> {
        let holidays = sqlx::query_as::<_, Holiday>(&sql(r#"
            SELECT
                id,
                date,
                name,
                is_active,
                is_optional,
                is_paid,
                created_at,
                updated_at
            FROM
                holidays
            ORDER BY
                date
        "#))
        .fetch_all(&self.pool)
        .await?;

        Ok(holidays)
    }
}
