use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{AttendanceRecord, AttendanceSource, AttendanceStatus};
use crate::database::utils::sql;

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One record per employee per date; a later write for the same date
    /// replaces the status and reason (e.g. leave approval over a manual
    /// entry).
    pub async fn upsert_record(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
        status: AttendanceStatus,
        status_reason: &str,
        source: AttendanceSource,
    ) -> Result<AttendanceRecord> {
        let now = Utc::now();

        let record = sqlx::query_as::<_, AttendanceRecord>(&sql(r#"
            INSERT INTO
                attendance_records (
                    employee_id,
                    date,
                    status,
                    status_reason,
                    source,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (employee_id, date) DO UPDATE
            SET
                status = EXCLUDED.status,
                status_reason = EXCLUDED.status_reason,
                source = EXCLUDED.source,
                updated_at = EXCLUDED.updated_at
            RETURNING
                id,
                employee_id,
                date,
                status,
                status_reason,
                source,
                created_at,
                updated_at
        "#))
        .bind(employee_id)
        .bind(date)
        .bind(status)
        .bind(status_reason)
        .bind(source)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list_between(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&sql(r#"
            SELECT
                id,
                employee_id,
                date,
                status,
                status_reason,
                source,
                created_at,
                updated_at
            FROM
                attendance_records
            WHERE
                employee_id = ?
                AND date >= ?
                AND date <= ?
            ORDER BY
                date
        "#))
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
