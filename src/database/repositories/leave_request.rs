use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{LeaveRequest, LeaveRequestInput, LeaveStatus};
use crate::database::utils::sql;

const COLUMNS: &str = r#"
    id,
    employee_id,
    leave_type,
    start_date,
    end_date,
    total_days,
    is_half_day,
    half_day_period,
    status,
    reason,
    reviewed_by,
    reviewed_at,
    rejection_reason,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: PgPool,
}

impl LeaveRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new request in `pending`; `total_days` comes from the
    /// duration calculator, never from the caller.
    pub async fn create(
        &self,
        input: &LeaveRequestInput,
        total_days: &BigDecimal,
    ) -> Result<LeaveRequest> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            INSERT INTO
                leave_requests (
                    employee_id,
                    leave_type,
                    start_date,
                    end_date,
                    total_days,
                    is_half_day,
                    half_day_period,
                    status,
                    reason,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        )))
        .bind(input.employee_id)
        .bind(input.leave_type)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(total_days)
        .bind(input.is_half_day)
        .bind(input.half_day_period)
        .bind(LeaveStatus::Pending)
        .bind(&input.reason)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            "SELECT {COLUMNS} FROM leave_requests WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn list(
        &self,
        employee_id: Option<Uuid>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>> {
        let mut query = format!("SELECT {COLUMNS} FROM leave_requests");
        let mut conditions = vec![];

        if employee_id.is_some() {
            conditions.push(format!("employee_id = ${}", conditions.len() + 1));
        }
        if status.is_some() {
            conditions.push(format!("status = ${}", conditions.len() + 1));
        }
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut prepared = sqlx::query_as::<_, LeaveRequest>(&query);
        if let Some(id) = employee_id {
            prepared = prepared.bind(id);
        }
        if let Some(s) = status {
            prepared = prepared.bind(s);
        }

        let requests = prepared.fetch_all(&self.pool).await?;

        Ok(requests)
    }

    /// Candidates for the overlap check: only pending/approved requests can
    /// conflict, and an update-in-place can exclude the row being edited.
    pub async fn find_overlapping(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        exclude_request_id: Option<Uuid>,
    ) -> Result<Vec<LeaveRequest>> {
        let mut query = format!(
            r#"
            SELECT {COLUMNS}
            FROM leave_requests
            WHERE
                employee_id = $1
                AND status IN ($2, $3)
                AND start_date <= $4
                AND end_date >= $5
            "#
        );
        if exclude_request_id.is_some() {
            query.push_str(" AND id != $6");
        }
        query.push_str(" ORDER BY start_date");

        let mut prepared = sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(employee_id)
            .bind(LeaveStatus::Pending)
            .bind(LeaveStatus::Approved)
            .bind(end)
            .bind(start);
        if let Some(id) = exclude_request_id {
            prepared = prepared.bind(id);
        }

        let requests = prepared.fetch_all(&self.pool).await?;

        Ok(requests)
    }

    pub async fn find_approved_covering(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            SELECT {COLUMNS}
            FROM leave_requests
            WHERE
                employee_id = ?
                AND status = ?
                AND start_date <= ?
                AND end_date >= ?
            LIMIT 1
            "#
        )))
        .bind(employee_id)
        .bind(LeaveStatus::Approved)
        .bind(date)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_approved_between(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRequest>> {
        let requests = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            SELECT {COLUMNS}
            FROM leave_requests
            WHERE
                employee_id = ?
                AND status = ?
                AND start_date <= ?
                AND end_date >= ?
            ORDER BY start_date
            "#
        )))
        .bind(employee_id)
        .bind(LeaveStatus::Approved)
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Claims the pending request for approval. Returns None when the row is
    /// no longer pending, which makes double-approval races lose cleanly.
    pub async fn set_approved(&self, id: Uuid, reviewed_by: Uuid) -> Result<Option<LeaveRequest>> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                reviewed_by = ?,
                reviewed_at = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING {COLUMNS}
            "#
        )))
        .bind(LeaveStatus::Approved)
        .bind(reviewed_by)
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(LeaveStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn set_rejected(
        &self,
        id: Uuid,
        reviewed_by: Uuid,
        rejection_reason: &str,
    ) -> Result<Option<LeaveRequest>> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                reviewed_by = ?,
                reviewed_at = ?,
                rejection_reason = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING {COLUMNS}
            "#
        )))
        .bind(LeaveStatus::Rejected)
        .bind(reviewed_by)
        .bind(now)
        .bind(rejection_reason)
        .bind(now)
        .bind(id)
        .bind(LeaveStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn set_cancelled(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING {COLUMNS}
            "#
        )))
        .bind(LeaveStatus::Cancelled)
        .bind(now)
        .bind(id)
        .bind(LeaveStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Compensation path: puts a claimed request back to pending after a
    /// ledger write failed, clearing the review fields.
    pub async fn reopen(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                reviewed_by = NULL,
                reviewed_at = NULL,
                rejection_reason = NULL,
                updated_at = ?
            WHERE
                id = ?
            RETURNING {COLUMNS}
            "#
        )))
        .bind(LeaveStatus::Pending)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }
}
