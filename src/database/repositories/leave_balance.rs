use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{
    LeaveBalance, LeaveBalanceHistory, LeaveType, NewBalanceHistory,
};
use crate::database::utils::sql;

const COLUMNS: &str = r#"
    id,
    employee_id,
    leave_type,
    year,
    allocated,
    used,
    pending,
    remaining,
    carry_forward,
    version,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct LeaveBalanceRepository {
    pool: PgPool,
}

impl LeaveBalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        employee_id: Uuid,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<Option<LeaveBalance>> {
        let balance = sqlx::query_as::<_, LeaveBalance>(&sql(&format!(
            r#"
            SELECT {COLUMNS}
            FROM leave_balances
            WHERE
                employee_id = ?
                AND leave_type = ?
                AND year = ?
            "#
        )))
        .bind(employee_id)
        .bind(leave_type)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveBalance>> {
        let balance = sqlx::query_as::<_, LeaveBalance>(&sql(&format!(
            "SELECT {COLUMNS} FROM leave_balances WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    pub async fn list_for_year(
        &self,
        employee_id: Option<Uuid>,
        year: i32,
    ) -> Result<Vec<LeaveBalance>> {
        let mut query = format!("SELECT {COLUMNS} FROM leave_balances WHERE year = $1");
        if employee_id.is_some() {
            query.push_str(" AND employee_id = $2");
        }
        query.push_str(" ORDER BY employee_id, leave_type");

        let mut prepared = sqlx::query_as::<_, LeaveBalance>(&query).bind(year);
        if let Some(id) = employee_id {
            prepared = prepared.bind(id);
        }

        let balances = prepared.fetch_all(&self.pool).await?;

        Ok(balances)
    }

    /// First assignment for an (employee, type, year) key. Created with zero
    /// usage; `remaining` starts at the full entitlement.
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        employee_id: Uuid,
        leave_type: LeaveType,
        year: i32,
        allocated: &BigDecimal,
        carry_forward: &BigDecimal,
    ) -> Result<LeaveBalance, sqlx::Error> {
        let now = Utc::now();
        let remaining = allocated + carry_forward;

        let balance = sqlx::query_as::<_, LeaveBalance>(&sql(&format!(
            r#"
            INSERT INTO
                leave_balances (
                    employee_id,
                    leave_type,
                    year,
                    allocated,
                    used,
                    pending,
                    remaining,
                    carry_forward,
                    version,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, 0, 0, ?, ?, 0, ?, ?)
            RETURNING {COLUMNS}
            "#
        )))
        .bind(employee_id)
        .bind(leave_type)
        .bind(year)
        .bind(allocated)
        .bind(remaining)
        .bind(carry_forward)
        .bind(now)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        Ok(balance)
    }

    /// Optimistic write: persists the mutated row only if nobody else has
    /// written it since it was read. Zero rows affected means the version
    /// moved underneath us and the whole operation must be redone.
    pub async fn save_versioned_tx(
        tx: &mut Transaction<'_, Postgres>,
        balance: &LeaveBalance,
    ) -> Result<u64, sqlx::Error> {
        let now = Utc::now();

        let result = sqlx::query(&sql(r#"
            UPDATE leave_balances
            SET
                allocated = ?,
                used = ?,
                pending = ?,
                remaining = ?,
                carry_forward = ?,
                version = version + 1,
                updated_at = ?
            WHERE
                id = ?
                AND version = ?
        "#))
        .bind(&balance.allocated)
        .bind(&balance.used)
        .bind(&balance.pending)
        .bind(&balance.remaining)
        .bind(&balance.carry_forward)
        .bind(now)
        .bind(balance.id)
        .bind(balance.version)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn append_history_tx(
        tx: &mut Transaction<'_, Postgres>,
        entry: &NewBalanceHistory,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now();

        sqlx::query(&sql(r#"
            INSERT INTO
                leave_balance_history (
                    balance_id,
                    employee_id,
                    leave_type,
                    year,
                    change_type,
                    days_changed,
                    previous_remaining,
                    new_remaining,
                    description,
                    related_request_id,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#))
        .bind(entry.balance_id)
        .bind(entry.employee_id)
        .bind(entry.leave_type)
        .bind(entry.year)
        .bind(entry.change_type)
        .bind(&entry.days_changed)
        .bind(&entry.previous_remaining)
        .bind(&entry.new_remaining)
        .bind(&entry.description)
        .bind(entry.related_request_id)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn history(
        &self,
        employee_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<LeaveBalanceHistory>> {
        let limit = limit.unwrap_or(50);

        let history = sqlx::query_as::<_, LeaveBalanceHistory>(&sql(r#"
            SELECT
                id,
                balance_id,
                employee_id,
                leave_type,
                year,
                change_type,
                days_changed,
                previous_remaining,
                new_remaining,
                description,
                related_request_id,
                created_at
            FROM
                leave_balance_history
            WHERE
                employee_id = ?
            ORDER BY
                created_at DESC
            LIMIT
                ?
        "#))
        .bind(employee_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }
}
