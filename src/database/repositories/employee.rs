use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{CreateEmployeeInput, Employee};
use crate::database::utils::sql;

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &CreateEmployeeInput, password_hash: &str) -> Result<Employee> {
        let now = Utc::now();

        let employee = sqlx::query_as::<_, Employee>(&sql(r#"
            INSERT INTO
                employees (email, name, role, password_hash, is_active, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, TRUE, ?, ?)
            RETURNING
                id,
                email,
                name,
                role,
                password_hash,
                is_active,
                created_at,
                updated_at
        "#))
        .bind(&input.email)
        .bind(&input.name)
        .bind(input.role)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&sql(r#"
            SELECT
                id,
                email,
                name,
                role,
                password_hash,
                is_active,
                created_at,
                updated_at
            FROM
                employees
            WHERE
                id = ?
        "#))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&sql(r#"
            SELECT
                id,
                email,
                name,
                role,
                password_hash,
                is_active,
                created_at,
                updated_at
            FROM
                employees
            WHERE
                email = ?
        "#))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar(&sql("SELECT COUNT(*) FROM employees WHERE email = ?"))
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    pub async fn list(&self) -> Result<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(&sql(r#"
            SELECT
                id,
                email,
                name,
                role,
                password_hash,
                is_active,
                created_at,
                updated_at
            FROM
                employees
            ORDER BY
                name
        "#))
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }
}
