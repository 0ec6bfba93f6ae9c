use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: Uuid,
    pub date: NaiveDate,
    pub name: String,
    pub is_active: bool,
    pub is_optional: bool,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayInput {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default = "default_true")]
    pub is_paid: bool,
}

fn default_true() -> bool {
    true
}
