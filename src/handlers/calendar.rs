use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::repositories::AttendanceRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{Claims, DayStatusResolver};

/// Employees always see their own calendar overlay; managers and admins may
/// ask about anyone (or nobody, for the plain company calendar).
fn employee_scope(claims: &Claims, requested: Option<Uuid>) -> Option<Uuid> {
    if claims.is_manager_or_admin() {
        requested
    } else {
        Some(claims.sub)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatusQuery {
    pub date: NaiveDate,
    pub employee_id: Option<Uuid>,
}

pub async fn day_status(
    claims: Claims,
    resolver: web::Data<DayStatusResolver>,
    query: web::Query<DayStatusQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = employee_scope(&claims, query.employee_id);
    let status = resolver.day_status(query.date, employee_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeStatusQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub employee_id: Option<Uuid>,
}

pub async fn range_status(
    claims: Claims,
    resolver: web::Data<DayStatusResolver>,
    query: web::Query<RangeStatusQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = employee_scope(&claims, query.employee_id);
    let statuses = resolver
        .date_range_status(query.start, query.end, employee_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(statuses)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummaryQuery {
    pub year: i32,
    pub month: u32,
    pub employee_id: Option<Uuid>,
}

pub async fn monthly_summary(
    claims: Claims,
    resolver: web::Data<DayStatusResolver>,
    query: web::Query<MonthlySummaryQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = employee_scope(&claims, query.employee_id);
    let summary = resolver
        .monthly_summary(query.year, query.month, employee_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub employee_id: Option<Uuid>,
}

pub async fn attendance_records(
    claims: Claims,
    repo: web::Data<AttendanceRepository>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = employee_scope(&claims, query.employee_id).ok_or_else(|| {
        AppError::BadRequest("employeeId is required for attendance listings".to_string())
    })?;

    let records = repo.list_between(employee_id, query.start, query.end).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(records)))
}
