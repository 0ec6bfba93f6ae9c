use actix_web::{web, HttpResponse};
use bigdecimal::{BigDecimal, Zero};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{BalanceAdjustmentInput, BalanceAssignmentInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{BalanceLedger, Claims};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceQuery {
    pub employee_id: Option<Uuid>,
    pub year: Option<i32>,
}

pub async fn get_balances(
    claims: Claims,
    ledger: web::Data<BalanceLedger>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = if claims.is_manager_or_admin() {
        query.employee_id.unwrap_or(claims.sub)
    } else {
        claims.sub
    };
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let balances = ledger.balances(employee_id, year).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(balances)))
}

/// Yearly entitlement assignment, one allocation per leave type.
pub async fn assign_balances(
    claims: Claims,
    ledger: web::Data<BalanceLedger>,
    input: web::Json<BalanceAssignmentInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can assign balances".to_string(),
        ));
    }

    let input = input.into_inner();
    for (leave_type, allocation) in &input.allocations {
        if allocation.allocated < BigDecimal::zero() || allocation.carry_forward < BigDecimal::zero()
        {
            return Err(AppError::BadRequest(format!(
                "Allocation for {} must be non-negative",
                leave_type
            )));
        }
    }

    let balances = ledger.assign(&input).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(balances)))
}

pub async fn adjust_balance(
    claims: Claims,
    ledger: web::Data<BalanceLedger>,
    path: web::Path<Uuid>,
    input: web::Json<BalanceAdjustmentInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can adjust balances".to_string(),
        ));
    }

    if input.days < BigDecimal::zero() {
        return Err(AppError::BadRequest(
            "Adjustment days must be non-negative; pick the operation instead".to_string(),
        ));
    }

    let balance = ledger.adjust(path.into_inner(), &input).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(balance)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub employee_id: Option<Uuid>,
    pub limit: Option<i64>,
}

pub async fn get_balance_history(
    claims: Claims,
    ledger: web::Data<BalanceLedger>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = if claims.is_manager_or_admin() {
        query.employee_id.unwrap_or(claims.sub)
    } else {
        claims.sub
    };

    let history = ledger.history(employee_id, query.limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(history)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationQuery {
    pub employee_id: Option<Uuid>,
    pub year: Option<i32>,
}

pub async fn get_utilization_report(
    claims: Claims,
    ledger: web::Data<BalanceLedger>,
    query: web::Query<UtilizationQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = if claims.is_manager_or_admin() {
        query.employee_id
    } else {
        Some(claims.sub)
    };
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let report = ledger.utilization_report(employee_id, year).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}
