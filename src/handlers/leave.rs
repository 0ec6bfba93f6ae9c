use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{LeaveRequestInput, LeaveStatus, RejectionInput};
use crate::database::repositories::LeaveRequestRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{Claims, LeaveRequestLifecycle};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveListQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
}

/// Submit a new leave request. Employees can only file for themselves.
pub async fn submit_leave_request(
    claims: Claims,
    lifecycle: web::Data<LeaveRequestLifecycle>,
    input: web::Json<LeaveRequestInput>,
) -> Result<HttpResponse, AppError> {
    let mut request_input = input.into_inner();

    if !claims.is_manager_or_admin() {
        request_input.employee_id = claims.sub;
    }

    let request = lifecycle.submit(&request_input).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

/// Dry run of the submission checks without touching any state.
pub async fn validate_leave_application(
    claims: Claims,
    lifecycle: web::Data<LeaveRequestLifecycle>,
    input: web::Json<LeaveRequestInput>,
) -> Result<HttpResponse, AppError> {
    let mut request_input = input.into_inner();

    if !claims.is_manager_or_admin() {
        request_input.employee_id = claims.sub;
    }

    let report = lifecycle.validate_application(&request_input, None).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}

pub async fn get_leave_requests(
    claims: Claims,
    repo: web::Data<LeaveRequestRepository>,
    query: web::Query<LeaveListQuery>,
) -> Result<HttpResponse, AppError> {
    // Employees can only see their own requests
    let employee_id = if claims.is_manager_or_admin() {
        query.employee_id
    } else {
        Some(claims.sub)
    };

    let requests = repo.list(employee_id, query.status).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

pub async fn get_leave_request(
    claims: Claims,
    repo: web::Data<LeaveRequestRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request_id = path.into_inner();
    let request = repo
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Leave request {}", request_id)))?;

    if !claims.is_manager_or_admin() && request.employee_id != claims.sub {
        return Err(AppError::Forbidden(
            "Cannot view other employees' requests".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn approve_leave_request(
    claims: Claims,
    lifecycle: web::Data<LeaveRequestLifecycle>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::Forbidden(
            "Insufficient permissions to approve requests".to_string(),
        ));
    }

    let request = lifecycle.approve(path.into_inner(), claims.sub).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn reject_leave_request(
    claims: Claims,
    lifecycle: web::Data<LeaveRequestLifecycle>,
    path: web::Path<Uuid>,
    input: web::Json<RejectionInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::Forbidden(
            "Insufficient permissions to reject requests".to_string(),
        ));
    }

    let request = lifecycle
        .reject(path.into_inner(), claims.sub, &input.reason)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Cancellation is the requesting employee's own action; the lifecycle
/// enforces ownership.
pub async fn cancel_leave_request(
    claims: Claims,
    lifecycle: web::Data<LeaveRequestLifecycle>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = lifecycle.cancel(path.into_inner(), claims.sub).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}
