use actix_web::{web, HttpResponse};

use crate::database::models::{CreateEmployeeInput, LoginInput};
use crate::database::repositories::EmployeeRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{AuthService, Claims};

pub async fn login(
    auth_service: web::Data<AuthService>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    let response = auth_service.login(&input).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

pub async fn me(
    claims: Claims,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let employee = auth_service.current_employee(&claims).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(employee)))
}

/// Admins create employee accounts; there is no self-service registration.
pub async fn create_employee(
    claims: Claims,
    auth_service: web::Data<AuthService>,
    input: web::Json<CreateEmployeeInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can create employees".to_string(),
        ));
    }

    let employee = auth_service.create_employee(&input).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(employee)))
}

pub async fn list_employees(
    claims: Claims,
    repo: web::Data<EmployeeRepository>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::Forbidden(
            "Insufficient permissions to list employees".to_string(),
        ));
    }

    let employees = repo.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(employees)))
}
