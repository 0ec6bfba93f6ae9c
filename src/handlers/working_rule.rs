use actix_web::{web, HttpResponse};

use crate::database::models::WorkingRuleInput;
use crate::database::repositories::WorkingRuleRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{Claims, DateRuleResolver};

pub async fn list_working_rules(
    claims: Claims,
    repo: web::Data<WorkingRuleRepository>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::Forbidden(
            "Insufficient permissions to view working rules".to_string(),
        ));
    }

    let rules = repo.list_all().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(rules)))
}

/// Rules are append-only; a new rule supersedes older ones from its
/// effective date onward. There is deliberately no update or delete.
pub async fn create_working_rule(
    claims: Claims,
    repo: web::Data<WorkingRuleRepository>,
    resolver: web::Data<DateRuleResolver>,
    input: web::Json<WorkingRuleInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can create working rules".to_string(),
        ));
    }

    input.validate().map_err(AppError::BadRequest)?;

    let rule = repo.create(&input).await?;
    resolver.invalidate();
    Ok(HttpResponse::Created().json(ApiResponse::success(rule)))
}
