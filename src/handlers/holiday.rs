use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::HolidayInput;
use crate::database::repositories::HolidayRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{Claims, DayStatusResolver};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayListQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

pub async fn list_holidays(
    _claims: Claims,
    repo: web::Data<HolidayRepository>,
    query: web::Query<HolidayListQuery>,
) -> Result<HttpResponse, AppError> {
    let holidays = match (query.start, query.end) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(AppError::InvalidRange { start, end });
            }
            repo.list_active_between(start, end).await?
        }
        _ => repo.list_all().await?,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(holidays)))
}

pub async fn create_holiday(
    claims: Claims,
    repo: web::Data<HolidayRepository>,
    resolver: web::Data<DayStatusResolver>,
    input: web::Json<HolidayInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can manage holidays".to_string(),
        ));
    }

    let holiday = repo.create(&input).await?;
    resolver.invalidate_holidays();
    Ok(HttpResponse::Created().json(ApiResponse::success(holiday)))
}

pub async fn update_holiday(
    claims: Claims,
    repo: web::Data<HolidayRepository>,
    resolver: web::Data<DayStatusResolver>,
    path: web::Path<Uuid>,
    input: web::Json<HolidayInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can manage holidays".to_string(),
        ));
    }

    let holiday_id = path.into_inner();
    let holiday = repo
        .update(holiday_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Holiday {}", holiday_id)))?;
    resolver.invalidate_holidays();
    Ok(HttpResponse::Ok().json(ApiResponse::success(holiday)))
}

pub async fn delete_holiday(
    claims: Claims,
    repo: web::Data<HolidayRepository>,
    resolver: web::Data<DayStatusResolver>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can manage holidays".to_string(),
        ));
    }

    let holiday_id = path.into_inner();
    if !repo.delete(holiday_id).await? {
        return Err(AppError::NotFound(format!("Holiday {}", holiday_id)));
    }
    resolver.invalidate_holidays();
    Ok(HttpResponse::NoContent().finish())
}
