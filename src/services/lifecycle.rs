use std::future::Future;

use chrono::Datelike;
use uuid::Uuid;

use super::duration::{DurationOptions, LeaveDurationCalculator};
use super::ledger::BalanceLedger;
use super::overlap::OverlapValidator;
use crate::database::models::{
    AttendanceSource, AttendanceStatus, LeaveRequest, LeaveRequestInput, LeaveStatus,
    LeaveValidationReport,
};
use crate::database::repositories::{AttendanceRepository, LeaveRequestRepository};
use crate::error::AppError;

/// State machine over leave requests: `pending` is the only non-terminal
/// state, and every transition drives the balance ledger. Approval also
/// stamps attendance records, strictly after the ledger commit.
#[derive(Clone)]
pub struct LeaveRequestLifecycle {
    leave_repository: LeaveRequestRepository,
    attendance_repository: AttendanceRepository,
    overlap: OverlapValidator,
    duration: LeaveDurationCalculator,
    ledger: BalanceLedger,
    write_retries: u32,
}

impl LeaveRequestLifecycle {
    pub fn new(
        leave_repository: LeaveRequestRepository,
        attendance_repository: AttendanceRepository,
        overlap: OverlapValidator,
        duration: LeaveDurationCalculator,
        ledger: BalanceLedger,
        write_retries: u32,
    ) -> Self {
        Self {
            leave_repository,
            attendance_repository,
            overlap,
            duration,
            ledger,
            write_retries: write_retries.max(1),
        }
    }

    /// Dry run of the submission checks: duration breakdown, overlap and
    /// balance coverage, without touching any state.
    pub async fn validate_application(
        &self,
        input: &LeaveRequestInput,
        exclude_request_id: Option<Uuid>,
    ) -> Result<LeaveValidationReport, AppError> {
        check_half_day_shape(input)?;

        let overlap = self
            .overlap
            .check(
                input.employee_id,
                input.start_date,
                input.end_date,
                exclude_request_id,
            )
            .await?;
        let duration = self
            .duration
            .duration(
                input.start_date,
                input.end_date,
                DurationOptions::partitioned(input.is_half_day),
            )
            .await?;
        let balance = self
            .ledger
            .validate(
                input.employee_id,
                input.leave_type,
                &duration.total_days,
                input.start_date.year(),
            )
            .await?;

        Ok(LeaveValidationReport {
            duration,
            overlap,
            balance,
        })
    }

    /// Submission: overlap check, duration, balance validation, reservation,
    /// then persist as pending. A failed insert hands the reservation back.
    pub async fn submit(&self, input: &LeaveRequestInput) -> Result<LeaveRequest, AppError> {
        check_half_day_shape(input)?;

        let overlap = self
            .overlap
            .check(input.employee_id, input.start_date, input.end_date, None)
            .await?;
        if let Some(conflicting) = overlap.conflicting_request {
            return Err(AppError::Overlap {
                conflicting_request_id: conflicting.id,
            });
        }

        let duration = self
            .duration
            .duration(
                input.start_date,
                input.end_date,
                DurationOptions::calendar(input.is_half_day),
            )
            .await?;
        let days = duration.total_days.clone();
        let year = input.start_date.year();

        let validation = self
            .ledger
            .validate(input.employee_id, input.leave_type, &days, year)
            .await?;
        if !validation.is_valid {
            return Err(AppError::insufficient_balance(
                validation.available,
                validation.requested,
            ));
        }

        self.retry_ledger(|| {
            self.ledger
                .reserve(input.employee_id, input.leave_type, &days, year, None)
        })
        .await?;

        match self.leave_repository.create(input, &days).await {
            Ok(request) => Ok(request),
            Err(err) => {
                log::error!(
                    "Persisting leave request for employee {} failed after reservation: {}; releasing",
                    input.employee_id,
                    err
                );
                if let Err(release_err) = self
                    .retry_ledger(|| {
                        self.ledger.release(
                            input.employee_id,
                            input.leave_type,
                            &days,
                            year,
                            None,
                            "Released after failed submission",
                        )
                    })
                    .await
                {
                    log::error!(
                        "Releasing orphaned reservation for employee {} failed: {}",
                        input.employee_id,
                        release_err
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Approval, only from `pending`. The status flip claims the request
    /// atomically (a concurrent approver loses), then the ledger commit moves
    /// the reserved days to used, then attendance is stamped. An attendance
    /// failure after the commit surfaces as a partial failure; the ledger is
    /// never silently rolled back.
    pub async fn approve(
        &self,
        request_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<LeaveRequest, AppError> {
        let request = self.require(request_id).await?;
        if request.status != LeaveStatus::Pending {
            return Err(AppError::invalid_transition("approve", request.status));
        }

        let approved = match self.leave_repository.set_approved(request_id, reviewer_id).await? {
            Some(request) => request,
            None => return Err(self.lost_claim("approve", request_id).await),
        };

        let days = approved.total_days.clone();
        let year = approved.start_date.year();
        if let Err(err) = self
            .retry_ledger(|| {
                self.ledger.commit(
                    approved.employee_id,
                    approved.leave_type,
                    &days,
                    year,
                    Some(approved.id),
                )
            })
            .await
        {
            log::error!(
                "Ledger commit failed after claiming approval of request {}: {}; reopening",
                approved.id,
                err
            );
            self.reopen_after_failure(approved.id).await;
            return Err(err);
        }

        if let Err(err) = self.stamp_attendance(&approved).await {
            log::error!(
                "Attendance stamping failed for approved request {}: {}",
                approved.id,
                err
            );
            return Err(AppError::PartialFailure(format!(
                "leave request {} was approved and the balance committed, but attendance records were not fully written: {}",
                approved.id, err
            )));
        }

        Ok(approved)
    }

    /// Rejection, only from `pending`, and only with a reason.
    pub async fn reject(
        &self,
        request_id: Uuid,
        reviewer_id: Uuid,
        reason: &str,
    ) -> Result<LeaveRequest, AppError> {
        if reason.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Rejection reason is required".to_string(),
            ));
        }

        let request = self.require(request_id).await?;
        if request.status != LeaveStatus::Pending {
            return Err(AppError::invalid_transition("reject", request.status));
        }

        let rejected = match self
            .leave_repository
            .set_rejected(request_id, reviewer_id, reason)
            .await?
        {
            Some(request) => request,
            None => return Err(self.lost_claim("reject", request_id).await),
        };

        self.release_or_reopen(&rejected, "Released on rejection")
            .await?;
        Ok(rejected)
    }

    /// Cancellation, only from `pending` and only by the requesting
    /// employee. Attendance is untouched: nothing was stamped yet.
    pub async fn cancel(
        &self,
        request_id: Uuid,
        employee_id: Uuid,
    ) -> Result<LeaveRequest, AppError> {
        let request = self.require(request_id).await?;
        if request.employee_id != employee_id {
            return Err(AppError::Forbidden(
                "Only the requesting employee can cancel a leave request".to_string(),
            ));
        }
        if request.status != LeaveStatus::Pending {
            return Err(AppError::invalid_transition("cancel", request.status));
        }

        let cancelled = match self.leave_repository.set_cancelled(request_id).await? {
            Some(request) => request,
            None => return Err(self.lost_claim("cancel", request_id).await),
        };

        self.release_or_reopen(&cancelled, "Released on cancellation")
            .await?;
        Ok(cancelled)
    }

    async fn release_or_reopen(
        &self,
        request: &LeaveRequest,
        description: &str,
    ) -> Result<(), AppError> {
        let days = request.total_days.clone();
        let year = request.start_date.year();
        if let Err(err) = self
            .retry_ledger(|| {
                self.ledger.release(
                    request.employee_id,
                    request.leave_type,
                    &days,
                    year,
                    Some(request.id),
                    description,
                )
            })
            .await
        {
            log::error!(
                "Ledger release failed for request {}: {}; reopening",
                request.id,
                err
            );
            self.reopen_after_failure(request.id).await;
            return Err(err);
        }
        Ok(())
    }

    /// One record per affected date; a half-day request stamps the start
    /// date only. The reason is derived from the leave type, never from the
    /// employee's free-text reason.
    async fn stamp_attendance(&self, request: &LeaveRequest) -> Result<(), AppError> {
        let status = if request.is_half_day {
            AttendanceStatus::HalfDay
        } else {
            AttendanceStatus::OnLeave
        };
        let reason = request.attendance_reason();
        let last = if request.is_half_day {
            request.start_date
        } else {
            request.end_date
        };

        for date in request.start_date.iter_days().take_while(|d| *d <= last) {
            self.attendance_repository
                .upsert_record(
                    request.employee_id,
                    date,
                    status,
                    &reason,
                    AttendanceSource::LeaveApproval,
                )
                .await?;
        }
        Ok(())
    }

    /// Bounded retry for ledger writes that lose the optimistic version
    /// race. Any other error propagates immediately.
    async fn retry_ledger<T, F, Fut>(&self, mut op: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(AppError::ConcurrencyConflict) if attempt < self.write_retries => {
                    log::warn!(
                        "Ledger write lost a version race (attempt {}/{}); retrying",
                        attempt,
                        self.write_retries
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn require(&self, request_id: Uuid) -> Result<LeaveRequest, AppError> {
        self.leave_repository
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {}", request_id)))
    }

    /// The guarded status flip found the row no longer pending: report the
    /// status it actually has now.
    async fn lost_claim(&self, action: &'static str, request_id: Uuid) -> AppError {
        let current = match self.leave_repository.find_by_id(request_id).await {
            Ok(Some(request)) => request.status.to_string(),
            _ => "unknown".to_string(),
        };
        AppError::invalid_transition(action, current)
    }

    async fn reopen_after_failure(&self, request_id: Uuid) {
        if let Err(err) = self.leave_repository.reopen(request_id).await {
            log::error!(
                "Reopening request {} after a failed ledger write also failed: {}",
                request_id,
                err
            );
        }
    }
}

/// Half-day requests are tied to exactly one date and must say which half.
fn check_half_day_shape(input: &LeaveRequestInput) -> Result<(), AppError> {
    if input.is_half_day {
        if input.start_date != input.end_date {
            return Err(AppError::BadRequest(
                "Half-day leave must start and end on the same date".to_string(),
            ));
        }
        if input.half_day_period.is_none() {
            return Err(AppError::BadRequest(
                "Half-day leave requires a morning or afternoon period".to_string(),
            ));
        }
    }
    Ok(())
}
