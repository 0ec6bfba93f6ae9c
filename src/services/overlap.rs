use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::models::OverlapCheck;
use crate::database::repositories::LeaveRequestRepository;
use crate::error::AppError;

/// Detects collisions between a candidate leave range and the employee's
/// existing pending/approved requests. Rejected and cancelled requests never
/// conflict.
#[derive(Clone)]
pub struct OverlapValidator {
    leave_repository: LeaveRequestRepository,
}

impl OverlapValidator {
    pub fn new(leave_repository: LeaveRequestRepository) -> Self {
        Self { leave_repository }
    }

    /// `exclude_request_id` lets an update-in-place ignore the row being
    /// edited.
    pub async fn check(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        exclude_request_id: Option<Uuid>,
    ) -> Result<OverlapCheck, AppError> {
        if start > end {
            return Err(AppError::InvalidRange { start, end });
        }

        let candidates = self
            .leave_repository
            .find_overlapping(employee_id, start, end, exclude_request_id)
            .await?;

        let conflicting_request = candidates
            .into_iter()
            .find(|r| ranges_overlap(start, end, r.start_date, r.end_date));

        Ok(OverlapCheck {
            has_overlap: conflicting_request.is_some(),
            conflicting_request,
        })
    }
}

/// Symmetric interval intersection. All four arrangements are covered:
/// a starts inside b, a ends inside b, a contains b, b contains a.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    (a_start >= b_start && a_start <= b_end)
        || (a_end >= b_start && a_end <= b_end)
        || (a_start <= b_start && a_end >= b_end)
        || (b_start <= a_start && b_end >= a_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn detects_all_four_intersection_cases() {
        let b = (date(2025, 3, 10), date(2025, 3, 14));

        // starts inside
        assert!(ranges_overlap(date(2025, 3, 12), date(2025, 3, 20), b.0, b.1));
        // ends inside
        assert!(ranges_overlap(date(2025, 3, 5), date(2025, 3, 11), b.0, b.1));
        // contains
        assert!(ranges_overlap(date(2025, 3, 1), date(2025, 3, 31), b.0, b.1));
        // contained
        assert!(ranges_overlap(date(2025, 3, 11), date(2025, 3, 13), b.0, b.1));
    }

    #[test]
    fn shared_endpoint_counts_as_overlap() {
        assert!(ranges_overlap(
            date(2025, 3, 14),
            date(2025, 3, 18),
            date(2025, 3, 10),
            date(2025, 3, 14),
        ));
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        let disjoint = ranges_overlap(
            date(2025, 3, 15),
            date(2025, 3, 18),
            date(2025, 3, 10),
            date(2025, 3, 14),
        );
        assert_eq!(disjoint, false);
    }
}
