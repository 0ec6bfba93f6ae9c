use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use crate::database::models::{
    BalanceAdjustmentInput, BalanceAssignmentInput, BalanceChangeType, BalanceValidation,
    ClampReport, LeaveBalance, LeaveBalanceHistory, LeaveType, NewBalanceHistory, UtilizationRow,
};
use crate::database::repositories::LeaveBalanceRepository;
use crate::database::transaction::DatabaseTransaction;
use crate::error::AppError;

/// Authoritative bookkeeping for leave balances. Every mutation is a single
/// atomic operation on one `(employee, leave_type, year)` key: read, apply
/// the pure transition, then write under an optimistic version check with a
/// history row in the same transaction. A lost race surfaces as
/// `ConcurrencyConflict`; the caller decides whether to retry.
#[derive(Clone)]
pub struct BalanceLedger {
    repository: LeaveBalanceRepository,
}

impl BalanceLedger {
    pub fn new(repository: LeaveBalanceRepository) -> Self {
        Self { repository }
    }

    /// Pre-flight check for a submission. Missing balance rows are invalid,
    /// not an error: the caller renders the shortfall to the employee.
    pub async fn validate(
        &self,
        employee_id: Uuid,
        leave_type: LeaveType,
        requested: &BigDecimal,
        year: i32,
    ) -> Result<BalanceValidation, AppError> {
        let balance = self.repository.find(employee_id, leave_type, year).await?;
        Ok(match balance {
            Some(balance) => balance.validate_requested(requested),
            None => BalanceValidation::missing(requested.clone()),
        })
    }

    pub async fn reserve(
        &self,
        employee_id: Uuid,
        leave_type: LeaveType,
        days: &BigDecimal,
        year: i32,
        related_request_id: Option<Uuid>,
    ) -> Result<LeaveBalance, AppError> {
        let mut balance = self.require(employee_id, leave_type, year).await?;
        let previous_remaining = balance.remaining.clone();
        let report = balance.apply_reserve(days)?;
        self.warn_clamps(&balance, BalanceChangeType::Reserve, &report);

        self.persist(
            &balance,
            NewBalanceHistory {
                balance_id: balance.id,
                employee_id,
                leave_type,
                year,
                change_type: BalanceChangeType::Reserve,
                days_changed: days.clone(),
                previous_remaining,
                new_remaining: balance.remaining.clone(),
                description: Some("Reserved on submission".to_string()),
                related_request_id,
            },
        )
        .await?;
        balance.version += 1;
        Ok(balance)
    }

    pub async fn commit(
        &self,
        employee_id: Uuid,
        leave_type: LeaveType,
        days: &BigDecimal,
        year: i32,
        related_request_id: Option<Uuid>,
    ) -> Result<LeaveBalance, AppError> {
        let mut balance = self.require(employee_id, leave_type, year).await?;
        let previous_remaining = balance.remaining.clone();
        let report = balance.apply_commit(days);
        self.warn_clamps(&balance, BalanceChangeType::Commit, &report);

        self.persist(
            &balance,
            NewBalanceHistory {
                balance_id: balance.id,
                employee_id,
                leave_type,
                year,
                change_type: BalanceChangeType::Commit,
                days_changed: days.clone(),
                previous_remaining,
                new_remaining: balance.remaining.clone(),
                description: Some("Committed on approval".to_string()),
                related_request_id,
            },
        )
        .await?;
        balance.version += 1;
        Ok(balance)
    }

    pub async fn release(
        &self,
        employee_id: Uuid,
        leave_type: LeaveType,
        days: &BigDecimal,
        year: i32,
        related_request_id: Option<Uuid>,
        description: &str,
    ) -> Result<LeaveBalance, AppError> {
        let mut balance = self.require(employee_id, leave_type, year).await?;
        let previous_remaining = balance.remaining.clone();
        let report = balance.apply_release(days);
        self.warn_clamps(&balance, BalanceChangeType::Release, &report);

        self.persist(
            &balance,
            NewBalanceHistory {
                balance_id: balance.id,
                employee_id,
                leave_type,
                year,
                change_type: BalanceChangeType::Release,
                days_changed: days.clone(),
                previous_remaining,
                new_remaining: balance.remaining.clone(),
                description: Some(description.to_string()),
                related_request_id,
            },
        )
        .await?;
        balance.version += 1;
        Ok(balance)
    }

    /// Administrative manual correction against a balance row.
    pub async fn adjust(
        &self,
        balance_id: Uuid,
        input: &BalanceAdjustmentInput,
    ) -> Result<LeaveBalance, AppError> {
        let mut balance = self
            .repository
            .find_by_id(balance_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave balance {}", balance_id)))?;
        let previous_remaining = balance.remaining.clone();
        let report = balance.apply_adjustment(input.operation, &input.days);
        self.warn_clamps(&balance, BalanceChangeType::Adjustment, &report);

        let description = input
            .description
            .clone()
            .unwrap_or_else(|| format!("Manual adjustment: {} {}", input.operation, input.days));

        self.persist(
            &balance,
            NewBalanceHistory {
                balance_id: balance.id,
                employee_id: balance.employee_id,
                leave_type: balance.leave_type,
                year: balance.year,
                change_type: BalanceChangeType::Adjustment,
                days_changed: input.days.clone(),
                previous_remaining,
                new_remaining: balance.remaining.clone(),
                description: Some(description),
                related_request_id: None,
            },
        )
        .await?;
        balance.version += 1;
        Ok(balance)
    }

    /// Yearly entitlement upsert, one row per leave type. Updates preserve
    /// accumulated `used`/`pending`.
    pub async fn assign(&self, input: &BalanceAssignmentInput) -> Result<Vec<LeaveBalance>, AppError> {
        let mut results = Vec::new();

        for (leave_type, allocation) in &input.allocations {
            let existing = self
                .repository
                .find(input.employee_id, *leave_type, input.year)
                .await?;

            match existing {
                Some(mut balance) => {
                    let previous_remaining = balance.remaining.clone();
                    let report =
                        balance.apply_assignment(&allocation.allocated, &allocation.carry_forward);
                    self.warn_clamps(&balance, BalanceChangeType::Assignment, &report);

                    self.persist(
                        &balance,
                        NewBalanceHistory {
                            balance_id: balance.id,
                            employee_id: input.employee_id,
                            leave_type: *leave_type,
                            year: input.year,
                            change_type: BalanceChangeType::Assignment,
                            days_changed: allocation.allocated.clone(),
                            previous_remaining,
                            new_remaining: balance.remaining.clone(),
                            description: Some("Yearly assignment".to_string()),
                            related_request_id: None,
                        },
                    )
                    .await?;
                    balance.version += 1;
                    results.push(balance);
                }
                None => {
                    let employee_id = input.employee_id;
                    let year = input.year;
                    let leave_type = *leave_type;
                    let allocated = allocation.allocated.clone();
                    let carry_forward = allocation.carry_forward.clone();

                    let created = DatabaseTransaction::run(move |tx| {
                        Box::pin(async move {
                            let balance = LeaveBalanceRepository::insert_tx(
                                tx,
                                employee_id,
                                leave_type,
                                year,
                                &allocated,
                                &carry_forward,
                            )
                            .await?;
                            LeaveBalanceRepository::append_history_tx(
                                tx,
                                &NewBalanceHistory {
                                    balance_id: balance.id,
                                    employee_id,
                                    leave_type,
                                    year,
                                    change_type: BalanceChangeType::Assignment,
                                    days_changed: allocated.clone(),
                                    previous_remaining: BigDecimal::zero(),
                                    new_remaining: balance.remaining.clone(),
                                    description: Some("Initial assignment".to_string()),
                                    related_request_id: None,
                                },
                            )
                            .await?;
                            Ok(balance)
                        })
                    })
                    .await?;
                    results.push(created);
                }
            }
        }

        Ok(results)
    }

    pub async fn balances(&self, employee_id: Uuid, year: i32) -> Result<Vec<LeaveBalance>, AppError> {
        Ok(self.repository.list_for_year(Some(employee_id), year).await?)
    }

    pub async fn history(
        &self,
        employee_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<LeaveBalanceHistory>, AppError> {
        Ok(self.repository.history(employee_id, limit).await?)
    }

    pub async fn utilization_report(
        &self,
        employee_id: Option<Uuid>,
        year: i32,
    ) -> Result<Vec<UtilizationRow>, AppError> {
        let balances = self.repository.list_for_year(employee_id, year).await?;
        Ok(balances.iter().map(UtilizationRow::from_balance).collect())
    }

    async fn require(
        &self,
        employee_id: Uuid,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<LeaveBalance, AppError> {
        self.repository
            .find(employee_id, leave_type, year)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No {} balance assigned for employee {} in {}",
                    leave_type, employee_id, year
                ))
            })
    }

    /// Writes the mutated row and its history entry atomically. Zero rows
    /// affected means another writer bumped the version first.
    async fn persist(&self, balance: &LeaveBalance, entry: NewBalanceHistory) -> Result<(), AppError> {
        let row = balance.clone();
        DatabaseTransaction::run(move |tx| {
            Box::pin(async move {
                let affected = LeaveBalanceRepository::save_versioned_tx(tx, &row).await?;
                if affected == 0 {
                    return Err(AppError::ConcurrencyConflict);
                }
                LeaveBalanceRepository::append_history_tx(tx, &entry).await?;
                Ok(())
            })
        })
        .await
    }

    fn warn_clamps(&self, balance: &LeaveBalance, change: BalanceChangeType, report: &ClampReport) {
        if !report.is_clean() {
            log::warn!(
                "Balance {} (employee {} {} {}) clamped {:?} to zero during {}; stored values were inconsistent",
                balance.id,
                balance.employee_id,
                balance.leave_type,
                balance.year,
                report.fields(),
                change
            );
        }
    }
}
