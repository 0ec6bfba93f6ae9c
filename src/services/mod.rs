pub mod auth;
pub mod date_rules;
pub mod day_status;
pub mod duration;
pub mod ledger;
pub mod lifecycle;
pub mod overlap;

pub use auth::{AuthService, Claims};
pub use date_rules::DateRuleResolver;
pub use day_status::DayStatusResolver;
pub use duration::{DurationOptions, LeaveDurationCalculator};
pub use ledger::BalanceLedger;
pub use lifecycle::LeaveRequestLifecycle;
pub use overlap::OverlapValidator;
