pub mod attendance;
pub mod balance;
pub mod calendar;
pub mod employee;
pub mod holiday;
pub mod leave;
pub(crate) mod macros;
pub mod working_rule;

// Re-export all models for easy importing
pub use attendance::*;
pub use balance::*;
pub use calendar::*;
pub use employee::*;
pub use holiday::*;
pub use leave::*;
pub use working_rule::*;
