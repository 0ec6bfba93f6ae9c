pub mod auth;
pub mod balance;
pub mod calendar;
pub mod holiday;
pub mod leave;
pub mod shared;
pub mod working_rule;

pub use shared::ApiResponse;
