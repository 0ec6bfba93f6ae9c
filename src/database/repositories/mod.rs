pub mod attendance;
pub mod employee;
pub mod holiday;
pub mod leave_balance;
pub mod leave_request;
pub mod working_rule;

// Re-export all repositories for easy importing
pub use attendance::AttendanceRepository;
pub use employee::EmployeeRepository;
pub use holiday::HolidayRepository;
pub use leave_balance::LeaveBalanceRepository;
pub use leave_request::LeaveRequestRepository;
pub use working_rule::WorkingRuleRepository;
