pub mod config;
pub mod dashboard;
pub mod employee;
pub mod label;
pub mod period;
pub mod source;
pub mod summarize_hours;
