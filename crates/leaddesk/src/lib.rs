pub mod config;
pub mod dashboard;
pub mod error;
pub mod intake;
pub mod records;
pub mod store;
pub mod telemetry;
