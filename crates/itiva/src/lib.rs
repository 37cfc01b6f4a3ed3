//! ITIVA security self-assessment: questionnaire catalog, scoring engine, and
//! per-user report persistence.

pub mod assessment;
pub mod config;
pub mod error;
pub mod reports;
pub mod telemetry;
