//! Contact quality scoring and advisor distribution for a sales CRM.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
