//! AWS-oriented adapters and handlers for compliance-rule evaluation.
//!
//! This crate owns runtime integration details (the Lambda pipeline, the
//! compliance service seam, configuration and tracing setup). Contracts and
//! pure evaluation logic live in `compliance_rule_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;
