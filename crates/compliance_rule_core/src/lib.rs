//! Shared compliance-rule domain primitives.
//!
//! This crate owns the evaluation contracts (inbound envelope, invoking event
//! shapes, configuration items, evaluation submissions) and the pure stages of
//! the pipeline: applicability and rule evaluation. It intentionally excludes
//! AWS SDK and Lambda runtime concerns.

pub mod applicability;
pub mod configuration_item;
pub mod contract;
pub mod error;
pub mod guard;
pub mod invoking_event;
pub mod rule;
