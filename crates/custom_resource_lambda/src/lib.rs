//! AWS-oriented adapters and the Lambda handler for custom-resource dispatch.
//!
//! This crate owns runtime integration details (SDK-backed capabilities, the
//! CloudFormation response transport and environment configuration) and
//! relies on `custom_resource_core` for the contract and routing.

pub mod adapters;
pub mod config;
pub mod handlers;
