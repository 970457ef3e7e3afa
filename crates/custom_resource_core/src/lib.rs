//! CloudFormation custom-resource dispatch primitives.
//!
//! This crate owns the event/response contract, the operation kinds and their
//! parameters, the capability seams and the dispatcher that maps one event to
//! exactly one terminal outcome. It excludes AWS SDK and Lambda runtime
//! concerns, which live in `custom_resource_lambda`.

pub mod capability;
pub mod contract;
pub mod dispatcher;
pub mod metric;
pub mod operation;
pub mod presets;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;
