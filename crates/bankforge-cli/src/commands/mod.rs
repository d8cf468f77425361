//! CLI command implementations

pub mod convert;
pub mod envelope;
pub mod json_output;

mod reporting;
