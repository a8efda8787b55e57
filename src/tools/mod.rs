//! MCP tool implementations for PipeRun.
//!
//! - **args**: lenient argument parsing shared by every tool
//! - **records**: list/get/create/update/delete pass-throughs and the raw request escape hatch

pub mod args;
pub mod records;

pub use records::RecordTools;
