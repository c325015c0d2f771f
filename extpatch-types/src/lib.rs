//! Shared DTOs (schemas-as-code) for the extpatch workspace.
//!
//! # Design constraints
//! - These types are serialized to disk as part of run reports.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod event;
pub mod file;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const EXTPATCH_REPORT_V1: &str = "extpatch.report.v1";
}
