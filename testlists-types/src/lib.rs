//! Shared DTOs for the test list workspace.
//!
//! # Design constraints
//! - Records mirror the on-disk six-column layout exactly.
//! - Defects and reports are serialized to disk; prefer adding optional
//!   fields over changing semantics.

pub mod defect;
pub mod notes;
pub mod record;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const TESTLISTS_REPORT_V1: &str = "testlists.report.v1";
}

/// Well-known file names inside a lists directory.
pub mod files {
    /// Legend mapping category codes to descriptions.
    pub const LEGEND_FILE: &str = "00-LEGEND-new_category_codes.csv";
    /// Aggregate list checked for cross-file duplicates.
    pub const GLOBAL_FILE: &str = "global.csv";
    /// Files starting with this prefix are legends, not lists.
    pub const LEGEND_PREFIX: &str = "00-";
    /// Only files with this extension are linted.
    pub const LIST_EXTENSION: &str = "csv";
}
