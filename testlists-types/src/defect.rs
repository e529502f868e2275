//! Validation defects.
//!
//! Defects are values, not errors: every check records one and keeps going.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Why a url failed validation, in check priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlIssue {
    PatternMismatch,
    ForbiddenCharacters,
    StrayWhitespace,
    MissingPath,
}

impl UrlIssue {
    pub fn describe(self) -> &'static str {
        match self {
            UrlIssue::PatternMismatch => "No match",
            UrlIssue::ForbiddenCharacters => "Bad chars",
            UrlIssue::StrayWhitespace => "Extra spaces at ends",
            UrlIssue::MissingPath => "No trailing slash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotesIssue {
    MalformedStructure,
    UnknownKey,
    ForbiddenCharacters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefectKind {
    InvalidHeader,
    InvalidColumnNumber,
    InvalidUrl { reason: UrlIssue },
    InvalidNotes { reason: NotesIssue },
    InvalidSource,
    InvalidCategoryCode,
    InvalidCategoryDesc,
    InvalidDate,
    DuplicateUrl,
    DuplicateUrlWithGlobalList,
}

impl DefectKind {
    /// Human-readable name used in the text report.
    pub fn name(self) -> &'static str {
        match self {
            DefectKind::InvalidHeader => "Invalid Header",
            DefectKind::InvalidColumnNumber => "Invalid Column Number",
            DefectKind::InvalidUrl { .. } => "Invalid URL",
            DefectKind::InvalidNotes { .. } => "Invalid Notes",
            DefectKind::InvalidSource => "Invalid Source",
            DefectKind::InvalidCategoryCode => "Invalid Category Code",
            DefectKind::InvalidCategoryDesc => "Invalid Category Description",
            DefectKind::InvalidDate => "Invalid Date",
            DefectKind::DuplicateUrl => "Duplicate URL",
            DefectKind::DuplicateUrlWithGlobalList => {
                "Duplicate URL between Local List and Global List"
            }
        }
    }

    /// Stable machine identifier (`invalid_url`, `duplicate_url`, ...).
    pub fn code(self) -> &'static str {
        match self {
            DefectKind::InvalidHeader => "invalid_header",
            DefectKind::InvalidColumnNumber => "invalid_column_number",
            DefectKind::InvalidUrl { .. } => "invalid_url",
            DefectKind::InvalidNotes { .. } => "invalid_notes",
            DefectKind::InvalidSource => "invalid_source",
            DefectKind::InvalidCategoryCode => "invalid_category_code",
            DefectKind::InvalidCategoryDesc => "invalid_category_desc",
            DefectKind::InvalidDate => "invalid_date",
            DefectKind::DuplicateUrl => "duplicate_url",
            DefectKind::DuplicateUrlWithGlobalList => "duplicate_url_with_global_list",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    #[serde(flatten)]
    pub kind: DefectKind,

    /// The offending column value, when the defect concerns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    pub path: Utf8PathBuf,

    /// 1-based line in the source file.
    pub line: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Defect {
    pub fn new(kind: DefectKind, path: impl Into<Utf8PathBuf>, line: u64) -> Self {
        Self {
            kind,
            value: None,
            path: path.into(),
            line,
            detail: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
