//! Shared data models for fix findings and the run report.

pub mod report;

pub use report::RunReport;

use serde::Serialize;

/// Category labels attached to findings.
///
/// Labels are free-form in the report; these are the ones the built-in
/// heuristics emit.
pub mod kind {
    pub const MISSING_CHARSET: &str = "missing-charset";
    pub const UNCLOSED_TAG: &str = "unclosed-tag";
    pub const UNQUOTED_ATTRIBUTE: &str = "unquoted-attribute";
    pub const DUPLICATE_ID: &str = "duplicate-id";
    pub const STRAY_CHARACTER: &str = "stray-character";
    pub const EXTRA_BACKTICKS: &str = "extra-backticks";
    pub const MISSING_IF_BRACES: &str = "missing-if-braces";
    pub const TRAILING_COMMA: &str = "trailing-comma";
    pub const SHORTHAND_PROPERTY: &str = "shorthand-property";
    pub const DUPLICATE_FUNCTION: &str = "duplicate-function";
    pub const MISSING_SEMICOLON: &str = "missing-semicolon";
    pub const PROCESSING_ERROR: &str = "processing-error";
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single result produced by a heuristic, before it is tied to a file.
pub struct Finding {
    pub kind: String,
    pub description: String,
    pub fixed: bool,
}

impl Finding {
    /// Content was rewritten.
    pub fn fixed(kind: &str, description: impl Into<String>) -> Self {
        Finding {
            kind: kind.to_string(),
            description: description.into(),
            fixed: true,
        }
    }

    /// Detected only; left for a human to resolve.
    pub fn detected(kind: &str, description: impl Into<String>) -> Self {
        Finding {
            kind: kind.to_string(),
            description: description.into(),
            fixed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
/// An entry in a file record. Never revised once appended.
pub struct ErrorEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub fixed: bool,
}

#[derive(Debug, Clone, Serialize)]
/// Per-path accumulator, created on the first finding for that path.
pub struct FileRecord {
    pub path: String,
    pub errors: Vec<ErrorEntry>,
}
