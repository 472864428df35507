//! Run report and the error stat collector.
//!
//! One `RunReport` is built per invocation and threaded through the
//! pipeline by reference. The model is append-only: counters only grow and
//! entries are never revised.

use super::{ErrorEntry, FileRecord, Finding};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub total_files: usize,
    pub fixed_files: usize,
    pub total_errors: usize,
    pub fixed_errors: usize,
    pub errors_by_type: TypeCounts,
    pub files_processed: Vec<FileRecord>,
}

/// Per-category counts in first-seen order; serialized as a JSON object.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypeCounts(Vec<(String, usize)>);

impl TypeCounts {
    pub fn increment(&mut self, kind: &str) {
        match self.0.iter_mut().find(|(k, _)| k == kind) {
            Some((_, n)) => *n += 1,
            None => self.0.push((kind.to_string(), 1)),
        }
    }

    pub fn get(&self, kind: &str) -> Option<&usize> {
        self.0.iter().find(|(k, _)| k == kind).map(|(_, n)| n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, n)| (k.as_str(), *n))
    }

    pub fn values(&self) -> impl Iterator<Item = &usize> {
        self.0.iter().map(|(_, n)| n)
    }
}

impl Serialize for TypeCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, n) in &self.0 {
            map.serialize_entry(k, n)?;
        }
        map.end()
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding for `path`, creating its record on first reference.
    ///
    /// `total_errors` always grows; `fixed_errors` only for fixed entries.
    pub fn record_finding(&mut self, path: &str, kind: &str, description: &str, fixed: bool) {
        let idx = match self.files_processed.iter().position(|f| f.path == path) {
            Some(i) => i,
            None => {
                self.files_processed.push(FileRecord {
                    path: path.to_string(),
                    errors: Vec::new(),
                });
                self.files_processed.len() - 1
            }
        };
        self.files_processed[idx].errors.push(ErrorEntry {
            kind: kind.to_string(),
            description: description.to_string(),
            fixed,
        });
        self.total_errors += 1;
        if fixed {
            self.fixed_errors += 1;
        }
        self.errors_by_type.increment(kind);
    }

    pub fn record(&mut self, path: &str, finding: &Finding) {
        self.record_finding(path, &finding.kind, &finding.description, finding.fixed);
    }

    /// Count a supported file that was read.
    pub fn count_file(&mut self) {
        self.total_files += 1;
    }

    /// Count a file whose content was rewritten.
    pub fn count_fixed_file(&mut self) {
        self.fixed_files += 1;
    }

    pub fn file(&self, path: &str) -> Option<&FileRecord> {
        self.files_processed.iter().find(|f| f.path == path)
    }

    /// Findings left for manual follow-up.
    pub fn remaining(&self) -> usize {
        self.total_errors - self.fixed_errors
    }
}
