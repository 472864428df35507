//! Per-extension fixer.
//!
//! Each language sits behind `SyntaxHeuristic`, a pure content-to-content
//! rewrite that also reports what it saw. The registry maps a lowercase
//! extension to its heuristic; `process_file` does the I/O around one file
//! and feeds findings into the run report.

pub mod css;
pub mod html;
pub mod js;

use crate::models::{kind, Finding, RunReport};
use crate::runlog::RunLog;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub use css::CssHeuristic;
pub use html::HtmlHeuristic;
pub use js::JsHeuristic;

/// Result of running one heuristic over one file's content.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub content: String,
    pub findings: Vec<Finding>,
}

impl FixOutcome {
    pub fn unchanged(content: &str) -> Self {
        FixOutcome {
            content: content.to_string(),
            findings: Vec::new(),
        }
    }

    /// True when at least one fix fired.
    pub fn changed(&self) -> bool {
        self.findings.iter().any(|f| f.fixed)
    }
}

/// A rewrite strategy for one language.
///
/// Implementations must not touch the filesystem; a real parser can replace
/// any of the built-in pattern matchers without changes to the walker or
/// the collector.
pub trait SyntaxHeuristic {
    fn language(&self) -> &'static str;
    fn apply(&self, content: &str) -> FixOutcome;
}

/// Extension-keyed heuristic registry.
pub struct Registry {
    by_ext: BTreeMap<String, Box<dyn SyntaxHeuristic>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    pub fn empty() -> Self {
        Registry {
            by_ext: BTreeMap::new(),
        }
    }

    /// `.html`, `.js` and `.css`.
    pub fn builtin() -> Self {
        let mut r = Self::empty();
        r.register(".html", Box::new(HtmlHeuristic::new()));
        r.register(".js", Box::new(JsHeuristic::new()));
        r.register(".css", Box::new(CssHeuristic::new()));
        r
    }

    pub fn register(&mut self, ext: &str, heuristic: Box<dyn SyntaxHeuristic>) {
        self.by_ext.insert(normalize_ext(ext), heuristic);
    }

    pub fn supports(&self, ext: &str) -> bool {
        self.by_ext.contains_key(&normalize_ext(ext))
    }

    pub fn for_path(&self, path: &Path) -> Option<&dyn SyntaxHeuristic> {
        let ext = extension_of(path)?;
        self.by_ext.get(&ext).map(|h| &**h)
    }
}

/// Lowercase with a leading dot: `HTML` and `.Html` both become `.html`.
pub fn normalize_ext(ext: &str) -> String {
    let e = ext.trim().to_ascii_lowercase();
    if e.starts_with('.') {
        e
    } else {
        format!(".{}", e)
    }
}

pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| normalize_ext(&e.to_string_lossy()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Unchanged,
    Fixed,
    /// Check mode: fixes fired but nothing was written.
    WouldFix,
    Failed,
}

/// Read, fix, and conditionally rewrite one file.
///
/// Read and write failures become `processing-error` findings; the caller
/// keeps going either way.
pub fn process_file(
    path: &Path,
    heuristic: &dyn SyntaxHeuristic,
    write: bool,
    report: &mut RunReport,
    log: &mut RunLog,
) -> FileStatus {
    let key = path.to_string_lossy().to_string();
    log.info(format!("reading file: {}", key));
    let content = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            log.warn(format!("error: failed to process {} - {}", key, e));
            report.record_finding(&key, kind::PROCESSING_ERROR, &e.to_string(), false);
            return FileStatus::Failed;
        }
    };
    report.count_file();

    log.info(format!("processing {} file: {}", heuristic.language(), key));
    let outcome = heuristic.apply(&content);
    for f in &outcome.findings {
        if f.fixed {
            log.info(format!("  - fixed: {}", f.description));
        } else {
            log.warn(format!("  - warning: {}", f.description));
        }
        report.record(&key, f);
    }

    if !outcome.changed() {
        log.info("  - done: no fixes needed");
        return FileStatus::Unchanged;
    }
    if !write {
        report.count_fixed_file();
        log.info("  - done: file would be fixed (check mode)");
        return FileStatus::WouldFix;
    }
    match fs::write(path, &outcome.content) {
        Ok(()) => {
            report.count_fixed_file();
            log.info("  - done: file fixed");
            log.info(format!("saved fixed file: {}", key));
            FileStatus::Fixed
        }
        Err(e) => {
            log.warn(format!("error: failed to write {} - {}", key, e));
            report.record_finding(&key, kind::PROCESSING_ERROR, &e.to_string(), false);
            FileStatus::Failed
        }
    }
}
