//! Directory walker.
//!
//! Visits every entry under the root in file-name order and hands each
//! regular file with an allowed extension to the caller. Symlinks are
//! followed; a link loop or an unreadable directory is logged and the walk
//! carries on with the siblings.

use crate::errors::{Result, WebfixError};
use crate::fix::extension_of;
use crate::runlog::RunLog;
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct WalkFilter {
    extensions: Vec<String>,
    exclude: Vec<Pattern>,
    skip: Vec<PathBuf>,
}

impl WalkFilter {
    /// `exclude` globs match paths relative to the walk root; `skip` holds
    /// absolute paths (files or directories) that are never visited.
    pub fn new(extensions: &[String], exclude: &[String], skip: Vec<PathBuf>) -> Result<Self> {
        let exclude = exclude
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| WebfixError::Config {
                    path: PathBuf::from(p),
                    message: format!("bad exclude pattern: {}", e),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(WalkFilter {
            extensions: extensions.to_vec(),
            exclude,
            skip,
        })
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        if self.skip.iter().any(|s| path.starts_with(s)) {
            return true;
        }
        let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
        self.exclude.iter().any(|p| p.matches_path(&rel))
    }

    fn accepts(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.contains(&ext))
    }
}

/// Absolute form of `p`, resolving symlinks where the path already exists.
pub fn absolutize(p: &Path) -> PathBuf {
    if let Ok(c) = p.canonicalize() {
        return c;
    }
    match (p.parent(), p.file_name()) {
        (Some(parent), Some(name)) => match parent.canonicalize() {
            Ok(c) => c.join(name),
            Err(_) => p.to_path_buf(),
        },
        _ => p.to_path_buf(),
    }
}

/// Walk `root`, calling `visit` for each accepted file. Returns the number
/// of files visited.
pub fn walk(
    root: &Path,
    filter: &WalkFilter,
    log: &mut RunLog,
    mut visit: impl FnMut(&Path, &mut RunLog),
) -> usize {
    let mut visited = 0usize;
    let entries = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !filter.is_excluded(root, e.path()));
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let err = WebfixError::Walk {
                    path: e.path().unwrap_or(root).to_path_buf(),
                    message: e.to_string(),
                };
                log.warn(format!("error: failed to scan - {}", err));
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_dir() {
            log.info(format!("scanning directory: {}", path.to_string_lossy()));
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        if !filter.accepts(path) {
            log.debug(format!("skipping unsupported file: {}", path.to_string_lossy()));
            continue;
        }
        visited += 1;
        visit(path, log);
    }
    visited
}
