//! The fix run: init log dir, walk, fix each file, save reports, save log.
//!
//! Strictly sequential. No step aborts the run; failures are logged and the
//! next step still happens. The report is the only state and it is passed
//! by reference through every step.

use crate::config::Effective;
use crate::errors::{Result, WebfixError};
use crate::fix::{process_file, FileStatus, Registry};
use crate::models::RunReport;
use crate::report::save_reports;
use crate::runlog::RunLog;
use crate::walk::{absolutize, walk, WalkFilter};
use std::fs;
use std::path::PathBuf;

/// Inputs for one run, usually built from `Effective`.
#[derive(Debug, Clone)]
pub struct AutofixOptions {
    pub root: PathBuf,
    pub log_dir: PathBuf,
    pub report_json: PathBuf,
    pub report_html: PathBuf,
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
    pub write: bool,
}

impl From<&Effective> for AutofixOptions {
    fn from(eff: &Effective) -> Self {
        AutofixOptions {
            root: eff.root.clone(),
            log_dir: eff.log_dir.clone(),
            report_json: eff.report_json.clone(),
            report_html: eff.report_html.clone(),
            extensions: eff.extensions.clone(),
            exclude: eff.exclude.clone(),
            write: eff.write,
        }
    }
}

#[derive(Debug)]
pub struct AutofixOutcome {
    pub report: RunReport,
    /// Files that changed (or would have, with writes off).
    pub changed_files: Vec<String>,
    pub reports_written: usize,
    pub log_file: Option<PathBuf>,
}

impl AutofixOutcome {
    pub fn any_changed(&self) -> bool {
        !self.changed_files.is_empty()
    }
}

/// Run the whole pipeline.
///
/// Only an invalid exclude pattern is returned as an error, before anything
/// is touched on disk.
pub fn run_autofix(opts: &AutofixOptions, registry: &Registry) -> Result<AutofixOutcome> {
    let mut log = RunLog::new();
    let mut report = RunReport::new();

    let extensions: Vec<String> = opts
        .extensions
        .iter()
        .filter(|ext| {
            let ok = registry.supports(ext);
            if !ok {
                log.warn(format!("warning: no fixer for extension {}, ignoring", ext));
            }
            ok
        })
        .cloned()
        .collect();
    let skip = vec![
        absolutize(&opts.report_json),
        absolutize(&opts.report_html),
        absolutize(&opts.log_dir),
    ];
    let filter = WalkFilter::new(&extensions, &opts.exclude, skip)?;

    log.info("starting web syntax fix run");
    let log_dir_ready = match fs::create_dir_all(&opts.log_dir) {
        Ok(()) => true,
        Err(e) => {
            let err = WebfixError::io(&opts.log_dir, e);
            log.warn(format!("error: failed to create log directory - {}", err));
            false
        }
    };

    let root = absolutize(&opts.root);
    if !opts.write {
        log.info("check mode: source files will not be written");
    }
    let mut changed_files = Vec::new();
    walk(&root, &filter, &mut log, |path, log| {
        let Some(heuristic) = registry.for_path(path) else {
            return;
        };
        match process_file(path, heuristic, opts.write, &mut report, log) {
            FileStatus::Fixed | FileStatus::WouldFix => {
                changed_files.push(path.to_string_lossy().to_string())
            }
            FileStatus::Unchanged | FileStatus::Failed => {}
        }
    });

    let reports_written = save_reports(&report, &opts.report_json, &opts.report_html, &mut log);

    log.info("fix run finished");
    log.info(format!("total files: {}", report.total_files));
    log.info(format!("fixed files: {}", report.fixed_files));
    log.info(format!("total issues: {}", report.total_errors));
    log.info(format!("fixed issues: {}", report.fixed_errors));
    log.info(format!("remaining: {}", report.remaining()));
    for (kind, count) in report.errors_by_type.iter() {
        log.info(format!("  {}: {}", kind, count));
    }

    let log_file = if log_dir_ready {
        match log.save(&opts.log_dir) {
            Ok(p) => {
                log::info!("log saved to: {}", p.to_string_lossy());
                Some(p)
            }
            Err(e) => {
                log::warn!("error: failed to save log - {}", e);
                None
            }
        }
    } else {
        None
    };

    Ok(AutofixOutcome {
        report,
        changed_files,
        reports_written,
        log_file,
    })
}
