//! Report emitter: indented JSON and a static HTML summary page.
//!
//! Emission happens after every file has been processed, so failures here
//! are logged and never undo or abort anything.

use crate::errors::{Result, WebfixError};
use crate::models::RunReport;
use crate::runlog::RunLog;
use chrono::{DateTime, Utc};
use html_escape::encode_text;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const STYLE: &str = r#"
    body { font-family: system-ui, sans-serif; max-width: 1100px; margin: 0 auto; padding: 24px; color: #1f2933; background: #f4f6f8; }
    h1 { border-bottom: 2px solid #2f855a; padding-bottom: 8px; color: #2f855a; }
    section { background: #fff; border-radius: 8px; padding: 16px 20px; margin-bottom: 24px; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
    .stat { display: inline-block; margin: 0 24px 8px 0; font-size: 17px; }
    .stat b { color: #2f855a; }
    .file { border-left: 4px solid #2f855a; background: #fafafa; padding: 10px 14px; margin-bottom: 14px; }
    .path { font-weight: 600; margin-bottom: 6px; word-break: break-all; }
    .entry { margin-left: 16px; }
    .entry.fixed { color: #2f855a; }
    .entry.unfixed { color: #c53030; }
    .clean { color: #2f855a; }
    footer { text-align: right; color: #718096; font-size: 13px; }
"#;

pub fn render_json(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render the HTML summary. All report text is escaped.
pub fn render_html(report: &RunReport, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"UTF-8\">\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    out.push_str("  <title>Web Syntax Fix Report</title>\n");
    let _ = write!(out, "  <style>{}  </style>\n</head>\n<body>\n", STYLE);
    out.push_str("  <h1>Web Syntax Fix Report</h1>\n");

    out.push_str("  <section class=\"summary\">\n    <h2>Summary</h2>\n");
    for (label, value) in [
        ("Files processed", report.total_files),
        ("Files fixed", report.fixed_files),
        ("Issues found", report.total_errors),
        ("Issues fixed", report.fixed_errors),
    ] {
        let _ = writeln!(
            out,
            "    <div class=\"stat\">{}: <b>{}</b></div>",
            label, value
        );
    }
    out.push_str("    <h3>By type</h3>\n    <ul>\n");
    for (kind, count) in report.errors_by_type.iter() {
        let _ = writeln!(out, "      <li>{}: {}</li>", encode_text(kind), count);
    }
    out.push_str("    </ul>\n  </section>\n");

    out.push_str("  <section class=\"files\">\n    <h2>Files</h2>\n");
    for file in &report.files_processed {
        out.push_str("    <div class=\"file\">\n");
        let _ = writeln!(
            out,
            "      <div class=\"path\">{}</div>",
            encode_text(&file.path)
        );
        if file.errors.is_empty() {
            out.push_str("      <div class=\"clean\">no issues</div>\n");
        }
        for e in &file.errors {
            let (class, tag) = if e.fixed {
                ("fixed", "[fixed]")
            } else {
                ("unfixed", "[unfixed]")
            };
            let _ = writeln!(
                out,
                "      <div class=\"entry {}\">{} {}: {}</div>",
                class,
                tag,
                encode_text(&e.kind),
                encode_text(&e.description)
            );
        }
        out.push_str("    </div>\n");
    }
    out.push_str("  </section>\n");
    let _ = writeln!(
        out,
        "  <footer>Generated {}</footer>\n</body>\n</html>",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| WebfixError::io(parent, e))?;
        }
    }
    fs::write(path, body).map_err(|e| WebfixError::io(path, e))
}

/// Write both reports. Returns how many were written.
pub fn save_reports(report: &RunReport, json_path: &Path, html_path: &Path, log: &mut RunLog) -> usize {
    let mut written = 0;
    match render_json(report).and_then(|s| write_file(json_path, &s)) {
        Ok(()) => {
            written += 1;
            log.info(format!("JSON report saved to: {}", json_path.to_string_lossy()));
        }
        Err(e) => log.warn(format!("error: failed to save JSON report - {}", e)),
    }
    match write_file(html_path, &render_html(report, Utc::now())) {
        Ok(()) => {
            written += 1;
            log.info(format!("HTML report saved to: {}", html_path.to_string_lossy()));
        }
        Err(e) => log.warn(format!("error: failed to save HTML report - {}", e)),
    }
    written
}
