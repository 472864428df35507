//! Console rendering for the fix run, the chat replies and metrics polls.
//!
//! Supports `human` (default) and `json` outputs. Color is disabled for
//! JSON and when `NO_COLOR` is set.

use crate::assistant::{Reply, ReplySource};
use crate::autofix::AutofixOutcome;
use crate::monitor::{MetricStatus, Monitor, OverallStatus};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Summary object for `--output json`.
pub fn compose_summary_json(outcome: &AutofixOutcome) -> JsonVal {
    let r = &outcome.report;
    json!({
        "totalFiles": r.total_files,
        "fixedFiles": r.fixed_files,
        "totalErrors": r.total_errors,
        "fixedErrors": r.fixed_errors,
        "remaining": r.remaining(),
    })
}

/// Print the end-of-run summary in the requested format.
pub fn print_fix(outcome: &AutofixOutcome, output: &str, check: bool) {
    if output == "json" {
        match serde_json::to_string_pretty(&compose_summary_json(outcome)) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
        }
        return;
    }
    let color = use_colors(output);
    for rec in &outcome.report.files_processed {
        let fixed = rec.errors.iter().filter(|e| e.fixed).count();
        let open = rec.errors.len() - fixed;
        let path = if color {
            rec.path.clone().bold().to_string()
        } else {
            rec.path.clone()
        };
        let marker = match (open, color) {
            (0, true) => "✔".green().to_string(),
            (0, false) => "✔".to_string(),
            (_, true) => "▲".yellow().to_string(),
            (_, false) => "▲".to_string(),
        };
        println!("{} {} fixed={} open={}", marker, path, fixed, open);
    }
    let r = &outcome.report;
    let verb = if check { "would_fix" } else { "fixed" };
    let summary = format!(
        "Summary: files={} {}={} issues={} fixed={} remaining={}",
        r.total_files,
        verb,
        r.fixed_files,
        r.total_errors,
        r.fixed_errors,
        r.remaining()
    );
    if color {
        println!("{}", summary.bold());
    } else {
        println!("{}", summary);
    }
}

/// Print one assistant reply.
pub fn print_reply(question: &str, reply: &Reply, output: &str) {
    if output == "json" {
        let v = json!({
            "message": question,
            "reply": reply.text,
            "source": reply.source.as_str(),
            "delayMs": reply.delay.as_millis() as u64,
        });
        println!("{}", v);
        return;
    }
    let color = use_colors(output);
    let tag = match (reply.source, color) {
        (ReplySource::Fallback, true) => "assistant (offline):".yellow().bold().to_string(),
        (_, true) => "assistant:".cyan().bold().to_string(),
        (ReplySource::Fallback, false) => "assistant (offline):".to_string(),
        (_, false) => "assistant:".to_string(),
    };
    if color {
        println!("{} {}", "you:".bold(), question);
    } else {
        println!("you: {}", question);
    }
    println!("{} {}", tag, reply.text);
}

fn status_label(status: MetricStatus, color: bool) -> String {
    let s = status.as_str();
    if !color {
        return s.to_string();
    }
    match status {
        MetricStatus::Online => s.green().to_string(),
        MetricStatus::Warning => s.yellow().to_string(),
        MetricStatus::Error => s.red().bold().to_string(),
    }
}

/// Print the latest sample with per-metric and overall status.
pub fn print_metrics(monitor: &Monitor, output: &str) {
    let Some(latest) = monitor.latest() else {
        return;
    };
    let overall = monitor.overall_status();
    if output == "json" {
        let v = json!({
            "metrics": latest,
            "status": overall.as_str(),
        });
        println!("{}", v);
        return;
    }
    let color = use_colors(output);
    for (name, value, status) in latest.rows() {
        println!("{:<12} {:>10.1}  {}", name, value, status_label(status, color));
    }
    let line = format!("overall: {}", overall.as_str());
    if !color {
        println!("{}", line);
        return;
    }
    match overall {
        OverallStatus::Excellent => println!("{}", line.green().bold()),
        OverallStatus::Warning => println!("{}", line.yellow().bold()),
        OverallStatus::Critical => println!("{}", line.red().bold()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{kind, RunReport};

    #[test]
    fn test_summary_json_shape() {
        let mut report = RunReport::new();
        report.count_file();
        report.count_fixed_file();
        report.record_finding("a.js", kind::MISSING_IF_BRACES, "added braces", true);
        report.record_finding("a.js", kind::DUPLICATE_FUNCTION, "duplicate function: f", false);
        let outcome = AutofixOutcome {
            report,
            changed_files: vec!["a.js".into()],
            reports_written: 2,
            log_file: None,
        };
        let v = compose_summary_json(&outcome);
        assert_eq!(
            v,
            json!({
                "totalFiles": 1,
                "fixedFiles": 1,
                "totalErrors": 2,
                "fixedErrors": 1,
                "remaining": 1,
            })
        );
    }

    #[test]
    fn test_json_mode_never_colors() {
        assert!(!use_colors("json"));
    }
}
