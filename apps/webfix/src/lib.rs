//! webfix core library.
//!
//! This crate exposes programmatic APIs for heuristically repairing common
//! syntax slips in web UI sources and for the non-rendering cores of the
//! dashboard assistant and metrics widgets.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `walk`: Directory walking with extension and exclusion filters.
//! - `fix`: Per-language heuristics behind the `SyntaxHeuristic` trait.
//! - `autofix`: The sequential fix run from log dir setup to saved logs.
//! - `models`: Findings, file records and the run report.
//! - `report`: JSON and HTML report emission.
//! - `runlog`: Timestamped run log saved as plaintext.
//! - `output`: Human/JSON console printers.
//! - `assistant`: Chat assistant core (quick replies, responder, history).
//! - `monitor`: Metrics window, thresholds and exported report.
//! - `errors`: Shared error type.
//! - `utils`: Supporting helpers.
pub mod assistant;
pub mod autofix;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fix;
pub mod models;
pub mod monitor;
pub mod output;
pub mod report;
pub mod runlog;
pub mod utils;
pub mod walk;
