//! Run-scoped log.
//!
//! Every message is forwarded to the `log` facade and buffered with an
//! RFC 3339 timestamp so the whole run can be saved as a plaintext file
//! once the pipeline finishes.

use crate::errors::{Result, WebfixError};
use chrono::{SecondsFormat, Utc};
use log::Level;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct RunLog {
    lines: Vec<String>,
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.push(Level::Info, message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.push(Level::Warn, message.as_ref());
    }

    pub fn debug(&mut self, message: impl AsRef<str>) {
        self.push(Level::Debug, message.as_ref());
    }

    fn push(&mut self, level: Level, message: &str) {
        log::log!(level, "{}", message);
        self.lines.push(format!("[{}] {}", timestamp(), message));
    }

    /// Buffered lines in emission order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Write the buffer to `fix_log_<timestamp>.log` under `dir`.
    ///
    /// `:` and `.` in the timestamp become `-` so the name is portable.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let stamp = timestamp().replace([':', '.'], "-");
        let path = dir.join(format!("fix_log_{}.log", stamp));
        fs::write(&path, self.lines.join("\n")).map_err(|e| WebfixError::io(&path, e))?;
        Ok(path)
    }
}
