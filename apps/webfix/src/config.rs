//! Configuration discovery and effective settings resolution.
//!
//! webfix reads `webfix.toml|yaml|yml` from the start directory (or the
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Relative paths resolve against the directory holding the config
//! file. Defaults:
//! - `root`: `.`
//! - `log_dir`: `logs/webfix`
//! - `report_json`: `ui_syntax_report.json`
//! - `report_html`: `ui_syntax_fixed.html`
//! - `extensions`: `.html`, `.js`, `.css`
//! - `output`: `human`
//! - `write`: true (forced off by `--check`)
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::errors::{Result, WebfixError};
use crate::fix::normalize_ext;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: [&str; 3] = [".html", ".js", ".css"];
const CONFIG_NAMES: [&str; 3] = ["webfix.toml", "webfix.yaml", "webfix.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// `[assistant]` section.
pub struct AssistantCfg {
    pub max_messages: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[monitor]` section.
pub struct MonitorCfg {
    pub max_data_points: Option<usize>,
    pub interval_secs: Option<u64>,
    pub theme: Option<String>, // dark|light
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `webfix.toml|yaml`.
pub struct WebfixConfig {
    pub root: Option<String>,
    pub log_dir: Option<String>,
    pub report_json: Option<String>,
    pub report_html: Option<String>,
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    pub output: Option<String>,
    pub write: Option<bool>,
    #[serde(default)]
    pub assistant: Option<AssistantCfg>,
    #[serde(default)]
    pub monitor: Option<MonitorCfg>,
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None` falls through to the file.
pub struct Overrides {
    pub start_dir: Option<String>,
    pub root: Option<String>,
    pub log_dir: Option<String>,
    pub report_json: Option<String>,
    pub report_html: Option<String>,
    pub output: Option<String>,
    pub check: bool,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub base_dir: PathBuf,
    pub config_found: bool,
    pub root: PathBuf,
    pub log_dir: PathBuf,
    pub report_json: PathBuf,
    pub report_html: PathBuf,
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
    pub output: String,
    pub write: bool,
    pub check: bool,
    pub max_messages: usize,
    pub assistant_seed: Option<u64>,
    pub max_data_points: usize,
    pub interval_secs: u64,
    pub theme: String,
    pub monitor_seed: Option<u64>,
}

/// Walk upward from `start` to find the directory that owns the config.
///
/// Stops when a `webfix.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_base_dir(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `WebfixConfig` from `webfix.toml` or `webfix.yaml|yml` if present.
pub fn load_config(base: &Path) -> Result<Option<WebfixConfig>> {
    for name in CONFIG_NAMES {
        let p = base.join(name);
        if !p.exists() {
            continue;
        }
        let s = fs::read_to_string(&p).map_err(|e| WebfixError::io(&p, e))?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<WebfixConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<WebfixConfig>(&s).map_err(|e| e.to_string())
        };
        return parsed.map(Some).map_err(|message| WebfixError::Config {
            path: p.clone(),
            message,
        });
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective> {
    let start = PathBuf::from(cli.start_dir.as_deref().unwrap_or("."));
    let base_dir = detect_base_dir(&start);
    let loaded = load_config(&base_dir)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let pick = |cli_v: &Option<String>, file_v: &Option<String>, default: &str| -> PathBuf {
        let raw = cli_v
            .clone()
            .or_else(|| file_v.clone())
            .unwrap_or_else(|| default.to_string());
        base_dir.join(raw)
    };
    let root = pick(&cli.root, &cfg.root, ".");
    let log_dir = pick(&cli.log_dir, &cfg.log_dir, "logs/webfix");
    let report_json = pick(&cli.report_json, &cfg.report_json, "ui_syntax_report.json");
    let report_html = pick(&cli.report_html, &cfg.report_html, "ui_syntax_fixed.html");

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(WebfixError::Config {
            path: base_dir.clone(),
            message: format!("unknown output mode '{}' (expected human|json)", output),
        });
    }

    let mut extensions: Vec<String> = cfg
        .extensions
        .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect())
        .iter()
        .map(|e| normalize_ext(e))
        .collect();
    extensions.dedup();

    let write = !cli.check && cfg.write.unwrap_or(true);

    let assistant = cfg.assistant.unwrap_or_default();
    let monitor = cfg.monitor.unwrap_or_default();
    let theme = monitor.theme.unwrap_or_else(|| "dark".to_string());
    let theme = if theme == "light" { theme } else { "dark".to_string() };

    Ok(Effective {
        base_dir,
        config_found,
        root,
        log_dir,
        report_json,
        report_html,
        extensions,
        exclude: cfg.exclude.unwrap_or_default(),
        output,
        write,
        check: cli.check,
        max_messages: assistant.max_messages.unwrap_or(50).max(1),
        assistant_seed: assistant.seed,
        max_data_points: monitor.max_data_points.unwrap_or(30).max(1),
        interval_secs: monitor.interval_secs.unwrap_or(10),
        theme,
        monitor_seed: monitor.seed,
    })
}
