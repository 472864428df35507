//! Performance metrics window.
//!
//! Keeps a bounded, timestamped history per metric, evaluates warning and
//! error thresholds, and exports the window as a JSON report. When the
//! source fails the monitor substitutes one mock sample; it never retries.

use crate::errors::{Result, WebfixError};
use chrono::{DateTime, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonVal};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_DATA_POINTS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSample {
    pub cpu: f64,
    pub kv_calls: f64,
    pub latency: f64,
    pub connections: f64,
}

impl MetricsSample {
    /// `(name, value, status)` in display order.
    pub fn rows(&self) -> Vec<(&'static str, f64, MetricStatus)> {
        Metric::ALL
            .iter()
            .map(|m| {
                let v = m.value_of(self);
                (m.name(), v, m.status(v))
            })
            .collect()
    }

    pub fn overall(&self) -> OverallStatus {
        if self.cpu > 90.0 || self.latency > 300.0 {
            OverallStatus::Critical
        } else if self.cpu > 80.0 || self.latency > 200.0 {
            OverallStatus::Warning
        } else {
            OverallStatus::Excellent
        }
    }
}

/// Body of `GET /api/metrics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<MetricsSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    KvCalls,
    Latency,
    Connections,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Cpu,
        Metric::KvCalls,
        Metric::Latency,
        Metric::Connections,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Cpu => "cpu",
            Metric::KvCalls => "kvCalls",
            Metric::Latency => "latency",
            Metric::Connections => "connections",
        }
    }

    fn index(&self) -> usize {
        match self {
            Metric::Cpu => 0,
            Metric::KvCalls => 1,
            Metric::Latency => 2,
            Metric::Connections => 3,
        }
    }

    fn value_of(&self, s: &MetricsSample) -> f64 {
        match self {
            Metric::Cpu => s.cpu,
            Metric::KvCalls => s.kv_calls,
            Metric::Latency => s.latency,
            Metric::Connections => s.connections,
        }
    }

    fn mock_base(&self) -> f64 {
        match self {
            Metric::Cpu => 25.0,
            Metric::KvCalls => 800.0,
            Metric::Latency => 90.0,
            Metric::Connections => 30.0,
        }
    }

    pub fn status(&self, v: f64) -> MetricStatus {
        let (warning, error) = match self {
            Metric::Cpu | Metric::Connections => (80.0, Some(90.0)),
            Metric::KvCalls => (1500.0, None),
            Metric::Latency => (200.0, Some(300.0)),
        };
        if error.is_some_and(|e| v > e) {
            MetricStatus::Error
        } else if v > warning {
            MetricStatus::Warning
        } else {
            MetricStatus::Online
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricStatus {
    Online,
    Warning,
    Error,
}

impl MetricStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricStatus::Online => "online",
            MetricStatus::Warning => "warning",
            MetricStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Excellent,
    Warning,
    Critical,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Excellent => "excellent",
            OverallStatus::Warning => "warning",
            OverallStatus::Critical => "critical",
        }
    }
}

/// Where samples come from.
pub trait MetricsSource {
    fn fetch(&mut self) -> Result<MetricsResponse>;
}

/// Reads a `MetricsResponse` JSON document on every fetch.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl MetricsSource for FileSource {
    fn fetch(&mut self) -> Result<MetricsResponse> {
        let s = fs::read_to_string(&self.path)
            .map_err(|e| WebfixError::Source(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&s)
            .map_err(|e| WebfixError::Source(format!("{}: {}", self.path.display(), e)))
    }
}

/// Random values within +/-10% of fixed bases.
pub struct MockMetrics {
    rng: StdRng,
}

impl MockMetrics {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        MockMetrics { rng }
    }

    pub fn sample(&mut self) -> MetricsSample {
        let mut next = |m: Metric| {
            let base = m.mock_base();
            let fluctuation = base * 0.2 * (self.rng.gen::<f64>() - 0.5);
            (base + fluctuation).max(0.0)
        };
        MetricsSample {
            cpu: next(Metric::Cpu),
            kv_calls: next(Metric::KvCalls),
            latency: next(Metric::Latency),
            connections: next(Metric::Connections),
        }
    }
}

impl MetricsSource for MockMetrics {
    fn fetch(&mut self) -> Result<MetricsResponse> {
        Ok(MetricsResponse {
            success: true,
            data: Some(self.sample()),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub latest: f64,
    pub samples: usize,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub max_data_points: usize,
    pub theme: String,
    pub seed: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            max_data_points: DEFAULT_MAX_DATA_POINTS,
            theme: "dark".to_string(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PollOutcome {
    pub sample: MetricsSample,
    /// The source failed and a mock sample was used instead.
    pub fallback: bool,
}

pub struct Monitor {
    config: MonitorConfig,
    windows: [VecDeque<DataPoint>; 4],
    mock: MockMetrics,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        let mock = MockMetrics::new(config.seed);
        Monitor {
            config,
            windows: Default::default(),
            mock,
        }
    }

    /// Fetch one sample and append it to the window.
    pub fn poll(&mut self, source: &mut dyn MetricsSource) -> PollOutcome {
        let fetched = match source.fetch() {
            Ok(MetricsResponse {
                success: true,
                data: Some(sample),
            }) => Some(sample),
            Ok(_) => {
                log::warn!("metrics source reported no data, using mock metrics");
                None
            }
            Err(e) => {
                log::warn!("failed to fetch metrics: {}, using mock metrics", e);
                None
            }
        };
        let outcome = match fetched {
            Some(sample) => PollOutcome {
                sample,
                fallback: false,
            },
            None => PollOutcome {
                sample: self.mock.sample(),
                fallback: true,
            },
        };
        self.record(outcome.sample);
        outcome
    }

    /// Append a sample directly.
    pub fn record(&mut self, sample: MetricsSample) {
        let timestamp = Utc::now();
        let max = self.config.max_data_points.max(1);
        for m in Metric::ALL {
            let window = &mut self.windows[m.index()];
            window.push_back(DataPoint {
                timestamp,
                value: m.value_of(&sample),
            });
            while window.len() > max {
                window.pop_front();
            }
        }
    }

    pub fn points(&self, metric: Metric) -> &VecDeque<DataPoint> {
        &self.windows[metric.index()]
    }

    pub fn latest(&self) -> Option<MetricsSample> {
        let last = |m: Metric| self.windows[m.index()].back().map(|p| p.value);
        Some(MetricsSample {
            cpu: last(Metric::Cpu)?,
            kv_calls: last(Metric::KvCalls)?,
            latency: last(Metric::Latency)?,
            connections: last(Metric::Connections)?,
        })
    }

    /// `excellent` while the window is empty.
    pub fn overall_status(&self) -> OverallStatus {
        self.latest()
            .map(|s| s.overall())
            .unwrap_or(OverallStatus::Excellent)
    }

    /// Per-metric statistics; metrics without samples are left out.
    pub fn summary(&self) -> Vec<(Metric, MetricSummary)> {
        Metric::ALL
            .iter()
            .filter_map(|&m| {
                let window = &self.windows[m.index()];
                let latest = window.back()?.value;
                let values = window.iter().map(|p| p.value);
                let sum: f64 = values.clone().sum();
                Some((
                    m,
                    MetricSummary {
                        average: sum / window.len() as f64,
                        max: values.clone().fold(f64::MIN, f64::max),
                        min: values.fold(f64::MAX, f64::min),
                        latest,
                        samples: window.len(),
                    },
                ))
            })
            .collect()
    }

    pub fn export_report(&self) -> Result<JsonVal> {
        let mut metrics = Map::new();
        for m in Metric::ALL {
            metrics.insert(
                m.name().to_string(),
                serde_json::to_value(&self.windows[m.index()])?,
            );
        }
        let mut summary = Map::new();
        for (m, s) in self.summary() {
            summary.insert(m.name().to_string(), serde_json::to_value(s)?);
        }
        Ok(json!({
            "generatedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "metrics": metrics,
            "summary": summary,
            "systemInfo": {
                "platform": std::env::consts::OS,
                "arch": std::env::consts::ARCH,
                "theme": self.config.theme,
            },
        }))
    }

    /// Write `webfix_metrics_<unix millis>.json` under `dir`.
    pub fn write_report(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|e| WebfixError::io(dir, e))?;
        let path = dir.join(format!(
            "webfix_metrics_{}.json",
            Utc::now().timestamp_millis()
        ));
        let body = serde_json::to_string_pretty(&self.export_report()?)?;
        fs::write(&path, body).map_err(|e| WebfixError::io(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample(cpu: f64, kv: f64, latency: f64, conn: f64) -> MetricsSample {
        MetricsSample {
            cpu,
            kv_calls: kv,
            latency,
            connections: conn,
        }
    }

    struct Failing;
    impl MetricsSource for Failing {
        fn fetch(&mut self) -> Result<MetricsResponse> {
            Err(WebfixError::Source("unreachable".into()))
        }
    }

    struct Fixed(MetricsSample);
    impl MetricsSource for Fixed {
        fn fetch(&mut self) -> Result<MetricsResponse> {
            Ok(MetricsResponse {
                success: true,
                data: Some(self.0),
            })
        }
    }

    #[test]
    fn test_mock_values_stay_within_ten_percent() {
        let mut mock = MockMetrics::new(Some(42));
        for _ in 0..200 {
            let s = mock.sample();
            assert!((22.5..=27.5).contains(&s.cpu));
            assert!((720.0..=880.0).contains(&s.kv_calls));
            assert!((81.0..=99.0).contains(&s.latency));
            assert!((27.0..=33.0).contains(&s.connections));
        }
    }

    #[test]
    fn test_failed_source_falls_back_once() {
        let mut m = Monitor::new(MonitorConfig {
            seed: Some(1),
            ..Default::default()
        });
        let out = m.poll(&mut Failing);
        assert!(out.fallback);
        assert_eq!(m.points(Metric::Cpu).len(), 1);
        assert_eq!(m.latest(), Some(out.sample));
    }

    #[test]
    fn test_unsuccessful_response_falls_back() {
        struct NoData;
        impl MetricsSource for NoData {
            fn fetch(&mut self) -> Result<MetricsResponse> {
                Ok(MetricsResponse {
                    success: false,
                    data: None,
                })
            }
        }
        let mut m = Monitor::new(MonitorConfig::default());
        assert!(m.poll(&mut NoData).fallback);
    }

    #[test]
    fn test_window_drops_oldest() {
        let mut m = Monitor::new(MonitorConfig {
            max_data_points: 3,
            ..Default::default()
        });
        for i in 0..5 {
            m.poll(&mut Fixed(sample(i as f64, 0.0, 0.0, 0.0)));
        }
        let cpu: Vec<f64> = m.points(Metric::Cpu).iter().map(|p| p.value).collect();
        assert_eq!(cpu, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_metric_thresholds() {
        assert_eq!(Metric::Cpu.status(85.0), MetricStatus::Warning);
        assert_eq!(Metric::Cpu.status(95.0), MetricStatus::Error);
        assert_eq!(Metric::Cpu.status(80.0), MetricStatus::Online);
        assert_eq!(Metric::KvCalls.status(9000.0), MetricStatus::Warning);
        assert_eq!(Metric::Latency.status(250.0), MetricStatus::Warning);
        assert_eq!(Metric::Latency.status(301.0), MetricStatus::Error);
        assert_eq!(Metric::Connections.status(91.0), MetricStatus::Error);
    }

    #[test]
    fn test_overall_status() {
        assert_eq!(sample(25.0, 800.0, 90.0, 30.0).overall(), OverallStatus::Excellent);
        assert_eq!(sample(81.0, 0.0, 90.0, 0.0).overall(), OverallStatus::Warning);
        assert_eq!(sample(25.0, 0.0, 201.0, 0.0).overall(), OverallStatus::Warning);
        assert_eq!(sample(25.0, 0.0, 350.0, 0.0).overall(), OverallStatus::Critical);
        assert_eq!(
            Monitor::new(MonitorConfig::default()).overall_status(),
            OverallStatus::Excellent
        );
    }

    #[test]
    fn test_summary_and_export() {
        let dir = tempdir().unwrap();
        let mut m = Monitor::new(MonitorConfig {
            theme: "light".into(),
            ..Default::default()
        });
        assert!(m.summary().is_empty());
        m.record(sample(10.0, 100.0, 50.0, 5.0));
        m.record(sample(30.0, 300.0, 70.0, 7.0));
        let summary = m.summary();
        let (metric, cpu) = &summary[0];
        assert_eq!(*metric, Metric::Cpu);
        assert_eq!(
            *cpu,
            MetricSummary {
                average: 20.0,
                max: 30.0,
                min: 10.0,
                latest: 30.0,
                samples: 2,
            }
        );

        let path = m.write_report(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("webfix_metrics_") && name.ends_with(".json"));
        let v: JsonVal = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["metrics"]["kvCalls"].as_array().unwrap().len(), 2);
        assert_eq!(v["summary"]["latency"]["average"], 60.0);
        assert_eq!(v["systemInfo"]["theme"], "light");
        assert!(v["generatedAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_file_source_reads_response() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("metrics.json");
        fs::write(
            &p,
            r#"{"success":true,"data":{"cpu":91,"kvCalls":10,"latency":20,"connections":3}}"#,
        )
        .unwrap();
        let mut m = Monitor::new(MonitorConfig::default());
        let out = m.poll(&mut FileSource::new(&p));
        assert!(!out.fallback);
        assert_eq!(out.sample.cpu, 91.0);
        assert_eq!(m.overall_status(), OverallStatus::Critical);

        let out = m.poll(&mut FileSource::new(dir.path().join("missing.json")));
        assert!(out.fallback);
    }
}
