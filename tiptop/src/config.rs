//! Dashboard configuration
//!
//! Every field has a default, so an empty YAML document describes the stock
//! dashboard: an info line, the cpu panel, a process table on the right and
//! memory and network panels below.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dashboard::Edge;
use crate::graph::ColorScale;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub regions: Vec<RegionConfig>,
    pub info: InfoConfig,
    pub cpu: CpuConfig,
    pub mem: MemoryConfig,
    #[serde(rename = "proc")]
    pub procs: ProcessConfig,
    pub net: NetConfig,
    pub colors: ColorConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            regions: vec![
                RegionConfig::new("info", Edge::Top, Some(1)),
                RegionConfig::new("cpu", Edge::Top, Some(14)),
                RegionConfig::new("proc", Edge::Right, Some(70)),
                RegionConfig::new("mem", Edge::Top, Some(20)),
                RegionConfig::new("net", Edge::Bottom, None),
            ],
            info: InfoConfig::default(),
            cpu: CpuConfig::default(),
            mem: MemoryConfig::default(),
            procs: ProcessConfig::default(),
            net: NetConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<DashboardConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<DashboardConfig, ConfigError> {
        if text.trim().is_empty() {
            return Ok(DashboardConfig::default());
        }
        let config: DashboardConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, region) in self.regions.iter().enumerate() {
            if self.regions[..i].iter().any(|r| r.name == region.name) {
                return Err(ConfigError::Invalid(format!(
                    "region {} listed twice",
                    region.name
                )));
            }
            if region.size == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "region {} has zero size",
                    region.name
                )));
            }
        }
        self.colors.scale()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionConfig {
    pub name: String,
    pub edge: Edge,
    /// Rows for top/bottom regions, columns for left/right ones. Absent means
    /// the region takes whatever space is left.
    #[serde(default)]
    pub size: Option<u16>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl RegionConfig {
    pub fn new(name: &str, edge: Edge, size: Option<u16>) -> RegionConfig {
        RegionConfig {
            name: name.to_string(),
            edge,
            size,
            visible: true,
        }
    }
}

fn default_visible() -> bool {
    true
}

fn interval(ms: Option<u64>) -> Option<Duration> {
    ms.filter(|ms| *ms > 0).map(Duration::from_millis)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InfoConfig {
    pub interval_ms: Option<u64>,
}

impl Default for InfoConfig {
    fn default() -> Self {
        InfoConfig {
            interval_ms: Some(2000),
        }
    }
}

impl InfoConfig {
    pub fn interval(&self) -> Option<Duration> {
        interval(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CpuConfig {
    pub interval_ms: Option<u64>,
    pub total_width: usize,
    pub total_height: usize,
    pub thread_width: usize,
    pub core_temp_width: usize,
    /// Bottom of the temperature graphs, in °C.
    pub temp_low: f64,
}

impl Default for CpuConfig {
    fn default() -> Self {
        CpuConfig {
            interval_ms: Some(2000),
            total_width: 50,
            total_height: 6,
            thread_width: 10,
            core_temp_width: 5,
            temp_low: 20.0,
        }
    }
}

impl CpuConfig {
    pub fn interval(&self) -> Option<Duration> {
        interval(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryConfig {
    pub interval_ms: Option<u64>,
    pub width: usize,
    pub height: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            interval_ms: Some(2000),
            width: 40,
            height: 3,
        }
    }
}

impl MemoryConfig {
    pub fn interval(&self) -> Option<Duration> {
        interval(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessConfig {
    pub interval_ms: Option<u64>,
    /// Number of processes listed.
    pub limit: usize,
    /// Longest a tick waits for the process table before moving on.
    pub budget_ms: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        ProcessConfig {
            interval_ms: Some(6000),
            limit: 30,
            budget_ms: 250,
        }
    }
}

impl ProcessConfig {
    pub fn interval(&self) -> Option<Duration> {
        interval(self.interval_ms)
    }

    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetConfig {
    pub interval_ms: Option<u64>,
}

impl NetConfig {
    pub fn interval(&self) -> Option<Duration> {
        interval(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Band boundaries as fractions of a metric's domain. Four even bands
    /// when absent.
    pub thresholds: Option<Vec<f64>>,
}

impl ColorConfig {
    pub fn scale(&self) -> Result<ColorScale, ConfigError> {
        match &self.thresholds {
            None => Ok(ColorScale::default()),
            Some(thresholds) => ColorScale::with_thresholds(thresholds.clone())
                .map_err(|e| ConfigError::Invalid(e.to_string())),
        }
    }
}
