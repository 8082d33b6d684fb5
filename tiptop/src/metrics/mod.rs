//! Metrics providers
//!
//! A provider answers point queries for scalar host metrics. Readings are
//! cached per [`MetricGroup`]: `refresh` re-reads one group from the host and
//! `current` returns the cached value, so one widget tick costs one
//! refresh no matter how many readings it takes.
//!
//! Process enumeration is slow enough to warrant its own thread and lives
//! behind the separate, `Send` [`ProcessSource`] trait.

mod fake;
mod system;

use std::fmt;

pub use fake::{FakeProcesses, FakeProvider};
pub use system::{SystemProcesses, SystemProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Load over all logical CPUs, in percent.
    CpuTotal,
    /// Load of one logical CPU, in percent.
    CpuThread(usize),
    /// Clock of the first CPU, in MHz.
    CpuFrequency,
    /// CPU package temperature, in °C.
    PackageTemp,
    /// Temperature of one physical core, in °C.
    CoreTemp(usize),
    MemoryUsed,
    MemoryTotal,
    SwapUsed,
    SwapTotal,
    /// Battery charge, in percent.
    Battery,
    /// Seconds since boot.
    Uptime,
}

impl Metric {
    pub fn group(self) -> MetricGroup {
        match self {
            Metric::CpuTotal | Metric::CpuThread(_) | Metric::CpuFrequency => MetricGroup::Cpu,
            Metric::PackageTemp | Metric::CoreTemp(_) => MetricGroup::Thermal,
            Metric::MemoryUsed | Metric::MemoryTotal | Metric::SwapUsed | Metric::SwapTotal => {
                MetricGroup::Memory
            }
            Metric::Battery | Metric::Uptime => MetricGroup::Host,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::CpuTotal => write!(f, "cpu load"),
            Metric::CpuThread(i) => write!(f, "cpu{} load", i),
            Metric::CpuFrequency => write!(f, "cpu frequency"),
            Metric::PackageTemp => write!(f, "package temperature"),
            Metric::CoreTemp(i) => write!(f, "core{} temperature", i),
            Metric::MemoryUsed => write!(f, "used memory"),
            Metric::MemoryTotal => write!(f, "total memory"),
            Metric::SwapUsed => write!(f, "used swap"),
            Metric::SwapTotal => write!(f, "total swap"),
            Metric::Battery => write!(f, "battery charge"),
            Metric::Uptime => write!(f, "uptime"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricGroup {
    Cpu,
    Thermal,
    Memory,
    Host,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    /// The reading exists on this host but could not be taken this time.
    #[error("{0} is not available right now")]
    Unavailable(Metric),
    /// This host never reports the reading.
    #[error("{0} is not supported on this host")]
    Unsupported(Metric),
    #[error("could not determine the host address")]
    NoAddress,
    #[error("process list unavailable: {0}")]
    Processes(String),
}

/// CPU layout reported at startup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Topology {
    pub physical_cores: usize,
    pub logical_cpus: usize,
    pub brand: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub args: Vec<String>,
    pub cpu_percent: f32,
    pub threads: usize,
    pub user: String,
    /// Resident set size, in bytes.
    pub memory: u64,
}

pub trait MetricsProvider {
    /// Re-reads every metric of `group` from the host.
    fn refresh(&mut self, group: MetricGroup);

    /// Latest cached reading.
    fn current(&self, metric: Metric) -> Result<f64, MetricError>;

    /// Fixed domain of a metric, if the host reports one.
    fn static_bounds(&self, metric: Metric) -> Option<(f64, f64)>;

    fn topology(&self) -> Topology;

    fn host_address(&mut self) -> Result<String, MetricError>;
}

pub trait ProcessSource: Send {
    /// Processes sorted by descending CPU usage, at most `limit` of them.
    fn top_processes(&mut self, limit: usize) -> Result<Vec<ProcessInfo>, MetricError>;
}
