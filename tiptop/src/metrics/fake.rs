use std::collections::{HashMap, VecDeque};

use super::{
    Metric, MetricError, MetricGroup, MetricsProvider, ProcessInfo, ProcessSource, Topology,
};

/// Scripted provider used by tests and demos.
///
/// Readings queued with [`FakeProvider::script`] are consumed one per refresh
/// of the metric's group; once a script runs dry the last reading sticks.
#[derive(Debug, Default)]
pub struct FakeProvider {
    scripts: HashMap<Metric, VecDeque<Result<f64, MetricError>>>,
    readings: HashMap<Metric, Result<f64, MetricError>>,
    bounds: HashMap<Metric, (f64, f64)>,
    topology: Topology,
    address: Option<String>,
    refreshes: Vec<MetricGroup>,
}

impl FakeProvider {
    pub fn new() -> FakeProvider {
        Self::default()
    }

    pub fn with_topology(mut self, physical_cores: usize, logical_cpus: usize) -> Self {
        self.topology = Topology {
            physical_cores,
            logical_cpus,
            brand: "Fake CPU".to_string(),
        };
        self
    }

    pub fn with_bounds(mut self, metric: Metric, min: f64, max: f64) -> Self {
        self.bounds.insert(metric, (min, max));
        self
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// Sets a steady reading, dropping any pending script.
    pub fn set(&mut self, metric: Metric, value: f64) {
        self.scripts.remove(&metric);
        self.readings.insert(metric, Ok(value));
    }

    pub fn script<I>(&mut self, metric: Metric, readings: I)
    where
        I: IntoIterator<Item = Result<f64, MetricError>>,
    {
        self.scripts.entry(metric).or_default().extend(readings);
    }

    /// Groups refreshed so far, in call order.
    pub fn refreshes(&self) -> &[MetricGroup] {
        &self.refreshes
    }
}

impl MetricsProvider for FakeProvider {
    fn refresh(&mut self, group: MetricGroup) {
        self.refreshes.push(group);
        for (metric, script) in self.scripts.iter_mut() {
            if metric.group() != group {
                continue;
            }
            if let Some(reading) = script.pop_front() {
                self.readings.insert(*metric, reading);
            }
        }
    }

    fn current(&self, metric: Metric) -> Result<f64, MetricError> {
        self.readings
            .get(&metric)
            .cloned()
            .unwrap_or(Err(MetricError::Unavailable(metric)))
    }

    fn static_bounds(&self, metric: Metric) -> Option<(f64, f64)> {
        self.bounds.get(&metric).copied()
    }

    fn topology(&self) -> Topology {
        self.topology.clone()
    }

    fn host_address(&mut self) -> Result<String, MetricError> {
        self.address.clone().ok_or(MetricError::NoAddress)
    }
}

/// Scripted process table; each call returns the next snapshot.
#[derive(Debug, Default)]
pub struct FakeProcesses {
    snapshots: VecDeque<Result<Vec<ProcessInfo>, MetricError>>,
    delay: Option<std::time::Duration>,
}

impl FakeProcesses {
    pub fn new<I>(snapshots: I) -> FakeProcesses
    where
        I: IntoIterator<Item = Result<Vec<ProcessInfo>, MetricError>>,
    {
        FakeProcesses {
            snapshots: snapshots.into_iter().collect(),
            delay: None,
        }
    }

    /// Makes every call sleep first, standing in for a slow process table.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl ProcessSource for FakeProcesses {
    fn top_processes(&mut self, limit: usize) -> Result<Vec<ProcessInfo>, MetricError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.snapshots.pop_front() {
            Some(Ok(mut list)) => {
                list.truncate(limit);
                Ok(list)
            }
            Some(Err(e)) => Err(e),
            None => Ok(Vec::new()),
        }
    }
}
