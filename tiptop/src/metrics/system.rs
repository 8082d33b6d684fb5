use std::net::IpAddr;

use sysinfo::{
    Component, Components, CpuRefreshKind, MemoryRefreshKind, Networks, ProcessRefreshKind,
    ProcessesToUpdate, RefreshKind, System, UpdateKind, Users,
};
use tracing::debug;

use super::{
    Metric, MetricError, MetricGroup, MetricsProvider, ProcessInfo, ProcessSource, Topology,
};

/// Metrics of the local host, read through `sysinfo`.
pub struct SystemProvider {
    sys: System,
    components: Components,
    networks: Networks,
}

impl SystemProvider {
    pub fn new() -> SystemProvider {
        let sys = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );
        let components = Components::new_with_refreshed_list();
        debug!(
            "found {} cpus and {} thermal components",
            sys.cpus().len(),
            components.list().len()
        );
        SystemProvider {
            sys,
            components,
            networks: Networks::new_with_refreshed_list(),
        }
    }

    fn package_sensor(&self) -> Option<&Component> {
        let list = self.components.list();
        list.iter()
            .find(|c| {
                let label = c.label();
                label.contains("Package") || label.contains("Tctl") || label.contains("Tdie")
            })
            .or_else(|| list.first())
    }

    fn core_sensor(&self, core: usize) -> Option<&Component> {
        self.components
            .list()
            .iter()
            .filter(|c| c.label().contains("Core"))
            .nth(core)
    }
}

impl Default for SystemProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn temperature(component: Option<&Component>, metric: Metric) -> Result<f64, MetricError> {
    component
        .and_then(|c| c.temperature())
        .filter(|t| t.is_finite())
        .map(f64::from)
        .ok_or(MetricError::Unavailable(metric))
}

impl MetricsProvider for SystemProvider {
    fn refresh(&mut self, group: MetricGroup) {
        match group {
            MetricGroup::Cpu => self.sys.refresh_cpu_all(),
            MetricGroup::Thermal => self.components.refresh(false),
            MetricGroup::Memory => self.sys.refresh_memory(),
            MetricGroup::Host => {}
        }
    }

    fn current(&self, metric: Metric) -> Result<f64, MetricError> {
        match metric {
            Metric::CpuTotal => Ok(f64::from(self.sys.global_cpu_usage())),
            Metric::CpuThread(i) => self
                .sys
                .cpus()
                .get(i)
                .map(|cpu| f64::from(cpu.cpu_usage()))
                .ok_or(MetricError::Unavailable(metric)),
            Metric::CpuFrequency => self
                .sys
                .cpus()
                .first()
                .map(|cpu| cpu.frequency() as f64)
                .ok_or(MetricError::Unavailable(metric)),
            Metric::PackageTemp => temperature(self.package_sensor(), metric),
            Metric::CoreTemp(i) => temperature(self.core_sensor(i), metric),
            Metric::MemoryUsed => Ok(self.sys.used_memory() as f64),
            Metric::MemoryTotal => Ok(self.sys.total_memory() as f64),
            Metric::SwapUsed => Ok(self.sys.used_swap() as f64),
            Metric::SwapTotal => Ok(self.sys.total_swap() as f64),
            Metric::Battery => Err(MetricError::Unsupported(metric)),
            Metric::Uptime => Ok(System::uptime() as f64),
        }
    }

    fn static_bounds(&self, metric: Metric) -> Option<(f64, f64)> {
        match metric {
            Metric::CpuTotal | Metric::CpuThread(_) | Metric::Battery => Some((0.0, 100.0)),
            Metric::PackageTemp | Metric::CoreTemp(_) => self
                .package_sensor()
                .and_then(|c| c.critical())
                .filter(|t| t.is_finite() && *t > 0.0)
                .map(|t| (0.0, f64::from(t))),
            Metric::MemoryUsed => match self.sys.total_memory() {
                0 => None,
                total => Some((0.0, total as f64)),
            },
            Metric::SwapUsed => match self.sys.total_swap() {
                0 => None,
                total => Some((0.0, total as f64)),
            },
            _ => None,
        }
    }

    fn topology(&self) -> Topology {
        let logical_cpus = self.sys.cpus().len();
        Topology {
            physical_cores: System::physical_core_count().unwrap_or(logical_cpus),
            logical_cpus,
            brand: self
                .sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .unwrap_or_default(),
        }
    }

    fn host_address(&mut self) -> Result<String, MetricError> {
        self.networks.refresh(true);
        let mut names: Vec<&String> = self.networks.list().keys().collect();
        names.sort();

        let address = names
            .into_iter()
            .filter_map(|name| self.networks.list().get(name))
            .flat_map(|data| data.ip_networks().iter().map(|net| net.addr))
            .find(|addr| matches!(addr, IpAddr::V4(v4) if !v4.is_loopback()));

        match address {
            Some(addr) => Ok(addr.to_string()),
            None => System::host_name().ok_or(MetricError::NoAddress),
        }
    }
}

/// Process table of the local host.
pub struct SystemProcesses {
    sys: System,
    users: Users,
}

impl SystemProcesses {
    pub fn new() -> SystemProcesses {
        SystemProcesses {
            sys: System::new(),
            users: Users::new_with_refreshed_list(),
        }
    }
}

impl Default for SystemProcesses {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SystemProcesses {
    fn top_processes(&mut self, limit: usize) -> Result<Vec<ProcessInfo>, MetricError> {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cpu()
                .with_memory()
                .with_tasks()
                .with_cmd(UpdateKind::OnlyIfNotSet)
                .with_user(UpdateKind::OnlyIfNotSet),
        );

        let mut processes: Vec<_> = self.sys.processes().values().collect();
        processes.sort_by(|a, b| b.cpu_usage().total_cmp(&a.cpu_usage()));
        processes.truncate(limit);

        // Accounts created since the last lookup.
        let unknown_user = processes.iter().any(|p| {
            p.user_id()
                .is_some_and(|uid| self.users.get_user_by_id(uid).is_none())
        });
        if unknown_user {
            debug!("refreshing user list");
            self.users.refresh();
        }

        let users = &self.users;
        Ok(processes
            .into_iter()
            .map(|p| ProcessInfo {
                pid: p.pid().as_u32(),
                name: p.name().to_string_lossy().into_owned(),
                args: p
                    .cmd()
                    .iter()
                    .skip(1)
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect(),
                cpu_percent: p.cpu_usage(),
                threads: p.tasks().map_or(1, |tasks| tasks.len().max(1)),
                user: p
                    .user_id()
                    .and_then(|uid| users.get_user_by_id(uid))
                    .map(|user| user.name().to_string())
                    .unwrap_or_default(),
                memory: p.memory(),
            })
            .collect())
    }
}
