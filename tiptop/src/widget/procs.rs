use std::time::Duration;

use tracing::{debug, warn};

use super::text::fit;
use super::{sizeof_fmt, Widget, WidgetError, Worker};
use crate::config::ProcessConfig;
use crate::metrics::{MetricError, MetricsProvider, ProcessInfo, ProcessSource};
use crate::panel::{Align, Line, Panel, Span, Tone};

const NAME: &str = "proc";
const ACCENT: Tone = Tone::Ansi(2);

type Snapshot = Result<Vec<ProcessInfo>, MetricError>;

/// Top processes by CPU usage.
///
/// Reading the process table can take a while on a busy host, so it runs on
/// a worker thread; a tick waits at most `budget` for it and otherwise keeps
/// showing the previous table.
pub struct ProcessWidget {
    worker: Worker<Snapshot>,
    budget: Duration,
    processes: Vec<ProcessInfo>,
    panel: Panel,
}

impl ProcessWidget {
    pub fn new(
        mut source: Box<dyn ProcessSource>,
        config: &ProcessConfig,
    ) -> Result<ProcessWidget, WidgetError> {
        let limit = config.limit;
        let worker = Worker::spawn("tiptop-procs", move || source.top_processes(limit))
            .map_err(|source| WidgetError::Spawn {
                widget: NAME,
                source,
            })?;
        let mut widget = ProcessWidget {
            worker,
            budget: config.budget(),
            processes: Vec::new(),
            panel: Panel::default(),
        };
        widget.panel = widget.build_panel();
        Ok(widget)
    }

    pub fn processes(&self) -> &[ProcessInfo] {
        &self.processes
    }

    fn build_panel(&self) -> Panel {
        let header = format!(
            "{:>6} {:<10} {:<20} {:>3} {:<8} {:>4} {:>5}",
            "pid", "program", "args", "#th", "user", "memB", "cpu%"
        );
        let mut body = vec![Line::default().with(Span::plain(header).bold())];
        body.extend(self.processes.iter().map(|p| {
            Line::default()
                .with(Span::plain(format!("{:6} ", p.pid)))
                .with(Span::toned(fit(&p.name, 10), ACCENT))
                .with(Span::plain(format!(" {} ", fit(&p.args.join(" "), 20))))
                .with(Span::toned(format!("{:3}", p.threads), ACCENT))
                .with(Span::plain(format!(" {} ", fit(&p.user, 8))))
                .with(Span::toned(
                    format!("{} {:5.1}", sizeof_fmt(p.memory), p.cpu_percent),
                    ACCENT,
                ))
        }));
        Panel::new(NAME, Tone::Ansi(6)).body(body, Align::Left)
    }
}

impl Widget for ProcessWidget {
    fn name(&self) -> &str {
        NAME
    }

    fn on_tick(&mut self, _provider: &mut dyn MetricsProvider) {
        self.worker.request();
        match self.worker.wait(self.budget) {
            Some(Ok(processes)) => self.processes = processes,
            Some(Err(e)) => warn!("{}", e),
            None => debug!("process table not ready, keeping the previous one"),
        }
        self.panel = self.build_panel();
    }

    fn panel(&self) -> &Panel {
        &self.panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{FakeProcesses, FakeProvider};

    fn process(pid: u32, name: &str, cpu: f32) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: name.to_string(),
            args: vec!["--flag".to_string(), "value".to_string()],
            cpu_percent: cpu,
            threads: 4,
            user: "root".to_string(),
            memory: 2048,
        }
    }

    fn config(budget_ms: u64) -> ProcessConfig {
        ProcessConfig {
            limit: 2,
            budget_ms,
            ..Default::default()
        }
    }

    #[test]
    fn lists_top_processes() {
        let source = FakeProcesses::new([Ok(vec![
            process(1, "init", 12.5),
            process(42, "a-very-long-program-name", 3.0),
            process(7, "idle", 0.0),
        ])]);
        let mut widget = ProcessWidget::new(Box::new(source), &config(5000)).unwrap();
        widget.on_tick(&mut FakeProvider::new());

        assert_eq!(widget.processes().len(), 2);
        let body = &widget.panel().body;
        assert_eq!(body.len(), 3);
        assert!(body[0].spans[0].bold);
        assert_eq!(
            body[1].text(),
            "     1 init       --flag value           4 root       2k  12.5"
        );
        assert!(body[2].text().contains(" a-very-lon "));
    }

    #[test]
    fn failed_snapshot_keeps_previous_table() {
        let source = FakeProcesses::new([
            Ok(vec![process(1, "init", 1.0)]),
            Err(MetricError::Processes("gone".to_string())),
        ]);
        let mut widget = ProcessWidget::new(Box::new(source), &config(5000)).unwrap();
        let mut provider = FakeProvider::new();
        widget.on_tick(&mut provider);
        widget.on_tick(&mut provider);
        assert_eq!(widget.processes(), &[process(1, "init", 1.0)]);
    }

    #[test]
    fn slow_source_does_not_block_tick() {
        let source = FakeProcesses::new([Ok(vec![process(9, "slow", 50.0)])])
            .with_delay(Duration::from_millis(300));
        let mut widget = ProcessWidget::new(Box::new(source), &config(1)).unwrap();
        let mut provider = FakeProvider::new();

        let started = std::time::Instant::now();
        widget.on_tick(&mut provider);
        assert!(started.elapsed() < Duration::from_millis(250));
        assert!(widget.processes().is_empty());

        std::thread::sleep(Duration::from_millis(500));
        widget.on_tick(&mut provider);
        assert_eq!(widget.processes().len(), 1);
    }
}
