use std::time::{Duration, Instant};

use tiptop::config::{DashboardConfig, RegionConfig};
use tiptop::dashboard::{Edge, Frame, Rect, RenderError, Renderer};
use tiptop::metrics::{FakeProcesses, FakeProvider, Metric, MetricError, ProcessInfo};
use tiptop::Monitor;

#[derive(Default)]
struct Recorder {
    frames: Vec<Frame>,
}

impl Renderer for Recorder {
    fn area(&self) -> Result<Rect, RenderError> {
        Ok(Rect::new(0, 0, 200, 60))
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

fn host() -> FakeProvider {
    let mut fake = FakeProvider::new()
        .with_topology(2, 4)
        .with_bounds(Metric::CpuTotal, 0.0, 100.0)
        .with_bounds(Metric::PackageTemp, 0.0, 95.0)
        .with_bounds(Metric::MemoryUsed, 0.0, 16e9)
        .with_address("10.0.0.5");
    fake.set(Metric::CpuTotal, 37.0);
    for i in 0..4 {
        fake.set(Metric::CpuThread(i), 20.0);
    }
    fake.set(Metric::PackageTemp, 48.0);
    fake.set(Metric::MemoryUsed, 4e9);
    fake.set(Metric::MemoryTotal, 16e9);
    fake.set(Metric::Uptime, 3600.0);
    fake
}

fn processes() -> Box<FakeProcesses> {
    Box::new(FakeProcesses::new([Ok(vec![ProcessInfo {
        pid: 1,
        name: "init".to_string(),
        args: Vec::new(),
        cpu_percent: 0.5,
        threads: 1,
        user: "root".to_string(),
        memory: 10_000_000,
    }])]))
}

#[test]
fn stock_dashboard_first_frame() {
    let t0 = Instant::now();
    let mut monitor = Monitor::from_config(
        &DashboardConfig::default(),
        host(),
        processes(),
        Recorder::default(),
        t0,
    )
    .unwrap();

    assert_eq!(monitor.step(t0).unwrap().len(), 5);
    assert_eq!(monitor.frames(), 1);

    let frame = &monitor.renderer().frames[0];
    assert_eq!(frame.placements.len(), 5);
    assert_eq!(frame.placement("info").unwrap().rect, Rect::new(0, 0, 200, 1));
    assert_eq!(frame.placement("cpu").unwrap().rect, Rect::new(0, 1, 200, 14));
    assert_eq!(frame.placement("proc").unwrap().rect, Rect::new(130, 15, 70, 45));
    assert_eq!(frame.placement("mem").unwrap().rect, Rect::new(0, 15, 130, 20));
    assert_eq!(frame.placement("net").unwrap().rect, Rect::new(0, 35, 130, 25));

    assert_eq!(frame.placement("cpu").unwrap().panel.title, "cpu - Fake CPU");
    assert_eq!(frame.placement("net").unwrap().panel.title, "net - 10.0.0.5");
    assert!(frame.placement("info").unwrap().panel.body[0]
        .text()
        .ends_with("up 0 days, 1:00"));
    // header plus one process
    assert_eq!(frame.placement("proc").unwrap().panel.body.len(), 2);

    // the net widget resolves once; only the 2 s widgets come due next
    assert_eq!(monitor.step(t0 + Duration::from_secs(2)).unwrap().len(), 3);
    assert_eq!(monitor.frames(), 2);
}

#[test]
fn transient_failure_keeps_previous_trace() {
    let mut provider = FakeProvider::new()
        .with_topology(1, 1)
        .with_bounds(Metric::CpuTotal, 0.0, 100.0);
    provider.script(
        Metric::CpuTotal,
        [
            Ok(10.0),
            Ok(20.0),
            Err(MetricError::Unavailable(Metric::CpuTotal)),
            Ok(40.0),
        ],
    );
    let mut config = DashboardConfig::default();
    config.regions = vec![RegionConfig::new("cpu", Edge::Top, None)];

    let t0 = Instant::now();
    let mut monitor = Monitor::from_config(
        &config,
        provider,
        processes(),
        Recorder::default(),
        t0,
    )
    .unwrap();
    for s in [0, 2, 4, 6] {
        monitor.step(t0 + Duration::from_secs(s)).unwrap();
    }

    let panels: Vec<_> = monitor
        .renderer()
        .frames
        .iter()
        .map(|f| f.placement("cpu").unwrap().panel.clone())
        .collect();
    assert_eq!(panels.len(), 4);
    assert_ne!(panels[0], panels[1]);
    assert_eq!(panels[1], panels[2]);
    assert!(panels[2].body[0].text().ends_with(" 20.0%"));
    assert!(panels[3].body[0].text().ends_with(" 40.0%"));
}

#[test]
fn yaml_layout_drives_regions() {
    let config = DashboardConfig::from_yaml(
        "regions:\n  - name: mem\n    edge: left\n    size: 50\n  - name: net\n    edge: top\n    visible: false\nmem:\n  width: 20\n",
    )
    .unwrap();
    let t0 = Instant::now();
    let mut monitor =
        Monitor::from_config(&config, host(), processes(), Recorder::default(), t0).unwrap();
    monitor.step(t0).unwrap();

    let frame = &monitor.renderer().frames[0];
    assert_eq!(frame.placements.len(), 1);
    let mem = frame.placement("mem").unwrap();
    assert_eq!(mem.rect, Rect::new(0, 0, 50, 60));
    assert!(mem.panel.body.iter().any(|l| l.text().ends_with(" 25.0%")));

    assert_eq!(monitor.toggle("net"), Some(true));
    monitor.render().unwrap();
    let frame = monitor.renderer().frames.last().unwrap();
    assert_eq!(frame.placement("net").unwrap().rect, Rect::new(50, 0, 150, 60));
}
