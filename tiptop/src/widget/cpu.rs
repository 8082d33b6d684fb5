use tracing::warn;

use super::{feed, reading, sparkline, overlay_tail, Widget, WidgetError};
use crate::config::CpuConfig;
use crate::graph::{Band, ColorScale, Palette, Sparkline};
use crate::metrics::{Metric, MetricGroup, MetricsProvider};
use crate::panel::{Align, Line, Panel, Span, Tone};

const NAME: &str = "cpu";
const LOAD_TONE: Tone = Tone::Ansi(4);
const TEMP_TONE: Tone = Tone::Ansi(5);

/// Display order of logical CPUs.
///
/// With two hardware threads per core, sibling threads `i` and `i + cores`
/// are listed next to each other.
pub fn thread_order(cores: usize, threads: usize) -> Vec<usize> {
    if cores > 0 && threads == 2 * cores {
        (0..cores).flat_map(|c| [c, c + cores]).collect()
    } else {
        (0..threads).collect()
    }
}

struct Thermal {
    domain: (f64, f64),
    package: Sparkline,
    cores: Vec<Sparkline>,
}

/// Total load over package temperature, plus a box of per-thread traces.
pub struct CpuWidget {
    title: String,
    heading: String,
    load_domain: (f64, f64),
    total: Sparkline,
    threads: Vec<Sparkline>,
    bands: Vec<Band>,
    order: Vec<usize>,
    thermal: Option<Thermal>,
    frequency: Option<f64>,
    scale: ColorScale,
    palette: Palette,
    panel: Panel,
}

impl CpuWidget {
    pub fn new(
        provider: &dyn MetricsProvider,
        config: &CpuConfig,
        scale: ColorScale,
    ) -> Result<CpuWidget, WidgetError> {
        let topology = provider.topology();
        if topology.logical_cpus == 0 {
            return Err(WidgetError::MissingConfiguration {
                widget: NAME,
                what: "logical cpu count".to_string(),
            });
        }
        let cores = topology.physical_cores.max(1);
        let load_domain = provider
            .static_bounds(Metric::CpuTotal)
            .unwrap_or((0.0, 100.0));

        let total = sparkline(NAME, config.total_width, config.total_height, load_domain, false)?;
        let threads = (0..topology.logical_cpus)
            .map(|_| sparkline(NAME, config.thread_width, 1, load_domain, false))
            .collect::<Result<Vec<_>, _>>()?;

        let thermal = match provider.static_bounds(Metric::PackageTemp) {
            Some((_, high)) if high > config.temp_low => {
                let domain = (config.temp_low, high);
                Some(Thermal {
                    domain,
                    package: sparkline(
                        NAME,
                        config.total_width,
                        config.total_height,
                        domain,
                        true,
                    )?,
                    cores: (0..cores)
                        .map(|_| sparkline(NAME, config.core_temp_width, 1, domain, false))
                        .collect::<Result<Vec<_>, _>>()?,
                })
            }
            _ => {
                warn!("no usable temperature range, cpu panel shows load only");
                None
            }
        };

        let mut widget = CpuWidget {
            title: format!("{} - {}", NAME, topology.brand),
            heading: format!("{} threads, {} cores", topology.logical_cpus, cores),
            load_domain,
            total,
            bands: vec![Band::NOMINAL; threads.len()],
            order: thread_order(cores, threads.len()),
            threads,
            thermal,
            frequency: None,
            scale,
            palette: Palette::default(),
            panel: Panel::default(),
        };
        widget.panel = widget.build_panel();
        Ok(widget)
    }

    pub fn total(&self) -> &Sparkline {
        &self.total
    }

    pub fn package(&self) -> Option<&Sparkline> {
        self.thermal.as_ref().map(|t| &t.package)
    }

    pub fn thread(&self, index: usize) -> Option<&Sparkline> {
        self.threads.get(index)
    }

    pub fn band(&self, index: usize) -> Option<Band> {
        self.bands.get(index).copied()
    }

    fn graph(&self) -> Vec<Line> {
        let mut load = self.total.lines();
        if let Some(first) = load.first_mut() {
            *first = overlay_tail(first, &format!("{:5.1}%", self.total.last_value()));
        }
        let mut lines: Vec<Line> = load.into_iter().map(|l| Line::toned(l, LOAD_TONE)).collect();

        if let Some(thermal) = &self.thermal {
            let mut temp = thermal.package.lines();
            if let Some(last) = temp.last_mut() {
                let label = format!("{:3}°C", thermal.package.last_value().round() as i64);
                *last = overlay_tail(last, &label);
            }
            lines.extend(temp.into_iter().map(|l| Line::toned(l, TEMP_TONE)));
        }
        lines
    }

    fn thread_box(&self) -> Panel {
        let mut lines: Vec<Line> = self
            .order
            .iter()
            .filter_map(|&i| {
                let stream = self.threads.get(i)?;
                let tone = self.palette.tone(self.bands[i]);
                let text = format!(
                    "{} {:3}%",
                    stream.lines().concat(),
                    stream.last_value().round() as i64
                );
                Some(Line::toned(text, tone))
            })
            .collect();

        if let Some(thermal) = &self.thermal {
            let stride = if self.threads.len() >= 2 * thermal.cores.len() { 2 } else { 1 };
            for (k, core) in thermal.cores.iter().enumerate() {
                if let Some(line) = lines.get_mut(k * stride) {
                    line.push(Span::plain(" "));
                    line.push(Span::toned(
                        format!(
                            "{} {}°C",
                            core.lines().concat(),
                            core.last_value().round() as i64
                        ),
                        TEMP_TONE,
                    ));
                }
            }
        }

        let mut inset = Panel::new(self.heading.clone(), Tone::Ansi(7)).body(lines, Align::Left);
        if let Some(mhz) = self.frequency {
            inset = inset.subtitle(format!("{:4} MHz", mhz.round() as i64));
        }
        inset
    }

    fn build_panel(&self) -> Panel {
        Panel::new(self.title.clone(), LOAD_TONE)
            .body(self.graph(), Align::Right)
            .inset(self.thread_box())
    }
}

impl Widget for CpuWidget {
    fn name(&self) -> &str {
        NAME
    }

    fn on_tick(&mut self, provider: &mut dyn MetricsProvider) {
        provider.refresh(MetricGroup::Cpu);
        feed(&mut self.total, provider, Metric::CpuTotal);
        let (min, max) = self.load_domain;
        for (i, stream) in self.threads.iter_mut().enumerate() {
            if let Some(load) = feed(stream, provider, Metric::CpuThread(i)) {
                self.bands[i] = self.scale.classify(load, min, max);
            }
        }
        if let Some(mhz) = reading(provider, Metric::CpuFrequency) {
            self.frequency = Some(mhz);
        }

        if let Some(thermal) = &mut self.thermal {
            provider.refresh(MetricGroup::Thermal);
            feed(&mut thermal.package, provider, Metric::PackageTemp);
            for (k, stream) in thermal.cores.iter_mut().enumerate() {
                feed(stream, provider, Metric::CoreTemp(k));
            }
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
    use crate::metrics::{FakeProvider, MetricError};

    fn provider() -> FakeProvider {
        let mut fake = FakeProvider::new()
            .with_topology(2, 4)
            .with_bounds(Metric::CpuTotal, 0.0, 100.0)
            .with_bounds(Metric::PackageTemp, 0.0, 100.0);
        fake.set(Metric::CpuTotal, 50.0);
        for i in 0..4 {
            fake.set(Metric::CpuThread(i), 10.0 + 25.0 * i as f64);
        }
        fake.set(Metric::CpuFrequency, 2400.0);
        fake.set(Metric::PackageTemp, 60.0);
        fake.set(Metric::CoreTemp(0), 55.0);
        fake.set(Metric::CoreTemp(1), 58.0);
        fake
    }

    fn config() -> CpuConfig {
        CpuConfig {
            total_width: 12,
            total_height: 2,
            thread_width: 4,
            core_temp_width: 3,
            ..Default::default()
        }
    }

    #[test]
    fn pairs_hyperthreads() {
        assert_eq!(thread_order(4, 8), vec![0, 4, 1, 5, 2, 6, 3, 7]);
        assert_eq!(thread_order(4, 4), vec![0, 1, 2, 3]);
        assert_eq!(thread_order(0, 3), vec![0, 1, 2]);
    }

    #[test]
    fn needs_at_least_one_cpu() {
        let fake = FakeProvider::new().with_topology(0, 0);
        assert!(matches!(
            CpuWidget::new(&fake, &config(), ColorScale::default()),
            Err(WidgetError::MissingConfiguration { .. })
        ));
    }

    #[test]
    fn tick_builds_panel() {
        let mut fake = provider();
        let mut widget = CpuWidget::new(&fake, &config(), ColorScale::default()).unwrap();
        widget.on_tick(&mut fake);

        let panel = widget.panel();
        assert_eq!(panel.title, "cpu - Fake CPU");
        // two load rows over two temperature rows
        assert_eq!(panel.body.len(), 4);
        assert!(panel.body[0].text().ends_with(" 50.0%"));
        assert!(panel.body[3].text().ends_with(" 60°C"));
        assert_eq!(panel.body[0].width(), 12);

        let inset = panel.inset.as_deref().unwrap();
        assert_eq!(inset.title, "4 threads, 2 cores");
        assert_eq!(inset.subtitle.as_deref(), Some("2400 MHz"));
        assert_eq!(inset.body.len(), 4);
        // order 0, 2, 1, 3; core temps on lines 0 and 2
        assert!(inset.body[0].text().contains(" 10%"));
        assert!(inset.body[0].text().ends_with(" 55°C"));
        assert!(inset.body[1].text().contains(" 60%"));
        assert!(inset.body[2].text().ends_with(" 58°C"));
        assert_eq!(widget.band(3), Some(Band::CRITICAL));
        assert_eq!(inset.body[3].spans[0].tone, Tone::Ansi(2));
    }

    #[test]
    fn without_thermal_range_shows_load_only() {
        let mut fake = provider();
        let fake_config = CpuConfig {
            temp_low: 150.0,
            ..config()
        };
        let mut widget = CpuWidget::new(&fake, &fake_config, ColorScale::default()).unwrap();
        widget.on_tick(&mut fake);
        assert!(widget.package().is_none());
        assert_eq!(widget.panel().body.len(), 2);
        assert!(!fake.refreshes().contains(&MetricGroup::Thermal));
    }

    #[test]
    fn failed_reading_leaves_stream_alone() {
        let mut fake = provider();
        let mut widget = CpuWidget::new(&fake, &config(), ColorScale::default()).unwrap();
        widget.on_tick(&mut fake);
        let before = widget.thread(1).unwrap().lines();

        fake.script(
            Metric::CpuThread(1),
            [Err(MetricError::Unavailable(Metric::CpuThread(1)))],
        );
        widget.on_tick(&mut fake);

        assert_eq!(widget.thread(1).unwrap().lines(), before);
        assert_eq!(widget.thread(1).unwrap().last_value(), 35.0);
        assert_ne!(widget.thread(0).unwrap().lines(), vec!["    ".to_string()]);
    }
}
