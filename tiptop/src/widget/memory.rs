use super::{feed, overlay_tail, sizeof_fmt, sparkline, Widget, WidgetError};
use crate::config::MemoryConfig;
use crate::graph::{ColorScale, Palette, Sparkline};
use crate::metrics::{Metric, MetricGroup, MetricsProvider};
use crate::panel::{Align, Line, Panel, Span, Tone};

const NAME: &str = "mem";

struct Gauge {
    label: &'static str,
    used: Metric,
    stream: Sparkline,
}

impl Gauge {
    /// Size the trace was scaled against at startup.
    fn capacity(&self) -> f64 {
        self.stream.domain().1
    }

    fn percent(&self) -> f64 {
        100.0 * self.stream.last_value() / self.capacity()
    }
}

/// Memory and swap usage traces.
pub struct MemoryWidget {
    gauges: Vec<Gauge>,
    scale: ColorScale,
    palette: Palette,
    panel: Panel,
}

impl MemoryWidget {
    pub fn new(
        provider: &dyn MetricsProvider,
        config: &MemoryConfig,
        scale: ColorScale,
    ) -> Result<MemoryWidget, WidgetError> {
        let memory = provider
            .static_bounds(Metric::MemoryUsed)
            .ok_or_else(|| WidgetError::MissingConfiguration {
                widget: NAME,
                what: "total memory".to_string(),
            })?;

        let mut gauges = vec![Gauge {
            label: "mem",
            used: Metric::MemoryUsed,
            stream: sparkline(NAME, config.width, config.height, memory, false)?,
        }];
        // Hosts without swap just show memory.
        if let Some(swap) = provider.static_bounds(Metric::SwapUsed) {
            gauges.push(Gauge {
                label: "swp",
                used: Metric::SwapUsed,
                stream: sparkline(NAME, config.width, config.height, swap, false)?,
            });
        }

        let mut widget = MemoryWidget {
            gauges,
            scale,
            palette: Palette::new(vec![Tone::Ansi(2), Tone::Ansi(3), Tone::Ansi(3), Tone::Ansi(1)]),
            panel: Panel::default(),
        };
        widget.panel = widget.build_panel();
        Ok(widget)
    }

    pub fn memory(&self) -> &Sparkline {
        &self.gauges[0].stream
    }

    pub fn swap(&self) -> Option<&Sparkline> {
        self.gauges.get(1).map(|g| &g.stream)
    }

    fn build_panel(&self) -> Panel {
        let mut body = Vec::new();
        for gauge in &self.gauges {
            let band = self.scale.classify(gauge.percent(), 0.0, 100.0);
            let tone = self.palette.tone(band);
            let mut lines = gauge.stream.lines();
            if let Some(first) = lines.first_mut() {
                *first = overlay_tail(first, &format!("{:5.1}%", gauge.percent()));
            }
            body.push(
                Line::default()
                    .with(Span::plain(format!("{} ", gauge.label)).bold())
                    .with(Span::toned(
                        format!(
                            "{} / {}",
                            sizeof_fmt(gauge.stream.last_value() as u64),
                            sizeof_fmt(gauge.capacity() as u64)
                        ),
                        tone,
                    )),
            );
            body.extend(lines.into_iter().map(|l| Line::toned(l, tone)));
        }
        Panel::new(NAME, Tone::Ansi(2)).body(body, Align::Left)
    }
}

impl Widget for MemoryWidget {
    fn name(&self) -> &str {
        NAME
    }

    fn on_tick(&mut self, provider: &mut dyn MetricsProvider) {
        provider.refresh(MetricGroup::Memory);
        for gauge in &mut self.gauges {
            feed(&mut gauge.stream, provider, gauge.used);
        }
        self.panel = self.build_panel();
    }

    fn panel(&self) -> &Panel {
        &self.panel
    }
}
