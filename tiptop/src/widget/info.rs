use chrono::{DateTime, Local};

use super::{reading, Widget};
use crate::metrics::{Metric, MetricGroup, MetricsProvider};
use crate::panel::{Align, Line, Panel, Tone};

const NAME: &str = "info";

pub type Clock = Box<dyn Fn() -> DateTime<Local>>;

fn format_uptime(seconds: f64) -> String {
    let secs = seconds.max(0.0) as u64;
    format!(
        "up {} days, {}:{:02}",
        secs / 86_400,
        secs % 86_400 / 3_600,
        secs % 3_600 / 60
    )
}

/// One-line status bar: wall clock, uptime and battery charge.
pub struct InfoLine {
    clock: Clock,
    uptime: Option<f64>,
    battery: Option<f64>,
    panel: Panel,
}

impl InfoLine {
    pub fn new(clock: Clock) -> InfoLine {
        let mut widget = InfoLine {
            clock,
            uptime: None,
            battery: None,
            panel: Panel::default(),
        };
        widget.panel = widget.build_panel();
        widget
    }

    pub fn system() -> InfoLine {
        Self::new(Box::new(Local::now))
    }

    fn build_panel(&self) -> Panel {
        let mut text = (self.clock)().format("%c").to_string();
        if let Some(uptime) = self.uptime {
            text.push_str(", ");
            text.push_str(&format_uptime(uptime));
        }
        if let Some(battery) = self.battery {
            text.push_str(&format!(", BAT {}%", battery.round() as i64));
        }
        Panel::bare(vec![Line::toned(text, Tone::Ansi(8))], Align::Center)
    }
}

impl Widget for InfoLine {
    fn name(&self) -> &str {
        NAME
    }

    fn on_tick(&mut self, provider: &mut dyn MetricsProvider) {
        provider.refresh(MetricGroup::Host);
        if let Some(uptime) = reading(provider, Metric::Uptime) {
            self.uptime = Some(uptime);
        }
        if let Some(battery) = reading(provider, Metric::Battery) {
            self.battery = Some(battery);
        }
        self.panel = self.build_panel();
    }

    fn panel(&self) -> &Panel {
        &self.panel
    }
}
