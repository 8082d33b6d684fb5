//! Metric widgets
//!
//! A widget owns its sparklines and turns provider readings into a [`Panel`]
//! each time the scheduler ticks it. A reading that fails is skipped for that
//! tick: the matching sparkline is left as it was and no placeholder sample
//! is appended.

mod cpu;
mod info;
mod memory;
mod net;
mod procs;
mod text;
mod worker;

use tracing::{debug, warn};

use crate::graph::{Sparkline, StreamError};
use crate::metrics::{Metric, MetricError, MetricsProvider};
use crate::panel::Panel;

pub use cpu::{thread_order, CpuWidget};
pub use info::{Clock, InfoLine};
pub use memory::MemoryWidget;
pub use net::NetWidget;
pub use procs::ProcessWidget;
pub use text::{overlay_tail, sizeof_fmt};
pub use worker::Worker;

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// The host lacks something the widget cannot work without.
    #[error("{widget}: {what} not available on this host")]
    MissingConfiguration { widget: &'static str, what: String },
    #[error("{widget}: {source}")]
    Stream {
        widget: &'static str,
        #[source]
        source: StreamError,
    },
    #[error("{widget}: failed to start worker thread: {source}")]
    Spawn {
        widget: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub trait Widget {
    fn name(&self) -> &str;

    /// Samples the provider and rebuilds the panel. Never fails; readings
    /// that are unavailable this tick are skipped.
    fn on_tick(&mut self, provider: &mut dyn MetricsProvider);

    fn panel(&self) -> &Panel;
}

fn sparkline(
    widget: &'static str,
    width: usize,
    height: usize,
    (min, max): (f64, f64),
    flip: bool,
) -> Result<Sparkline, WidgetError> {
    Sparkline::new(width, height, min, max, flip)
        .map_err(|source| WidgetError::Stream { widget, source })
}

fn reading(provider: &dyn MetricsProvider, metric: Metric) -> Option<f64> {
    match provider.current(metric) {
        Ok(value) if value.is_finite() => Some(value),
        Ok(value) => {
            warn!("discarding non-finite {} reading {}", metric, value);
            None
        }
        Err(e @ MetricError::Unsupported(_)) => {
            debug!("{}", e);
            None
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

/// Appends the current reading of `metric`, if there is one.
fn feed(stream: &mut Sparkline, provider: &dyn MetricsProvider, metric: Metric) -> Option<f64> {
    let value = reading(provider, metric)?;
    stream.append(value);
    Some(value)
}
