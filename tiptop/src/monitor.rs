//! Event loop
//!
//! A [`Monitor`] ties the scheduler, the dashboard, the metrics provider and
//! the renderer together. Each pass through the loop ticks whatever is due,
//! draws one frame for the whole batch, then sleeps until the next deadline
//! or the next shell command, whichever comes first.

use std::time::{Duration, Instant};

use futures::{future::FutureExt, select, Stream, StreamExt};
use futures_timer::Delay;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, DashboardConfig, RegionConfig};
use crate::dashboard::{Dashboard, Region, RenderError, Renderer};
use crate::metrics::{MetricsProvider, ProcessSource};
use crate::schedule::{Scheduler, WidgetId};
use crate::widget::{CpuWidget, InfoLine, MemoryWidget, NetWidget, ProcessWidget, Widget, WidgetError};

/// How long the loop sleeps when no widget has a pending deadline.
pub const IDLE_WAIT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show or hide a region by name.
    Toggle(String),
    Redraw,
    Quit,
}

pub struct Monitor<P, R> {
    scheduler: Scheduler,
    dashboard: Dashboard,
    provider: P,
    renderer: R,
    frames: u64,
}

impl<P: MetricsProvider, R: Renderer> Monitor<P, R> {
    pub fn new(provider: P, renderer: R) -> Monitor<P, R> {
        Monitor {
            scheduler: Scheduler::new(),
            dashboard: Dashboard::new(),
            provider,
            renderer,
            frames: 0,
        }
    }

    /// Builds the widgets named by `config.regions`, in order. A widget the
    /// host cannot support is left out along with its region.
    pub fn from_config(
        config: &DashboardConfig,
        provider: P,
        processes: Box<dyn ProcessSource>,
        renderer: R,
        now: Instant,
    ) -> Result<Monitor<P, R>, ConfigError> {
        config.validate()?;
        let scale = config.colors.scale()?;
        let mut monitor = Monitor::new(provider, renderer);
        let mut processes = Some(processes);

        for region in &config.regions {
            let built: Result<(Box<dyn Widget>, Option<Duration>), WidgetError> =
                match region.name.as_str() {
                    "info" => Ok((
                        Box::new(InfoLine::system()) as Box<dyn Widget>,
                        config.info.interval(),
                    )),
                    "cpu" => CpuWidget::new(&monitor.provider, &config.cpu, scale.clone())
                        .map(|w| (Box::new(w) as Box<dyn Widget>, config.cpu.interval())),
                    "mem" => MemoryWidget::new(&monitor.provider, &config.mem, scale.clone())
                        .map(|w| (Box::new(w) as Box<dyn Widget>, config.mem.interval())),
                    "net" => Ok((
                        Box::new(NetWidget::new()) as Box<dyn Widget>,
                        config.net.interval(),
                    )),
                    "proc" => {
                        let source = processes.take().ok_or_else(|| {
                            ConfigError::Invalid("region proc listed twice".to_string())
                        })?;
                        ProcessWidget::new(source, &config.procs)
                            .map(|w| (Box::new(w) as Box<dyn Widget>, config.procs.interval()))
                    }
                    other => {
                        return Err(ConfigError::Invalid(format!("unknown region {}", other)))
                    }
                };

            match built {
                Ok((widget, interval)) => {
                    monitor.add(region, widget, interval, now);
                }
                Err(e) => warn!("omitting region {}: {}", region.name, e),
            }
        }
        info!("dashboard with {} regions", monitor.dashboard.regions().len());
        Ok(monitor)
    }

    /// Registers `widget` with the scheduler and places it in a region.
    pub fn add(
        &mut self,
        region: &RegionConfig,
        widget: Box<dyn Widget>,
        interval: Option<Duration>,
        now: Instant,
    ) -> WidgetId {
        let id = self.scheduler.register(widget, interval, now);
        self.dashboard.add(Region {
            name: region.name.clone(),
            widget: id,
            edge: region.edge,
            size: region.size,
            visible: region.visible,
        });
        id
    }

    /// Ticks every widget due at `now` and draws a single frame if any ran.
    pub fn step(&mut self, now: Instant) -> Result<Vec<WidgetId>, RenderError> {
        let ticked = self.scheduler.run_due(now, &mut self.provider);
        if !ticked.is_empty() {
            self.render()?;
        }
        Ok(ticked)
    }

    pub fn render(&mut self) -> Result<(), RenderError> {
        let area = self.renderer.area()?;
        let frame = self.dashboard.compose(area, &self.scheduler);
        self.renderer.draw(&frame)?;
        self.frames += 1;
        Ok(())
    }

    /// Flips a region's visibility. Widgets keep ticking while hidden.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        self.dashboard.toggle(name)
    }

    /// Cancels all timers. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if !self.scheduler.is_stopped() {
            self.scheduler.shutdown();
        }
    }

    /// Applies a shell command; returns `false` once the loop should stop.
    pub fn handle(&mut self, command: Command) -> Result<bool, RenderError> {
        match command {
            Command::Toggle(name) => {
                match self.toggle(&name) {
                    Some(_) => self.render()?,
                    None => debug!("no region named {}", name),
                }
                Ok(true)
            }
            Command::Redraw => {
                self.render()?;
                Ok(true)
            }
            Command::Quit => Ok(false),
        }
    }

    /// Runs until `commands` yields [`Command::Quit`] or ends, or until the
    /// renderer fails. Timers are cancelled on every exit path.
    pub async fn run<S>(&mut self, mut commands: S) -> Result<(), RenderError>
    where
        S: Stream<Item = Command> + Unpin,
    {
        let result = self.event_loop(&mut commands).await;
        self.shutdown();
        result
    }

    async fn event_loop<S>(&mut self, commands: &mut S) -> Result<(), RenderError>
    where
        S: Stream<Item = Command> + Unpin,
    {
        loop {
            self.step(Instant::now())?;

            let wait = match self.scheduler.next_deadline() {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => IDLE_WAIT,
            };
            let mut delay = Delay::new(wait).fuse();
            let mut next = commands.next().fuse();

            select! {
                _ = delay => {},
                command = next => match command {
                    Some(command) => {
                        if !self.handle(command)? {
                            return Ok(());
                        }
                    }
                    None => return Ok(()),
                },
            }
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
