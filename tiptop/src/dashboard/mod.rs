//! Dashboard composition
//!
//! The dashboard is a list of named screen regions, each showing one
//! widget's panel. It holds no metric state: composing a frame reads the
//! latest panels from the scheduler and places the visible ones.

mod layout;

use std::io;

use tracing::debug;

use crate::panel::Panel;
use crate::schedule::{Scheduler, WidgetId};

pub use layout::{dock_all, Edge, Rect};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("terminal output failed: {0}")]
    Io(#[from] io::Error),
    #[error("renderer is closed")]
    Closed,
}

/// Draws composed frames. Each call to `draw` must put the whole frame on
/// screen before returning.
pub trait Renderer {
    fn area(&self) -> Result<Rect, RenderError>;

    fn draw(&mut self, frame: &Frame) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub widget: WidgetId,
    pub edge: Edge,
    pub size: Option<u16>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub region: String,
    pub rect: Rect,
    pub panel: Panel,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub area: Rect,
    pub placements: Vec<Placement>,
}

impl Frame {
    pub fn placement(&self, region: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.region == region)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    regions: Vec<Region>,
}

impl Dashboard {
    pub fn new() -> Dashboard {
        Self::default()
    }

    pub fn add(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn is_visible(&self, name: &str) -> Option<bool> {
        self.regions
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.visible)
    }

    /// Flips a region's visibility and returns the new state, or `None` for
    /// an unknown region.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let region = self.regions.iter_mut().find(|r| r.name == name)?;
        region.visible = !region.visible;
        debug!("region {} visible: {}", name, region.visible);
        Some(region.visible)
    }

    /// Lays out the visible regions in `area` with their current panels.
    pub fn compose(&self, area: Rect, scheduler: &Scheduler) -> Frame {
        let visible: Vec<&Region> = self.regions.iter().filter(|r| r.visible).collect();
        let requests: Vec<(Edge, Option<u16>)> =
            visible.iter().map(|r| (r.edge, r.size)).collect();
        let rects = dock_all(area, &requests);

        let placements = visible
            .into_iter()
            .zip(rects)
            .filter(|(_, rect)| !rect.is_empty())
            .filter_map(|(region, rect)| {
                let panel = scheduler.panel(region.widget)?;
                Some(Placement {
                    region: region.name.clone(),
                    rect,
                    panel: panel.clone(),
                })
            })
            .collect();
        Frame { area, placements }
    }
}
