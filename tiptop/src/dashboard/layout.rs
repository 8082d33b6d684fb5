//! Edge docking
//!
//! Regions are cut off the edges of the screen. Fixed-size regions dock
//! first, in order, each taking its size (or whatever is left) from its edge
//! of the remaining area. Flexible regions then share what remains evenly
//! along their own axis.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    fn is_vertical(self) -> bool {
        matches!(self, Edge::Top | Edge::Bottom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Cuts `size` cells off `edge`; returns the cut and the remainder.
    pub fn dock(self, edge: Edge, size: u16) -> (Rect, Rect) {
        match edge {
            Edge::Top => {
                let h = size.min(self.height);
                (
                    Rect::new(self.x, self.y, self.width, h),
                    Rect::new(self.x, self.y + h, self.width, self.height - h),
                )
            }
            Edge::Bottom => {
                let h = size.min(self.height);
                (
                    Rect::new(self.x, self.y + self.height - h, self.width, h),
                    Rect::new(self.x, self.y, self.width, self.height - h),
                )
            }
            Edge::Left => {
                let w = size.min(self.width);
                (
                    Rect::new(self.x, self.y, w, self.height),
                    Rect::new(self.x + w, self.y, self.width - w, self.height),
                )
            }
            Edge::Right => {
                let w = size.min(self.width);
                (
                    Rect::new(self.x + self.width - w, self.y, w, self.height),
                    Rect::new(self.x, self.y, self.width - w, self.height),
                )
            }
        }
    }

    fn extent(&self, edge: Edge) -> u16 {
        if edge.is_vertical() {
            self.height
        } else {
            self.width
        }
    }
}

/// Places `(edge, size)` requests inside `area`, returning one rect per
/// request in the same order. Requests that get no space come back empty.
pub fn dock_all(area: Rect, requests: &[(Edge, Option<u16>)]) -> Vec<Rect> {
    let mut placed = vec![Rect::default(); requests.len()];
    let mut rest = area;

    for (i, (edge, size)) in requests.iter().enumerate() {
        if let Some(size) = size {
            let (cut, remainder) = rest.dock(*edge, *size);
            placed[i] = cut;
            rest = remainder;
        }
    }

    let flexible: Vec<usize> = (0..requests.len())
        .filter(|i| requests[*i].1.is_none())
        .collect();
    for (k, &i) in flexible.iter().enumerate() {
        let edge = requests[i].0;
        let share = rest.extent(edge) / (flexible.len() - k) as u16;
        let (cut, remainder) = rest.dock(edge, share);
        placed[i] = cut;
        rest = remainder;
    }
    placed
}
