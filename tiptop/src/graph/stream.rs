//! Sparkline stream
//!
//! Keeps a fixed number of glyph columns per character row and scrolls them
//! left by one column on every appended sample. Taller streams stack rows of
//! braille cells, each row covering [`CELL_LEVELS`] levels of the domain; a
//! sample lights a glyph in the row its level falls into and blanks the rest.

use std::collections::{vec_deque, VecDeque};
use std::fmt;

use super::glyph::{level_pair_to_glyph, quantize, Glyph, Orientation, CELL_LEVELS};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    #[error("sparkline width must be at least 1")]
    ZeroWidth,
    #[error("sparkline height must be at least 1")]
    ZeroHeight,
    #[error("invalid sparkline domain {min}..{max}")]
    InvalidDomain { min: f64, max: f64 },
}

/// One character row of a sparkline, oldest glyph first.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    glyphs: VecDeque<Glyph>,
}

impl Row {
    fn blank(width: usize) -> Self {
        Self {
            glyphs: std::iter::repeat(Glyph::BLANK).take(width).collect(),
        }
    }

    fn push(&mut self, glyph: Glyph) {
        self.glyphs.pop_front();
        self.glyphs.push_back(glyph);
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Glyph> {
        self.glyphs.iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for glyph in &self.glyphs {
            write!(f, "{}", glyph)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Sparkline {
    min: f64,
    max: f64,
    flip: bool,
    // rows[0] is the baseline row
    rows: Vec<Row>,
    last_level: usize,
    last_value: f64,
}

impl Sparkline {
    pub fn new(
        width: usize,
        height: usize,
        min: f64,
        max: f64,
        flip: bool,
    ) -> Result<Sparkline, StreamError> {
        if width == 0 {
            return Err(StreamError::ZeroWidth);
        }
        if height == 0 {
            return Err(StreamError::ZeroHeight);
        }
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(StreamError::InvalidDomain { min, max });
        }
        Ok(Sparkline {
            min,
            max,
            flip,
            rows: (0..height).map(|_| Row::blank(width)).collect(),
            last_level: 0,
            last_value: min,
        })
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Distinguishable levels across the full height.
    pub fn resolution(&self) -> usize {
        CELL_LEVELS * self.rows.len()
    }

    pub fn last_value(&self) -> f64 {
        self.last_value
    }

    pub fn append(&mut self, value: f64) {
        let level = quantize(value, self.min, self.max, self.resolution());
        let prev = self.last_level;
        let active = level.saturating_sub(1) / CELL_LEVELS;
        let orientation = if self.flip {
            Orientation::Down
        } else {
            Orientation::Up
        };

        for (r, row) in self.rows.iter_mut().enumerate() {
            let glyph = if r == active {
                let base = r * CELL_LEVELS;
                level_pair_to_glyph(prev.saturating_sub(base), level - base, orientation)
            } else {
                Glyph::BLANK
            };
            row.push(glyph);
        }

        self.last_level = level;
        self.last_value = value;
    }

    /// Rows in display order, top first.
    pub fn rows(&self) -> Vec<&Row> {
        if self.flip {
            self.rows.iter().collect()
        } else {
            self.rows.iter().rev().collect()
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.rows().into_iter().map(Row::to_string).collect()
    }
}
