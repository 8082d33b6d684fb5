//! Quantizer and braille glyph encoder
//!
//! A braille cell has two dot columns of four dots each. A glyph encodes one
//! step of a trace: the left column is filled up to the previous level and
//! the right column up to the current level. With five levels per column
//! (0 to 4 dots) there are 25 glyphs per orientation, one per ordered pair.

use std::fmt;

/// Number of dot rows in one braille cell, i.e. the per-cell resolution.
pub const CELL_LEVELS: usize = 4;

const BRAILLE_BASE: u32 = 0x2800;

// Dot bits listed from the anchor outwards.
const UP_LEFT: [u8; CELL_LEVELS] = [0x40, 0x04, 0x02, 0x01];
const UP_RIGHT: [u8; CELL_LEVELS] = [0x80, 0x20, 0x10, 0x08];
const DOWN_LEFT: [u8; CELL_LEVELS] = [0x01, 0x02, 0x04, 0x40];
const DOWN_RIGHT: [u8; CELL_LEVELS] = [0x08, 0x10, 0x20, 0x80];

type GlyphTable = [[Glyph; CELL_LEVELS + 1]; CELL_LEVELS + 1];

static UPWARD: GlyphTable = build_table(UP_LEFT, UP_RIGHT);
static DOWNWARD: GlyphTable = build_table(DOWN_LEFT, DOWN_RIGHT);

/// Which edge of the cell the dots grow from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Dots fill from the bottom of the cell.
    #[default]
    Up,
    /// Dots fill from the top of the cell.
    Down,
}

/// One character cell of a sparkline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Glyph(char);

impl Glyph {
    pub const BLANK: Glyph = Glyph(' ');

    pub fn as_char(self) -> char {
        self.0
    }

    pub fn is_blank(self) -> bool {
        self == Self::BLANK
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self::BLANK
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const fn column_bits(dots: &[u8; CELL_LEVELS], level: usize) -> u8 {
    let mut bits = 0;
    let mut i = 0;
    while i < level {
        bits |= dots[i];
        i += 1;
    }
    bits
}

const fn build_table(left: [u8; CELL_LEVELS], right: [u8; CELL_LEVELS]) -> GlyphTable {
    let mut table = [[Glyph::BLANK; CELL_LEVELS + 1]; CELL_LEVELS + 1];
    let mut prev = 0;
    while prev <= CELL_LEVELS {
        let mut cur = 0;
        while cur <= CELL_LEVELS {
            let bits = column_bits(&left, prev) | column_bits(&right, cur);
            // An empty cell is drawn as a plain space, not U+2800.
            if bits != 0 {
                if let Some(c) = char::from_u32(BRAILLE_BASE + bits as u32) {
                    table[prev][cur] = Glyph(c);
                }
            }
            cur += 1;
        }
        prev += 1;
    }
    table
}

/// Maps `value` onto `[0, resolution]`.
///
/// The value is clamped into `[min, max]` and the scaled position is rounded
/// up, so anything above zero shows at least one dot. NaN and a degenerate
/// domain both yield level 0.
pub fn quantize(value: f64, min: f64, max: f64, resolution: usize) -> usize {
    if value.is_nan() || !(max > min) {
        return 0;
    }
    let t = (value.clamp(min, max) - min) / (max - min);
    let level = (t * resolution as f64).ceil();
    (level as usize).min(resolution)
}

/// Returns the glyph for a step from `prev` to `level`.
///
/// Levels above [`CELL_LEVELS`] are clamped, so every pair maps to a glyph.
pub fn level_pair_to_glyph(prev: usize, level: usize, orientation: Orientation) -> Glyph {
    let table = match orientation {
        Orientation::Up => &UPWARD,
        Orientation::Down => &DOWNWARD,
    };
    table[prev.min(CELL_LEVELS)][level.min(CELL_LEVELS)]
}
