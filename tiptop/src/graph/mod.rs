//! Braille sparklines
//!
//! - `glyph`: quantizer and the level-pair to braille glyph tables
//! - `stream`: fixed-width rolling sparkline built from those glyphs
//! - `color`: maps a reading to a severity band

mod color;
mod glyph;
mod stream;

pub use color::{Band, ColorScale, Palette, ScaleError};
pub use glyph::{level_pair_to_glyph, quantize, Glyph, Orientation, CELL_LEVELS};
pub use stream::{Row, Sparkline, StreamError};
