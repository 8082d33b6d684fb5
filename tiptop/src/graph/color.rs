use crate::panel::Tone;

/// Severity band index, 0 being the calmest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Band(pub usize);

impl Band {
    pub const NOMINAL: Band = Band(0);
    pub const ELEVATED: Band = Band(1);
    pub const HIGH: Band = Band(2);
    pub const CRITICAL: Band = Band(3);
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScaleError {
    #[error("color scale thresholds must be strictly increasing within (0, 1), got {0:?}")]
    InvalidThresholds(Vec<f64>),
}

/// Splits a domain into contiguous bands at fractional thresholds.
///
/// Bands are half-open, `[t_i, t_{i+1})`, and the top band also contains the
/// domain maximum. A value sitting exactly on a threshold belongs to the band
/// above it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    thresholds: Vec<f64>,
}

impl ColorScale {
    pub fn even(bands: usize) -> ColorScale {
        let bands = bands.max(1);
        ColorScale {
            thresholds: (1..bands).map(|i| i as f64 / bands as f64).collect(),
        }
    }

    pub fn with_thresholds(thresholds: Vec<f64>) -> Result<ColorScale, ScaleError> {
        let in_range = thresholds.iter().all(|t| *t > 0.0 && *t < 1.0);
        let increasing = thresholds.windows(2).all(|w| w[0] < w[1]);
        if !in_range || !increasing {
            return Err(ScaleError::InvalidThresholds(thresholds));
        }
        Ok(ColorScale { thresholds })
    }

    pub fn bands(&self) -> usize {
        self.thresholds.len() + 1
    }

    pub fn classify(&self, value: f64, min: f64, max: f64) -> Band {
        if !(max > min) {
            return Band(0);
        }
        let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
        Band(self.thresholds.iter().take_while(|th| **th <= t).count())
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        ColorScale::even(4)
    }
}

/// Display tone for each band; bands past the end reuse the last tone.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    tones: Vec<Tone>,
}

impl Palette {
    pub fn new(tones: Vec<Tone>) -> Palette {
        Palette { tones }
    }

    pub fn tone(&self, band: Band) -> Tone {
        match self.tones.get(band.0).or(self.tones.last()) {
            Some(tone) => *tone,
            None => Tone::Default,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new(vec![
            Tone::Ansi(4),
            Tone::Ansi(6),
            Tone::Ansi(6),
            Tone::Ansi(2),
        ])
    }
}
