//! Classification labels and results.

use core::fmt;
use core::str::FromStr;

use crate::estimate::FrequencyEstimate;

/// Waveform shape verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveformLabel {
    /// Sinusoid: negligible harmonics, continuously varying slope.
    Sine,
    /// Triangle: fast-decaying odd harmonics, constant slope magnitude.
    Triangle,
    /// Square: slowly decaying odd harmonics, dwell at the extremes.
    Square,
    /// No usable variation in the window.
    Flat,
    /// Features did not support any shape.
    Unknown,
}

impl WaveformLabel {
    /// All labels, in reporting order.
    pub const ALL: [WaveformLabel; 5] = [
        WaveformLabel::Sine,
        WaveformLabel::Triangle,
        WaveformLabel::Square,
        WaveformLabel::Flat,
        WaveformLabel::Unknown,
    ];

    /// Lowercase name, stable for logs and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            WaveformLabel::Sine => "sine",
            WaveformLabel::Triangle => "triangle",
            WaveformLabel::Square => "square",
            WaveformLabel::Flat => "flat",
            WaveformLabel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WaveformLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for WaveformLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sine" | "sin" => Ok(WaveformLabel::Sine),
            "triangle" | "tri" => Ok(WaveformLabel::Triangle),
            "square" | "sq" => Ok(WaveformLabel::Square),
            "flat" => Ok(WaveformLabel::Flat),
            "unknown" => Ok(WaveformLabel::Unknown),
            _ => Err(()),
        }
    }
}

/// Time-domain shape features of a normalized signal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeFeatures {
    /// Fraction of samples with `|x|` at or above the plateau level.
    pub plateau_frac: f64,
    /// Fraction of `|dx|` within the tolerance band around the median `|dx|`.
    pub const_slope_frac: f64,
    /// Fraction of adjacent `dx` pairs whose sign differs.
    pub sign_change_rate: f64,
    /// Coefficient of variation of `|dx|` (std / mean).
    pub slope_cv: f64,
}

/// Harmonic magnitudes relative to the fundamental bin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HarmonicRatios {
    /// Second harmonic over fundamental.
    pub r2: f64,
    /// Third harmonic over fundamental.
    pub r3: f64,
    /// Fifth harmonic over fundamental.
    pub r5: f64,
}

impl HarmonicRatios {
    /// Fifth over third: how fast odd harmonics decay.
    pub fn odd_decay(&self) -> f64 {
        self.r5 / (self.r3 + 1e-12)
    }
}

/// Outcome of one capture cycle's classification.
///
/// Always produced, even when nothing could be decided, so a caller can
/// report every cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    /// Shape verdict.
    pub label: WaveformLabel,
    /// Fundamental estimate used alongside the verdict.
    pub frequency: FrequencyEstimate,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Time-domain features (zeroed when not computed).
    pub features: ShapeFeatures,
    /// Harmonic ratios, when a fundamental and spectrum were available.
    pub harmonics: Option<HarmonicRatios>,
    /// Short diagnostic, set for guard and fallback outcomes.
    pub note: Option<&'static str>,
}

impl ClassificationResult {
    /// A zero-confidence result carrying only a label and a note.
    pub fn undecided(label: WaveformLabel, note: &'static str) -> Self {
        Self {
            label,
            frequency: FrequencyEstimate::Indeterminate,
            confidence: 0.0,
            features: ShapeFeatures::default(),
            harmonics: None,
            note: Some(note),
        }
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}) f={} plateau={:.3} const_slope={:.3} sign_change={:.3} slope_cv={:.3}",
            self.label,
            self.confidence,
            self.frequency,
            self.features.plateau_frac,
            self.features.const_slope_frac,
            self.features.sign_change_rate,
            self.features.slope_cv,
        )?;
        if let Some(h) = self.harmonics {
            write!(f, " r2={:.3} r3={:.3} r5={:.3}", h.r2, h.r3, h.r5)?;
        }
        if let Some(note) = self.note {
            write!(f, " [{note}]")?;
        }
        Ok(())
    }
}
