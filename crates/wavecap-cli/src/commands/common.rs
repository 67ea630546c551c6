//! Shared CLI helpers used across multiple commands.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use wavecap_analysis::Analysis;
use wavecap_config::AnalyzerConfig;
use wavecap_core::Shape;

/// Load the effective configuration.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AnalyzerConfig> {
    AnalyzerConfig::discover(path).map_err(|e| anyhow::anyhow!("{}", e))
}

/// Waveform shapes for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ShapeArg {
    #[default]
    Sine,
    Triangle,
    Square,
}

impl From<ShapeArg> for Shape {
    fn from(s: ShapeArg) -> Self {
        match s {
            ShapeArg::Sine => Shape::Sine,
            ShapeArg::Triangle => Shape::Triangle,
            ShapeArg::Square => Shape::Square,
        }
    }
}

/// One line of output: a capture window and its verdict.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub measured_fs: f64,
    pub samples: usize,
    pub label: &'static str,
    pub confidence: f64,
    pub frequency_hz: Option<f64>,
    pub method: Option<&'static str>,
    pub spectral_hz: Option<f64>,
    pub zero_crossing_hz: Option<f64>,
    pub hysteresis_hz: Option<f64>,
    pub autocorrelation_hz: Option<f64>,
    pub plateau_frac: f64,
    pub const_slope_frac: f64,
    pub sign_change_rate: f64,
    pub slope_cv: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

impl CycleReport {
    pub fn new(cycle: u64, analysis: &Analysis) -> Self {
        let f = &analysis.frequency;
        let c = &analysis.classification;
        Self {
            cycle,
            measured_fs: analysis.measured_fs,
            samples: analysis.samples,
            label: c.label.as_str(),
            confidence: c.confidence,
            frequency_hz: f.selected.hz(),
            method: f.method.map(|m| m.as_str()),
            spectral_hz: f.spectral.hz(),
            zero_crossing_hz: f.zero_crossing.hz(),
            hysteresis_hz: f.hysteresis.hz(),
            autocorrelation_hz: f.autocorrelation.hz(),
            plateau_frac: c.features.plateau_frac,
            const_slope_frac: c.features.const_slope_frac,
            sign_change_rate: c.features.sign_change_rate,
            slope_cv: c.features.slope_cv,
            note: c.note,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn hz(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2} Hz"))
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>4}] fs={:.1} Hz  fft={}  zc={}  -> {} ({:.2})",
            self.cycle,
            self.measured_fs,
            hz(self.spectral_hz),
            hz(self.zero_crossing_hz),
            self.label,
            self.confidence,
        )?;
        if self.spectral_hz.is_none()
            && let Some(selected) = self.frequency_hz
        {
            write!(f, "  f0={selected:.2} Hz")?;
        }
        if let Some(note) = self.note {
            write!(f, "  [{note}]")?;
        }
        Ok(())
    }
}
