//! Frequency estimate value type.

use core::fmt;

use libm::fabs;

/// A fundamental-frequency estimate.
///
/// "No reliable period found" is a valid outcome, not an error, so it is a
/// variant rather than a `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FrequencyEstimate {
    /// A non-negative frequency in Hz.
    Hz(f64),
    /// No reliable periodicity in the window.
    #[default]
    Indeterminate,
}

impl FrequencyEstimate {
    /// Wrap a raw estimate; zero, negative and non-finite values are indeterminate.
    pub fn from_hz(hz: f64) -> Self {
        if hz.is_finite() && hz > 0.0 {
            Self::Hz(hz)
        } else {
            Self::Indeterminate
        }
    }

    /// Frequency in Hz, if determinate.
    pub fn hz(self) -> Option<f64> {
        match self {
            Self::Hz(hz) => Some(hz),
            Self::Indeterminate => None,
        }
    }

    /// Frequency in Hz, with indeterminate reported as 0.
    pub fn hz_or_zero(self) -> f64 {
        self.hz().unwrap_or(0.0)
    }

    /// Whether a frequency was found.
    pub fn is_determinate(self) -> bool {
        matches!(self, Self::Hz(_))
    }

    /// Relative difference to another estimate, if both are determinate.
    pub fn relative_error(self, reference: Self) -> Option<f64> {
        match (self, reference) {
            (Self::Hz(a), Self::Hz(b)) => Some(fabs((a - b) / b)),
            _ => None,
        }
    }
}

impl From<Option<f64>> for FrequencyEstimate {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Indeterminate, Self::from_hz)
    }
}

impl fmt::Display for FrequencyEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hz(hz) => {
                if let Some(precision) = f.precision() {
                    write!(f, "{hz:.precision$} Hz")
                } else {
                    write!(f, "{hz:.3} Hz")
                }
            }
            Self::Indeterminate => f.write_str("indeterminate"),
        }
    }
}
