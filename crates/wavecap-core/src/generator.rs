//! Ideal test waveforms with optional noise.
//!
//! The generator evaluates a waveform at an absolute time, so a simulated
//! source can be driven either by a wall clock or by a stepped sample clock
//! and still produce a continuous signal.

use core::f64::consts::PI;
use libm::{cos, floor, log, sin, sqrt};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Canonical waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// Sinusoid.
    #[default]
    Sine,
    /// Symmetric triangle, in phase with the sine (rising through zero at phase 0).
    Triangle,
    /// 50% duty square, high for the first half period.
    Square,
}

impl Shape {
    /// Unit-amplitude value at `phase` turns (any real; wrapped into [0, 1)).
    #[inline]
    pub fn value(self, phase: f64) -> f64 {
        let p = phase - floor(phase);
        match self {
            Shape::Sine => sin(2.0 * PI * p),
            Shape::Triangle => {
                if p < 0.25 {
                    4.0 * p
                } else if p < 0.75 {
                    2.0 - 4.0 * p
                } else {
                    4.0 * p - 4.0
                }
            }
            Shape::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// Noise distribution added on top of a waveform.
#[derive(Debug, Clone, Copy, PartialEq)]
enum NoiseKind {
    Gaussian { sigma: f64 },
    Uniform { amplitude: f64 },
}

/// Deterministic noise source (xorshift32).
#[derive(Debug, Clone)]
pub struct NoiseSource {
    kind: NoiseKind,
    state: u32,
}

impl NoiseSource {
    const DEFAULT_SEED: u32 = 0x1234_5678;

    /// Zero-mean Gaussian noise with standard deviation `sigma`.
    pub fn gaussian(sigma: f64) -> Self {
        Self {
            kind: NoiseKind::Gaussian { sigma },
            state: Self::DEFAULT_SEED,
        }
    }

    /// Uniform noise bounded by `±amplitude`.
    pub fn uniform(amplitude: f64) -> Self {
        Self {
            kind: NoiseKind::Uniform { amplitude },
            state: Self::DEFAULT_SEED,
        }
    }

    /// Replace the seed (zero is mapped to the default, xorshift needs a nonzero state).
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.state = if seed == 0 { Self::DEFAULT_SEED } else { seed };
        self
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform in (0, 1].
    #[inline]
    fn next_unit(&mut self) -> f64 {
        (f64::from(self.next_u32()) + 1.0) / 4_294_967_296.0
    }

    /// Draw the next noise value.
    pub fn next_value(&mut self) -> f64 {
        match self.kind {
            NoiseKind::Gaussian { sigma } => {
                // Box-Muller
                let u1 = self.next_unit();
                let u2 = self.next_unit();
                sigma * sqrt(-2.0 * log(u1)) * cos(2.0 * PI * u2)
            }
            NoiseKind::Uniform { amplitude } => amplitude * (2.0 * self.next_unit() - 1.0),
        }
    }
}

/// Waveform generator: `offset + amplitude * shape(f * t + phase) + noise`.
///
/// # Example
///
/// ```rust
/// use wavecap_core::{Shape, SignalGenerator};
///
/// let mut tri = SignalGenerator::new(Shape::Triangle, 50.0).with_amplitude(2.0);
/// let x = tri.render(1000, 1000.0);
/// assert_eq!(x.len(), 1000);
/// assert!((x[5] - 2.0).abs() < 1e-9); // quarter period at 50 Hz / 1 kHz
/// ```
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    shape: Shape,
    frequency_hz: f64,
    amplitude: f64,
    offset: f64,
    phase: f64,
    noise: Option<NoiseSource>,
}

impl SignalGenerator {
    /// Unit-amplitude, zero-offset, noiseless generator.
    pub fn new(shape: Shape, frequency_hz: f64) -> Self {
        Self {
            shape,
            frequency_hz: frequency_hz.max(0.0),
            amplitude: 1.0,
            offset: 0.0,
            phase: 0.0,
            noise: None,
        }
    }

    /// Set peak amplitude.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Set DC offset.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Set starting phase in turns.
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Add noise.
    pub fn with_noise(mut self, noise: NoiseSource) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Waveform shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Frequency in Hz.
    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Value at absolute time `t` seconds. Advances the noise source.
    pub fn value_at(&mut self, t: f64) -> f64 {
        let clean = self.offset + self.amplitude * self.shape.value(self.frequency_hz * t + self.phase);
        match self.noise.as_mut() {
            Some(noise) => clean + noise.next_value(),
            None => clean,
        }
    }

    /// Render `n` samples at sample rate `fs`, starting at t = 0.
    pub fn render(&mut self, n: usize, fs: f64) -> Vec<f64> {
        (0..n).map(|i| self.value_at(i as f64 / fs)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::fabs;

    #[test]
    fn shapes_agree_at_quarter_points() {
        for shape in [Shape::Sine, Shape::Triangle] {
            assert!(fabs(shape.value(0.0)) < 1e-12);
            assert!(fabs(shape.value(0.25) - 1.0) < 1e-12);
            assert!(fabs(shape.value(0.75) + 1.0) < 1e-12);
        }
        assert_eq!(Shape::Square.value(0.1), 1.0);
        assert_eq!(Shape::Square.value(0.6), -1.0);
    }

    #[test]
    fn phase_wraps() {
        assert!(fabs(Shape::Triangle.value(3.25) - 1.0) < 1e-9);
        assert!(fabs(Shape::Triangle.value(-0.75) - 1.0) < 1e-9);
    }

    #[test]
    fn uniform_noise_is_bounded() {
        let mut n = NoiseSource::uniform(0.05);
        for _ in 0..10_000 {
            assert!(fabs(n.next_value()) <= 0.05);
        }
    }

    #[test]
    fn gaussian_noise_has_expected_spread() {
        let mut n = NoiseSource::gaussian(0.1).with_seed(42);
        let draws: Vec<f64> = (0..20_000).map(|_| n.next_value()).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let var = draws.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / draws.len() as f64;
        assert!(fabs(mean) < 0.01, "mean {mean}");
        assert!(fabs(sqrt(var) - 0.1) < 0.01, "std {}", sqrt(var));
    }

    #[test]
    fn offset_and_amplitude_apply() {
        let mut g = SignalGenerator::new(Shape::Square, 10.0)
            .with_amplitude(1.5)
            .with_offset(1.65);
        assert!(fabs(g.value_at(0.01) - 3.15) < 1e-12);
        assert!(fabs(g.value_at(0.06) - 0.15) < 1e-12);
    }
}
