//! Simulated converter driven by a signal generator.

use std::time::Instant;

use wavecap_core::{AdcSpec, RawSample, SignalGenerator};

use crate::Result;
use crate::source::{SampleSource, check_channel};

#[derive(Debug, Clone)]
enum Clock {
    /// Seconds since construction.
    Wall(Instant),
    /// Sample index over a fixed rate.
    Stepped { index: u64, sample_rate: f64 },
}

/// A [`SampleSource`] that quantizes a [`SignalGenerator`] through an
/// [`AdcSpec`].
///
/// With the wall clock, what a capture sees depends on when it reads, the
/// same way real hardware does. With the stepped clock each read advances
/// time by exactly one sample period, so captures are reproducible.
/// Every channel returns the same signal.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    generator: SignalGenerator,
    adc: AdcSpec,
    clock: Clock,
    reads: u64,
}

impl SimulatedSource {
    /// Source that evaluates the generator at wall-clock time.
    pub fn new(generator: SignalGenerator, adc: AdcSpec) -> Self {
        Self {
            generator,
            adc,
            clock: Clock::Wall(Instant::now()),
            reads: 0,
        }
    }

    /// Source whose clock advances `1 / sample_rate` per read.
    pub fn stepped(generator: SignalGenerator, adc: AdcSpec, sample_rate: f64) -> Self {
        Self {
            generator,
            adc,
            clock: Clock::Stepped {
                index: 0,
                sample_rate,
            },
            reads: 0,
        }
    }

    /// Number of successful reads so far.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// The underlying generator.
    pub fn generator(&self) -> &SignalGenerator {
        &self.generator
    }

    fn now(&mut self) -> f64 {
        match &mut self.clock {
            Clock::Wall(start) => start.elapsed().as_secs_f64(),
            Clock::Stepped { index, sample_rate } => {
                let now = if *sample_rate > 0.0 {
                    *index as f64 / *sample_rate
                } else {
                    0.0
                };
                *index += 1;
                now
            }
        }
    }
}

impl SampleSource for SimulatedSource {
    fn read(&mut self, channel: u8) -> Result<RawSample> {
        check_channel(channel)?;
        let t = self.now();
        let volts = self.generator.value_at(t);
        self.reads += 1;
        Ok(self.adc.volts_to_code(volts))
    }

    fn adc(&self) -> AdcSpec {
        self.adc
    }
}
