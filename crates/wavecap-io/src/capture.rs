//! Paced capture of one window.
//!
//! The pacer keeps an absolute schedule: deadline `k` is
//! `start + k * period`, computed by adding the period to the previous
//! deadline rather than to the time the read finished, so read latency does
//! not accumulate as drift. When a read overruns its slot the schedule is
//! rebased to "now" instead of firing a burst of back-to-back reads to catch
//! up; the measured rate then reports the shortfall.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use wavecap_core::{CaptureWindow, RawSample};

use crate::source::{SampleSource, check_channel};
use crate::{Error, Result};

/// How reads are spaced in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Read as fast as the source allows.
    Free,
    /// Hold each read to its deadline: sleep until `spin_margin` before it,
    /// then spin.
    Deadline {
        /// Final stretch before a deadline that is busy-waited.
        spin_margin: Duration,
    },
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Deadline {
            spin_margin: Duration::from_micros(500),
        }
    }
}

/// What to capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Converter channel, 0..=7.
    pub channel: u8,
    /// Requested sample rate in Hz.
    pub sample_rate_hz: f64,
    /// Window length in seconds.
    pub duration_secs: f64,
    /// Lower bound on the sample count.
    pub min_samples: usize,
    /// Read spacing policy.
    pub pacing: Pacing,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            sample_rate_hz: 5000.0,
            duration_secs: 0.4,
            min_samples: 10,
            pacing: Pacing::default(),
        }
    }
}

impl CaptureConfig {
    /// `max(min_samples, round(sample_rate_hz * duration_secs))`.
    pub fn sample_count(&self) -> usize {
        let n = (self.sample_rate_hz * self.duration_secs).round();
        let n = if n.is_finite() && n > 0.0 { n as usize } else { 0 };
        n.max(self.min_samples)
    }

    /// Nominal time between reads, zero for an unusable rate.
    pub fn period(&self) -> Duration {
        Duration::try_from_secs_f64(self.sample_rate_hz.recip()).unwrap_or(Duration::ZERO)
    }

    /// Check that the settings can produce a window.
    pub fn validate(&self) -> Result<()> {
        check_channel(self.channel)?;
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(Error::InvalidCapture(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(Error::InvalidCapture(format!(
                "duration must be positive, got {}",
                self.duration_secs
            )));
        }
        if self.sample_count() == 0 {
            return Err(Error::InvalidCapture("window would be empty".into()));
        }
        Ok(())
    }
}

/// Deadline following `prev`, rebased to `now` if it has already passed.
pub fn next_deadline(prev: Instant, period: Duration, now: Instant) -> Instant {
    let next = prev + period;
    if next < now { now } else { next }
}

/// Drift-free read scheduler.
#[derive(Debug, Clone)]
pub struct DeadlinePacer {
    next: Instant,
    period: Duration,
    spin_margin: Duration,
    late: usize,
}

impl DeadlinePacer {
    /// First deadline is `start`.
    pub fn new(start: Instant, period: Duration, spin_margin: Duration) -> Self {
        Self {
            next: start,
            period,
            spin_margin,
            late: 0,
        }
    }

    /// Upcoming deadline.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Deadlines that had already passed when waited on, excluding the first.
    pub fn late(&self) -> usize {
        self.late
    }

    /// Block until the current deadline, then schedule the next one.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if let Some(remaining) = self.next.checked_duration_since(now) {
            if remaining > self.spin_margin {
                std::thread::sleep(remaining - self.spin_margin);
            }
            while Instant::now() < self.next {
                std::hint::spin_loop();
            }
        }
        self.advance(Instant::now());
    }

    /// Schedule the deadline after the current one as seen at `now`.
    pub fn advance(&mut self, now: Instant) {
        let next = next_deadline(self.next, self.period, now);
        if next == now && now > self.next + self.period {
            self.late += 1;
        }
        self.next = next;
    }
}

/// Shared flag that aborts a capture between samples.
///
/// Clones share the flag, so one can be handed to a signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Fills capture windows from an owned sample source.
///
/// The buffer owns the source for its lifetime; [`into_source`](Self::into_source)
/// returns it, and dropping the buffer drops it.
#[derive(Debug)]
pub struct CaptureBuffer<S> {
    source: S,
    config: CaptureConfig,
    cancel: CancelToken,
}

impl<S: SampleSource> CaptureBuffer<S> {
    /// Capture from `source` with `config`.
    pub fn new(source: S, config: CaptureConfig) -> Self {
        Self {
            source,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Use an externally controlled cancellation token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Capture settings.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Cancellation token observed between samples.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Borrow the source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Give the source back.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Capture one window.
    ///
    /// Reads `config.sample_count()` samples in acquisition order and
    /// stamps the window with the rate actually achieved. Device errors and
    /// cancellation end the capture; nothing is retried.
    pub fn capture(&mut self) -> Result<CaptureWindow> {
        self.config.validate()?;
        let n = self.config.sample_count();
        let channel = self.config.channel;
        let mut samples: Vec<RawSample> = Vec::with_capacity(n);

        tracing::debug!(
            channel,
            samples = n,
            target_fs = self.config.sample_rate_hz,
            "capture start"
        );

        let start = Instant::now();
        let mut pacer = match self.config.pacing {
            Pacing::Free => None,
            Pacing::Deadline { spin_margin } => {
                Some(DeadlinePacer::new(start, self.config.period(), spin_margin))
            }
        };

        for _ in 0..n {
            if self.cancel.is_cancelled() {
                tracing::debug!(read = samples.len(), "capture cancelled");
                return Err(Error::Cancelled);
            }
            if let Some(pacer) = pacer.as_mut() {
                pacer.wait();
            }
            samples.push(self.source.read(channel)?);
        }

        let elapsed = start.elapsed();
        let window = CaptureWindow::from_elapsed(samples, elapsed, self.config.sample_rate_hz);

        tracing::debug!(
            samples = window.len(),
            elapsed_ms = elapsed.as_secs_f64() * 1e3,
            measured_fs = window.measured_fs(),
            late = pacer.as_ref().map_or(0, DeadlinePacer::late),
            "capture complete"
        );

        Ok(window)
    }
}
