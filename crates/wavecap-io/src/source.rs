//! The sample source abstraction.

use wavecap_core::{AdcSpec, RawSample};

use crate::{Error, Result};

/// Highest single-ended channel on an 8-channel converter.
pub const MAX_CHANNEL: u8 = 7;

/// Reject channels outside `0..=MAX_CHANNEL`.
pub fn check_channel(channel: u8) -> Result<()> {
    if channel > MAX_CHANNEL {
        Err(Error::InvalidChannel(channel))
    } else {
        Ok(())
    }
}

/// Something that returns one converter code per call.
///
/// Implementations validate the channel before touching the bus and report
/// bus failures as [`Error::Device`]. Nothing is retried here; retry policy
/// belongs to the caller.
pub trait SampleSource {
    /// Read one code from `channel`.
    fn read(&mut self, channel: u8) -> Result<RawSample>;

    /// Resolution and reference of the codes this source returns.
    fn adc(&self) -> AdcSpec;

    /// Read one sample and convert it to volts.
    fn read_voltage(&mut self, channel: u8) -> Result<f64> {
        let code = self.read(channel)?;
        Ok(self.adc().code_to_volts(code))
    }
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn read(&mut self, channel: u8) -> Result<RawSample> {
        (**self).read(channel)
    }

    fn adc(&self) -> AdcSpec {
        (**self).adc()
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read(&mut self, channel: u8) -> Result<RawSample> {
        (**self).read(channel)
    }

    fn adc(&self) -> AdcSpec {
        (**self).adc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(RawSample);

    impl SampleSource for Fixed {
        fn read(&mut self, channel: u8) -> Result<RawSample> {
            check_channel(channel)?;
            Ok(self.0)
        }

        fn adc(&self) -> AdcSpec {
            AdcSpec::default()
        }
    }

    #[test]
    fn channel_bounds() {
        assert!(check_channel(0).is_ok());
        assert!(check_channel(7).is_ok());
        assert!(matches!(check_channel(8), Err(Error::InvalidChannel(8))));
    }

    #[test]
    fn voltage_uses_adc_spec() {
        let mut s = Fixed(1023);
        assert!((s.read_voltage(0).unwrap() - 3.3).abs() < 1e-12);
    }

    #[test]
    fn boxed_source_forwards() {
        let mut s: Box<dyn SampleSource> = Box::new(Fixed(512));
        assert_eq!(s.read(3).unwrap(), 512);
        assert!(s.read(9).is_err());
    }
}
