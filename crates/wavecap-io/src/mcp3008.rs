//! MCP3008 8-channel 10-bit SPI converter.

use embedded_hal::spi::SpiDevice;
use wavecap_core::{AdcSpec, RawSample};

use crate::source::{SampleSource, check_channel};
use crate::{Error, Result};

/// Single-ended MCP3008 driver.
///
/// Owns the SPI device for its whole lifetime. [`release`](Self::release)
/// hands it back; dropping the driver drops (and closes) it.
#[derive(Debug)]
pub struct Mcp3008<SPI> {
    spi: SPI,
    adc: AdcSpec,
}

impl<SPI: SpiDevice> Mcp3008<SPI> {
    /// Wrap an SPI device with the converter's reference voltage.
    pub fn new(spi: SPI, vref: f64) -> Self {
        Self {
            spi,
            adc: AdcSpec::new(10, vref),
        }
    }

    /// Give the SPI device back.
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Start bit, single-ended mode and channel select.
    pub fn frame(channel: u8) -> [u8; 3] {
        [0x01, 0x80 | ((channel & 0x07) << 4), 0x00]
    }

    /// Ten result bits from the last two bytes of a response.
    pub fn decode(rx: &[u8; 3]) -> RawSample {
        (RawSample::from(rx[1] & 0x03) << 8) | RawSample::from(rx[2])
    }
}

impl<SPI: SpiDevice> SampleSource for Mcp3008<SPI> {
    fn read(&mut self, channel: u8) -> Result<RawSample> {
        check_channel(channel)?;
        let mut buf = Self::frame(channel);
        self.spi.transfer_in_place(&mut buf).map_err(|e| {
            tracing::warn!(channel, error = ?e, "SPI transfer failed");
            Error::Device(format!("SPI transfer on channel {channel}: {e:?}"))
        })?;
        Ok(Self::decode(&buf))
    }

    fn adc(&self) -> AdcSpec {
        self.adc
    }
}

/// Bus settings for a Linux spidev node.
#[cfg(feature = "linux-spi")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiSettings {
    /// Device node, e.g. `/dev/spidev0.0`.
    pub device: String,
    /// Clock ceiling in Hz.
    pub max_speed_hz: u32,
    /// SPI mode 0..=3.
    pub mode: u8,
}

/// Open a spidev node and wrap it in an [`Mcp3008`].
#[cfg(feature = "linux-spi")]
pub fn open_spidev(
    settings: &SpiSettings,
    vref: f64,
) -> Result<Mcp3008<linux_embedded_hal::SpidevDevice>> {
    use linux_embedded_hal::SpidevDevice;
    use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};

    let mode = match settings.mode {
        0 => SpiModeFlags::SPI_MODE_0,
        1 => SpiModeFlags::SPI_MODE_1,
        2 => SpiModeFlags::SPI_MODE_2,
        3 => SpiModeFlags::SPI_MODE_3,
        other => return Err(Error::Device(format!("invalid SPI mode {other}"))),
    };

    let mut spi = SpidevDevice::open(&settings.device)
        .map_err(|e| Error::Device(format!("open {}: {e:?}", settings.device)))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(settings.max_speed_hz)
        .mode(mode)
        .build();
    spi.configure(&options)
        .map_err(|e| Error::Device(format!("configure {}: {e}", settings.device)))?;

    tracing::info!(
        device = %settings.device,
        max_speed_hz = settings.max_speed_hz,
        mode = settings.mode,
        "opened SPI device"
    );
    Ok(Mcp3008::new(spi, vref))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{ErrorKind, ErrorType, Operation};

    /// Answers every frame with a fixed code and records what was sent.
    struct MockSpi {
        code: u16,
        sent: Vec<[u8; 3]>,
        fail: bool,
    }

    impl MockSpi {
        fn new(code: u16) -> Self {
            Self {
                code,
                sent: Vec::new(),
                fail: false,
            }
        }
    }

    impl ErrorType for MockSpi {
        type Error = ErrorKind;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> core::result::Result<(), ErrorKind> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::TransferInPlace(buf) = op {
                    self.sent.push([buf[0], buf[1], buf[2]]);
                    buf[0] = 0xff;
                    buf[1] = 0xf8 | (self.code >> 8) as u8;
                    buf[2] = (self.code & 0xff) as u8;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn frame_layout() {
        assert_eq!(Mcp3008::<MockSpi>::frame(0), [0x01, 0x80, 0x00]);
        assert_eq!(Mcp3008::<MockSpi>::frame(5), [0x01, 0xd0, 0x00]);
        assert_eq!(Mcp3008::<MockSpi>::frame(7), [0x01, 0xf0, 0x00]);
    }

    #[test]
    fn decode_masks_high_bits() {
        assert_eq!(Mcp3008::<MockSpi>::decode(&[0xff, 0xff, 0xff]), 1023);
        assert_eq!(Mcp3008::<MockSpi>::decode(&[0x00, 0x02, 0x01]), 513);
    }

    #[test]
    fn read_round_trips_code() {
        let mut adc = Mcp3008::new(MockSpi::new(777), 3.3);
        assert_eq!(adc.read(2).unwrap(), 777);
        let spi = adc.release();
        assert_eq!(spi.sent, vec![[0x01, 0xa0, 0x00]]);
    }

    #[test]
    fn invalid_channel_never_touches_bus() {
        let mut adc = Mcp3008::new(MockSpi::new(1), 3.3);
        assert!(matches!(adc.read(8), Err(Error::InvalidChannel(8))));
        assert!(adc.release().sent.is_empty());
    }

    #[test]
    fn bus_failure_is_device_error() {
        let mut spi = MockSpi::new(1);
        spi.fail = true;
        let mut adc = Mcp3008::new(spi, 3.3);
        assert!(matches!(adc.read(0), Err(Error::Device(_))));
    }

    #[test]
    fn voltage_scaling() {
        let mut adc = Mcp3008::new(MockSpi::new(1023), 5.0);
        assert!((adc.read_voltage(0).unwrap() - 5.0).abs() < 1e-12);
    }
}
