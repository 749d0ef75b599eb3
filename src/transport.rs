//! Wire framing and the hardware transport seam.
//!
//! A frame is three segments clocked out back to back: a four-byte zero
//! header, the pixel words, and an all-ones footer of `ceil(count / 16)`
//! bytes that supplies the end-of-frame clock train the protocol needs.
//!
//! The [`Transport`] trait is the only hardware boundary. The engine is
//! generic over it: [`SpidevTransport`] drives a real strip through the
//! Linux spidev interface, [`MemoryTransport`] captures frames for tests
//! and host-side previews.

use crate::error::Error;

/// Length of the zero start-of-frame header.
pub const HEADER_LEN: usize = 4;

/// The start-of-frame header.
pub const HEADER: [u8; HEADER_LEN] = [0; HEADER_LEN];

/// Footer length for a strip of `count` LEDs: one clock byte per 16 LEDs,
/// rounded up.
pub const fn footer_len(count: usize) -> usize {
    count.div_ceil(16)
}

/// Blocking transport to the LED hardware.
pub trait Transport {
    /// Open and configure the device. A previously open handle is
    /// released first.
    fn connect(&mut self, device: &str, frequency_hz: u32) -> Result<(), Error>;

    /// Whether an open device handle is held.
    fn is_connected(&self) -> bool;

    /// Clock out one frame as three consecutive segments. Blocks until
    /// the hardware accepts the data and returns the number of bytes
    /// actually transferred.
    fn transfer(&mut self, header: &[u8], pixels: &[u8], footer: &[u8]) -> Result<usize, Error>;

    /// Release the device handle. Idempotent.
    fn disconnect(&mut self);
}

#[cfg(feature = "hardware")]
mod spi {
    use std::io;

    use linux_embedded_hal::spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};

    use super::Transport;
    use crate::error::Error;

    /// Transport over a Linux spidev character device.
    #[derive(Default)]
    pub struct SpidevTransport {
        device: Option<Spidev>,
    }

    impl SpidevTransport {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Transport for SpidevTransport {
        fn connect(&mut self, device: &str, frequency_hz: u32) -> Result<(), Error> {
            self.disconnect();

            let mut spi = Spidev::open(device).map_err(Error::Device)?;
            let options = SpidevOptions::new()
                .bits_per_word(8)
                .max_speed_hz(frequency_hz)
                .mode(SpiModeFlags::SPI_MODE_0)
                .build();
            spi.configure(&options).map_err(Error::Device)?;

            self.device = Some(spi);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.device.is_some()
        }

        fn transfer(
            &mut self,
            header: &[u8],
            pixels: &[u8],
            footer: &[u8],
        ) -> Result<usize, Error> {
            let Some(device) = self.device.as_mut() else {
                return Err(Error::Device(io::Error::from(io::ErrorKind::NotConnected)));
            };

            let mut segments = [
                SpidevTransfer::write(header),
                SpidevTransfer::write(pixels),
                SpidevTransfer::write(footer),
            ];
            device
                .transfer_multiple(&mut segments)
                .map_err(Error::Transfer)?;

            Ok(header.len() + pixels.len() + footer.len())
        }

        fn disconnect(&mut self) {
            // Dropping the handle closes the file descriptor.
            self.device = None;
        }
    }
}

#[cfg(feature = "hardware")]
pub use spi::SpidevTransport;

/// Transport that records frames in memory.
///
/// Connect failures and short writes can be injected to exercise the
/// engine's failure paths.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    connected: bool,
    frames: Vec<Vec<u8>>,
    connects: usize,
    fail_connects: bool,
    truncate_writes_by: usize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `connect` calls fail until cleared.
    pub fn set_fail_connects(&mut self, fail: bool) {
        self.fail_connects = fail;
    }

    /// Report `amount` fewer bytes written on every transfer.
    pub fn set_truncate_writes_by(&mut self, amount: usize) {
        self.truncate_writes_by = amount;
    }

    /// Number of successful `connect` calls so far.
    pub fn connects(&self) -> usize {
        self.connects
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// The bytes of the most recently transferred frame, all three
    /// segments concatenated.
    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl Transport for MemoryTransport {
    fn connect(&mut self, _device: &str, _frequency_hz: u32) -> Result<(), Error> {
        self.disconnect();
        if self.fail_connects {
            return Err(Error::Device(std::io::Error::from(
                std::io::ErrorKind::NotFound,
            )));
        }
        self.connected = true;
        self.connects += 1;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn transfer(&mut self, header: &[u8], pixels: &[u8], footer: &[u8]) -> Result<usize, Error> {
        if !self.connected {
            return Err(Error::Device(std::io::Error::from(
                std::io::ErrorKind::NotConnected,
            )));
        }
        let mut frame = Vec::with_capacity(header.len() + pixels.len() + footer.len());
        frame.extend_from_slice(header);
        frame.extend_from_slice(pixels);
        frame.extend_from_slice(footer);
        let total = frame.len();
        self.frames.push(frame);
        Ok(total.saturating_sub(self.truncate_writes_by))
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }
}
