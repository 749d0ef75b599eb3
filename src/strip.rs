//! The LED strip engine.
//!
//! Owns the canonical pixel buffer, the correction pipeline and the
//! hardware transport, and exposes the validated painting API plus
//! `show()`. Connection lifecycle: enabling connects, disabling (or a
//! device error) disconnects; device, frequency and count changes while
//! enabled reconnect because the frame buffers depend on them.

use tracing::error;

use crate::buffer::{PixelBuffer, RestoreScope};
use crate::color::Rgb;
use crate::config::StripConfig;
use crate::correction::CorrectionPipeline;
use crate::error::Error;
use crate::transport::{HEADER, Transport, footer_len};

/// An APA102/SK9822-compatible LED strip behind a [`Transport`].
pub struct LedStrip<T: Transport> {
    enabled: bool,
    connected: bool,
    device_name: String,
    frequency_hz: u32,
    transport: T,
    buffer: PixelBuffer,
    correction: CorrectionPipeline,
    footer: Vec<u8>,
    /// Transmit scratch, rebuilt on every `show`.
    wire: Vec<u8>,
}

impl<T: Transport> LedStrip<T> {
    /// Create a strip from configuration. A zero LED count is bounded to
    /// one with a logged complaint. When the configuration enables the
    /// strip, the device is connected immediately.
    pub fn new(config: &StripConfig, transport: T) -> Self {
        if config.count < 1 {
            error!(
                count = config.count,
                "strip length bounded to 1 after attempt to configure a zero-length strip"
            );
        }

        let mut strip = Self {
            enabled: false,
            connected: false,
            device_name: config.device.clone(),
            frequency_hz: config.frequency_hz,
            transport,
            buffer: PixelBuffer::new(config.count),
            correction: CorrectionPipeline::new(
                config.hsv_brightness,
                config.gamma_correction,
                config.gamma,
            ),
            footer: Vec::new(),
            wire: Vec::new(),
        };

        if config.enabled {
            strip.set_enabled(true);
        }
        strip
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the strip. Enabling connects the device;
    /// disabling releases it.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.connect();
        } else {
            self.disconnect();
        }
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Change the device node. Reconnects while enabled.
    pub fn set_device_name(&mut self, device: impl Into<String>) {
        let device = device.into();
        if self.device_name == device {
            return;
        }
        self.device_name = device;
        if self.enabled {
            self.connect();
        }
    }

    pub fn frequency(&self) -> u32 {
        self.frequency_hz
    }

    /// Change the SPI clock frequency. Reconnects while enabled.
    pub fn set_frequency(&mut self, frequency_hz: u32) {
        if self.frequency_hz == frequency_hz {
            return;
        }
        self.frequency_hz = frequency_hz;
        if self.enabled {
            self.connect();
        }
    }

    pub fn count(&self) -> usize {
        self.buffer.len()
    }

    /// Resize the strip. The overlapping prefix of the buffer is kept,
    /// a grown tail comes up cleared. Reconnects while enabled since the
    /// frame footer is length-dependent.
    pub fn set_count(&mut self, count: usize) -> Result<(), Error> {
        let count = if count < 1 {
            error!(count, "strip length bounded to 1 after attempt to set a zero length");
            1
        } else {
            count
        };
        if self.buffer.len() == count {
            return Ok(());
        }
        self.buffer.resize(count)?;
        if self.enabled {
            self.connect();
        }
        Ok(())
    }

    pub fn gamma_correction(&self) -> bool {
        self.correction.gamma_correction()
    }

    /// Toggle gamma correction. Repaints while enabled so the corrected
    /// output becomes visible immediately; no reconnect is needed.
    pub fn set_gamma_correction(&mut self, enabled: bool) {
        if self.correction.gamma_correction() == enabled {
            return;
        }
        self.correction.set_gamma_correction(enabled);
        if self.enabled {
            self.show();
        }
    }

    pub fn gamma(&self) -> f32 {
        self.correction.gamma()
    }

    /// Change the gamma exponent; the lookup table is recomputed.
    pub fn set_gamma(&mut self, gamma: f32) {
        if self.correction.gamma() == gamma {
            return;
        }
        self.correction.set_gamma(gamma);
        if self.correction.gamma_correction() && self.enabled {
            self.show();
        }
    }

    pub fn hsv_brightness(&self) -> bool {
        self.correction.hsv_brightness()
    }

    /// Toggle HSV-derived brightness. Repaints while enabled.
    pub fn set_hsv_brightness(&mut self, enabled: bool) {
        if self.correction.hsv_brightness() == enabled {
            return;
        }
        self.correction.set_hsv_brightness(enabled);
        if self.enabled {
            self.show();
        }
    }

    /// Set one LED's color and brightness.
    pub fn set_led(&mut self, index: usize, color: Rgb, brightness: u8) -> Result<(), Error> {
        self.buffer.set(index, color, brightness)
    }

    /// Set color and brightness across an inclusive range.
    pub fn fill(
        &mut self,
        first: usize,
        last: usize,
        color: Rgb,
        brightness: u8,
    ) -> Result<(), Error> {
        self.buffer.fill(first, last, color, brightness)
    }

    pub fn color(&self, index: usize) -> Result<Rgb, Error> {
        self.buffer.color(index)
    }

    pub fn set_color(&mut self, index: usize, color: Rgb) -> Result<(), Error> {
        self.buffer.set_color(index, color)
    }

    pub fn set_color_range(&mut self, first: usize, last: usize, color: Rgb) -> Result<(), Error> {
        self.buffer.set_color_range(first, last, color)
    }

    pub fn brightness(&self, index: usize) -> Result<u8, Error> {
        self.buffer.brightness(index)
    }

    pub fn set_brightness(&mut self, index: usize, brightness: u8) -> Result<(), Error> {
        self.buffer.set_brightness(index, brightness)
    }

    pub fn set_brightness_range(
        &mut self,
        first: usize,
        last: usize,
        brightness: u8,
    ) -> Result<(), Error> {
        self.buffer.set_brightness_range(first, last, brightness)
    }

    pub fn average_color(&self, first: usize, last: usize) -> Result<Rgb, Error> {
        self.buffer.average_color(first, last)
    }

    pub fn average_brightness(&self, first: usize, last: usize) -> Result<u8, Error> {
        self.buffer.average_brightness(first, last)
    }

    /// Reverse the LED order end-to-end.
    pub fn reverse(&mut self) {
        self.buffer.reverse();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn clear_range(&mut self, first: usize, last: usize) -> Result<(), Error> {
        self.buffer.clear_range(first, last)
    }

    /// Snapshot the buffer for a later `restore`.
    pub fn save(&mut self) -> Result<(), Error> {
        self.buffer.save()
    }

    pub fn forget_saved(&mut self) {
        self.buffer.forget_saved();
    }

    pub fn can_restore(&self) -> bool {
        self.buffer.can_restore()
    }

    /// Restore the saved snapshot (single use).
    pub fn restore(&mut self, scope: RestoreScope) -> Result<(), Error> {
        self.buffer.restore(scope)
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// The transport behind this strip; capture transports expose the
    /// transmitted frames here.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Direct buffer access, bypassing the per-call validation. Used by
    /// animation drivers painting whole frames.
    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    /// Serialize the (corrected) buffer and clock it out.
    ///
    /// Returns `false` without transmitting when the strip is disabled
    /// or disconnected, and on failed or short transfers; failures are
    /// logged. The stored pixel data is never modified.
    pub fn show(&mut self) -> bool {
        if !self.enabled || !self.connected {
            return false;
        }

        self.wire.clear();
        for pixel in self.buffer.pixels() {
            self.wire
                .extend_from_slice(&self.correction.correct(*pixel).to_bytes());
        }

        let expected = HEADER.len() + self.wire.len() + self.footer.len();
        match self.transport.transfer(&HEADER, &self.wire, &self.footer) {
            Ok(written) if written == expected => true,
            Ok(written) => {
                let err = Error::ShortTransfer { written, expected };
                error!("error sending SPI message: {err}");
                false
            }
            Err(err) => {
                error!("error sending SPI message: {err}");
                false
            }
        }
    }

    fn connect(&mut self) {
        if self.connected {
            self.disconnect();
        }

        if let Err(err) = self
            .transport
            .connect(&self.device_name, self.frequency_hz)
        {
            error!(device = %self.device_name, "unable to open device: {err}");
            return;
        }

        self.footer = vec![0xFF; footer_len(self.buffer.len())];
        self.connected = true;
    }

    fn disconnect(&mut self) {
        self.transport.disconnect();
        self.footer = Vec::new();
        self.connected = false;
    }
}

impl<T: Transport> Drop for LedStrip<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
