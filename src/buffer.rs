//! The canonical per-LED pixel buffer.
//!
//! All range-taking operations validate their inputs up front and reject
//! with an [`Error`] without touching the buffer. The buffer also owns an
//! optional saved snapshot used to restore strip contents after an
//! animation stops; a snapshot is single-use and keeps its own length,
//! independent of later resizes.

use tracing::warn;

use crate::color::{Rgb, quadratic_channel_mean};
use crate::error::Error;
use crate::pixel::{MAX_BRIGHTNESS, Pixel};

/// Selects which pixel components `restore` copies back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreScope {
    /// Color bytes only; brightness is left untouched.
    Color,
    /// Brightness bytes only; color is left untouched.
    Brightness,
    /// Whole pixels.
    All,
}

/// An ordered sequence of packed pixels with save/restore support.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pixels: Vec<Pixel>,
    saved: Option<Vec<Pixel>>,
}

impl PixelBuffer {
    /// Create a buffer of `count` cleared pixels. A zero count is bounded
    /// to one; a strip always has at least one LED.
    pub fn new(count: usize) -> Self {
        Self {
            pixels: vec![Pixel::CLEAR; count.max(1)],
            saved: None,
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Resize to `new_count` LEDs. The overlapping prefix is preserved;
    /// a grown tail is clear-initialized. On allocation failure the
    /// buffer is left unchanged.
    pub fn resize(&mut self, new_count: usize) -> Result<(), Error> {
        let new_count = new_count.max(1);
        if new_count > self.pixels.len() {
            self.pixels.try_reserve(new_count - self.pixels.len())?;
        }
        self.pixels.resize(new_count, Pixel::CLEAR);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), Error> {
        if index >= self.pixels.len() {
            warn!(index, count = self.pixels.len(), "index out of bounds");
            return Err(Error::IndexOutOfBounds {
                index,
                count: self.pixels.len(),
            });
        }
        Ok(())
    }

    fn check_span(&self, first: usize, last: usize) -> Result<(), Error> {
        if first > last || last >= self.pixels.len() {
            warn!(first, last, count = self.pixels.len(), "range out of bounds");
            return Err(Error::RangeOutOfBounds {
                first,
                last,
                count: self.pixels.len(),
            });
        }
        Ok(())
    }

    fn check_brightness(brightness: u8) -> Result<(), Error> {
        if brightness > MAX_BRIGHTNESS {
            warn!(brightness, "brightness out of bounds");
            return Err(Error::BrightnessOutOfBounds {
                value: brightness,
                max: MAX_BRIGHTNESS,
            });
        }
        Ok(())
    }

    /// Set one LED's color and brightness.
    pub fn set(&mut self, index: usize, color: Rgb, brightness: u8) -> Result<(), Error> {
        self.check_index(index)?;
        Self::check_brightness(brightness)?;
        self.pixels[index] = Pixel::new(color, brightness);
        Ok(())
    }

    /// Set color and brightness across an inclusive range.
    pub fn fill(
        &mut self,
        first: usize,
        last: usize,
        color: Rgb,
        brightness: u8,
    ) -> Result<(), Error> {
        self.check_span(first, last)?;
        Self::check_brightness(brightness)?;
        self.pixels[first..=last].fill(Pixel::new(color, brightness));
        Ok(())
    }

    pub fn color(&self, index: usize) -> Result<Rgb, Error> {
        self.check_index(index)?;
        Ok(self.pixels[index].color())
    }

    pub fn set_color(&mut self, index: usize, color: Rgb) -> Result<(), Error> {
        self.check_index(index)?;
        self.pixels[index].set_color(color);
        Ok(())
    }

    pub fn set_color_range(&mut self, first: usize, last: usize, color: Rgb) -> Result<(), Error> {
        self.check_span(first, last)?;
        for pixel in &mut self.pixels[first..=last] {
            pixel.set_color(color);
        }
        Ok(())
    }

    pub fn brightness(&self, index: usize) -> Result<u8, Error> {
        self.check_index(index)?;
        Ok(self.pixels[index].brightness())
    }

    pub fn set_brightness(&mut self, index: usize, brightness: u8) -> Result<(), Error> {
        self.check_index(index)?;
        Self::check_brightness(brightness)?;
        self.pixels[index].set_brightness(brightness);
        Ok(())
    }

    pub fn set_brightness_range(
        &mut self,
        first: usize,
        last: usize,
        brightness: u8,
    ) -> Result<(), Error> {
        self.check_span(first, last)?;
        Self::check_brightness(brightness)?;
        for pixel in &mut self.pixels[first..=last] {
            pixel.set_brightness(brightness);
        }
        Ok(())
    }

    /// Average color over an inclusive range.
    ///
    /// A uniformly filled range returns its exact fill color, avoiding
    /// rounding drift in the common case. Mixed ranges use the quadratic
    /// mean per channel.
    pub fn average_color(&self, first: usize, last: usize) -> Result<Rgb, Error> {
        self.check_span(first, last)?;
        let range = &self.pixels[first..=last];
        let head = range[0].color();

        if range.iter().all(|pixel| pixel.color() == head) {
            return Ok(head);
        }

        let mut r = 0u64;
        let mut g = 0u64;
        let mut b = 0u64;
        for pixel in range {
            let color = pixel.color();
            r += u64::from(color.r) * u64::from(color.r);
            g += u64::from(color.g) * u64::from(color.g);
            b += u64::from(color.b) * u64::from(color.b);
        }

        let count = range.len() as u64;
        Ok(Rgb {
            r: quadratic_channel_mean(r, count),
            g: quadratic_channel_mean(g, count),
            b: quadratic_channel_mean(b, count),
        })
    }

    /// Average brightness over an inclusive range: exact for uniform
    /// ranges, rounded arithmetic mean otherwise.
    pub fn average_brightness(&self, first: usize, last: usize) -> Result<u8, Error> {
        self.check_span(first, last)?;
        let range = &self.pixels[first..=last];
        let head = range[0].brightness();

        if range.iter().all(|pixel| pixel.brightness() == head) {
            return Ok(head);
        }

        let sum: u64 = range.iter().map(|pixel| u64::from(pixel.brightness())).sum();
        let count = range.len() as u64;
        Ok(((sum + count / 2) / count) as u8)
    }

    /// Reverse the LED order end-to-end.
    pub fn reverse(&mut self) {
        self.pixels.reverse();
    }

    /// Reset the whole buffer to the clear state (full brightness, black).
    pub fn clear(&mut self) {
        self.pixels.fill(Pixel::CLEAR);
    }

    /// Reset an inclusive range to the clear state.
    pub fn clear_range(&mut self, first: usize, last: usize) -> Result<(), Error> {
        self.check_span(first, last)?;
        self.pixels[first..=last].fill(Pixel::CLEAR);
        Ok(())
    }

    /// Snapshot the current contents for a later `restore`. Overwrites
    /// any previous snapshot.
    pub fn save(&mut self) -> Result<(), Error> {
        let mut copy = Vec::new();
        copy.try_reserve_exact(self.pixels.len())?;
        copy.extend_from_slice(&self.pixels);
        self.saved = Some(copy);
        Ok(())
    }

    /// Drop the saved snapshot, if any.
    pub fn forget_saved(&mut self) {
        self.saved = None;
    }

    pub fn can_restore(&self) -> bool {
        self.saved.is_some()
    }

    /// Copy the saved snapshot back over the overlapping prefix, then
    /// discard it. Restoring only color leaves brightness untouched and
    /// vice versa.
    pub fn restore(&mut self, scope: RestoreScope) -> Result<(), Error> {
        let Some(saved) = self.saved.take() else {
            warn!("asked to restore saved strip data with no data saved");
            return Err(Error::NothingSaved);
        };

        let overlap = saved.len().min(self.pixels.len());
        for (pixel, snapshot) in self.pixels[..overlap].iter_mut().zip(&saved[..overlap]) {
            match scope {
                RestoreScope::Color => pixel.set_color(snapshot.color()),
                RestoreScope::Brightness => pixel.set_brightness(snapshot.brightness()),
                RestoreScope::All => *pixel = *snapshot,
            }
        }
        Ok(())
    }
}
