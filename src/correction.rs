//! Transmit-time pixel post-processing.
//!
//! The pipeline is applied read-only while serializing a frame; the
//! canonical buffer is never mutated. Processing order is fixed: the
//! HSV-value brightness substitution first, then the gamma remap of the
//! color channels. The brightness byte is never gamma-corrected.

use crate::color::{Rgb, hsv_value};
use crate::gamma::{GammaLut, gamma_lut};
use crate::pixel::{MAX_BRIGHTNESS, Pixel};

/// Optional HSV-derived brightness substitution and gamma correction.
#[derive(Debug, Clone)]
pub struct CorrectionPipeline {
    hsv_brightness: bool,
    gamma_correction: bool,
    gamma: f32,
    lut: GammaLut,
}

impl CorrectionPipeline {
    pub fn new(hsv_brightness: bool, gamma_correction: bool, gamma: f32) -> Self {
        Self {
            hsv_brightness,
            gamma_correction,
            gamma,
            lut: gamma_lut(gamma),
        }
    }

    pub fn hsv_brightness(&self) -> bool {
        self.hsv_brightness
    }

    pub fn set_hsv_brightness(&mut self, enabled: bool) {
        self.hsv_brightness = enabled;
    }

    pub fn gamma_correction(&self) -> bool {
        self.gamma_correction
    }

    pub fn set_gamma_correction(&mut self, enabled: bool) {
        self.gamma_correction = enabled;
        if enabled {
            self.lut = gamma_lut(self.gamma);
        }
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn set_gamma(&mut self, gamma: f32) {
        self.gamma = gamma;
        if self.gamma_correction {
            self.lut = gamma_lut(gamma);
        }
    }

    /// Whether any stage would change transmitted pixels.
    pub fn is_active(&self) -> bool {
        self.hsv_brightness || self.gamma_correction
    }

    /// Produce the transmitted form of one stored pixel.
    pub fn correct(&self, pixel: Pixel) -> Pixel {
        let mut out = pixel;

        if self.hsv_brightness {
            let value = hsv_value(pixel.color());
            let derived =
                ((u16::from(value) * u16::from(MAX_BRIGHTNESS) + 127) / 255) as u8;
            out.set_brightness(derived);
        }

        if self.gamma_correction {
            let color = out.color();
            out.set_color(Rgb {
                r: self.lut[usize::from(color.r)],
                g: self.lut[usize::from(color.g)],
                b: self.lut[usize::from(color.b)],
            });
        }

        out
    }

    /// Correct a whole buffer into `out`, replacing its contents.
    pub fn apply(&self, pixels: &[Pixel], out: &mut Vec<Pixel>) {
        out.clear();
        out.extend(pixels.iter().map(|pixel| self.correct(*pixel)));
    }
}
