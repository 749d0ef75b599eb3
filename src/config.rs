//! Configuration for the strip and shelf engines.
//!
//! Plain serde-friendly structs so external bindings (CLI flags, HTTP
//! bodies, config files) can produce them directly. Defaults match a
//! 4x5 shelf driven from `/dev/spidev0.0` at 8 MHz.

use serde::{Deserialize, Serialize};

use crate::layout::ShelfLayout;

/// LED strip hardware and correction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// Path of the SPI device node.
    pub device: String,
    /// SPI clock frequency in Hz.
    pub frequency_hz: u32,
    /// Number of LEDs on the strip.
    pub count: usize,
    /// Whether the strip connects to its device.
    pub enabled: bool,
    /// Gamma-correct color channels at transmit time.
    pub gamma_correction: bool,
    /// Gamma exponent for the correction table.
    pub gamma: f32,
    /// Derive the transmitted brightness from each color's HSV value.
    pub hsv_brightness: bool,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            device: String::from("/dev/spidev0.0"),
            frequency_hz: 8_000_000,
            count: 1,
            enabled: false,
            gamma_correction: false,
            gamma: 2.6,
            hsv_brightness: false,
        }
    }
}

/// Shelf-level behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    pub layout: ShelfLayout,
    /// Overall brightness, 0.0..=1.0.
    pub brightness: f32,
    /// Fade brightness changes instead of applying them instantly.
    pub brightness_transitions: bool,
    /// Crossfade average-color fills instead of applying them instantly.
    pub color_transitions: bool,
    /// Base duration for a full-magnitude transition, in milliseconds.
    pub transition_duration_ms: u64,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            layout: ShelfLayout::default(),
            brightness: 1.0,
            brightness_transitions: true,
            color_transitions: true,
            transition_duration_ms: 400,
        }
    }
}
