//! Fire flicker animation.
//!
//! Every frame subtracts a per-LED flicker amount from a warm base
//! color, and the frame interval is re-randomized between frames so the
//! flame never settles into a rhythm.

use embassy_time::{Duration, Instant};

use super::Animation;
use crate::buffer::PixelBuffer;
use crate::color::Rgb;

const BASE_COLOR: Rgb = Rgb {
    r: 255,
    g: 96,
    b: 12,
};

/// Largest amount subtracted from each channel.
const FLICKER_DEPTH: u32 = 100;

const MIN_FRAME_MS: u64 = 40;
const MAX_FRAME_MS: u64 = 60;

/// Candle-like flicker over the whole strip.
#[derive(Debug, Clone)]
pub struct FireAnimation {
    interval: Duration,
    frame: u64,
}

impl FireAnimation {
    pub const fn new() -> Self {
        Self {
            interval: Duration::from_millis(MIN_FRAME_MS),
            frame: 0,
        }
    }

    /// Deterministic SplitMix64-style mixing, folded down to u32.
    const fn hash(x: u64) -> u32 {
        let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        (z ^ (z >> 31)) as u32
    }

    fn flicker(&self, led: usize) -> u8 {
        (Self::hash((self.frame << 24) ^ led as u64) % (FLICKER_DEPTH + 1)) as u8
    }
}

impl Default for FireAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl Animation for FireAnimation {
    fn name(&self) -> &str {
        "fire"
    }

    fn frame_interval(&self) -> Duration {
        self.interval
    }

    fn set_frame_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn paint(&mut self, _now: Instant, pixels: &mut PixelBuffer) {
        self.frame = self.frame.wrapping_add(1);

        for led in 0..pixels.len() {
            let flicker = self.flicker(led);
            let color = Rgb {
                r: BASE_COLOR.r.saturating_sub(flicker),
                g: BASE_COLOR.g.saturating_sub(flicker),
                b: BASE_COLOR.b.saturating_sub(flicker),
            };
            let _ = pixels.set_color(led, color);
        }

        let span = MAX_FRAME_MS - MIN_FRAME_MS + 1;
        let jitter = u64::from(Self::hash(self.frame.wrapping_mul(0x9e37))) % span;
        self.interval = Duration::from_millis(MIN_FRAME_MS + jitter);
    }
}
