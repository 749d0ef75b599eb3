//! Color type and the small amount of color math the engine needs.

use smart_leds::RGB8;

pub type Rgb = RGB8;

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
pub const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

/// Blend two RGB colors.
///
/// # Arguments
/// * `a` - First color
/// * `b` - Second color
/// * `amount_of_b` - Blend factor (0.0 = all a, 1.0 = all b)
pub fn blend_colors(a: Rgb, b: Rgb, amount_of_b: f32) -> Rgb {
    Rgb {
        r: blend_channel(a.r, b.r, amount_of_b),
        g: blend_channel(a.g, b.g, amount_of_b),
        b: blend_channel(a.b, b.b, amount_of_b),
    }
}

#[inline]
fn blend_channel(a: u8, b: u8, t: f32) -> u8 {
    let blended = f32::from(a) + (f32::from(b) - f32::from(a)) * t;
    libm::roundf(blended.clamp(0.0, 255.0)) as u8
}

/// Euclidean distance between two colors, normalized to 0.0..=1.0.
///
/// Used to scale color transition durations with the magnitude of the
/// change, analogous to `|end - start|` for brightness.
pub fn color_distance(a: Rgb, b: Rgb) -> f32 {
    let dr = f32::from(a.r) - f32::from(b.r);
    let dg = f32::from(a.g) - f32::from(b.g);
    let db = f32::from(a.b) - f32::from(b.b);
    let max = 255.0 * libm::sqrtf(3.0);
    libm::sqrtf(dr * dr + dg * dg + db * db) / max
}

/// The HSV value component of a color: the brightest channel.
pub fn hsv_value(color: Rgb) -> u8 {
    color.r.max(color.g).max(color.b)
}

/// Quadratic mean of one channel over `count` samples, given the sum of
/// its squares. Preserves perceived brightness better than an arithmetic
/// mean when the averaged colors differ.
pub(crate) fn quadratic_channel_mean(sum_of_squares: u64, count: u64) -> u8 {
    if count == 0 {
        return 0;
    }
    let mean = sum_of_squares as f32 / count as f32;
    libm::roundf(libm::sqrtf(mean)).clamp(0.0, 255.0) as u8
}
