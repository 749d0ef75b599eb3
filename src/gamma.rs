//! Gamma lookup tables.

/// A 256-entry channel remap table.
pub type GammaLut = [u8; 256];

/// Build the lookup table for a gamma exponent:
/// `lut[i] = round(255 * (i / 255)^gamma)`.
///
/// For `gamma == 1.0` the table is the identity; for any positive gamma
/// the endpoints stay fixed (`lut[0] == 0`, `lut[255] == 255`).
pub fn gamma_lut(gamma: f32) -> GammaLut {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = (libm::powf(i as f32 / 255.0, gamma) * 255.0 + 0.5) as u8;
    }
    lut
}
