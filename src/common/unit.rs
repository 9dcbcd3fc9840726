//! Unit conversion utilities.
//!
//! DrawingML measures everything in English Metric Units (EMU). Layout math is
//! done in `f64` EMU and rounded exactly once, when the final extent is emitted.

pub const EMUS_PER_INCH: i64 = 914_400;

/// Screen resolution assumed for raster images that carry no usable DPI.
pub const DEFAULT_DPI: u32 = 96;

#[inline]
pub fn inches_to_emu_f64(inches: f64) -> f64 {
    inches * EMUS_PER_INCH as f64
}

/// EMUs covered by a single pixel at `dpi` (9525 at 96 DPI).
#[inline]
pub fn emu_per_px(dpi: u32) -> f64 {
    EMUS_PER_INCH as f64 / dpi.max(1) as f64
}

#[inline]
pub fn px_to_emu_f64(px: u32, dpi: u32) -> f64 {
    px as f64 * emu_per_px(dpi)
}

/// Round a fractional EMU value to the nearest whole unit.
///
/// Negative and non-finite inputs clamp to zero; an extent can never be negative.
#[inline]
pub fn round_emu(emu: f64) -> i64 {
    if emu.is_finite() && emu > 0.0 {
        emu.round() as i64
    } else {
        0
    }
}
