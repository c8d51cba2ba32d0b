// THEORY:
// The skin-tone classifier is the leaf of the detection pipeline: a pure, per-pixel
// binary predicate. It is a fixed analytic rule, not a learned model, built from
// two independent color-space heuristics that are OR-ed together:
//
// 1.  **RGB rule**: skin is red-dominant with a minimum brightness in every channel
//     and a clear red/green separation.
// 2.  **YCbCr rule**: skin occupies a compact box in the chroma plane once luma is
//     factored out, which makes it more tolerant of lighting than raw RGB.
//
// The RGB rule is often written with an extra `|r - g| > 15` clause. Under `r > g`
// that clause is the same as `r - g > 15`, so only the signed form is checked.

use crate::core_modules::pixel::pixel::Pixel;

const RGB_MIN_RED: u8 = 95;
const RGB_MIN_GREEN: u8 = 40;
const RGB_MIN_BLUE: u8 = 20;
const RGB_MIN_RED_GREEN_SPREAD: i16 = 15;

const YCBCR_MIN_LUMA: f64 = 80.0;
const YCBCR_CB_RANGE: (f64, f64) = (77.0, 127.0);
const YCBCR_CR_RANGE: (f64, f64) = (133.0, 173.0);

/// Returns true when the color passes either the RGB or the YCbCr skin rule.
pub fn is_skin_tone(r: u8, g: u8, b: u8) -> bool {
    rgb_rule(r, g, b) || ycbcr_rule(r, g, b)
}

/// Convenience wrapper over [`is_skin_tone`] for a decoded pixel. Alpha is ignored.
pub fn is_skin_pixel(pixel: &Pixel) -> bool {
    is_skin_tone(pixel.red, pixel.green, pixel.blue)
}

pub fn rgb_rule(r: u8, g: u8, b: u8) -> bool {
    r > RGB_MIN_RED
        && g > RGB_MIN_GREEN
        && b > RGB_MIN_BLUE
        && r > g
        && r > b
        && (r as i16 - g as i16) > RGB_MIN_RED_GREEN_SPREAD
}

pub fn ycbcr_rule(r: u8, g: u8, b: u8) -> bool {
    let (y, cb, cr) = Pixel::new(r, g, b, u8::MAX).ycbcr();
    y > YCBCR_MIN_LUMA
        && cb > YCBCR_CB_RANGE.0
        && cb < YCBCR_CB_RANGE.1
        && cr > YCBCR_CR_RANGE.0
        && cr < YCBCR_CR_RANGE.1
}
