// THEORY:
// The `RegionScanner` turns a raw RGBA frame into a list of skin-colored windows.
// It plays the same role a grid manager plays for a chunked vision system: it is
// the bridge between the flat byte buffer and the region-based analysis above it.
//
// Key principles:
// 1.  **Resolution-relative grid**: The window side is a fixed fraction of the
//     shorter image edge (`min(width, height) / grid_divisor`). Small images get few
//     or no windows; that is an accepted resolution floor, not an error.
// 2.  **Half overlap**: Windows advance by half their side in both axes, so a face
//     straddling a window border is still seen whole by a neighbor.
// 3.  **Defensive sampling**: Every pixel read is bounds-checked. A short buffer
//     just lowers the sample count of the windows that hang off its end; it never
//     fails the pass.
// 4.  **Borrowed input**: The buffer is read in place and never copied or retained.

use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
use crate::core_modules::region::ScoredRegion;
use crate::core_modules::skin_tone::is_skin_pixel;
use crate::pipeline::DetectorConfig;
use log::{trace, warn};

/// Window side (and stride basis) for an image of the given size.
pub fn grid_size(width: u32, height: u32, grid_divisor: u32) -> u32 {
    if grid_divisor == 0 {
        return 0;
    }
    width.min(height) / grid_divisor
}

/// Scans the frame and returns every window whose skin ratio beats the threshold.
pub fn scan(pixels: &[u8], width: u32, height: u32, config: &DetectorConfig) -> Vec<ScoredRegion> {
    let mut regions = Vec::new();
    if pixels.is_empty() || width == 0 || height == 0 {
        return regions;
    }

    let expected_len = width as u64 * height as u64 * CHANNELS as u64;
    if pixels.len() as u64 != expected_len {
        warn!(
            "pixel buffer holds {} bytes but {}x{} RGBA needs {}; out-of-range pixels will be skipped",
            pixels.len(),
            width,
            height,
            expected_len
        );
    }

    let grid = grid_size(width, height, config.grid_divisor);
    if grid == 0 {
        trace!("{}x{} is below the scan resolution floor", width, height);
        return regions;
    }
    let stride = (grid / 2).max(1);
    // Windows whose top-left pixel is past the buffer sample nothing, and neither
    // does any window after them in scan order.
    let can_skip_empty = config.score_threshold >= 0.0;
    let buffer_len = pixels.len() as u64;

    let mut y = 0u32;
    'rows: while y.saturating_add(grid) < height {
        let mut x = 0u32;
        while x.saturating_add(grid) < width {
            let first_byte = (y as u64 * width as u64 + x as u64) * CHANNELS as u64;
            if can_skip_empty && first_byte >= buffer_len {
                trace!("scan stopped at ({}, {}): rest of the frame is past the buffer", x, y);
                break 'rows;
            }
            let score = score_window(pixels, width, x, y, grid);
            if score > config.score_threshold {
                regions.push(ScoredRegion::new(x, y, grid, score));
            }
            x += stride;
        }
        y += stride;
    }

    regions
}

/// Fraction of the sampled pixels in the `size`×`size` window at (`start_x`, `start_y`)
/// that are skin-toned. Returns 0.0 when no pixel of the window is inside the buffer.
pub fn score_window(pixels: &[u8], width: u32, start_x: u32, start_y: u32, size: u32) -> f64 {
    if width == 0 {
        return 0.0;
    }
    // A trailing partial row still counts; its missing pixels fail `Pixel::at`.
    let rows_in_buffer = (pixels.len() as u64).div_ceil(width as u64 * CHANNELS as u64);
    let row_end = (start_y as u64 + size as u64).min(rows_in_buffer);
    let column_end = start_x as u64 + size as u64;

    let mut skin_pixels = 0usize;
    let mut sampled_pixels = 0usize;

    for pixel_y in start_y as u64..row_end {
        for pixel_x in start_x as u64..column_end {
            let Ok(byte_index) = usize::try_from((pixel_y * width as u64 + pixel_x) * CHANNELS as u64)
            else {
                continue;
            };
            if let Some(pixel) = Pixel::at(pixels, byte_index) {
                if is_skin_pixel(&pixel) {
                    skin_pixels += 1;
                }
                sampled_pixels += 1;
            }
        }
    }

    if sampled_pixels == 0 {
        0.0
    } else {
        skin_pixels as f64 / sampled_pixels as f64
    }
}
