use crate::core::base::*;
use crate::core::display::*;
use crate::core::error::*;
use crate::core::film::*;
use crate::core::spectrum::*;

use rayon::prelude::*;

/// Pixels handed to one rayon task at a time.
const MIN_PIXELS_PER_TASK: usize = 4096;

/// Maps one HDR channel to 8 bits: `v <= 0 -> 0`, `v >= 1 -> 255`,
/// otherwise `round(v * 255)`. Non-finite values map to 0.
#[inline]
pub fn to_byte(v: Float) -> u8 {
    if !v.is_finite() || v <= 0.0 {
        0
    } else if v >= 1.0 {
        255
    } else {
        (v * 255.0).round() as u8
    }
}

/// Packs a pixel as `0xAARRGGBB`.
#[inline]
pub fn pack_argb(p: &Argb) -> u32 {
    (to_byte(p.a) as u32) << 24
        | (to_byte(p.r) as u32) << 16
        | (to_byte(p.g) as u32) << 8
        | (to_byte(p.b) as u32)
}

/// One full pass over `frame`, in parallel. The frame may be written
/// concurrently; each pixel reflects whatever values were visible when it
/// was read.
pub fn composite(frame: &FrameAccumulator) -> Result<DisplayableImage, PreviewError> {
    let pixels: Vec<u32> = frame
        .par_pixels()
        .with_min_len(MIN_PIXELS_PER_TASK)
        .map(|p| pack_argb(&p))
        .collect();
    DisplayableImage::new(frame.width(), frame.height(), pixels)
}
