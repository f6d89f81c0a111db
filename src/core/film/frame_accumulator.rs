use crate::core::base::*;
use crate::core::config::*;
use crate::core::error::*;
use crate::core::spectrum::*;

use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// One HDR pixel stored as the bit patterns of its four channels.
///
/// All-zero bits decode to 0.0, so a fresh buffer reads as transparent
/// black before the engine has written anything.
#[derive(Debug, Default)]
struct AtomicPixel {
    c: [AtomicU64; 4],
}

impl AtomicPixel {
    #[inline]
    fn load(&self) -> Argb {
        Argb::from([
            Float::from_bits(self.c[0].load(Ordering::Relaxed)),
            Float::from_bits(self.c[1].load(Ordering::Relaxed)),
            Float::from_bits(self.c[2].load(Ordering::Relaxed)),
            Float::from_bits(self.c[3].load(Ordering::Relaxed)),
        ])
    }

    #[inline]
    fn store(&self, v: &Argb) {
        let a = v.to_array();
        for i in 0..4 {
            self.c[i].store(a[i].to_bits(), Ordering::Relaxed);
        }
    }

    #[inline]
    fn add(&self, v: &Argb) {
        let a = v.to_array();
        for i in 0..4 {
            let _ = self.c[i].fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((Float::from_bits(bits) + a[i]).to_bits())
            });
        }
    }
}

/// Shared HDR pixel buffer, `width * height` ARGB quads in row-major order.
///
/// The engine writes while the compositor reads; neither side takes a lock.
/// Each channel is an independent atomic, so a concurrent reader may see a
/// pixel whose channels come from different writes. Callers treat that as
/// tearing, never as corruption: every observed channel is a value that was
/// actually stored.
#[derive(Debug)]
pub struct FrameAccumulator {
    resolution: [usize; 2],
    pixels: Vec<AtomicPixel>,
}

impl FrameAccumulator {
    pub fn new(width: usize, height: usize) -> Self {
        let n = width * height;
        let mut pixels = Vec::with_capacity(n);
        pixels.resize_with(n, AtomicPixel::default);
        FrameAccumulator {
            resolution: [width, height],
            pixels,
        }
    }

    pub fn for_config(config: &RenderConfig) -> Self {
        Self::new(config.horizontal_resolution, config.vertical_resolution)
    }

    pub fn from_pixels(width: usize, height: usize, pixels: &[Argb]) -> Result<Self, PreviewError> {
        if pixels.len() != width * height {
            let msg = format!(
                "{} pixels given for a {}x{} accumulator",
                pixels.len(),
                width,
                height
            );
            return Err(PreviewError::config(&msg));
        }
        let acc = Self::new(width, height);
        for (i, p) in pixels.iter().enumerate() {
            acc.set(i, p);
        }
        Ok(acc)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.resolution[0]
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.resolution[1]
    }

    #[inline]
    pub fn resolution(&self) -> [usize; 2] {
        self.resolution
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// True when the buffer can hold a render of `config` without reallocation.
    pub fn matches(&self, config: &RenderConfig) -> bool {
        self.resolution == config.resolution()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.resolution[0] + x
    }

    #[inline]
    pub fn get(&self, index: usize) -> Argb {
        self.pixels[index].load()
    }

    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> Argb {
        self.get(self.index(x, y))
    }

    #[inline]
    pub fn set(&self, index: usize, v: &Argb) {
        self.pixels[index].store(v);
    }

    #[inline]
    pub fn add(&self, index: usize, v: &Argb) {
        self.pixels[index].add(v);
    }

    pub fn fill(&self, v: &Argb) {
        self.pixels.par_iter().for_each(|p| p.store(v));
    }

    /// Resets every pixel to the neutral default.
    pub fn clear(&self) {
        self.fill(&Argb::TRANSPARENT);
    }

    /// Parallel iterator over the current pixel values.
    pub fn par_pixels(&self) -> impl IndexedParallelIterator<Item = Argb> + '_ {
        self.pixels.par_iter().map(|p| p.load())
    }

    pub fn snapshot(&self) -> Vec<Argb> {
        self.par_pixels().collect()
    }
}
