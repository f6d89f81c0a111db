use crate::core::error::*;

use image::RgbaImage;
use std::sync::Arc;

/// Display-ready image: one `0xAARRGGBB` word per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayableImage {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl DisplayableImage {
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self, PreviewError> {
        if pixels.len() != width * height {
            let msg = format!(
                "{} packed pixels for a {}x{} image",
                pixels.len(),
                width,
                height
            );
            return Err(PreviewError::display(&msg));
        }
        Ok(DisplayableImage {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resolution(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    /// `[a, r, g, b]` bytes of pixel `index`.
    pub fn channels(&self, index: usize) -> [u8; 4] {
        self.pixels[index].to_be_bytes()
    }

    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for p in self.pixels.iter() {
            let [a, r, g, b] = p.to_be_bytes();
            bytes.extend_from_slice(&[r, g, b, a]);
        }
        RgbaImage::from_vec(self.width as u32, self.height as u32, bytes)
    }
}

/// Receiver of composited frames. The sink owns each image it is handed;
/// publishing a new one releases the sink's claim on the previous one.
pub trait DisplaySink: Send + Sync {
    fn publish(&self, image: Arc<DisplayableImage>) -> Result<(), PreviewError>;
}
