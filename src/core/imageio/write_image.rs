use crate::core::display::*;
use crate::core::error::*;

use image::ImageFormat;
use log::*;
use std::path::Path;

impl From<image::ImageError> for PreviewError {
    fn from(value: image::ImageError) -> Self {
        let msg = value.to_string();
        return PreviewError::new(ErrorKind::Image, &msg);
    }
}

/// Saves a composited image. The format follows the file extension and
/// falls back to PNG when there is none.
pub fn write_image(path: &Path, image: &DisplayableImage) -> Result<(), PreviewError> {
    let rgba = image
        .to_rgba_image()
        .ok_or_else(|| PreviewError::new(ErrorKind::Image, "image buffer size mismatch"))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let format = match ImageFormat::from_path(path) {
        Ok(format) => format,
        Err(_) => ImageFormat::Png,
    };
    match format {
        // no alpha channel in these formats
        ImageFormat::Jpeg | ImageFormat::Pnm => {
            let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            rgb.save_with_format(path, format)?;
        }
        _ => {
            rgba.save_with_format(path, format)?;
        }
    }
    info!(
        "wrote {}x{} image to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}
