use super::quality::*;
use super::render_mode::*;
use crate::core::base::*;
use crate::core::error::*;
use crate::core::geometry::*;
use crate::core::spectrum::*;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_FOCAL_LENGTH: Float = 0.3;
pub const DEFAULT_ORBIT_RADIUS: Float = 10.0;

#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Point3f,
    pub look_at: Point3f,
    pub zoom_factor: Float,
    pub focal_length: Float,
}

impl CameraConfig {
    /// Eye orbiting the origin at `radius`, `angle` radians around the
    /// vertical axis and `height` above the floor.
    pub fn orbit(angle: Float, height: Float, radius: Float) -> Point3f {
        Point3f::new(angle.sin() * radius, height, angle.cos() * radius)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            position: Point3f::new(0.0, 0.0, DEFAULT_ORBIT_RADIUS),
            look_at: Point3f::zero(),
            zoom_factor: 1.0,
            focal_length: DEFAULT_FOCAL_LENGTH,
        }
    }
}

/// Everything a single render invocation needs. Captured by value when a
/// render is requested and never modified afterwards; the `with_*`
/// methods return altered copies.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub horizontal_resolution: usize,
    pub vertical_resolution: usize,
    pub subpixels_per_pixel: usize,
    pub samples_per_subpixel: usize,
    pub maximum_iteration_count: usize,
    pub camera: CameraConfig,
    pub mode: RenderMode,
    pub background_color: Argb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig::from_quality(Quality::default())
    }
}

impl RenderConfig {
    pub fn from_quality(quality: Quality) -> Self {
        let q = quality.settings();
        RenderConfig {
            horizontal_resolution: q.horizontal_resolution,
            vertical_resolution: q.vertical_resolution,
            subpixels_per_pixel: q.subpixels_per_pixel,
            samples_per_subpixel: q.samples_per_subpixel,
            maximum_iteration_count: q.maximum_iteration_count,
            camera: CameraConfig::default(),
            mode: RenderMode::default(),
            background_color: Argb::TRANSPARENT,
        }
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.horizontal_resolution * self.vertical_resolution
    }

    #[inline]
    pub fn resolution(&self) -> [usize; 2] {
        [self.horizontal_resolution, self.vertical_resolution]
    }

    pub fn validate(&self) -> Result<(), PreviewError> {
        if self.horizontal_resolution == 0 || self.vertical_resolution == 0 {
            let msg = format!(
                "resolution must be non-zero, got {}x{}",
                self.horizontal_resolution, self.vertical_resolution
            );
            return Err(PreviewError::config(&msg));
        }
        if self
            .horizontal_resolution
            .checked_mul(self.vertical_resolution)
            .is_none()
        {
            return Err(PreviewError::config("resolution overflows the pixel count"));
        }
        if self.subpixels_per_pixel == 0 {
            return Err(PreviewError::config("subpixels per pixel must be at least 1"));
        }
        if self.samples_per_subpixel == 0 {
            return Err(PreviewError::config("samples per subpixel must be at least 1"));
        }
        if self.maximum_iteration_count == 0 {
            return Err(PreviewError::config(
                "maximum iteration count must be at least 1",
            ));
        }
        let camera = &self.camera;
        if !(camera.zoom_factor.is_finite() && camera.zoom_factor > 0.0) {
            let msg = format!("zoom factor must be positive, got {}", camera.zoom_factor);
            return Err(PreviewError::config(&msg));
        }
        if !camera.focal_length.is_finite() || camera.position.has_nans() || camera.look_at.has_nans() {
            return Err(PreviewError::config("camera contains non-finite values"));
        }
        if camera.position == camera.look_at {
            return Err(PreviewError::config("camera position equals its look-at target"));
        }
        Ok(())
    }

    pub fn with_quality(&self, quality: Quality) -> Self {
        let q = quality.settings();
        RenderConfig {
            horizontal_resolution: q.horizontal_resolution,
            vertical_resolution: q.vertical_resolution,
            subpixels_per_pixel: q.subpixels_per_pixel,
            samples_per_subpixel: q.samples_per_subpixel,
            maximum_iteration_count: q.maximum_iteration_count,
            ..*self
        }
    }

    pub fn with_resolution(&self, width: usize, height: usize) -> Self {
        RenderConfig {
            horizontal_resolution: width,
            vertical_resolution: height,
            ..*self
        }
    }

    pub fn with_mode(&self, mode: RenderMode) -> Self {
        RenderConfig { mode, ..*self }
    }

    pub fn with_samples(&self, samples_per_subpixel: usize) -> Self {
        RenderConfig {
            samples_per_subpixel,
            ..*self
        }
    }

    pub fn with_subpixels(&self, subpixels_per_pixel: usize) -> Self {
        RenderConfig {
            subpixels_per_pixel,
            ..*self
        }
    }

    pub fn with_max_iterations(&self, maximum_iteration_count: usize) -> Self {
        RenderConfig {
            maximum_iteration_count,
            ..*self
        }
    }

    pub fn with_camera(&self, camera: CameraConfig) -> Self {
        RenderConfig { camera, ..*self }
    }

    pub fn with_position(&self, position: Point3f) -> Self {
        let camera = CameraConfig {
            position,
            ..self.camera
        };
        self.with_camera(camera)
    }

    pub fn with_zoom(&self, zoom_factor: Float) -> Self {
        let camera = CameraConfig {
            zoom_factor,
            ..self.camera
        };
        self.with_camera(camera)
    }

    pub fn with_focal_length(&self, focal_length: Float) -> Self {
        let camera = CameraConfig {
            focal_length,
            ..self.camera
        };
        self.with_camera(camera)
    }

    pub fn from_json_str(s: &str) -> Result<Self, PreviewError> {
        let config: RenderConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, PreviewError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, PreviewError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_low_quality() {
        let c = RenderConfig::default();
        assert_eq!(c.resolution(), [640, 360]);
        assert_eq!(c.maximum_iteration_count, 8);
        assert_eq!(c.subpixels_per_pixel, 1);
        assert_eq!(c.samples_per_subpixel, 2);
        assert_eq!(c.mode, RenderMode::RenderTime);
        assert_eq!(c.camera.focal_length, 0.3);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_with_methods_copy() {
        let c = RenderConfig::default();
        let d = c.with_zoom(2.5).with_mode(RenderMode::Depths);
        assert_eq!(c.camera.zoom_factor, 1.0);
        assert_eq!(d.camera.zoom_factor, 2.5);
        assert_eq!(d.mode, RenderMode::Depths);
        assert_eq!(d.horizontal_resolution, c.horizontal_resolution);
    }

    #[test]
    fn test_validate_rejects() {
        let c = RenderConfig::default();
        assert!(c.with_resolution(0, 10).validate().is_err());
        assert!(c.with_samples(0).validate().is_err());
        assert!(c.with_subpixels(0).validate().is_err());
        assert!(c.with_max_iterations(0).validate().is_err());
        assert!(c.with_zoom(0.0).validate().is_err());
        assert!(c.with_zoom(Float::NAN).validate().is_err());
        let e = c.with_samples(0).validate().unwrap_err();
        assert_eq!(e.kind, ErrorKind::Config);
    }

    #[test]
    fn test_orbit() {
        let p = CameraConfig::orbit(0.0, 5.0, 10.0);
        assert_eq!(p, Point3f::new(0.0, 5.0, 10.0));
        let q = CameraConfig::orbit(PI_OVER_2, 0.0, 10.0);
        assert!((q.x - 10.0).abs() < 1e-9);
        assert!(q.z.abs() < 1e-9);
    }

    #[test]
    fn test_json_partial_document() {
        let c = RenderConfig::from_json_str(
            r#"{ "horizontal_resolution": 32, "vertical_resolution": 16, "mode": "depths" }"#,
        )
        .unwrap();
        assert_eq!(c.resolution(), [32, 16]);
        assert_eq!(c.mode, RenderMode::Depths);
        assert_eq!(c.samples_per_subpixel, 2);

        let text = c.to_json_string().unwrap();
        assert_eq!(RenderConfig::from_json_str(&text).unwrap(), c);
    }

    #[test]
    fn test_json_unknown_fields_are_ignored() {
        let c = RenderConfig::from_json_str(
            r#"{ "horizontal_resolution": 8, "vertical_resolution": 8, "air_refraction_index": 1.33 }"#,
        )
        .unwrap();
        assert_eq!(c.resolution(), [8, 8]);
        let text = c.to_json_string().unwrap();
        assert!(!text.contains("air_refraction_index"));
        assert!(text.contains("background_color"));
    }

    #[test]
    fn test_json_invalid_config_is_rejected() {
        let r = RenderConfig::from_json_str(r#"{ "samples_per_subpixel": 0 }"#);
        assert!(r.is_err());
    }
}
