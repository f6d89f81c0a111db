use super::ray::*;
use crate::core::base::*;
use crate::core::config::*;
use crate::core::geometry::*;

/// Pinhole camera. Screen coordinates run from -1 (left, bottom) to
/// 1 (right, top).
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Camera {
    position: Point3f,
    gaze: Vector3f,
    right: Vector3f,
    up: Vector3f,
    focal_length: Float,
}

impl Camera {
    pub fn new(config: &CameraConfig, width: usize, height: usize) -> Self {
        let fov = PI_OVER_2 / config.zoom_factor;
        let gaze = (config.look_at - config.position).normalize();
        let mut right = Vector3f::cross(&gaze, &Vector3f::UNIT_Y);
        if right.length_squared() < EPSILON {
            right = Vector3f::cross(&gaze, &Vector3f::UNIT_Z);
        }
        let aspect = width as Float / Float::max(height as Float, 1.0);
        let right = right.normalize() * (aspect * fov);
        let up = Vector3f::cross(&right, &gaze).normalize() * fov;
        Camera {
            position: config.position,
            gaze,
            right,
            up,
            focal_length: config.focal_length,
        }
    }

    pub fn generate_ray(&self, x: Float, y: Float) -> Ray {
        let d = (self.gaze + self.right * x + self.up * y).normalize();
        Ray::new(&(self.position + d * self.focal_length), &d, 0)
    }
}
