use crate::core::base::*;

use serde::{Deserialize, Serialize};
use std::ops;

#[derive(Debug, PartialEq, Default, Copy, Clone, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

pub type Vector3f = Vector3;
pub type Point3f = Vector3;
pub type Normal3f = Vector3;

impl Vector3 {
    pub const UNIT_X: Vector3 = Vector3::new(1.0, 0.0, 0.0);
    pub const UNIT_Y: Vector3 = Vector3::new(0.0, 1.0, 0.0);
    pub const UNIT_Z: Vector3 = Vector3::new(0.0, 0.0, 1.0);

    pub const fn new(x: Float, y: Float, z: Float) -> Self {
        Vector3 { x, y, z }
    }

    #[inline]
    pub fn zero() -> Self {
        Vector3::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn dot(&self, rhs: &Self) -> Float {
        return self.x * rhs.x + self.y * rhs.y + self.z * rhs.z;
    }

    #[inline]
    pub fn length_squared(&self) -> Float {
        return self.dot(self);
    }

    #[inline]
    pub fn length(&self) -> Float {
        return self.length_squared().sqrt();
    }

    /// Returns the zero vector unchanged instead of producing NaNs.
    #[inline]
    pub fn normalize(&self) -> Self {
        let l = self.length();
        if l == 0.0 {
            return *self;
        }
        *self / l
    }

    #[inline]
    pub fn distance(a: &Self, b: &Self) -> Float {
        return (*a - *b).length();
    }

    #[inline]
    pub fn cross(v1: &Self, v2: &Self) -> Self {
        Vector3 {
            x: (v1.y * v2.z) - (v1.z * v2.y),
            y: (v1.z * v2.x) - (v1.x * v2.z),
            z: (v1.x * v2.y) - (v1.y * v2.x),
        }
    }

    /// Angle in radians between two directions.
    pub fn angle_to(&self, other: &Self) -> Float {
        let l = self.length() * other.length();
        if l == 0.0 {
            return 0.0;
        }
        Float::acos(Float::clamp(self.dot(other) / l, -1.0, 1.0))
    }

    /// Mirrors `self` about the plane with normal `n`.
    pub fn reflect(&self, n: &Self) -> Self {
        let n = n.normalize();
        *self - n * (2.0 * self.dot(&n))
    }

    /// Rotates by euler angles (x, then y, then z), in radians.
    pub fn rotate(&self, euler: &Self) -> Self {
        let (sx, cx) = euler.x.sin_cos();
        let (sy, cy) = euler.y.sin_cos();
        let (sz, cz) = euler.z.sin_cos();
        let v = Vector3::new(self.x, self.y * cx - self.z * sx, self.y * sx + self.z * cx);
        let v = Vector3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy);
        Vector3::new(v.x * cz - v.y * sz, v.x * sz + v.y * cz, v.z)
    }

    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }
}

impl ops::Add for Vector3 {
    type Output = Vector3;
    #[inline]
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl ops::Sub for Vector3 {
    type Output = Vector3;
    #[inline]
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl ops::Mul<Float> for Vector3 {
    type Output = Vector3;
    #[inline]
    fn mul(self, rhs: Float) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl ops::Mul<Vector3> for Float {
    type Output = Vector3;
    #[inline]
    fn mul(self, rhs: Vector3) -> Vector3 {
        rhs * self
    }
}

impl ops::Div<Float> for Vector3 {
    type Output = Vector3;
    #[inline]
    fn div(self, rhs: Float) -> Vector3 {
        Vector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl ops::Neg for Vector3 {
    type Output = Vector3;
    #[inline]
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl ops::AddAssign for Vector3 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl From<(Float, Float, Float)> for Vector3 {
    #[inline]
    fn from(value: (Float, Float, Float)) -> Self {
        Vector3::new(value.0, value.1, value.2)
    }
}

impl From<[Float; 3]> for Vector3 {
    #[inline]
    fn from(value: [Float; 3]) -> Self {
        Vector3::new(value[0], value[1], value[2])
    }
}

//------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        let v1 = Vector3::new(1.0, 2.0, 3.0);
        let v2 = Vector3::new(4.0, 5.0, 6.0);
        assert_eq!(v1 + v2, Vector3::new(5.0, 7.0, 9.0));
        assert_eq!(v2 - v1, Vector3::new(3.0, 3.0, 3.0));
        assert_eq!(2.0 * v2, Vector3::new(8.0, 10.0, 12.0));
    }

    #[test]
    fn test_normalize_zero() {
        let v = Vector3::zero().normalize();
        assert!(!v.has_nans());
        assert_eq!(Vector3::new(4.0, 0.0, 0.0).normalize(), Vector3::UNIT_X);
    }

    #[test]
    fn test_cross_and_angle() {
        let c = Vector3::cross(&Vector3::UNIT_X, &Vector3::UNIT_Y);
        assert_eq!(c, Vector3::UNIT_Z);
        let a = Vector3::UNIT_X.angle_to(&Vector3::UNIT_Y);
        assert!((a - PI_OVER_2).abs() < 1e-12);
    }

    #[test]
    fn test_reflect() {
        let d = Vector3::new(1.0, -1.0, 0.0);
        let r = d.reflect(&Vector3::UNIT_Y);
        assert_eq!(r, Vector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vector3::UNIT_X.rotate(&Vector3::new(0.0, 0.0, PI_OVER_2));
        assert!((v.x).abs() < 1e-12);
        assert!((v.y - 1.0).abs() < 1e-12);
    }
}
