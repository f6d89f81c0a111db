use crate::core::base::*;
use crate::core::geometry::*;

use serde::{Deserialize, Serialize};
use std::ops;

/// Linear HDR colour sample: alpha, red, green, blue. Values are
/// nominally in [0, 1] but are not bounded.
#[derive(Debug, PartialEq, Default, Copy, Clone, Serialize, Deserialize)]
pub struct Argb {
    pub a: Float,
    pub r: Float,
    pub g: Float,
    pub b: Float,
}

impl Argb {
    pub const BLACK: Argb = Argb::new(1.0, 0.0, 0.0, 0.0);
    pub const WHITE: Argb = Argb::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Argb = Argb::new(0.0, 0.0, 0.0, 0.0);
    pub const RED: Argb = Argb::new(1.0, 1.0, 0.0, 0.0);
    pub const GREEN: Argb = Argb::new(1.0, 0.0, 1.0, 0.0);
    pub const BLUE: Argb = Argb::new(1.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(a: Float, r: Float, g: Float, b: Float) -> Self {
        Argb { a, r, g, b }
    }

    #[inline]
    pub const fn rgb(r: Float, g: Float, b: Float) -> Self {
        Argb::new(1.0, r, g, b)
    }

    #[inline]
    pub const fn gray(v: Float) -> Self {
        Argb::new(1.0, v, v, v)
    }

    #[inline]
    pub fn to_array(&self) -> [Float; 4] {
        [self.a, self.r, self.g, self.b]
    }

    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|c| c.is_finite())
    }
}

impl From<[Float; 4]> for Argb {
    #[inline]
    fn from(c: [Float; 4]) -> Self {
        Argb::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Vector3> for Argb {
    #[inline]
    fn from(v: Vector3) -> Self {
        Argb::rgb(v.x, v.y, v.z)
    }
}

impl ops::Add for Argb {
    type Output = Argb;
    #[inline]
    fn add(self, rhs: Argb) -> Argb {
        Argb::new(self.a + rhs.a, self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl ops::AddAssign for Argb {
    #[inline]
    fn add_assign(&mut self, rhs: Argb) {
        *self = *self + rhs;
    }
}

impl ops::Sub for Argb {
    type Output = Argb;
    #[inline]
    fn sub(self, rhs: Argb) -> Argb {
        Argb::new(self.a - rhs.a, self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl ops::Mul for Argb {
    type Output = Argb;
    #[inline]
    fn mul(self, rhs: Argb) -> Argb {
        Argb::new(self.a * rhs.a, self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl ops::Mul<Float> for Argb {
    type Output = Argb;
    #[inline]
    fn mul(self, s: Float) -> Argb {
        Argb::new(self.a * s, self.r * s, self.g * s, self.b * s)
    }
}

impl ops::Div<Float> for Argb {
    type Output = Argb;
    #[inline]
    fn div(self, s: Float) -> Argb {
        Argb::new(self.a / s, self.r / s, self.g / s, self.b / s)
    }
}
