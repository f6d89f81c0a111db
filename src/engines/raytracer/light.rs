use crate::core::base::*;
use crate::core::geometry::*;
use crate::core::spectrum::*;

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum LightKind {
    /// Constant contribution everywhere, no shadows.
    Global,
    /// Directional light; `direction` points away from the source.
    Parallel,
    /// Point light restricted to a cone around `direction`.
    Spot,
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Light {
    pub kind: LightKind,
    pub position: Point3f,
    pub direction: Vector3f,
    pub color: Argb,
    pub intensity: Float,
    /// Half angle of the spot cone in radians.
    pub opening_angle: Float,
    pub falloff_exponent: Float,
}

impl Light {
    pub fn global(color: Argb, intensity: Float) -> Self {
        Light {
            kind: LightKind::Global,
            position: Point3f::zero(),
            direction: Vector3f::zero(),
            color,
            intensity,
            opening_angle: PI,
            falloff_exponent: 0.0,
        }
    }

    pub fn parallel(direction: Vector3f, color: Argb, intensity: Float) -> Self {
        Light {
            kind: LightKind::Parallel,
            position: Point3f::zero(),
            direction: direction.normalize(),
            color,
            intensity,
            opening_angle: PI,
            falloff_exponent: 0.0,
        }
    }

    pub fn spot(position: Point3f, direction: Vector3f, color: Argb, intensity: Float) -> Self {
        Light {
            kind: LightKind::Spot,
            position,
            direction: direction.normalize(),
            color,
            intensity,
            opening_angle: radians(60.0),
            falloff_exponent: 2.0,
        }
    }

    /// Unit vector from `p` towards the light and the distance to it.
    /// Global lights have no direction.
    pub fn incidence(&self, p: &Point3f) -> Option<(Vector3f, Float)> {
        match self.kind {
            LightKind::Global => None,
            LightKind::Parallel => Some((-self.direction, Float::INFINITY)),
            LightKind::Spot => {
                let to_light = self.position - *p;
                let dist = to_light.length();
                if dist == 0.0 {
                    return None;
                }
                Some((to_light / dist, dist))
            }
        }
    }

    /// Radiance scale arriving at `p` along `wi`, before the surface term.
    pub fn attenuation(&self, wi: &Vector3f, dist: Float) -> Float {
        match self.kind {
            LightKind::Global | LightKind::Parallel => self.intensity,
            LightKind::Spot => {
                let cos_theta = (-*wi).dot(&self.direction);
                let cos_max = self.opening_angle.cos();
                if cos_theta < cos_max {
                    return 0.0;
                }
                let t = (cos_theta - cos_max) / (1.0 - cos_max).max(EPSILON);
                let cone = Float::clamp(t, 0.0, 1.0).powf(self.falloff_exponent.max(0.0));
                self.intensity * cone / (dist * dist).max(EPSILON)
            }
        }
    }
}
