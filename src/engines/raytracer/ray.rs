use crate::core::base::*;
use crate::core::geometry::*;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Ray {
    pub o: Point3f,
    pub d: Vector3f,
    /// Number of bounces that produced this ray; camera rays are 0.
    pub depth: usize,
}

impl Ray {
    pub fn new(o: &Point3f, d: &Vector3f, depth: usize) -> Self {
        Ray {
            o: *o,
            d: d.normalize(),
            depth,
        }
    }

    #[inline]
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }

    /// Continues from the point at `t` in direction `d`, nudged off the surface.
    pub fn spawn(&self, t: Float, d: &Vector3f) -> Ray {
        let d = d.normalize();
        Ray::new(&(self.at(t) + d * SHADOW_EPSILON), &d, self.depth + 1)
    }
}

/// Closest intersection along a ray.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Hit {
    pub t: Float,
    /// Barycentric coordinates for triangles, spherical ones for spheres.
    pub u: Float,
    pub v: Float,
    pub back_face: bool,
}
