use super::material::*;
use super::ray::*;
use crate::core::base::*;
use crate::core::geometry::*;

#[derive(Debug, PartialEq, Clone)]
pub enum Shape {
    Triangle { a: Point3f, b: Point3f, c: Point3f },
    Sphere { center: Point3f, radius: Float },
}

#[derive(Debug, PartialEq, Clone)]
pub struct Primitive {
    pub shape: Shape,
    pub material: Material,
}

impl Primitive {
    pub fn new(shape: Shape) -> Self {
        Primitive {
            shape,
            material: Material::default(),
        }
    }

    pub fn is_triangle(&self) -> bool {
        matches!(self.shape, Shape::Triangle { .. })
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Hit> {
        match &self.shape {
            Shape::Triangle { a, b, c } => intersect_triangle(ray, a, b, c),
            Shape::Sphere { center, radius } => intersect_sphere(ray, center, *radius),
        }
    }

    pub fn normal_at(&self, p: &Point3f) -> Normal3f {
        match &self.shape {
            Shape::Triangle { a, b, c } => Vector3f::cross(&(*b - *a), &(*c - *a)).normalize(),
            Shape::Sphere { center, .. } => (*p - *center).normalize(),
        }
    }

    pub fn surface_area(&self) -> Float {
        match &self.shape {
            Shape::Triangle { a, b, c } => 0.5 * Vector3f::cross(&(*b - *a), &(*c - *a)).length(),
            Shape::Sphere { radius, .. } => 4.0 * PI * radius * radius,
        }
    }
}

/// Möller–Trumbore.
fn intersect_triangle(ray: &Ray, a: &Point3f, b: &Point3f, c: &Point3f) -> Option<Hit> {
    let edge_ab = *b - *a;
    let edge_ac = *c - *a;
    let pvec = Vector3f::cross(&ray.d, &edge_ac);
    let det = edge_ab.dot(&pvec);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = ray.o - *a;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = Vector3f::cross(&tvec, &edge_ab);
    let v = ray.d.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge_ac.dot(&qvec) * inv_det;
    if t <= EPSILON {
        return None;
    }
    Some(Hit {
        t,
        u,
        v,
        back_face: det < 0.0,
    })
}

fn intersect_sphere(ray: &Ray, center: &Point3f, radius: Float) -> Option<Hit> {
    let oc = ray.o - *center;
    let b = oc.dot(&ray.d);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let (t0, t1) = (-b - sq, -b + sq);
    let (t, back_face) = if t0 > EPSILON {
        (t0, false)
    } else if t1 > EPSILON {
        (t1, true)
    } else {
        return None;
    };
    let n = (ray.at(t) - *center) / radius;
    let u = 0.5 + Float::atan2(n.z, n.x) / (2.0 * PI);
    let v = Float::acos(Float::clamp(n.y, -1.0, 1.0)) / PI;
    Some(Hit { t, u, v, back_face })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_hit() {
        let tri = Primitive::new(Shape::Triangle {
            a: Point3f::new(-1.0, -1.0, 0.0),
            b: Point3f::new(1.0, -1.0, 0.0),
            c: Point3f::new(0.0, 1.0, 0.0),
        });
        let ray = Ray::new(&Point3f::new(0.0, 0.0, 5.0), &Vector3f::new(0.0, 0.0, -1.0), 0);
        let hit = tri.intersect(&ray).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-9);
        assert!(hit.u >= 0.0 && hit.v >= 0.0 && hit.u + hit.v <= 1.0);

        let miss = Ray::new(&Point3f::new(5.0, 0.0, 5.0), &Vector3f::new(0.0, 0.0, -1.0), 0);
        assert!(tri.intersect(&miss).is_none());
        let behind = Ray::new(&Point3f::new(0.0, 0.0, 5.0), &Vector3f::new(0.0, 0.0, 1.0), 0);
        assert!(tri.intersect(&behind).is_none());
    }

    #[test]
    fn test_sphere_hit_and_inside() {
        let s = Primitive::new(Shape::Sphere {
            center: Point3f::zero(),
            radius: 1.0,
        });
        let ray = Ray::new(&Point3f::new(0.0, 0.0, 5.0), &Vector3f::new(0.0, 0.0, -1.0), 0);
        let hit = s.intersect(&ray).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-9);
        assert!(!hit.back_face);
        assert_eq!(s.normal_at(&ray.at(hit.t)), Vector3f::UNIT_Z);

        let inside = Ray::new(&Point3f::zero(), &Vector3f::UNIT_X, 0);
        let hit = s.intersect(&inside).unwrap();
        assert!(hit.back_face);
        assert!((hit.t - 1.0).abs() < 1e-9);
    }
}
