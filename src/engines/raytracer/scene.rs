use super::light::*;
use super::material::*;
use super::primitive::*;
use super::ray::*;
use crate::core::base::*;
use crate::core::geometry::*;
use crate::core::spectrum::*;

use log::*;
use std::ops::Range;

const ICOSAHEDRON_X: Float = 0.525731112119133606;
const ICOSAHEDRON_Z: Float = 0.850650808352039932;

const ICOSAHEDRON_VERTICES: [[Float; 3]; 12] = [
    [-ICOSAHEDRON_X, 0.0, ICOSAHEDRON_Z],
    [ICOSAHEDRON_X, 0.0, ICOSAHEDRON_Z],
    [-ICOSAHEDRON_X, 0.0, -ICOSAHEDRON_Z],
    [ICOSAHEDRON_X, 0.0, -ICOSAHEDRON_Z],
    [0.0, ICOSAHEDRON_Z, ICOSAHEDRON_X],
    [0.0, ICOSAHEDRON_Z, -ICOSAHEDRON_X],
    [0.0, -ICOSAHEDRON_Z, ICOSAHEDRON_X],
    [0.0, -ICOSAHEDRON_Z, -ICOSAHEDRON_X],
    [ICOSAHEDRON_Z, ICOSAHEDRON_X, 0.0],
    [-ICOSAHEDRON_Z, ICOSAHEDRON_X, 0.0],
    [ICOSAHEDRON_Z, -ICOSAHEDRON_X, 0.0],
    [-ICOSAHEDRON_Z, -ICOSAHEDRON_X, 0.0],
];

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 4, 1],
    [0, 9, 4],
    [9, 5, 4],
    [4, 5, 8],
    [4, 8, 1],
    [8, 10, 1],
    [8, 3, 10],
    [5, 3, 8],
    [5, 2, 3],
    [2, 7, 3],
    [7, 10, 3],
    [7, 6, 10],
    [7, 11, 6],
    [11, 0, 6],
    [0, 1, 6],
    [6, 1, 10],
    [9, 0, 11],
    [9, 11, 2],
    [9, 2, 5],
    [7, 2, 11],
];

/// Closest surface along a ray, resolved to world space.
#[derive(Debug, Copy, Clone)]
pub struct SurfaceHit {
    pub index: usize,
    pub hit: Hit,
    pub point: Point3f,
    /// Unit normal facing the incoming ray.
    pub normal: Normal3f,
}

/// Flat list of primitives and lights. Shapes added together form a
/// mesh, identified by the range of primitive indices returned.
#[derive(Debug, Default, Clone)]
pub struct Scene {
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    /// The scene shown by the preview: a red cube, a mirror floor, and a
    /// glossy sphere and icosahedron under a warm spot light.
    pub fn showcase() -> Self {
        let mut scene = Scene::new();
        scene.add_spot_light(
            &Point3f::new(1.0, 10.0, 1.0),
            &Vector3f::new(0.0, -1.0, 0.0),
            Argb::rgb(1.0, 1.0, 0.7),
            100.0,
        );
        scene.add_global_light(Argb::WHITE, 0.15);

        let cube = scene.add_cube(&Point3f::new(-4.0, 3.0, 4.0), 2.0);
        scene.set_material(cube, &Material::diffuse(Argb::RED));

        let floor = scene.add_plane_xz(&Point3f::zero(), 20.0);
        scene.set_material(floor, &Material::reflective(Argb::BLACK, 1.0));

        let glossy = Material::reflective(Argb::rgb(0.5, 0.7, 0.84), 0.8);
        let sphere = scene.add_sphere(&Point3f::new(0.0, 2.0, 0.0), 1.7);
        scene.set_material(sphere, &glossy);
        let ico = scene.add_icosahedron(&Point3f::new(5.0, 3.0, -5.0), 2.0);
        scene.set_material(ico, &glossy);

        debug!(
            "showcase scene: {} primitives, {} lights",
            scene.primitives.len(),
            scene.lights.len()
        );
        scene
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn primitive(&self, index: usize) -> &Primitive {
        &self.primitives[index]
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add_spot_light(
        &mut self,
        position: &Point3f,
        direction: &Vector3f,
        color: Argb,
        intensity: Float,
    ) {
        self.add_light(Light::spot(*position, *direction, color, intensity));
    }

    pub fn add_parallel_light(&mut self, direction: &Vector3f, color: Argb, intensity: Float) {
        self.add_light(Light::parallel(*direction, color, intensity));
    }

    pub fn add_global_light(&mut self, color: Argb, intensity: Float) {
        self.add_light(Light::global(color, intensity));
    }

    pub fn add_triangle(&mut self, a: &Point3f, b: &Point3f, c: &Point3f) -> Range<usize> {
        let start = self.primitives.len();
        self.primitives.push(Primitive::new(Shape::Triangle {
            a: *a,
            b: *b,
            c: *c,
        }));
        start..self.primitives.len()
    }

    pub fn add_sphere(&mut self, center: &Point3f, radius: Float) -> Range<usize> {
        let start = self.primitives.len();
        self.primitives.push(Primitive::new(Shape::Sphere {
            center: *center,
            radius,
        }));
        start..self.primitives.len()
    }

    /// Square of side `size` in the XY plane, rotated by `euler` (radians)
    /// and moved to `center`.
    pub fn add_plane(&mut self, center: &Point3f, size: Float, euler: &Vector3f) -> Range<usize> {
        let h = size * 0.5;
        let corners = [
            Point3f::new(-h, -h, 0.0),
            Point3f::new(h, -h, 0.0),
            Point3f::new(h, h, 0.0),
            Point3f::new(-h, h, 0.0),
        ]
        .map(|p| p.rotate(euler) + *center);
        let start = self.primitives.len();
        self.add_triangle(&corners[0], &corners[1], &corners[2]);
        self.add_triangle(&corners[0], &corners[2], &corners[3]);
        start..self.primitives.len()
    }

    /// Horizontal square, facing up.
    pub fn add_plane_xz(&mut self, center: &Point3f, size: Float) -> Range<usize> {
        self.add_plane(center, size, &Vector3f::new(-PI_OVER_2, 0.0, 0.0))
    }

    /// Axis aligned cube with edge length `size`.
    pub fn add_cube(&mut self, center: &Point3f, size: Float) -> Range<usize> {
        let h = size * 0.5;
        let rotations = [
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, PI_OVER_2, 0.0),
            Vector3f::new(0.0, PI, 0.0),
            Vector3f::new(0.0, -PI_OVER_2, 0.0),
            Vector3f::new(-PI_OVER_2, 0.0, 0.0),
            Vector3f::new(PI_OVER_2, 0.0, 0.0),
        ];
        let start = self.primitives.len();
        for euler in rotations.iter() {
            let face_center = Vector3f::new(0.0, 0.0, h).rotate(euler) + *center;
            self.add_plane(&face_center, size, euler);
        }
        start..self.primitives.len()
    }

    /// Regular icosahedron whose vertices lie at distance `size / 2` from `center`.
    pub fn add_icosahedron(&mut self, center: &Point3f, size: Float) -> Range<usize> {
        let r = size * 0.5;
        let v: Vec<Point3f> = ICOSAHEDRON_VERTICES
            .iter()
            .map(|p| Point3f::from(*p) * r + *center)
            .collect();
        let start = self.primitives.len();
        for f in ICOSAHEDRON_FACES.iter() {
            self.add_triangle(&v[f[0]], &v[f[1]], &v[f[2]]);
        }
        start..self.primitives.len()
    }

    pub fn set_material(&mut self, mesh: Range<usize>, material: &Material) {
        for p in self.primitives[mesh].iter_mut() {
            p.material = *material;
        }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let mut closest: Option<(usize, Hit)> = None;
        for (i, p) in self.primitives.iter().enumerate() {
            if let Some(hit) = p.intersect(ray) {
                if closest.map_or(true, |(_, c)| hit.t < c.t) {
                    closest = Some((i, hit));
                }
            }
        }
        closest.map(|(index, hit)| {
            let point = ray.at(hit.t);
            let mut normal = self.primitives[index].normal_at(&point);
            if normal.dot(&ray.d) > 0.0 {
                normal = -normal;
            }
            SurfaceHit {
                index,
                hit,
                point,
                normal,
            }
        })
    }

    /// True when something lies on `ray` closer than `max_t`.
    pub fn occluded(&self, ray: &Ray, max_t: Float) -> bool {
        self.primitives
            .iter()
            .filter_map(|p| p.intersect(ray))
            .any(|hit| hit.t < max_t)
    }
}
