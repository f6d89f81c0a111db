use super::camera::*;
use super::ray::*;
use super::scene::*;
use crate::core::base::*;
use crate::core::config::*;
use crate::core::engine::*;
use crate::core::film::*;
use crate::core::geometry::*;
use crate::core::progress::*;
use crate::core::rng::*;
use crate::core::spectrum::*;

use log::*;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub const BLOCK_SIZE: usize = 128;

/// Result of following one camera ray through the scene.
#[derive(Debug, Copy, Clone)]
struct Trace {
    first: Option<SurfaceHit>,
    color: Argb,
    /// Rays cast, including the camera ray and every reflection.
    iterations: usize,
}

/// Whitted style CPU ray tracer over a fixed scene.
///
/// The frame is processed in 128x128 blocks, one after another; pixels of
/// a block are traced in parallel. Each pixel is written after every
/// sample so the preview sees it converge.
#[derive(Debug)]
pub struct RayTracer {
    scene: Scene,
    seed: AtomicU64,
}

impl Default for RayTracer {
    fn default() -> Self {
        RayTracer::new()
    }
}

impl RayTracer {
    /// Engine over the showcase scene.
    pub fn new() -> Self {
        RayTracer::with_scene(Scene::showcase())
    }

    pub fn with_scene(scene: Scene) -> Self {
        RayTracer {
            scene,
            seed: AtomicU64::new(0),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn trace(&self, config: &RenderConfig, ray: &Ray, shade: bool) -> Trace {
        match self.scene.intersect(ray) {
            Some(surface) => {
                let (color, iterations) = self.follow(config, ray, &surface, shade);
                Trace {
                    first: Some(surface),
                    color,
                    iterations,
                }
            }
            None => Trace {
                first: None,
                color: config.background_color,
                iterations: 1,
            },
        }
    }

    fn follow(
        &self,
        config: &RenderConfig,
        ray: &Ray,
        surface: &SurfaceHit,
        shade: bool,
    ) -> (Argb, usize) {
        let material = &self.scene.primitive(surface.index).material;
        let local = if shade {
            self.shade(ray, surface)
        } else {
            Argb::TRANSPARENT
        };
        if !material.is_reflective() || ray.depth + 1 >= config.maximum_iteration_count {
            return (local, 1);
        }

        let reflected = ray.spawn(surface.hit.t, &ray.d.reflect(&surface.normal));
        let (color, iterations) = match self.scene.intersect(&reflected) {
            Some(next) => self.follow(config, &reflected, &next, shade),
            None => (config.background_color, 1),
        };
        let k = material.reflectiveness;
        (local * (1.0 - k) + color * k, iterations + 1)
    }

    fn shade(&self, ray: &Ray, surface: &SurfaceHit) -> Argb {
        let material = &self.scene.primitive(surface.index).material;
        let p = surface.point;
        let n = surface.normal;
        let mut c = material.emissive_color;
        for light in self.scene.lights() {
            let (wi, dist) = match light.incidence(&p) {
                Some(v) => v,
                None => {
                    c += material.diffuse_color * light.color * light.intensity;
                    continue;
                }
            };
            let cos_theta = n.dot(&wi);
            if cos_theta <= 0.0 {
                continue;
            }
            let scale = light.attenuation(&wi, dist);
            if scale <= 0.0 {
                continue;
            }
            let shadow = Ray::new(&(p + n * SHADOW_EPSILON), &wi, ray.depth + 1);
            if self.scene.occluded(&shadow, dist) {
                continue;
            }
            c += material.diffuse_color * light.color * (cos_theta * scale);
            if material.specularity > 0.0 {
                let h = (wi - ray.d).normalize();
                let s = Float::max(n.dot(&h), 0.0).powf(material.specular_exponent);
                c += material.specular_color * light.color * (s * material.specularity * scale);
            }
        }
        Argb::new(1.0, c.r, c.g, c.b)
    }

    /// Colour of one subpixel sample for the configured mode.
    fn sample(&self, config: &RenderConfig, camera: &Camera, x: Float, y: Float) -> Argb {
        let start = Instant::now();
        let mode = config.mode;
        let shade = matches!(mode, RenderMode::Colors | RenderMode::RenderTime);
        let ray = camera.generate_ray(x, y);
        let trace = self.trace(config, &ray, shade);

        match mode {
            RenderMode::Colors => trace.color,
            RenderMode::RayDirection => Argb::from((ray.d + Vector3f::new(1.0, 1.0, 1.0)) * 0.5),
            RenderMode::Iterations => {
                let max = config.maximum_iteration_count.max(1) as Float;
                Argb::gray(1.0 - trace.iterations as Float / max)
            }
            RenderMode::RenderTime => {
                let micros = Float::max(start.elapsed().as_secs_f64() * 1e6, 1.0);
                Argb::gray(micros.log10() * RENDER_TIME_SCALE)
            }
            _ => match &trace.first {
                Some(surface) => self.surface_channel(mode, &ray, surface),
                None => config.background_color,
            },
        }
    }

    fn surface_channel(&self, mode: RenderMode, ray: &Ray, surface: &SurfaceHit) -> Argb {
        let Hit { t, u, v, .. } = surface.hit;
        let is_triangle = self.scene.primitive(surface.index).is_triangle();
        match mode {
            RenderMode::Depths => Argb::gray(1.0 / (1.0 + 0.1 * t)),
            RenderMode::UvCoords => Argb::rgb(u, v, 1.0 - u - v),
            RenderMode::SurfaceNormals => {
                Argb::from((surface.normal + Vector3f::new(1.0, 1.0, 1.0)) * 0.5)
            }
            RenderMode::RayIncidenceAngle => {
                let angle = (-ray.d).angle_to(&surface.normal);
                Argb::gray(1.0 - (angle / PI_OVER_2).abs())
            }
            RenderMode::Wireframe => {
                let on_edge = if is_triangle {
                    Float::min(Float::min(u, v), 1.0 - u - v) <= 0.01
                } else {
                    (u * 24.0).fract() < 0.04 || (v * 12.0).fract() < 0.04
                };
                if on_edge {
                    Argb::rgb(u, v, 1.0 - u - v)
                } else {
                    Argb::BLACK
                }
            }
            _ => Argb::TRANSPARENT,
        }
    }
}

impl RenderEngine for RayTracer {
    fn name(&self) -> &str {
        "raytracer"
    }

    fn render(
        &self,
        config: &RenderConfig,
        buffer: &FrameAccumulator,
        progress: &ProgressChannel,
    ) -> RenderOutcome {
        config.validate()?;
        check_buffer(config, buffer)?;
        let start = Instant::now();

        let width = config.horizontal_resolution;
        let height = config.vertical_resolution;
        let sub = config.subpixels_per_pixel;
        let samples = config.samples_per_subpixel;
        let total = (width * height * samples) as u64;
        let seed = self.seed.fetch_add(1, Ordering::Relaxed);
        let camera = Camera::new(&config.camera, width, height);
        let done = AtomicU64::new(0);

        let cell_w = 2.0 / (width * sub) as Float;
        let cell_h = 2.0 / (height * sub) as Float;
        let norm = 1.0 / (sub * sub * samples) as Float;

        let nx = width.div_ceil(BLOCK_SIZE);
        let ny = height.div_ceil(BLOCK_SIZE);
        debug!("{}: {} blocks, {} pixel samples", self.name(), nx * ny, total);

        for by in 0..ny {
            for bx in 0..nx {
                let x0 = bx * BLOCK_SIZE;
                let y0 = by * BLOCK_SIZE;
                let bw = usize::min(BLOCK_SIZE, width - x0);
                let bh = usize::min(BLOCK_SIZE, height - y0);
                (0..(bw * bh)).into_par_iter().for_each(|i| {
                    let x = x0 + i % bw;
                    let y = y0 + i / bw;
                    let index = buffer.index(x, y);
                    let mut rng = RNG::for_pixel(x, y, seed);
                    let left = -1.0 + 2.0 * x as Float / width as Float;
                    let top = 1.0 - 2.0 * y as Float / height as Float;
                    for s in 0..samples {
                        let mut total_color = Argb::TRANSPARENT;
                        for sy in 0..sub {
                            for sx in 0..sub {
                                let px = left + (sx as Float + rng.uniform_float()) * cell_w;
                                let py = top - (sy as Float + rng.uniform_float()) * cell_h;
                                total_color += self.sample(config, &camera, px, py);
                            }
                        }
                        let value = total_color * norm;
                        if s == 0 {
                            buffer.set(index, &value);
                        } else {
                            buffer.add(index, &value);
                        }
                        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                        progress.set_counts(n, total);
                    }
                });
            }
        }

        progress.set(1.0);
        Ok(RenderStats {
            elapsed: start.elapsed(),
            pixel_samples: done.load(Ordering::Relaxed),
        })
    }
}
