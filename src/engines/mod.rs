pub mod raytracer;
