mod camera;
mod light;
mod material;
mod primitive;
mod ray;
mod ray_tracer;
mod scene;

pub use camera::*;
pub use light::*;
pub use material::*;
pub use primitive::*;
pub use ray::*;
pub use ray_tracer::*;
pub use scene::*;
