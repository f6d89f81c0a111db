pub mod write_image;

pub use write_image::*;
