mod latest_image;

pub use latest_image::*;
