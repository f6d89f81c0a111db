/// Scalar used for geometry and HDR channel values.
pub type Float = f64;
