use super::types::Float;

pub const DOUBLE_ONE_MINUS_EPSILON: f64 = 0.99999999999999989;
pub const ONE_MINUS_EPSILON: Float = DOUBLE_ONE_MINUS_EPSILON;

pub const EPSILON: Float = 1e-6;
pub const SHADOW_EPSILON: Float = 0.0001;
pub const PI: Float = std::f64::consts::PI;
pub const PI_OVER_2: Float = PI / 2.0;

/// log10(µs) scale used by the render time visualisation.
pub const RENDER_TIME_SCALE: Float = 0.30293575075;

#[inline]
pub fn radians(deg: Float) -> Float {
    (PI / 180.0) * deg
}

#[inline]
pub fn degrees(rad: Float) -> Float {
    (180.0 / PI) * rad
}
