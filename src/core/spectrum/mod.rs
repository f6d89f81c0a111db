pub mod argb;

pub use argb::*;
