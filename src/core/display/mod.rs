pub mod display;
pub mod multiple_display;

pub use display::*;
pub use multiple_display::*;
