pub mod preview_options;

pub use preview_options::*;
