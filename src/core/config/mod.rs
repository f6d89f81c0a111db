pub mod quality;
pub mod render_config;
pub mod render_mode;

pub use quality::*;
pub use render_config::*;
pub use render_mode::*;
