pub mod compositor;
pub mod idle_saver;
pub mod tone_map;

pub use compositor::*;
pub use idle_saver::*;
pub use tone_map::*;
