pub use crate::core::base::*;
pub use crate::core::compositor::*;
pub use crate::core::config::*;
pub use crate::core::coordinator::*;
pub use crate::core::display::*;
pub use crate::core::engine::*;
pub use crate::core::error::*;
pub use crate::core::film::*;
pub use crate::core::geometry::*;
pub use crate::core::imageio::*;
pub use crate::core::options::*;
pub use crate::core::progress::*;
pub use crate::core::rng::*;
pub use crate::core::spectrum::*;
