pub mod latest;
pub mod sequential;
pub mod tev;

pub use latest::*;
pub use sequential::*;
pub use tev::*;
