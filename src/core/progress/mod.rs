pub mod progress_channel;
pub mod progressreporter;

pub use progress_channel::*;
pub use progressreporter::*;
