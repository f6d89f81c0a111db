mod ipc;
mod tev_display;

pub use ipc::*;
pub use tev_display::*;
