mod coordinator;
mod state;

pub use coordinator::*;
pub use state::{CoordinatorEvent, CoordinatorSnapshot, CoordinatorState, RequestOutcome};
