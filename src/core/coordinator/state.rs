use crate::core::config::*;
use crate::core::engine::*;

use std::fmt;

/// Observable scheduling state.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum CoordinatorState {
    Idle,
    Rendering,
    RenderingWithPending,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CoordinatorState::Idle => "idle",
            CoordinatorState::Rendering => "rendering",
            CoordinatorState::RenderingWithPending => "rendering (pending)",
        };
        write!(f, "{}", s)
    }
}

/// Internal phase. The pending configuration lives inside the variant, so
/// "pending" and "which config" can only ever change together.
#[derive(Debug, Clone)]
pub(crate) enum Phase {
    Idle,
    Rendering,
    RenderingWithPending(RenderConfig),
}

impl Phase {
    pub(crate) fn state(&self) -> CoordinatorState {
        match self {
            Phase::Idle => CoordinatorState::Idle,
            Phase::Rendering => CoordinatorState::Rendering,
            Phase::RenderingWithPending(_) => CoordinatorState::RenderingWithPending,
        }
    }
}

/// What `request_render` did with a request.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum RequestOutcome {
    /// The coordinator was idle; a render with this config has started.
    Started { generation: u64 },
    /// A render is running; this config will run when it finishes.
    Scheduled,
    /// A render is running and another request was already waiting; that
    /// request was discarded in favour of this one.
    Coalesced,
}

/// Notifications delivered to subscribers.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    Started {
        generation: u64,
        config: RenderConfig,
    },
    Finished {
        generation: u64,
        outcome: RenderOutcome,
    },
    /// No render is running and none is pending.
    Idle,
}

/// State and counters read under a single lock acquisition.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct CoordinatorSnapshot {
    pub state: CoordinatorState,
    pub generation: u64,
    pub completed: u64,
}
