//! Live preview for a long running ray tracing engine.
//!
//! A [`core::coordinator::RequestCoordinator`] runs at most one render at a
//! time and coalesces requests that arrive meanwhile; a
//! [`core::compositor::Compositor`] periodically tone maps the shared HDR
//! frame into 8-bit images for a display sink.

pub mod core;
pub mod displays;
pub mod engines;
