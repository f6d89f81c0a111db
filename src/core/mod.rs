pub mod base;
pub mod compositor;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod engine;
pub mod error;
pub mod film;
pub mod geometry;
pub mod imageio;
pub mod options;
pub mod prelude;
pub mod progress;
pub mod rng;
pub mod spectrum;
