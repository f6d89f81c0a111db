pub mod frame_accumulator;

pub use frame_accumulator::FrameAccumulator;
