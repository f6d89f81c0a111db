use crate::core::config::*;
use crate::core::error::*;
use crate::core::film::*;
use crate::core::progress::*;

use std::time::Duration;

/// Completion statistics of one render invocation.
#[derive(Debug, Default, PartialEq, Copy, Clone)]
pub struct RenderStats {
    /// Wall clock time spent inside the engine.
    pub elapsed: Duration,
    /// Pixel samples written, `w * h * samples` for a full render.
    pub pixel_samples: u64,
}

pub type RenderOutcome = Result<RenderStats, PreviewError>;

/// A synchronous, long running computation that fills a frame.
///
/// The engine value itself is the persistent context: it is built once,
/// shared by every invocation, and released when the last handle is
/// dropped. `render` always runs on a worker thread and may use any
/// internal parallelism and write pixels in any order. `buffer` holds
/// exactly `config.pixel_count()` pixels.
pub trait RenderEngine: Send + Sync {
    fn name(&self) -> &str {
        "engine"
    }

    fn render(
        &self,
        config: &RenderConfig,
        buffer: &FrameAccumulator,
        progress: &ProgressChannel,
    ) -> RenderOutcome;
}

/// Precondition shared by engines: the buffer must match the requested resolution.
pub fn check_buffer(config: &RenderConfig, buffer: &FrameAccumulator) -> Result<(), PreviewError> {
    if !buffer.matches(config) {
        let msg = format!(
            "buffer is {}x{} but the render asks for {}x{}",
            buffer.width(),
            buffer.height(),
            config.horizontal_resolution,
            config.vertical_resolution
        );
        return Err(PreviewError::config(&msg));
    }
    Ok(())
}
