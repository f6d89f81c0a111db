use super::tone_map::*;
use crate::core::coordinator::*;
use crate::core::display::*;
use crate::core::error::*;

use log::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Work done on a single compositor tick, independent of any timer.
pub struct CompositorTick {
    coordinator: RequestCoordinator,
    sink: Arc<dyn DisplaySink>,
    last_completed: u64,
}

impl CompositorTick {
    pub fn new(coordinator: RequestCoordinator, sink: Arc<dyn DisplaySink>) -> Self {
        let last_completed = coordinator.completed_renders();
        CompositorTick {
            coordinator,
            sink,
            last_completed,
        }
    }

    /// Composites and publishes when a render is active. One extra pass is
    /// made on the first tick after a render finished so the sink ends up
    /// with the complete frame. Returns whether an image was published.
    pub fn tick(&mut self) -> Result<bool, PreviewError> {
        let snapshot = self.coordinator.snapshot();
        let active = snapshot.state != CoordinatorState::Idle;
        if !active && snapshot.completed == self.last_completed {
            return Ok(false);
        }
        self.last_completed = snapshot.completed;

        let frame = self.coordinator.frame();
        if frame.is_empty() {
            return Ok(false);
        }
        let image = composite(&frame)?;
        self.sink.publish(Arc::new(image))?;
        Ok(true)
    }
}

/// Periodic task that turns the live frame into display images.
///
/// Runs on its own thread at a fixed cadence, not synchronised with render
/// completion. Stops and joins when dropped.
pub struct Compositor {
    stop: Arc<AtomicBool>,
    published: Arc<AtomicU64>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Compositor {
    pub fn spawn(
        coordinator: RequestCoordinator,
        sink: Arc<dyn DisplaySink>,
        cadence: Duration,
    ) -> Result<Self, PreviewError> {
        let stop = Arc::new(AtomicBool::new(false));
        let published = Arc::new(AtomicU64::new(0));
        let mut tick = CompositorTick::new(coordinator, sink);

        let thread_stop = Arc::clone(&stop);
        let thread_published = Arc::clone(&published);
        let thread_handle = thread::Builder::new()
            .name("compositor".to_string())
            .spawn(move || {
                info!("compositor started (cadence {:?})", cadence);
                let mut next_tick = Instant::now() + cadence;
                let mut failing = false;
                while !thread_stop.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if next_tick > now {
                        thread::sleep(next_tick - now);
                    }
                    // Missed ticks are dropped rather than replayed.
                    next_tick = Instant::max(next_tick + cadence, Instant::now());
                    if thread_stop.load(Ordering::Acquire) {
                        break;
                    }

                    let start = Instant::now();
                    match tick.tick() {
                        Ok(true) => {
                            thread_published.fetch_add(1, Ordering::Relaxed);
                            trace!("composited frame in {:?}", start.elapsed());
                            failing = false;
                        }
                        Ok(false) => {}
                        // Only the first of a run of failures is a warning.
                        Err(e) if failing => debug!("compositor: {}", e),
                        Err(e) => {
                            warn!("compositor: {}", e);
                            failing = true;
                        }
                    }
                }
                info!("compositor stopped");
            })?;

        Ok(Compositor {
            stop,
            published,
            thread_handle: Some(thread_handle),
        })
    }

    /// Images handed to the sink so far.
    pub fn frames_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                error!("compositor thread panicked: {:?}", e);
            }
        }
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        self.halt();
    }
}
