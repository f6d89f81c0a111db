use super::tone_map::*;
use crate::core::coordinator::*;
use crate::core::display::*;
use crate::core::error::*;
use crate::core::imageio::*;

use log::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Composites the finished frame, hands it to `sink` and writes it to `path`.
///
/// Meant to run once the coordinator is idle, when the frame no longer
/// changes.
pub fn save_final_image(
    coordinator: &RequestCoordinator,
    sink: &dyn DisplaySink,
    path: &Path,
) -> Result<Arc<DisplayableImage>, PreviewError> {
    let frame = coordinator.frame();
    if frame.is_empty() {
        return Err(PreviewError::error("nothing rendered yet"));
    }
    let image = Arc::new(composite(&frame)?);
    sink.publish(Arc::clone(&image))?;
    write_image(path, &image)?;
    Ok(image)
}

/// Listens for the coordinator going idle and saves the finished image
/// each time. Stops and joins when dropped; idle events received before
/// that are still handled.
pub struct IdleSaver {
    stop: Arc<AtomicBool>,
    saved: Arc<AtomicU64>,
    thread_handle: Option<JoinHandle<()>>,
}

impl IdleSaver {
    pub fn spawn(
        coordinator: RequestCoordinator,
        sink: Arc<dyn DisplaySink>,
        path: PathBuf,
    ) -> Result<Self, PreviewError> {
        let stop = Arc::new(AtomicBool::new(false));
        let saved = Arc::new(AtomicU64::new(0));
        let events = coordinator.subscribe();

        let thread_stop = Arc::clone(&stop);
        let thread_saved = Arc::clone(&saved);
        let thread_handle = thread::Builder::new()
            .name("idle-saver".to_string())
            .spawn(move || {
                let save = || match save_final_image(&coordinator, sink.as_ref(), &path) {
                    Ok(_) => {
                        thread_saved.fetch_add(1, Ordering::Release);
                    }
                    Err(e) => warn!("saving {}: {}", path.display(), e),
                };
                IdleSaver::listen(&events, &thread_stop, save);
            })?;

        Ok(IdleSaver {
            stop,
            saved,
            thread_handle: Some(thread_handle),
        })
    }

    fn listen(events: &Receiver<CoordinatorEvent>, stop: &AtomicBool, save: impl Fn()) {
        while !stop.load(Ordering::Acquire) {
            match events.recv_timeout(POLL_INTERVAL) {
                Ok(CoordinatorEvent::Idle) => save(),
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
        for event in events.try_iter() {
            if let CoordinatorEvent::Idle = event {
                save();
            }
        }
    }

    /// Images written so far.
    pub fn images_saved(&self) -> u64 {
        self.saved.load(Ordering::Acquire)
    }

    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                error!("idle saver thread panicked: {:?}", e);
            }
        }
    }
}

impl Drop for IdleSaver {
    fn drop(&mut self) {
        self.halt();
    }
}
