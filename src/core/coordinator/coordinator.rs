use super::state::*;
use crate::core::config::*;
use crate::core::engine::*;
use crate::core::error::*;
use crate::core::film::*;
use crate::core::progress::*;

use log::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

struct Schedule {
    phase: Phase,
    /// Invocations started so far; the running one has this number.
    generation: u64,
    completed: u64,
    last_outcome: Option<RenderOutcome>,
    worker: Option<JoinHandle<()>>,
    listeners: Vec<Sender<CoordinatorEvent>>,
}

impl Schedule {
    fn emit(&mut self, event: CoordinatorEvent) {
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

struct Shared {
    engine: Arc<dyn RenderEngine>,
    schedule: Mutex<Schedule>,
    idle: Condvar,
    frame: RwLock<Arc<FrameAccumulator>>,
    progress: Arc<ProgressChannel>,
}

/// Serialises render requests so that at most one engine invocation runs
/// at a time, and coalesces requests that arrive while it runs.
///
/// Every state read and write goes through one mutex. `request_render`
/// only touches that state and possibly spawns the worker thread; it never
/// waits for a render. The worker runs the engine outside the lock and
/// then, under the lock, either restarts with the newest pending config or
/// goes idle.
#[derive(Clone)]
pub struct RequestCoordinator {
    shared: Arc<Shared>,
}

impl RequestCoordinator {
    pub fn new(engine: Arc<dyn RenderEngine>) -> Self {
        let shared = Shared {
            engine,
            schedule: Mutex::new(Schedule {
                phase: Phase::Idle,
                generation: 0,
                completed: 0,
                last_outcome: None,
                worker: None,
                listeners: Vec::new(),
            }),
            idle: Condvar::new(),
            frame: RwLock::new(Arc::new(FrameAccumulator::new(0, 0))),
            progress: Arc::new(ProgressChannel::new()),
        };
        RequestCoordinator {
            shared: Arc::new(shared),
        }
    }

    /// Asks for a render of `config`.
    ///
    /// An invalid config is rejected here and never scheduled. Otherwise
    /// the request starts a render when idle, or replaces whatever was
    /// pending when a render is already running.
    pub fn request_render(&self, config: RenderConfig) -> Result<RequestOutcome, PreviewError> {
        config.validate()?;

        let mut schedule = self.shared.lock_schedule();
        match schedule.phase.state() {
            CoordinatorState::Idle => {
                schedule.phase = Phase::Rendering;
                schedule.generation += 1;
                let generation = schedule.generation;

                let shared = Arc::clone(&self.shared);
                let spawned = thread::Builder::new()
                    .name("render-worker".to_string())
                    .spawn(move || Shared::worker_loop(shared, config, generation));
                match spawned {
                    Ok(handle) => {
                        // The previous worker already left its loop under this lock.
                        schedule.worker = Some(handle);
                    }
                    Err(e) => {
                        schedule.phase = Phase::Idle;
                        schedule.generation -= 1;
                        error!("failed to spawn render worker: {}", e);
                        return Err(PreviewError::from(e));
                    }
                }
                debug!("idle -> rendering (generation {})", generation);
                schedule.emit(CoordinatorEvent::Started { generation, config });
                Ok(RequestOutcome::Started { generation })
            }
            CoordinatorState::Rendering => {
                schedule.phase = Phase::RenderingWithPending(config);
                debug!("rendering -> rendering with pending");
                Ok(RequestOutcome::Scheduled)
            }
            CoordinatorState::RenderingWithPending => {
                schedule.phase = Phase::RenderingWithPending(config);
                debug!("pending request superseded");
                Ok(RequestOutcome::Coalesced)
            }
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.shared.lock_schedule().phase.state()
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        let schedule = self.shared.lock_schedule();
        CoordinatorSnapshot {
            state: schedule.phase.state(),
            generation: schedule.generation,
            completed: schedule.completed,
        }
    }

    /// The config that will run next, if a request is waiting.
    pub fn pending_config(&self) -> Option<RenderConfig> {
        match &self.shared.lock_schedule().phase {
            Phase::RenderingWithPending(config) => Some(*config),
            _ => None,
        }
    }

    pub fn is_rendering(&self) -> bool {
        self.state() != CoordinatorState::Idle
    }

    /// Number of engine invocations started so far.
    pub fn generation(&self) -> u64 {
        self.shared.lock_schedule().generation
    }

    pub fn completed_renders(&self) -> u64 {
        self.shared.lock_schedule().completed
    }

    pub fn last_outcome(&self) -> Option<RenderOutcome> {
        self.shared.lock_schedule().last_outcome.clone()
    }

    /// Buffer of the current (or most recent) render.
    pub fn frame(&self) -> Arc<FrameAccumulator> {
        let frame = match self.shared.frame.read() {
            Ok(frame) => frame,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(&frame)
    }

    pub fn progress(&self) -> Arc<ProgressChannel> {
        Arc::clone(&self.shared.progress)
    }

    pub fn engine(&self) -> Arc<dyn RenderEngine> {
        Arc::clone(&self.shared.engine)
    }

    pub fn subscribe(&self) -> Receiver<CoordinatorEvent> {
        let (tx, rx) = channel();
        self.shared.lock_schedule().listeners.push(tx);
        rx
    }

    /// Blocks until no render is running or pending. Returns false on timeout.
    ///
    /// Not for use on the display/event thread.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut schedule = self.shared.lock_schedule();
        loop {
            if let Phase::Idle = schedule.phase {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            schedule = match self.shared.idle.wait_timeout(schedule, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Waits for the coordinator to go idle and joins the worker thread.
    pub fn shutdown(&self, timeout: Duration) -> Result<(), PreviewError> {
        if !self.wait_idle(timeout) {
            return Err(PreviewError::engine("render still running at shutdown"));
        }
        let worker = self.shared.lock_schedule().worker.take();
        if let Some(handle) = worker {
            if handle.join().is_err() {
                return Err(PreviewError::engine("render worker panicked"));
            }
        }
        info!("coordinator shut down");
        Ok(())
    }
}

impl Shared {
    fn lock_schedule(&self) -> MutexGuard<'_, Schedule> {
        match self.schedule.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn worker_loop(shared: Arc<Shared>, config: RenderConfig, generation: u64) {
        let mut next = Some((config, generation));
        while let Some((config, generation)) = next {
            let outcome = shared.invoke_engine(&config, generation);
            next = shared.on_engine_complete(generation, outcome);
        }
    }

    /// Completion transition. Runs whether the engine succeeded or failed.
    fn on_engine_complete(
        &self,
        generation: u64,
        outcome: RenderOutcome,
    ) -> Option<(RenderConfig, u64)> {
        let mut schedule = self.lock_schedule();
        schedule.completed += 1;
        schedule.last_outcome = Some(outcome.clone());
        schedule.emit(CoordinatorEvent::Finished {
            generation,
            outcome,
        });

        match std::mem::replace(&mut schedule.phase, Phase::Idle) {
            Phase::RenderingWithPending(config) => {
                schedule.phase = Phase::Rendering;
                schedule.generation += 1;
                let generation = schedule.generation;
                debug!("restarting with pending config (generation {})", generation);
                schedule.emit(CoordinatorEvent::Started { generation, config });
                Some((config, generation))
            }
            Phase::Rendering => {
                debug!("rendering -> idle");
                schedule.emit(CoordinatorEvent::Idle);
                self.idle.notify_all();
                None
            }
            Phase::Idle => {
                error!("render completed while the coordinator was idle");
                self.idle.notify_all();
                None
            }
        }
    }

    /// Makes sure the frame fits `config`. Only called from the worker
    /// between two engine invocations. The new buffer is allocated before
    /// the lock is taken; readers only wait for the swap.
    fn prepare_frame(&self, config: &RenderConfig) -> Arc<FrameAccumulator> {
        let current = {
            let frame = match self.frame.read() {
                Ok(frame) => frame,
                Err(poisoned) => poisoned.into_inner(),
            };
            Arc::clone(&frame)
        };
        if current.matches(config) {
            return current;
        }
        info!(
            "reallocating frame {}x{} -> {}x{}",
            current.width(),
            current.height(),
            config.horizontal_resolution,
            config.vertical_resolution
        );
        let fresh = Arc::new(FrameAccumulator::for_config(config));
        let mut frame = match self.frame.write() {
            Ok(frame) => frame,
            Err(poisoned) => poisoned.into_inner(),
        };
        *frame = Arc::clone(&fresh);
        fresh
    }

    fn invoke_engine(&self, config: &RenderConfig, generation: u64) -> RenderOutcome {
        let frame = self.prepare_frame(config);
        self.progress.reset();
        info!(
            "render {} started: {}x{} {} ({} samples x {}^2 subpixels, depth {})",
            generation,
            config.horizontal_resolution,
            config.vertical_resolution,
            config.mode,
            config.samples_per_subpixel,
            config.subpixels_per_pixel,
            config.maximum_iteration_count
        );

        let engine = self.engine.as_ref();
        let progress = self.progress.as_ref();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            engine.render(config, &frame, progress)
        }));
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(payload) => {
                let msg = format!("{} panicked: {}", engine.name(), panic_message(&*payload));
                Err(PreviewError::engine(&msg))
            }
        };

        match &outcome {
            Ok(stats) => info!(
                "render {} finished in {:.3}ms",
                generation,
                stats.elapsed.as_secs_f64() * 1000.0
            ),
            Err(e) => error!("render {} failed: {}", generation, e),
        }
        outcome
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return s.to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    String::from("unknown panic")
}
