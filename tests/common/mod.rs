#![allow(dead_code)]

use livetrace::core::prelude::*;

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(10);

/// How a gated render ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Finish,
    Fail,
    Panic,
}

/// Engine whose renders block until the test releases them.
pub struct GatedEngine {
    fill: Argb,
    calls: Mutex<Vec<RenderConfig>>,
    started: Mutex<Sender<RenderConfig>>,
    gate: Mutex<Receiver<Step>>,
}

/// Test side of a `GatedEngine`.
pub struct Gate {
    started: Receiver<RenderConfig>,
    release: Sender<Step>,
}

impl GatedEngine {
    pub fn new(fill: Argb) -> (Arc<GatedEngine>, Gate) {
        let (started_tx, started_rx) = channel();
        let (release_tx, release_rx) = channel();
        let engine = GatedEngine {
            fill,
            calls: Mutex::new(Vec::new()),
            started: Mutex::new(started_tx),
            gate: Mutex::new(release_rx),
        };
        let gate = Gate {
            started: started_rx,
            release: release_tx,
        };
        (Arc::new(engine), gate)
    }

    pub fn calls(&self) -> Vec<RenderConfig> {
        self.calls.lock().unwrap().clone()
    }
}

impl RenderEngine for GatedEngine {
    fn name(&self) -> &str {
        "gated"
    }

    fn render(
        &self,
        config: &RenderConfig,
        buffer: &FrameAccumulator,
        progress: &ProgressChannel,
    ) -> RenderOutcome {
        check_buffer(config, buffer)?;
        self.calls.lock().unwrap().push(*config);
        buffer.fill(&self.fill);
        progress.set(0.5);
        let _ = self.started.lock().unwrap().send(*config);

        let step = self.gate.lock().unwrap().recv().unwrap_or(Step::Finish);
        match step {
            Step::Finish => {
                progress.set(1.0);
                Ok(RenderStats {
                    elapsed: Duration::from_millis(1),
                    pixel_samples: config.pixel_count() as u64,
                })
            }
            Step::Fail => Err(PreviewError::engine("gated failure")),
            Step::Panic => panic!("boom"),
        }
    }
}

impl Gate {
    /// Waits for the engine to begin a render and returns its config.
    pub fn started(&self) -> RenderConfig {
        self.started
            .recv_timeout(TIMEOUT)
            .expect("engine did not start")
    }

    pub fn assert_not_started(&self, wait: Duration) {
        match self.started.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {}
            other => panic!("unexpected render start: {:?}", other),
        }
    }

    pub fn release(&self, step: Step) {
        self.release.send(step).unwrap();
    }
}

pub fn small_config(width: usize, height: usize) -> RenderConfig {
    RenderConfig::default()
        .with_resolution(width, height)
        .with_samples(1)
        .with_subpixels(1)
        .with_max_iterations(2)
}
