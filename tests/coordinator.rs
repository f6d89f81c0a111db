mod common;

use common::*;
use livetrace::core::prelude::*;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn coordinator() -> (RequestCoordinator, Arc<GatedEngine>, Gate) {
    let (engine, gate) = GatedEngine::new(Argb::gray(0.5));
    let coordinator = RequestCoordinator::new(engine.clone());
    (coordinator, engine, gate)
}

#[test]
fn test_idle_request_starts_render() {
    let (coordinator, engine, gate) = coordinator();
    assert_eq!(coordinator.state(), CoordinatorState::Idle);

    let config = small_config(8, 4);
    let outcome = coordinator.request_render(config).unwrap();
    assert_eq!(outcome, RequestOutcome::Started { generation: 1 });
    assert_eq!(gate.started(), config);
    assert_eq!(coordinator.state(), CoordinatorState::Rendering);
    assert!(coordinator.is_rendering());
    assert!(coordinator.pending_config().is_none());

    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    assert_eq!(coordinator.completed_renders(), 1);
    assert_eq!(engine.calls(), vec![config]);
    assert!(matches!(coordinator.last_outcome(), Some(Ok(_))));
    coordinator.shutdown(TIMEOUT).unwrap();
}

#[test]
fn test_second_request_runs_after_first() {
    let (coordinator, engine, gate) = coordinator();
    let config1 = small_config(8, 4);
    let config2 = config1.with_mode(RenderMode::Depths);

    coordinator.request_render(config1).unwrap();
    assert_eq!(gate.started(), config1);
    let outcome = coordinator.request_render(config2).unwrap();
    assert_eq!(outcome, RequestOutcome::Scheduled);
    assert_eq!(coordinator.state(), CoordinatorState::RenderingWithPending);
    assert_eq!(coordinator.pending_config(), Some(config2));

    gate.release(Step::Finish);
    assert_eq!(gate.started(), config2);
    assert_eq!(coordinator.state(), CoordinatorState::Rendering);
    assert!(coordinator.pending_config().is_none());

    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    assert_eq!(engine.calls(), vec![config1, config2]);
    assert_eq!(coordinator.generation(), 2);
    coordinator.shutdown(TIMEOUT).unwrap();
}

#[test]
fn test_requests_during_render_coalesce_to_last() {
    let (coordinator, engine, gate) = coordinator();
    let first = small_config(8, 4);
    coordinator.request_render(first).unwrap();
    gate.started();

    let mut last = first;
    for samples in 2..=6 {
        last = first.with_samples(samples);
        let outcome = coordinator.request_render(last).unwrap();
        if samples == 2 {
            assert_eq!(outcome, RequestOutcome::Scheduled);
        } else {
            assert_eq!(outcome, RequestOutcome::Coalesced);
        }
        assert_eq!(coordinator.pending_config(), Some(last));
    }

    gate.release(Step::Finish);
    assert_eq!(gate.started(), last);
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    gate.assert_not_started(Duration::from_millis(50));
    assert_eq!(engine.calls(), vec![first, last]);
    assert_eq!(coordinator.completed_renders(), 2);
}

#[test]
fn test_concurrent_requests_run_one_extra_render() {
    let (coordinator, engine, gate) = coordinator();
    let first = small_config(8, 4);
    coordinator.request_render(first).unwrap();
    gate.started();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let c = coordinator.clone();
            thread::spawn(move || c.request_render(first.with_samples(10 + i)).unwrap())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let pending = coordinator.pending_config().unwrap();

    gate.release(Step::Finish);
    assert_eq!(gate.started(), pending);
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    assert_eq!(engine.calls().len(), 2);
}

#[test]
fn test_engine_failure_returns_to_idle() {
    let (coordinator, _engine, gate) = coordinator();
    coordinator.request_render(small_config(4, 4)).unwrap();
    gate.started();
    gate.release(Step::Fail);
    assert!(coordinator.wait_idle(TIMEOUT));
    let err = coordinator.last_outcome().unwrap().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Engine);

    // The coordinator accepts work again.
    let outcome = coordinator.request_render(small_config(4, 4)).unwrap();
    assert_eq!(outcome, RequestOutcome::Started { generation: 2 });
    gate.started();
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    assert!(matches!(coordinator.last_outcome(), Some(Ok(_))));
}

#[test]
fn test_engine_panic_returns_to_idle() {
    let (coordinator, _engine, gate) = coordinator();
    coordinator.request_render(small_config(4, 4)).unwrap();
    gate.started();
    gate.release(Step::Panic);
    assert!(coordinator.wait_idle(TIMEOUT));
    let err = coordinator.last_outcome().unwrap().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Engine);
    assert!(err.msg.contains("boom"), "{}", err.msg);
    coordinator.shutdown(TIMEOUT).unwrap();
}

#[test]
fn test_failure_still_runs_pending() {
    let (coordinator, engine, gate) = coordinator();
    let first = small_config(4, 4);
    let second = first.with_samples(3);
    coordinator.request_render(first).unwrap();
    gate.started();
    coordinator.request_render(second).unwrap();
    gate.release(Step::Fail);
    assert_eq!(gate.started(), second);
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    assert_eq!(engine.calls(), vec![first, second]);
}

#[test]
fn test_invalid_config_is_rejected() {
    let (coordinator, engine, gate) = coordinator();
    let err = coordinator
        .request_render(small_config(0, 4))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    assert_eq!(coordinator.generation(), 0);

    // Rejected while rendering too, leaving nothing pending.
    coordinator.request_render(small_config(4, 4)).unwrap();
    gate.started();
    let bad = small_config(4, 4).with_zoom(0.0);
    assert!(coordinator.request_render(bad).is_err());
    assert!(coordinator.pending_config().is_none());
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    assert_eq!(engine.calls().len(), 1);
}

#[test]
fn test_frame_follows_resolution() {
    let (coordinator, _engine, gate) = coordinator();
    coordinator.request_render(small_config(8, 4)).unwrap();
    gate.started();
    let frame_a = coordinator.frame();
    assert_eq!(frame_a.resolution(), [8, 4]);
    assert_eq!(frame_a.get(0), Argb::gray(0.5));
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));

    // Same resolution reuses the buffer.
    coordinator
        .request_render(small_config(8, 4).with_samples(2))
        .unwrap();
    gate.started();
    assert!(Arc::ptr_eq(&frame_a, &coordinator.frame()));
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));

    coordinator.request_render(small_config(16, 2)).unwrap();
    gate.started();
    let frame_b = coordinator.frame();
    assert_eq!(frame_b.resolution(), [16, 2]);
    assert_eq!(frame_b.len(), 32);
    assert!(!Arc::ptr_eq(&frame_a, &frame_b));
    // The old buffer is still valid for anyone holding it.
    assert_eq!(frame_a.len(), 32);
    assert_eq!(frame_a.get(0), Argb::gray(0.5));
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
}

#[test]
fn test_events() {
    let (coordinator, _engine, gate) = coordinator();
    let events = coordinator.subscribe();
    let config = small_config(4, 4);
    coordinator.request_render(config).unwrap();
    gate.started();
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));

    match events.recv_timeout(TIMEOUT).unwrap() {
        CoordinatorEvent::Started { generation, config: c } => {
            assert_eq!(generation, 1);
            assert_eq!(c, config);
        }
        e => panic!("unexpected {:?}", e),
    }
    match events.recv_timeout(TIMEOUT).unwrap() {
        CoordinatorEvent::Finished { generation, outcome } => {
            assert_eq!(generation, 1);
            assert!(outcome.is_ok());
        }
        e => panic!("unexpected {:?}", e),
    }
    assert!(matches!(
        events.recv_timeout(TIMEOUT).unwrap(),
        CoordinatorEvent::Idle
    ));
}

#[test]
fn test_wait_idle_times_out_while_rendering() {
    let (coordinator, _engine, gate) = coordinator();
    coordinator.request_render(small_config(4, 4)).unwrap();
    gate.started();
    assert!(!coordinator.wait_idle(Duration::from_millis(20)));
    assert_eq!(coordinator.progress().get(), 0.5);
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    assert_eq!(coordinator.progress().get(), 1.0);
}
