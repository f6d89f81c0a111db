mod common;

use common::*;
use livetrace::core::prelude::*;
use livetrace::displays::LatestImage;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

#[test]
fn test_composite_row() {
    let frame = FrameAccumulator::from_pixels(
        4,
        1,
        &[
            Argb::new(1.0, 0.5, 0.5, 0.5),
            Argb::new(-1.0, 0.0, 0.0, 0.0),
            Argb::new(2.0, 1.0, 1.0, 1.0),
            Argb::new(Float::NAN, 0.25, 0.25, 0.25),
        ],
    )
    .unwrap();
    let image = composite(&frame).unwrap();
    assert_eq!(image.resolution(), [4, 1]);
    let a: Vec<u8> = (0..4).map(|i| image.channels(i)[0]).collect();
    let r: Vec<u8> = (0..4).map(|i| image.channels(i)[1]).collect();
    assert_eq!(a, vec![255, 0, 255, 0]);
    assert_eq!(r, vec![128, 0, 255, 64]);
    assert_eq!(image.pixel(0, 0), 0xFF808080);
    assert_eq!(image.pixel(3, 0), 0x00404040);
}

#[test]
fn test_composite_non_finite() {
    let frame = FrameAccumulator::from_pixels(
        2,
        1,
        &[
            Argb::new(Float::NAN, Float::INFINITY, Float::NEG_INFINITY, -1.0),
            Argb::new(1.0, 1.0, 1.0, 1.0),
        ],
    )
    .unwrap();
    let image = composite(&frame).unwrap();
    assert_eq!(image.pixels(), &[0x00000000, 0xFFFFFFFF]);
}

#[test]
fn test_composite_is_idempotent() {
    let frame = FrameAccumulator::new(300, 200);
    for i in 0..frame.len() {
        let v = (i % 97) as Float / 96.0;
        frame.set(i, &Argb::new(1.0, v, 1.0 - v, v * 0.5));
    }
    let first = composite(&frame).unwrap();
    let second = composite(&frame).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.pixel(0, 0), 0xFF00FF00);
}

#[test]
fn test_tick_publishes_only_with_work() {
    let (engine, gate) = GatedEngine::new(Argb::gray(0.5));
    let coordinator = RequestCoordinator::new(engine);
    let sink = Arc::new(LatestImage::new());
    let mut tick = CompositorTick::new(coordinator.clone(), sink.clone());

    // Idle with nothing rendered.
    assert!(!tick.tick().unwrap());
    assert_eq!(sink.publications(), 0);

    coordinator.request_render(small_config(4, 2)).unwrap();
    gate.started();
    assert!(tick.tick().unwrap());
    assert!(tick.tick().unwrap());
    let image = sink.latest().unwrap();
    assert_eq!(image.resolution(), [4, 2]);
    assert!(image.pixels().iter().all(|p| *p == 0xFF808080));

    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    // One flush after completion, then nothing until the next render.
    assert!(tick.tick().unwrap());
    assert!(!tick.tick().unwrap());
    assert_eq!(sink.publications(), 3);
}

#[test]
fn test_compositor_thread_publishes_during_render() {
    let (engine, gate) = GatedEngine::new(Argb::rgb(1.0, 0.0, 0.0));
    let coordinator = RequestCoordinator::new(engine);
    let sink = Arc::new(LatestImage::new());
    let compositor =
        Compositor::spawn(coordinator.clone(), sink.clone(), Duration::from_millis(1)).unwrap();

    coordinator.request_render(small_config(8, 8)).unwrap();
    gate.started();
    assert!(wait_for(|| sink.publications() >= 3));
    let image = sink.latest().unwrap();
    assert_eq!(image.pixel(7, 7), 0xFFFF0000);

    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    // After completion the publications settle.
    thread::sleep(Duration::from_millis(30));
    let settled = sink.publications();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(sink.publications(), settled);

    assert!(compositor.frames_published() >= 3);
    compositor.stop();
}

#[test]
fn test_compositor_stops_on_drop() {
    let (engine, _gate) = GatedEngine::new(Argb::WHITE);
    let coordinator = RequestCoordinator::new(engine);
    let sink = Arc::new(LatestImage::new());
    {
        let _compositor =
            Compositor::spawn(coordinator, sink.clone(), Duration::from_millis(1)).unwrap();
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(sink.publications(), 0);
}

#[test]
fn test_idle_saver_writes_each_finished_render() {
    let (engine, gate) = GatedEngine::new(Argb::gray(0.5));
    let coordinator = RequestCoordinator::new(engine);
    let sink = Arc::new(LatestImage::new());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.png");
    let saver = IdleSaver::spawn(coordinator.clone(), sink.clone(), path.clone()).unwrap();

    coordinator.request_render(small_config(4, 2)).unwrap();
    gate.started();
    thread::sleep(Duration::from_millis(10));
    assert_eq!(saver.images_saved(), 0);
    assert!(!path.exists());

    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    assert!(wait_for(|| saver.images_saved() == 1));
    let saved = image::open(&path).unwrap().to_rgba8();
    assert_eq!(saved.dimensions(), (4, 2));
    assert_eq!(saved.get_pixel(3, 1).0, [128, 128, 128, 255]);
    // The sink holds the same finished image.
    assert_eq!(sink.latest().unwrap().pixel(3, 1), 0xFF808080);

    // An idle transition right before stopping is still saved.
    coordinator.request_render(small_config(2, 2)).unwrap();
    gate.started();
    gate.release(Step::Finish);
    assert!(coordinator.wait_idle(TIMEOUT));
    saver.stop();
    assert_eq!(image::open(&path).unwrap().to_rgba8().dimensions(), (2, 2));
}

#[test]
fn test_save_final_image_needs_a_frame() {
    let (engine, _gate) = GatedEngine::new(Argb::WHITE);
    let coordinator = RequestCoordinator::new(engine);
    let sink = LatestImage::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.png");
    assert!(save_final_image(&coordinator, &sink, &path).is_err());
    assert!(!path.exists());
    assert_eq!(sink.publications(), 0);
}
