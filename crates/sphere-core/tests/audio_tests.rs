mod common;

use common::*;
use sphere_core::audio::{AudioEngine, SoundEffect};
use sphere_core::config::AudioConfig;
use sphere_core::SceneError;

fn engine(backend: StubAudio) -> AudioEngine<StubAudio> {
    AudioEngine::new(backend, AudioConfig::default(), 3)
}

#[test]
fn init_applies_defaults_and_welcomes() {
    let mut a = engine(StubAudio::default());
    a.initialize().unwrap();
    assert!(a.is_ready());
    assert!(a.has_effects());
    let b = a.backend();
    assert_eq!(b.opened, 1);
    assert!(!b.routed_direct);
    assert_eq!(b.params, [(0, 100.0), (1, 20.0), (2, 200.0), (3, 30.0)]);
    assert_eq!(b.played, ["welcome"]);
}

#[test]
fn init_is_idempotent() {
    let mut a = engine(StubAudio::default());
    a.initialize().unwrap();
    a.initialize().unwrap();
    assert_eq!(a.backend().opened, 1);
    assert_eq!(a.backend().played, ["welcome"]);
}

#[test]
fn missing_effects_device_falls_back_to_direct_routing() {
    let mut a = engine(StubAudio {
        fail_effects: true,
        ..Default::default()
    });
    a.initialize().unwrap();
    assert!(a.is_ready());
    assert!(!a.has_effects());
    assert!(a.backend().routed_direct);
    assert!(a.backend().params.is_empty());
    assert_eq!(a.backend().played, ["welcome"]);
    assert!(matches!(
        a.set_parameter("window", 10.0),
        Err(SceneError::EffectsUnavailable(_))
    ));
    a.play(SoundEffect::Click);
    assert_eq!(a.backend().played, ["welcome", "click"]);
}

#[test]
fn failed_open_leaves_engine_silent() {
    let mut a = engine(StubAudio {
        fail_open: true,
        ..Default::default()
    });
    assert!(a.initialize().is_err());
    assert!(!a.is_ready());
    a.play(SoundEffect::Hover);
    assert!(a.backend().played.is_empty());
    assert!(matches!(a.analysis(), Err(SceneError::NotReady)));

    // a later gesture may retry
    a.backend_mut().fail_open = false;
    a.initialize().unwrap();
    assert!(a.is_ready());
}

#[test]
fn parameters_resolve_exact_then_partial() {
    let mut a = engine(StubAudio::default());
    a.initialize().unwrap();
    a.backend_mut().params.clear();

    a.set_parameter("delay", 450.0).unwrap();
    a.set_parameter("fx/chorus", 500.0).unwrap();
    a.set_parameter("feedback", 55.0).unwrap();
    assert_eq!(a.backend().params, [(2, 450.0), (1, 100.0), (3, 55.0)]);
    assert_eq!(a.params().get("fx/chorus"), Some(100.0));

    assert!(matches!(
        a.set_parameter("reverb", 1.0),
        Err(SceneError::UnknownParameter(_))
    ));
    assert_eq!(a.backend().params.len(), 3);
}

#[test]
fn parameters_set_before_init_are_applied_on_init() {
    let mut a = engine(StubAudio::default());
    a.set_parameter("window", 150.0).unwrap();
    assert!(a.backend().params.is_empty());
    a.initialize().unwrap();
    assert_eq!(a.backend().params[0], (0, 150.0));
}

#[test]
fn flat_spectrum_maps_to_every_band() {
    let mut a = engine(StubAudio {
        spectrum: vec![0.5; 128],
        ..Default::default()
    });
    a.initialize().unwrap();
    let s = a.analysis().unwrap();
    assert!((s.low - 0.5).abs() < 1e-6);
    assert!((s.mid - 0.5).abs() < 1e-6);
    assert!((s.high - 0.5).abs() < 1e-6);

    a.backend_mut().spectrum = vec![0.05; 128];
    let s = a.analysis().unwrap();
    assert_eq!((s.low, s.mid, s.high), (0.0, 0.0, 0.0));
}
