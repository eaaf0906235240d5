mod common;

use common::*;
use glam::Vec2;
use sphere_core::interaction::{CursorStyle, InteractionEffect};

const FRAME_MS: f64 = 16.0;

#[test]
fn morph_factor_is_monotonic_and_completes_at_one() {
    let mut scene = ready_scene(StubAudio::default());
    let mut now = 0.0;
    while !scene.morph().is_morphing() {
        now += FRAME_MS;
        scene.tick(now);
        assert!(now < 10_000.0, "morph never started");
    }
    let mut prev = scene.morph().factor();
    let mut ticks = 0;
    while scene.morph().is_morphing() {
        now += FRAME_MS;
        scene.tick(now);
        ticks += 1;
        let f = scene.morph().factor();
        assert!(f >= prev, "factor went backwards: {prev} -> {f}");
        assert!(f <= 1.0);
        prev = f;
        assert!(ticks <= 1001, "morph did not finish");
    }
    assert_eq!(scene.morph().factor(), 1.0);
    assert_eq!(scene.morph().slots(), (0, 1));
}

#[test]
fn morph_start_rebinds_textures_and_plays_sound_once_audio_is_up() {
    let mut scene = ready_scene(StubAudio::default());
    scene.init_audio().unwrap();
    let before = scene.renderer().unwrap().bound.len();
    let mut now = 0.0;
    while !scene.morph().is_morphing() {
        now += FRAME_MS;
        scene.tick(now);
    }
    assert_eq!(scene.renderer().unwrap().bound.len(), before + 1);
    assert_eq!(scene.audio().backend().played, ["welcome", "morph"]);
}

#[test]
fn hover_factor_is_bounded_and_decays() {
    let mut scene = ready_scene(StubAudio::default());
    build_field(&mut scene, 3, 0);
    scene.focus_project("music-1", 0.0).unwrap();
    let mut now = 0.0;
    for _ in 0..40 {
        now += FRAME_MS;
        scene.tick(now);
        for m in scene.field().markers() {
            assert!(m.hover_factor <= 1.0 && m.hover_factor >= 0.0);
        }
    }
    let idx = scene.field().find("music-1").unwrap();
    assert_eq!(scene.field().markers()[idx].hover_factor, 1.0);

    // pointer far from every marker clears the hover
    scene.pointer_move(Vec2::ZERO, Vec2::new(0.98, 0.98), now);
    for _ in 0..15 {
        now += FRAME_MS;
        scene.tick(now);
    }
    assert_eq!(scene.field().markers()[idx].hover_factor, 0.0);
}

#[test]
fn damping_converges_without_overshoot() {
    let mut scene = ready_scene(StubAudio::default());
    build_field(&mut scene, 4, 3);
    scene.focus_project("programming-1", 500.0).unwrap();
    let target = scene.rotation().target;
    let start = scene.rotation().current;
    let mut prev_gap = (target.x - start.x).abs() + (target.y - start.y).abs();
    assert!(prev_gap > 0.1);
    let mut now = 500.0;
    for _ in 0..600 {
        now += FRAME_MS;
        scene.tick(now);
        let c = scene.rotation().current;
        let gap = (target.x - c.x).abs() + (target.y - c.y).abs();
        assert!(gap <= prev_gap + 1e-6);
        prev_gap = gap;
    }
    assert!(prev_gap < 1e-3);
}

#[test]
fn drag_rotates_immediately_and_holds_damping() {
    let mut scene = ready_scene(StubAudio::default());
    let fx = scene.pointer_down(Vec2::new(100.0, 100.0), 0.0);
    assert!(fx.contains(&InteractionEffect::AudioStarted));
    assert!(fx.contains(&InteractionEffect::Cursor(CursorStyle::Grabbing)));

    scene.pointer_move(Vec2::new(150.0, 90.0), Vec2::ZERO, 10.0);
    let r = scene.rotation().current;
    assert!((r.y - 0.1).abs() < 1e-6);
    assert!((r.x - 0.02).abs() < 1e-6);
    assert!(scene.controller().suspends_damping());

    scene.tick(20.0);
    assert_eq!(scene.rotation().current, r);

    let fx = scene.pointer_up(Some(Vec2::ZERO), 30.0);
    assert_eq!(fx[..], [InteractionEffect::Cursor(CursorStyle::Grab)]);
    assert!(!scene.controller().suspends_damping());
}

#[test]
fn quick_tap_on_marker_scrolls_to_its_section() {
    let mut scene = ready_scene(StubAudio::default());
    build_field(&mut scene, 1, 0);
    scene.pointer_down(Vec2::new(400.0, 300.0), 0.0);
    let fx = scene.pointer_up(Some(Vec2::ZERO), 40.0);
    assert!(fx.contains(&InteractionEffect::ScrollTo("music-0".into())));
    assert!(scene.field().markers()[0].is_clicked);
    assert!(scene.audio().backend().played.contains(&"click"));

    // destruction climbs to its ceiling and stays there
    let mut now = 40.0;
    for _ in 0..60 {
        now += FRAME_MS;
        scene.tick(now);
    }
    assert!((scene.field().markers()[0].destruction_factor - 3.0).abs() < 1e-5);
}

#[test]
fn frames_render_particles_for_every_marker() {
    let mut scene = ready_scene(StubAudio::default());
    build_field(&mut scene, 2, 1);
    scene.tick(16.0);
    let r = scene.renderer().unwrap();
    assert_eq!(r.instance_counts.last(), Some(&15));
    let frame = r.frames.last().unwrap();
    assert!((frame.time - 16.0e-5).abs() < 1e-9);
    assert_eq!(frame.morph_factor, 0.2);
}
