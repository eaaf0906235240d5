mod common;

use common::*;
use sphere_core::config::FieldConfig;
use sphere_core::points::{spherical_to_cartesian, spiral_coord, BuildStep, PointField};
use sphere_core::rotation::Rotation;

#[test]
fn golden_angle_positions_lie_on_radius_and_are_distinct() {
    for n in [1usize, 2, 3, 7, 50, 200] {
        let pts: Vec<_> = (0..n)
            .map(|i| spherical_to_cartesian(spiral_coord(i, n), 1.6))
            .collect();
        for p in &pts {
            assert!((p.length() - 1.6).abs() < 1e-4, "n={n} p={p:?}");
        }
        for i in 0..n {
            for j in (i + 1)..n {
                assert!(pts[i].distance(pts[j]) > 1e-3, "n={n} i={i} j={j}");
            }
        }
    }
}

#[test]
fn seven_projects_take_four_ticks() {
    let mut scene = ready_scene(StubAudio::default());
    let ticks = build_field(&mut scene, 4, 3);
    assert_eq!(ticks, 4);
    assert_eq!(scene.field().markers().len(), 7);
    assert_eq!(scene.field().hit_list_len(), 7);
    assert!(scene.field().is_complete());
    let ids: Vec<_> = scene.field().markers().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "music-0",
            "music-1",
            "music-2",
            "music-3",
            "programming-0",
            "programming-1",
            "programming-2"
        ]
    );
}

#[test]
fn hit_list_is_published_only_on_completion() {
    let mut field = PointField::new(FieldConfig::default(), 1);
    let ticket = field.rebuild(projects("m", 5), vec![]);
    assert_eq!(
        field.build_batch(ticket),
        BuildStep::Pending { built: 2, total: 5 }
    );
    assert_eq!(field.hit_list_len(), 0);
    field.build_batch(ticket);
    assert_eq!(field.hit_list_len(), 0);
    assert_eq!(field.build_batch(ticket), BuildStep::Complete { total: 5 });
    assert_eq!(field.hit_list_len(), 5);
}

#[test]
fn stale_ticket_cannot_touch_a_newer_build() {
    let mut field = PointField::new(FieldConfig::default(), 1);
    let old = field.rebuild(projects("m", 6), vec![]);
    field.build_batch(old);
    let fresh = field.rebuild(projects("m", 3), projects("p", 1));
    assert_eq!(field.markers().len(), 0);

    assert_eq!(field.build_batch(old), BuildStep::Stale);
    assert_eq!(field.markers().len(), 0);

    while let BuildStep::Pending { .. } = field.build_batch(fresh) {}
    assert_eq!(field.markers().len(), 4);
    assert_eq!(field.hit_list_len(), 4);
    assert_eq!(field.build_batch(old), BuildStep::Stale);
    assert_eq!(field.hit_list_len(), 4);
}

#[test]
fn empty_lists_complete_immediately() {
    let mut field = PointField::new(FieldConfig::default(), 1);
    let t = field.rebuild(vec![], vec![]);
    assert_eq!(field.build_batch(t), BuildStep::Complete { total: 0 });
    assert_eq!(field.hit_list_len(), 0);
}

#[test]
fn focus_brings_marker_to_the_front() {
    let mut scene = ready_scene(StubAudio::default());
    build_field(&mut scene, 4, 3);
    let now = 12_345.0;
    scene.focus_project("music-2", now).unwrap();

    let rot = scene.rotation();
    let auto = rot.auto_rotation(now);
    let visual = Rotation::new(rot.target.x + auto, rot.target.y + auto);
    let index = scene.field().find("music-2").unwrap();
    let p = scene.field().markers()[index].original_position;
    let q = visual.matrix() * p;
    assert!(q.x.abs() < 1e-3, "{q:?}");
    assert!(q.y.abs() < 1e-3, "{q:?}");
    assert!((q.z - 1.6).abs() < 1e-3, "{q:?}");

    assert!(scene.field().markers()[index].is_hovered);
    assert_eq!(scene.controller().hovered(), Some(index));
}

#[test]
fn focus_unhovers_every_other_marker() {
    let mut scene = ready_scene(StubAudio::default());
    build_field(&mut scene, 2, 2);
    scene.focus_project("music-0", 100.0).unwrap();
    scene.focus_project("programming-1", 200.0).unwrap();
    let hovered: Vec<_> = scene
        .field()
        .markers()
        .iter()
        .filter(|m| m.is_hovered)
        .map(|m| m.id.clone())
        .collect();
    assert_eq!(hovered, ["programming-1"]);
}

#[test]
fn focus_on_unknown_id_is_an_error() {
    let mut scene = ready_scene(StubAudio::default());
    build_field(&mut scene, 1, 0);
    assert!(matches!(
        scene.focus_project("music-9", 0.0),
        Err(sphere_core::SceneError::UnknownProject(_))
    ));
}

#[test]
fn malformed_descriptors_still_place_every_marker() {
    let music = sphere_core::project::parse_list(
        r#"[{"title":"Album","year":2019}, 7, {"links":{"youtube":["a"]}}]"#,
    )
    .unwrap();
    assert_eq!(music.len(), 3);
    let mut scene = ready_scene(StubAudio::default());
    let ticket = scene.update_project_field(music, Vec::new());
    while let BuildStep::Pending { .. } = scene.advance_project_field(ticket) {}
    assert_eq!(scene.field().markers().len(), 3);
    assert!(scene.field().find("music-2").is_some());
}
