//! End-to-end viewport behaviour through the headless harness.

use glam::{Quat, Vec2, Vec3};
use plater_view_lib::fixtures::{cube_spec, resting_spec, two_object_scene};
use plater_view_lib::harness::ViewportHarness;
use plater_view_lib::viewport::composer::DrawItem;
use plater_view_lib::viewport::interaction::{EventOutcome, InteractionState, Modifiers, PointerButton};
use plater_view_lib::ViewportError;
use shared::ObjectSpec;

fn harness_with_cube() -> ViewportHarness {
    let mut h = ViewportHarness::new();
    h.add(&resting_spec(cube_spec("box", 10.0, 10.0, 10.0))).unwrap();
    h
}

#[test]
fn test_shift_drag_rotates_camera_and_leaves_object() {
    let mut h = harness_with_cube();
    let outcome = h.drag(
        PointerButton::Left,
        Vec2::new(100.0, 100.0),
        Vec2::new(110.0, 100.0),
        Modifiers::SHIFT,
    );
    assert_eq!(outcome, EventOutcome::Redraw);
    assert!(h.camera().orientation.angle_between(Quat::IDENTITY) > 1e-4);
    assert_eq!(h.object("box").unwrap().position, Vec3::ZERO);
    assert_eq!(h.viewport.state(), InteractionState::Idle);
}

#[test]
fn test_plain_drag_moves_selected_by_world_delta() {
    let mut h = harness_with_cube();
    let projector = h.viewport.projector().unwrap();
    let expected = projector.world_delta(Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0));

    h.drag(
        PointerButton::Left,
        Vec2::new(100.0, 100.0),
        Vec2::new(110.0, 100.0),
        Modifiers::NONE,
    );

    assert_eq!(h.camera().orientation, Quat::IDENTITY);
    let p = h.object("box").unwrap().position;
    assert!((p.x - expected.x).abs() < 1e-3);
    assert!((p.y - expected.y).abs() < 1e-3);
    assert_eq!(p.z, 0.0);
    // 10 pixels on a 200-unit platform seen from 200 units away
    assert!(p.x > 1.0 && p.x < 10.0, "moved {}", p.x);
}

#[test]
fn test_drag_after_deselect_is_noop() {
    let mut h = harness_with_cube();
    h.clear_selection();
    let outcome = h.drag(
        PointerButton::Left,
        Vec2::new(100.0, 100.0),
        Vec2::new(200.0, 150.0),
        Modifiers::NONE,
    );
    assert_eq!(outcome, EventOutcome::Skipped(ViewportError::NoSelection));
    assert_eq!(h.object("box").unwrap().position, Vec3::ZERO);
}

#[test]
fn test_zoom_in_then_out_restores_view() {
    let mut h = ViewportHarness::new();
    let cursor = Vec2::new(650.0, 120.0);
    let before = h.viewport.projector().unwrap();
    let anchor = before.unproject(cursor.x, cursor.y, before.reference_depth());
    let distance = h.camera().distance;

    h.wheel(1.0, cursor, Modifiers::SHIFT);
    assert!(h.camera().distance < distance);
    let zoomed = h.viewport.projector().unwrap();
    let under = zoomed.unproject(cursor.x, cursor.y, zoomed.reference_depth());
    assert!(under.abs_diff_eq(anchor, 0.1));

    h.wheel(-1.0, cursor, Modifiers::SHIFT);
    assert!((h.camera().distance - distance).abs() < 1e-3);
    let after = h.viewport.projector().unwrap();
    let under = after.unproject(cursor.x, cursor.y, after.reference_depth());
    assert!(under.abs_diff_eq(anchor, 0.1));
}

#[test]
fn test_orthographic_zoom_keeps_cursor_point() {
    let mut h = ViewportHarness::new();
    h.viewport.toggle_projection();
    let cursor = Vec2::new(200.0, 500.0);
    let before = h.viewport.projector().unwrap();
    let anchor = before.unproject(cursor.x, cursor.y, before.reference_depth());

    for _ in 0..5 {
        h.wheel(1.0, cursor, Modifiers::SHIFT);
    }
    let after = h.viewport.projector().unwrap();
    let under = after.unproject(cursor.x, cursor.y, after.reference_depth());
    assert!(under.truncate().abs_diff_eq(anchor.truncate(), 0.05));
}

#[test]
fn test_placed_objects_drop_and_settle() {
    let mut h = ViewportHarness::from_scene(&two_object_scene()).unwrap();
    assert_eq!(h.object_count(), 2);
    assert!(h.viewport.is_animating());
    assert!(h.object("peg").unwrap().position.z > 0.0);

    let frames = h.run_animations();
    assert!(frames > 0);
    for name in ["block", "peg"] {
        let object = h.object(name).unwrap();
        assert_eq!(object.position.z, 0.0);
        assert_eq!(object.scale.z, 1.0);
    }
}

#[test]
fn test_drop_keeps_configured_scale() {
    let mut h = ViewportHarness::new();
    let spec = ObjectSpec {
        scale: [1.0, 1.0, 3.0],
        ..cube_spec("tall", 10.0, 10.0, 10.0)
    };
    h.add(&spec).unwrap();
    assert!(h.viewport.is_animating());

    h.run_animations();
    let tall = h.object("tall").unwrap();
    assert_eq!(tall.scale, Vec3::new(1.0, 1.0, 3.0));
    assert_eq!(tall.position.z, 0.0);
}

#[test]
fn test_removing_mid_drop_is_safe() {
    let mut h = ViewportHarness::new();
    h.add(&cube_spec("box", 5.0, 5.0, 5.0)).unwrap();
    h.advance(std::time::Duration::from_millis(200));
    assert_eq!(h.remove_selected().as_deref(), Some("box"));
    assert!(!h.viewport.is_animating());
    assert_eq!(h.run_animations(), 0);
}

#[test]
fn test_frame_draws_platform_marker_and_objects() {
    let mut h = ViewportHarness::from_scene(&two_object_scene()).unwrap();
    h.viewport.set_hovered(true);
    h.move_to(Vec2::new(400.0, 300.0), Modifiers::NONE);

    let frame = h.frame();
    assert_eq!(frame.commands.len(), 4);
    assert_eq!(frame.commands[0].item, DrawItem::Platform);
    assert_eq!(frame.commands[1].item, DrawItem::CursorMarker);
    assert_eq!(
        frame.commands[3].item,
        DrawItem::Object { name: "peg".into(), selected: true }
    );
    assert_eq!(h.viewport.composer().initializations(), 1);
}

#[test]
fn test_zero_size_viewport_skips_projection() {
    let mut h = harness_with_cube();
    h.resize(0.0, 0.0);
    let outcome = h.drag(
        PointerButton::Left,
        Vec2::new(0.0, 0.0),
        Vec2::new(10.0, 0.0),
        Modifiers::NONE,
    );
    assert!(matches!(
        outcome,
        EventOutcome::Skipped(ViewportError::DegenerateViewport { .. })
    ));
    assert!(h.frame().commands.is_empty());

    h.resize(640.0, 480.0);
    assert_eq!(h.frame().commands.len(), 2);
}
