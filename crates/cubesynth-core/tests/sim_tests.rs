// Host-side tests for the frame driver: fixed stepping, override ordering,
// contact sonification and transform sync.

mod common;

use common::*;
use cubesynth_core::*;
use glam::Vec3;
use instant::Instant;
use std::time::Duration;

const FRAME: Duration = Duration::from_micros(16_700);

#[test]
fn every_visual_is_synced_once_per_frame() {
    let mut s = scripted_session(3);
    let mut scene = CountingScene::default();
    let stats = s.frame(FRAME, &mut scene);

    assert_eq!(stats.steps, 1);
    assert_eq!(scene.renders, 1);
    assert_eq!(stats.synced, s.visuals().len());
    assert_eq!(scene.synced.len(), 6 + 1 + 3);
}

#[test]
fn short_frames_render_without_stepping() {
    let mut s = scripted_session(0);
    let mut scene = CountingScene::default();
    let stats = s.frame(Duration::from_millis(5), &mut scene);
    assert_eq!(stats.steps, 0);
    assert_eq!(s.world().steps, 0);
    assert_eq!(scene.renders, 1);
}

#[test]
fn long_stall_is_capped() {
    let mut s = scripted_session(0);
    let mut scene = CountingScene::default();
    let stats = s.frame(Duration::from_secs(1), &mut scene);
    assert_eq!(stats.steps, SessionConfig::default().max_steps_per_frame);
}

#[test]
fn contacts_from_the_step_are_sonified() {
    let mut s = scripted_session(2);
    let (a, b) = (s.balls()[0], s.balls()[1]);
    s.world_mut().queue_contacts(vec![
        ContactBegin {
            body_a: a,
            body_b: b,
            velocity_a: Vec3::new(0.0, -3.0, 0.0),
            velocity_b: Vec3::ZERO,
        },
        // same step: inside the cooldown
        ContactBegin {
            body_a: b,
            body_b: a,
            velocity_a: Vec3::new(0.0, 0.0, 7.0),
            velocity_b: Vec3::ZERO,
        },
    ]);
    let mut scene = CountingScene::default();
    let stats = s.frame_at(FRAME, Instant::now(), &mut scene);
    assert_eq!(stats.contacts, 2);
    assert_eq!(stats.impacts, 1);
    assert_eq!(s.audio().engine().hits(), vec![(6, -5.0)]);
}

#[test]
fn drag_override_runs_before_each_step() {
    let mut s = scripted_session(0);
    let body = s.draggable();
    let at = draggable_on_screen(&s);
    s.pointer_down(at.x, at.y).unwrap();
    s.pointer_move(at.x + 50.0, at.y);
    let pinned = s.bridge().target().unwrap();

    // knock the body away between frames
    s.world_mut()
        .set_position(body, Vec3::new(-5.0, 1.0, -5.0))
        .unwrap();
    s.world_mut().set_velocity(body, Vec3::new(9.0, 0.0, 9.0)).unwrap();
    s.world_mut().watch = Some(body);

    let mut scene = CountingScene::default();
    s.frame(FRAME * 2, &mut scene);

    assert_eq!(s.world().positions_at_step.len(), 2);
    for p in &s.world().positions_at_step {
        assert!((p.x - pinned.x).abs() < 1e-6 && (p.z - pinned.y).abs() < 1e-6);
    }
    // height stays with the simulation
    assert_eq!(s.world().positions_at_step[0].y, 1.0);

    s.pointer_up();
    s.frame(FRAME, &mut scene);
    assert_eq!(s.world().positions_at_step.len(), 3);
}

#[test]
fn tilt_pushes_and_plucks_with_its_own_cooldown() {
    let mut s = scripted_session(0);
    let body = s.draggable();
    let t0 = Instant::now();

    assert!(!s.orientation_at(10.0, 10.0, t0), "disabled by default");
    s.set_orientation_enabled(true);
    assert!(s.orientation_at(10.0, -20.0, t0));
    assert_eq!(s.world().bodies[body.0 as usize].force, Vec3::new(-2.0, 0.0, 1.0));
    assert!(!s.orientation_at(10.0, -20.0, t0 + Duration::from_millis(150)));
    assert!(s.orientation_at(10.0, -20.0, t0 + Duration::from_millis(200)));

    // idle chord is augmented on C4, played as three short tones per pluck
    let hits: Vec<usize> = s.audio().engine().hits().into_iter().map(|h| h.0).collect();
    assert_eq!(hits, vec![0, 4, 8, 0, 4, 8]);

    // tiny tilt pushes but stays silent
    assert!(!s.orientation_at(0.5, 0.5, t0 + Duration::from_secs(5)));
}

#[test]
fn shutdown_ends_gesture_and_disposes_audio() {
    let mut s = scripted_session(0);
    let at = draggable_on_screen(&s);
    s.pointer_down(at.x, at.y).unwrap();
    s.shutdown();
    assert_eq!(s.drag().gesture().phase(), DragPhase::Idle);
    assert_eq!(s.audio().state(), AudioState::Disposed);
    assert_eq!(s.audio().engine().calls.last(), Some(&AudioCall::Dispose));
    assert!(s.resume_audio().is_err());
}
