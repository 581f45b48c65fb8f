// Host-side tests for collision sonification and its shared cooldown.

mod common;

use common::*;
use cubesynth_core::constants::IMPACT_NOTE_DURATION;
use cubesynth_core::*;
use glam::Vec3;
use instant::Instant;
use std::time::Duration;

fn ball(mass: f32) -> BodyDesc {
    BodyDesc {
        shape: BodyShape::Sphere { radius: 1.0 },
        position: Vec3::ZERO,
        mass,
        linear_damping: 0.0,
        angular_damping: 0.0,
        friction: 0.2,
        restitution: 0.3,
    }
}

struct Rig {
    world: ScriptedWorld,
    audio: AudioSession<RecordingEngine>,
    trigger: CollisionSoundTrigger,
    a: BodyHandle,
    b: BodyHandle,
    wall: BodyHandle,
}

fn rig() -> Rig {
    let mut world = ScriptedWorld::default();
    let a = world.add_body(&ball(1.0));
    let b = world.add_body(&ball(1.0));
    let wall = world.add_body(&ball(0.0));
    let mut audio = AudioSession::new(RecordingEngine::default());
    audio.resume().unwrap();
    Rig {
        world,
        audio,
        trigger: CollisionSoundTrigger::new(),
        a,
        b,
        wall,
    }
}

fn contact(a: BodyHandle, b: BodyHandle, va: Vec3, vb: Vec3) -> ContactBegin {
    ContactBegin {
        body_a: a,
        body_b: b,
        velocity_a: va,
        velocity_b: vb,
    }
}

#[test]
fn speed_three_plays_note_six_at_minus_five_db() {
    let mut r = rig();
    let c = contact(r.a, r.b, Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO);
    let sound = r
        .trigger
        .on_contact(&c, &r.world, Instant::now(), &mut r.audio)
        .expect("audible");
    assert_eq!(sound.note.index(), 6);
    assert_eq!(
        r.audio.engine().calls.last(),
        Some(&AudioCall::AttackRelease(6, IMPACT_NOTE_DURATION, -5.0))
    );
}

#[test]
fn relative_velocity_is_used() {
    let mut r = rig();
    // both moving together: no impact
    let c = contact(r.a, r.b, Vec3::new(5.0, 0.0, 0.0), Vec3::new(4.5, 0.0, 0.0));
    assert!(r
        .trigger
        .on_contact(&c, &r.world, Instant::now(), &mut r.audio)
        .is_none());
    // head-on
    let c = contact(r.a, r.b, Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
    let sound = r
        .trigger
        .on_contact(&c, &r.world, Instant::now(), &mut r.audio)
        .unwrap();
    assert_eq!(sound.note.index(), 4);
}

#[test]
fn static_and_slow_contacts_are_silent() {
    let mut r = rig();
    let now = Instant::now();
    let fast = Vec3::new(0.0, -8.0, 0.0);
    assert!(r
        .trigger
        .on_contact(&contact(r.a, r.wall, fast, Vec3::ZERO), &r.world, now, &mut r.audio)
        .is_none());
    assert!(r
        .trigger
        .on_contact(&contact(r.wall, r.b, Vec3::ZERO, fast), &r.world, now, &mut r.audio)
        .is_none());
    let floor_speed = Vec3::new(1.0, 0.0, 0.0);
    assert!(r
        .trigger
        .on_contact(&contact(r.a, r.b, floor_speed, Vec3::ZERO), &r.world, now, &mut r.audio)
        .is_none());
    assert!(r.audio.engine().hits().is_empty());
    // none of the rejected events consumed the cooldown
    assert!(r.trigger.cooldown().last_fired().is_none());
}

#[test]
fn unknown_bodies_are_silent() {
    let mut r = rig();
    let c = contact(BodyHandle(99), r.b, Vec3::new(9.0, 0.0, 0.0), Vec3::ZERO);
    assert!(r
        .trigger
        .on_contact(&c, &r.world, Instant::now(), &mut r.audio)
        .is_none());
}

#[test]
fn cooldown_is_shared_across_pairs() {
    let mut r = rig();
    let c = rig_extra_pair(&mut r);
    let t0 = Instant::now();
    let hit = contact(r.a, r.b, Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO);

    assert!(r.trigger.on_contact(&hit, &r.world, t0, &mut r.audio).is_some());
    // different pair, 50 ms later
    assert!(r
        .trigger
        .on_contact(&c, &r.world, t0 + Duration::from_millis(50), &mut r.audio)
        .is_none());
    assert_eq!(r.audio.engine().hits().len(), 1);
}

fn rig_extra_pair(r: &mut Rig) -> ContactBegin {
    let c = r.world.add_body(&ball(1.0));
    let d = r.world.add_body(&ball(1.0));
    contact(c, d, Vec3::ZERO, Vec3::new(0.0, 0.0, 6.0))
}

#[test]
fn spaced_contacts_both_sound() {
    let mut r = rig();
    let t0 = Instant::now();
    let hit = contact(r.a, r.b, Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO);
    assert!(r.trigger.on_contact(&hit, &r.world, t0, &mut r.audio).is_some());
    assert!(r
        .trigger
        .on_contact(&hit, &r.world, t0 + Duration::from_millis(99), &mut r.audio)
        .is_none());
    assert!(r
        .trigger
        .on_contact(&hit, &r.world, t0 + Duration::from_millis(100), &mut r.audio)
        .is_some());
    assert_eq!(r.audio.engine().hits().len(), 2);
}
