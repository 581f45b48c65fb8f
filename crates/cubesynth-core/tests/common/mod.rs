// Shared fakes for host-side integration tests: an audio engine that records
// every call and an in-memory physics world with scripted contacts.

#![allow(dead_code)]

use cubesynth_core::*;
use glam::{Quat, Vec3};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCall {
    Resume,
    Dispose,
    SetVolume(f32),
    Attack(Vec<usize>, f32),
    AttackRelease(usize, Duration, f32),
    ReleaseAll,
}

#[derive(Default)]
pub struct RecordingEngine {
    pub calls: Vec<AudioCall>,
}

impl RecordingEngine {
    pub fn attacks(&self) -> Vec<Vec<usize>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                AudioCall::Attack(notes, _) => Some(notes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn hits(&self) -> Vec<(usize, f32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                AudioCall::AttackRelease(note, _, db) => Some((*note, *db)),
                _ => None,
            })
            .collect()
    }

    pub fn volumes(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                AudioCall::SetVolume(db) => Some(*db),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &AudioCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl AudioEngine for RecordingEngine {
    fn resume(&mut self) -> Result<(), AudioError> {
        self.calls.push(AudioCall::Resume);
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), AudioError> {
        self.calls.push(AudioCall::Dispose);
        Ok(())
    }

    fn set_volume(&mut self, volume_db: f32) -> Result<(), AudioError> {
        self.calls.push(AudioCall::SetVolume(volume_db));
        Ok(())
    }

    fn attack(&mut self, notes: &[Note], volume_db: f32) -> Result<(), AudioError> {
        let idx = notes.iter().map(|n| n.index()).collect();
        self.calls.push(AudioCall::Attack(idx, volume_db));
        Ok(())
    }

    fn attack_release(
        &mut self,
        note: Note,
        duration: Duration,
        volume_db: f32,
    ) -> Result<(), AudioError> {
        self.calls
            .push(AudioCall::AttackRelease(note.index(), duration, volume_db));
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), AudioError> {
        self.calls.push(AudioCall::ReleaseAll);
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct ScriptedBody {
    pub mass: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub force: Vec3,
}

/// No gravity and no solver: bodies move only by their velocity and by
/// applied forces. Contacts are queued by the test and emitted on the next step.
#[derive(Default)]
pub struct ScriptedWorld {
    pub bodies: Vec<ScriptedBody>,
    pub pending: VecDeque<Vec<ContactBegin>>,
    pub steps: usize,
    pub positions_at_step: Vec<Vec3>,
    pub watch: Option<BodyHandle>,
}

impl ScriptedWorld {
    pub fn queue_contacts(&mut self, contacts: Vec<ContactBegin>) {
        self.pending.push_back(contacts);
    }

    fn get(&self, body: BodyHandle) -> Result<&ScriptedBody, PhysicsError> {
        self.bodies
            .get(body.0 as usize)
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn get_mut(&mut self, body: BodyHandle) -> Result<&mut ScriptedBody, PhysicsError> {
        let b = self
            .bodies
            .get_mut(body.0 as usize)
            .ok_or(PhysicsError::UnknownBody(body))?;
        if b.mass <= 0.0 {
            return Err(PhysicsError::Immovable(body));
        }
        Ok(b)
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        self.bodies.push(ScriptedBody {
            mass: desc.mass.max(0.0),
            position: desc.position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            force: Vec3::ZERO,
        });
        BodyHandle(self.bodies.len() as u32 - 1)
    }

    fn step(&mut self, dt: f32, contacts: &mut Vec<ContactBegin>) {
        self.steps += 1;
        if let Some(watch) = self.watch {
            if let Ok(b) = self.get(watch) {
                let p = b.position;
                self.positions_at_step.push(p);
            }
        }
        for b in self.bodies.iter_mut().filter(|b| b.mass > 0.0) {
            b.velocity += b.force / b.mass * dt;
            b.position += b.velocity * dt;
            b.force = Vec3::ZERO;
        }
        if let Some(batch) = self.pending.pop_front() {
            contacts.extend(batch);
        }
    }

    fn mass(&self, body: BodyHandle) -> Result<f32, PhysicsError> {
        Ok(self.get(body)?.mass)
    }

    fn position(&self, body: BodyHandle) -> Result<Vec3, PhysicsError> {
        Ok(self.get(body)?.position)
    }

    fn rotation(&self, body: BodyHandle) -> Result<Quat, PhysicsError> {
        self.get(body).map(|_| Quat::IDENTITY)
    }

    fn velocity(&self, body: BodyHandle) -> Result<Vec3, PhysicsError> {
        Ok(self.get(body)?.velocity)
    }

    fn angular_velocity(&self, body: BodyHandle) -> Result<Vec3, PhysicsError> {
        Ok(self.get(body)?.angular_velocity)
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) -> Result<(), PhysicsError> {
        self.get_mut(body)?.position = position;
        Ok(())
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<(), PhysicsError> {
        self.get_mut(body)?.velocity = velocity;
        Ok(())
    }

    fn set_angular_velocity(
        &mut self,
        body: BodyHandle,
        angular_velocity: Vec3,
    ) -> Result<(), PhysicsError> {
        self.get_mut(body)?.angular_velocity = angular_velocity;
        Ok(())
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec3) -> Result<(), PhysicsError> {
        self.get_mut(body)?.force += force;
        Ok(())
    }
}

/// Counts transform syncs and renders.
#[derive(Default)]
pub struct CountingScene {
    pub synced: Vec<(VisualHandle, Vec3)>,
    pub renders: usize,
}

impl SceneSink for CountingScene {
    fn sync_transform(&mut self, visual: VisualHandle, position: Vec3, _rotation: Quat) {
        self.synced.push((visual, position));
    }

    fn render(&mut self) {
        self.renders += 1;
    }
}

pub const WIDTH: f32 = 1200.0;
pub const HEIGHT: f32 = 800.0;

pub fn scripted_session(ball_count: usize) -> Session<ScriptedWorld, RecordingEngine> {
    let config = SessionConfig {
        ball_count,
        ..Default::default()
    };
    let mut session = Session::new(
        ScriptedWorld::default(),
        RecordingEngine::default(),
        config,
        WIDTH,
        HEIGHT,
    );
    session.resume_audio().expect("resume");
    session
}

/// Screen position of the draggable body's center.
pub fn draggable_on_screen<W: PhysicsWorld, E: AudioEngine>(session: &Session<W, E>) -> glam::Vec2 {
    let center = session
        .world()
        .position(session.draggable())
        .expect("draggable exists");
    session.viewport().project(center).expect("in front of camera")
}
