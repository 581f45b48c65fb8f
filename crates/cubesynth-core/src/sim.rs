//! Per-frame driver: fixed-timestep physics, contact sounds, transform sync.

use crate::audio::{AudioEngine, AudioSession};
use crate::bridge::PhysicsBridge;
use crate::collision::CollisionSoundTrigger;
use crate::constants::{MAX_STEPS_PER_FRAME, PHYSICS_DT};
use crate::physics::{ContactBegin, PhysicsWorld};
use crate::scene::{VisualHandle, VisualMap};
use glam::{Quat, Vec3};
use instant::Instant;
use std::time::Duration;

/// Render collaborator. Front-ends own the actual meshes/sprites.
pub trait SceneSink {
    fn sync_transform(&mut self, visual: VisualHandle, position: Vec3, rotation: Quat);
    fn render(&mut self);
}

/// Accumulates wall time and hands out whole fixed steps.
#[derive(Clone, Debug)]
pub struct FixedStep {
    dt: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FixedStep {
    pub fn new(dt: f32, max_steps: u32) -> Self {
        Self {
            dt,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Unconsumed time carried to the next frame.
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }

    /// Add elapsed time and return how many steps to run now.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let secs = elapsed.as_secs_f32();
        if secs.is_finite() {
            self.accumulator += secs;
        }
        let mut steps = 0;
        while self.accumulator >= self.dt && steps < self.max_steps {
            self.accumulator -= self.dt;
            steps += 1;
        }
        if self.accumulator >= self.dt {
            log::debug!(
                "[sim] dropping {:.3}s of backlog after {} steps",
                self.accumulator,
                steps
            );
            self.accumulator %= self.dt;
        }
        steps
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(PHYSICS_DT, MAX_STEPS_PER_FRAME)
    }
}

/// What one frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub steps: u32,
    pub contacts: usize,
    pub impacts: usize,
    pub synced: usize,
}

#[derive(Default)]
pub struct SimulationLoop {
    clock: FixedStep,
    contacts: Vec<ContactBegin>,
}

impl SimulationLoop {
    pub fn new(dt: f32, max_steps: u32) -> Self {
        Self {
            clock: FixedStep::new(dt, max_steps),
            contacts: Vec::new(),
        }
    }

    pub fn clock(&self) -> &FixedStep {
        &self.clock
    }

    /// Run one display frame. The drag override is re-applied before every
    /// step so contacts integrate against the held position.
    #[allow(clippy::too_many_arguments)]
    pub fn frame<W, E, S>(
        &mut self,
        elapsed: Duration,
        now: Instant,
        world: &mut W,
        bridge: &PhysicsBridge,
        collisions: &mut CollisionSoundTrigger,
        audio: &mut AudioSession<E>,
        visuals: &VisualMap,
        scene: &mut S,
    ) -> FrameStats
    where
        W: PhysicsWorld,
        E: AudioEngine,
        S: SceneSink,
    {
        let mut stats = FrameStats {
            steps: self.clock.advance(elapsed),
            ..Default::default()
        };
        for _ in 0..stats.steps {
            bridge.apply(world);
            self.contacts.clear();
            world.step(self.clock.dt(), &mut self.contacts);
            stats.contacts += self.contacts.len();
            for contact in &self.contacts {
                if collisions.on_contact(contact, world, now, audio).is_some() {
                    stats.impacts += 1;
                }
            }
        }

        for (body, visual) in visuals.pairs() {
            match (world.position(body), world.rotation(body)) {
                (Ok(p), Ok(r)) => {
                    scene.sync_transform(visual, p, r);
                    stats.synced += 1;
                }
                _ => log::warn!("[sim] {body} has no transform; skipping {visual:?}"),
            }
        }
        scene.render();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_carries_remainder() {
        let mut clock = FixedStep::new(0.1, 5);
        assert_eq!(clock.advance(Duration::from_millis(50)), 0);
        assert_eq!(clock.advance(Duration::from_millis(70)), 1);
        assert!((clock.remainder() - 0.02).abs() < 1e-4);
    }

    #[test]
    fn backlog_is_capped() {
        let mut clock = FixedStep::new(0.1, 3);
        assert_eq!(clock.advance(Duration::from_secs(2)), 3);
        assert!(clock.remainder() < 0.1);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }

    #[test]
    fn sixty_hz_frames_step_once() {
        let mut clock = FixedStep::default();
        let total: u32 = (0..60)
            .map(|_| clock.advance(Duration::from_micros(16_667)))
            .sum();
        assert!((59..=60).contains(&total));
    }
}
