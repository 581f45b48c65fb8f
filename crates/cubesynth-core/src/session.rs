//! Top-level controller owning the world, the audio session and every
//! interaction component. Front-ends forward raw events and frame ticks.

use crate::audio::{AudioEngine, AudioError, AudioSession};
use crate::bridge::PhysicsBridge;
use crate::camera::Viewport;
use crate::collision::CollisionSoundTrigger;
use crate::constants::{
    DRAG_MASTER_VOLUME_DB, MASTER_VOLUME_DB, MAX_STEPS_PER_FRAME, PHYSICS_DT, SPHERE_RADIUS,
    SURROUNDING_COUNT,
};
use crate::drag::{ChordTrigger, DragController};
use crate::orientation::OrientationInput;
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::scene::{build_enclosure, VisualMap};
use crate::sim::{FrameStats, SceneSink, SimulationLoop};
use glam::Vec2;
use instant::Instant;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub seed: u64,
    pub ball_count: usize,
    pub master_volume_db: f32,
    pub drag_volume_db: f32,
    pub max_steps_per_frame: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ball_count: SURROUNDING_COUNT,
            master_volume_db: MASTER_VOLUME_DB,
            drag_volume_db: DRAG_MASTER_VOLUME_DB,
            max_steps_per_frame: MAX_STEPS_PER_FRAME,
        }
    }
}

pub struct Session<W: PhysicsWorld, E: AudioEngine> {
    world: W,
    audio: AudioSession<E>,
    drag: DragController,
    bridge: PhysicsBridge,
    collisions: CollisionSoundTrigger,
    orientation: OrientationInput,
    sim: SimulationLoop,
    viewport: Viewport,
    visuals: VisualMap,
    balls: Vec<BodyHandle>,
}

impl<W: PhysicsWorld, E: AudioEngine> Session<W, E> {
    /// Populate `world` with the enclosure and wrap `engine` in a suspended session.
    pub fn new(mut world: W, engine: E, config: SessionConfig, width: f32, height: f32) -> Self {
        let layout = build_enclosure(&mut world, config.ball_count, config.seed);
        let mut audio = AudioSession::new(engine);
        if let Err(e) = audio.init() {
            log::warn!("[session] audio init failed: {e}");
        }
        audio.set_master_volume(config.master_volume_db);
        Self {
            world,
            audio,
            drag: DragController::new(layout.draggable, SPHERE_RADIUS)
                .with_duck_volume(config.drag_volume_db),
            bridge: PhysicsBridge::new(),
            collisions: CollisionSoundTrigger::new(),
            orientation: OrientationInput::new(),
            sim: SimulationLoop::new(PHYSICS_DT, config.max_steps_per_frame),
            viewport: Viewport::new(width, height),
            visuals: layout.visuals,
            balls: layout.balls,
        }
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn audio(&self) -> &AudioSession<E> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioSession<E> {
        &mut self.audio
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn bridge(&self) -> &PhysicsBridge {
        &self.bridge
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn visuals(&self) -> &VisualMap {
        &self.visuals
    }

    pub fn draggable(&self) -> BodyHandle {
        self.drag.draggable()
    }

    pub fn balls(&self) -> &[BodyHandle] {
        &self.balls
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.resize(width, height);
    }

    /// Start audio output. Call from inside a user gesture on the web.
    pub fn resume_audio(&mut self) -> Result<(), AudioError> {
        self.audio.resume()
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<ChordTrigger> {
        self.drag.pointer_down(
            Vec2::new(x, y),
            &self.viewport,
            &mut self.world,
            &mut self.bridge,
            &mut self.audio,
        )
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> Option<ChordTrigger> {
        self.drag.pointer_move(
            Vec2::new(x, y),
            &self.viewport,
            &mut self.world,
            &mut self.bridge,
            &mut self.audio,
        )
    }

    pub fn pointer_up(&mut self) -> Option<BodyHandle> {
        self.drag
            .pointer_up(&mut self.world, &mut self.bridge, &mut self.audio)
    }

    pub fn set_orientation_enabled(&mut self, enabled: bool) {
        self.orientation.set_enabled(enabled);
    }

    pub fn orientation(&mut self, beta_deg: f32, gamma_deg: f32) -> bool {
        self.orientation_at(beta_deg, gamma_deg, Instant::now())
    }

    pub fn orientation_at(&mut self, beta_deg: f32, gamma_deg: f32, now: Instant) -> bool {
        let chord = self.drag.current_chord(self.viewport.width);
        self.orientation.apply(
            beta_deg,
            gamma_deg,
            now,
            &mut self.world,
            self.drag.draggable(),
            &chord.notes,
            &mut self.audio,
        )
    }

    pub fn frame<S: SceneSink>(&mut self, elapsed: Duration, scene: &mut S) -> FrameStats {
        self.frame_at(elapsed, Instant::now(), scene)
    }

    pub fn frame_at<S: SceneSink>(
        &mut self,
        elapsed: Duration,
        now: Instant,
        scene: &mut S,
    ) -> FrameStats {
        self.sim.frame(
            elapsed,
            now,
            &mut self.world,
            &self.bridge,
            &mut self.collisions,
            &mut self.audio,
            &self.visuals,
            scene,
        )
    }

    /// End any gesture and release the audio device.
    pub fn shutdown(&mut self) {
        self.pointer_up();
        self.audio.dispose();
        log::info!("[session] shut down");
    }
}
