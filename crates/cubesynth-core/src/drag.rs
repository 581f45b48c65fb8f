//! Drag gesture state machine: Idle <-> Dragging.
//!
//! A press on the draggable body starts a sustained chord at a ducked master
//! volume. Moving re-pins the body through the [`PhysicsBridge`] and, when the
//! vertical travel crosses into a new note, re-voices the chord using the
//! live horizontal offset. Releasing silences the chord, restores the session
//! volume and leaves the body at rest.

use crate::audio::{AudioEngine, AudioSession};
use crate::bridge::PhysicsBridge;
use crate::camera::Viewport;
use crate::chord::select_chord;
use crate::constants::{CHORD_NOTE_VOLUME_DB, DRAG_MASTER_VOLUME_DB, DRAG_PLANE_Y};
use crate::notes::{ChordNotes, ChordShape, Note};
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::pitch::map_vertical_delta;
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
}

/// Gesture bookkeeping. The target body is present exactly while dragging.
#[derive(Clone, Debug, Default)]
pub struct GestureState {
    origin: Vec2,
    last_screen: Vec2,
    current_note: Note,
    target: Option<BodyHandle>,
}

impl GestureState {
    pub fn active(&self) -> bool {
        self.target.is_some()
    }

    pub fn phase(&self) -> DragPhase {
        if self.active() {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn current_note(&self) -> Note {
        self.current_note
    }

    pub fn target(&self) -> Option<BodyHandle> {
        self.target
    }
}

/// A chord that was just (re)attacked.
#[derive(Clone, Debug, PartialEq)]
pub struct ChordTrigger {
    pub root: Note,
    pub shape: ChordShape,
    pub notes: ChordNotes,
}

pub struct DragController {
    gesture: GestureState,
    draggable: BodyHandle,
    pick_radius: f32,
    plane_y: f32,
    duck_db: f32,
}

impl DragController {
    pub fn new(draggable: BodyHandle, pick_radius: f32) -> Self {
        Self {
            gesture: GestureState::default(),
            draggable,
            pick_radius,
            plane_y: DRAG_PLANE_Y,
            duck_db: DRAG_MASTER_VOLUME_DB,
        }
    }

    /// Master volume used while a chord is held.
    pub fn with_duck_volume(mut self, volume_db: f32) -> Self {
        self.duck_db = volume_db;
        self
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn draggable(&self) -> BodyHandle {
        self.draggable
    }

    /// Chord for the current gesture; centered (zero offset) when idle.
    pub fn current_chord(&self, viewport_width: f32) -> ChordTrigger {
        let (x, origin_x) = if self.gesture.active() {
            (self.gesture.last_screen.x, self.gesture.origin.x)
        } else {
            (0.0, 0.0)
        };
        let shape = select_chord(x, origin_x, viewport_width);
        let root = self.gesture.current_note;
        ChordTrigger {
            root,
            shape,
            notes: shape.notes(root),
        }
    }

    /// Idle -> Dragging when the press lands on the draggable body. The body
    /// is held where it is until the first move.
    pub fn pointer_down<W: PhysicsWorld, E: AudioEngine>(
        &mut self,
        screen: Vec2,
        viewport: &Viewport,
        world: &mut W,
        bridge: &mut PhysicsBridge,
        audio: &mut AudioSession<E>,
    ) -> Option<ChordTrigger> {
        if self.gesture.active() {
            // only the first touch point drives the gesture
            return None;
        }
        match world.mass(self.draggable) {
            Ok(m) if m > 0.0 => {}
            _ => return None,
        }
        let center = world.position(self.draggable).ok()?;
        viewport.intersect_sphere(screen, center, self.pick_radius)?;

        self.gesture = GestureState {
            origin: screen,
            last_screen: screen,
            current_note: Note::LOWEST,
            target: Some(self.draggable),
        };
        let here = Vec2::new(center.x, center.z);
        if let Err(e) = bridge.override_body(world, self.draggable, here) {
            log::warn!("[drag] cannot hold {}: {e}", self.draggable);
        }
        let trigger = self.current_chord(viewport.width);
        log::info!(
            "[drag] begin on {} at ({:.0},{:.0}): {} {}",
            self.draggable,
            screen.x,
            screen.y,
            trigger.root,
            trigger.shape.name
        );
        audio.release_all();
        audio.duck(self.duck_db);
        audio.attack(&trigger.notes, CHORD_NOTE_VOLUME_DB);
        Some(trigger)
    }

    /// Dragging -> Dragging. Returns the new chord when the note changed.
    pub fn pointer_move<W: PhysicsWorld, E: AudioEngine>(
        &mut self,
        screen: Vec2,
        viewport: &Viewport,
        world: &mut W,
        bridge: &mut PhysicsBridge,
        audio: &mut AudioSession<E>,
    ) -> Option<ChordTrigger> {
        let target = self.gesture.target?;
        self.gesture.last_screen = screen;

        if let Some(hit) = viewport.intersect_horizontal_plane(screen, self.plane_y) {
            if let Err(e) = bridge.override_body(world, target, Vec2::new(hit.x, hit.z)) {
                log::warn!("[drag] cannot move {target}: {e}");
            }
        }

        let note = map_vertical_delta(screen.y - self.gesture.origin.y);
        if note == self.gesture.current_note {
            return None;
        }
        self.gesture.current_note = note;
        let trigger = self.current_chord(viewport.width);
        log::debug!("[drag] note {} -> {} {}", note.index(), trigger.root, trigger.shape.name);
        audio.release_all();
        audio.attack(&trigger.notes, CHORD_NOTE_VOLUME_DB);
        Some(trigger)
    }

    /// Dragging -> Idle. Returns the released body.
    pub fn pointer_up<W: PhysicsWorld, E: AudioEngine>(
        &mut self,
        world: &mut W,
        bridge: &mut PhysicsBridge,
        audio: &mut AudioSession<E>,
    ) -> Option<BodyHandle> {
        let target = self.gesture.target.take()?;
        audio.release_all();
        audio.restore_volume();
        bridge.release(world);
        if let Err(e) = PhysicsBridge::stop(world, target) {
            log::warn!("[drag] cannot settle {target}: {e}");
        }
        log::info!("[drag] released {target}");
        Some(target)
    }
}
