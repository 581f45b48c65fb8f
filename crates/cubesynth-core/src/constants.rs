use std::time::Duration;

// Shared interaction/audio/physics tuning constants used by both web and native frontends.

// Note space
pub const NOTE_COUNT: usize = 24; // two chromatic octaves, C4..B5
pub const BASE_MIDI: i32 = 60; // C4
pub const CHORD_BAND_COUNT: usize = 6;

// Pitch mapping
pub const PITCH_STEP_PX: f32 = 50.0; // vertical travel per scale step

// Volumes (decibels)
pub const MASTER_VOLUME_DB: f32 = -6.0; // ~0.5 linear
pub const DRAG_MASTER_VOLUME_DB: f32 = -12.0; // master while a chord is held
pub const CHORD_NOTE_VOLUME_DB: f32 = -20.0; // ~0.1 linear per chord note
pub const SILENCE_DB: f32 = -80.0;

// Collision sonification
pub const COLLISION_COOLDOWN: Duration = Duration::from_millis(100);
pub const IMPACT_SPEED_FLOOR: f32 = 1.0; // m/s; at or below this contacts stay silent
pub const IMPACT_NOTE_SCALE: f32 = 2.0; // note index per m/s
pub const IMPACT_VOLUME_BASE_DB: f32 = -20.0;
pub const IMPACT_VOLUME_DB_PER_SPEED: f32 = 5.0;
pub const IMPACT_NOTE_DURATION: Duration = Duration::from_millis(200);

// Device orientation input
pub const ORIENTATION_COOLDOWN: Duration = Duration::from_millis(200);
pub const ORIENTATION_FORCE_SCALE: f32 = 0.1; // newtons per degree of tilt
pub const ORIENTATION_FORCE_FLOOR: f32 = 0.1;
pub const ORIENTATION_NOTE_DURATION: Duration = Duration::from_millis(500);

// Simulation
pub const PHYSICS_DT: f32 = 1.0 / 60.0;
pub const MAX_STEPS_PER_FRAME: u32 = 5;
pub const GRAVITY_Y: f32 = -9.82;
pub const DRAG_PLANE_Y: f32 = 0.0; // horizontal plane the held body follows

// Enclosure
pub const FLOOR_Y: f32 = -2.0;
pub const ROOM_LENGTH: f32 = 32.0; // along X
pub const ROOM_WIDTH: f32 = 18.0; // along Z
pub const WALL_HEIGHT: f32 = 8.0;
pub const WALL_THICKNESS: f32 = 1.0;

// Bodies
pub const SPHERE_RADIUS: f32 = 1.0;
pub const DRAGGABLE_MASS: f32 = 5.0;
pub const DRAGGABLE_SPAWN: [f32; 3] = [0.0, 10.0, 0.0]; // clamped below the ceiling at spawn
pub const SURROUNDING_MASS: f32 = 1.0;
pub const SURROUNDING_COUNT: usize = 150;
pub const SURROUNDING_MIN_RADIUS: f32 = 2.0;
pub const SURROUNDING_MAX_RADIUS: f32 = 12.0;
pub const SURROUNDING_MIN_HEIGHT: f32 = 2.0;
pub const SURROUNDING_MAX_HEIGHT: f32 = WALL_HEIGHT - 4.0;
pub const BODY_DAMPING: f32 = 0.05;

// Contact materials
pub const FRICTION: f32 = 0.2;
pub const STATIC_RESTITUTION: f32 = 0.2;
pub const SPHERE_RESTITUTION: f32 = 0.3;

// Camera (top-down)
pub const CAMERA_EYE: [f32; 3] = [0.0, 15.0, 0.0];
pub const CAMERA_FOVY_DEG: f32 = 45.0;
