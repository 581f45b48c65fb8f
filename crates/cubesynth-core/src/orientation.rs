use crate::audio::{AudioEngine, AudioSession};
use crate::constants::{
    CHORD_NOTE_VOLUME_DB, ORIENTATION_COOLDOWN, ORIENTATION_FORCE_FLOOR, ORIENTATION_FORCE_SCALE,
    ORIENTATION_NOTE_DURATION,
};
use crate::cooldown::Cooldown;
use crate::notes::Note;
use crate::physics::{BodyHandle, PhysicsWorld};
use glam::Vec3;
use instant::Instant;

/// Device tilt as a secondary input: pushes the draggable body and, at most
/// every 200 ms, plucks the current chord. Runs on its own cooldown channel.
pub struct OrientationInput {
    enabled: bool,
    cooldown: Cooldown,
}

impl Default for OrientationInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Force for a tilt reading: gamma (left/right) drives X, beta (front/back) drives Z.
pub fn tilt_force(beta_deg: f32, gamma_deg: f32) -> Vec3 {
    Vec3::new(
        gamma_deg * ORIENTATION_FORCE_SCALE,
        0.0,
        beta_deg * ORIENTATION_FORCE_SCALE,
    )
}

impl OrientationInput {
    pub fn new() -> Self {
        Self {
            enabled: false,
            cooldown: Cooldown::new(ORIENTATION_COOLDOWN),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            log::info!("[orientation] {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Apply one tilt reading. Returns whether the chord was played.
    #[allow(clippy::too_many_arguments)]
    pub fn apply<W: PhysicsWorld, E: AudioEngine>(
        &mut self,
        beta_deg: f32,
        gamma_deg: f32,
        now: Instant,
        world: &mut W,
        body: BodyHandle,
        chord: &[Note],
        audio: &mut AudioSession<E>,
    ) -> bool {
        if !self.enabled || !beta_deg.is_finite() || !gamma_deg.is_finite() {
            return false;
        }
        let force = tilt_force(beta_deg, gamma_deg);
        if let Err(e) = world.apply_force(body, force) {
            log::warn!("[orientation] cannot push {body}: {e}");
            return false;
        }
        if force.length() <= ORIENTATION_FORCE_FLOOR || !self.cooldown.try_fire(now) {
            return false;
        }
        for &note in chord {
            audio.attack_release(note, ORIENTATION_NOTE_DURATION, CHORD_NOTE_VOLUME_DB);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilt_maps_gamma_to_x_and_beta_to_z() {
        let f = tilt_force(10.0, -20.0);
        assert_eq!(f, Vec3::new(-2.0, 0.0, 1.0));
    }

    #[test]
    fn disabled_by_default() {
        assert!(!OrientationInput::new().enabled());
    }
}
