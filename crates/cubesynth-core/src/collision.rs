use crate::audio::{AudioEngine, AudioSession};
use crate::constants::{
    COLLISION_COOLDOWN, IMPACT_NOTE_DURATION, IMPACT_NOTE_SCALE, IMPACT_SPEED_FLOOR,
    IMPACT_VOLUME_BASE_DB, IMPACT_VOLUME_DB_PER_SPEED,
};
use crate::cooldown::Cooldown;
use crate::notes::Note;
use crate::physics::{ContactBegin, PhysicsWorld};
use instant::Instant;

/// A percussive hit that was sent to the audio session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpactSound {
    pub speed: f32,
    pub note: Note,
    pub volume_db: f32,
}

impl ImpactSound {
    pub fn from_speed(speed: f32) -> Self {
        Self {
            speed,
            note: Note::clamped((speed * IMPACT_NOTE_SCALE).floor() as i64),
            volume_db: (IMPACT_VOLUME_BASE_DB + speed * IMPACT_VOLUME_DB_PER_SPEED)
                .clamp(IMPACT_VOLUME_BASE_DB, 0.0),
        }
    }
}

/// Turns contact-begin events into rate-limited percussion.
///
/// One cooldown is shared by every pair of bodies: close collisions are
/// dropped rather than queued so 150 bodies stay audible as individual hits.
pub struct CollisionSoundTrigger {
    cooldown: Cooldown,
}

impl Default for CollisionSoundTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionSoundTrigger {
    pub fn new() -> Self {
        Self {
            cooldown: Cooldown::new(COLLISION_COOLDOWN),
        }
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    pub fn on_contact<W: PhysicsWorld, E: AudioEngine>(
        &mut self,
        contact: &ContactBegin,
        world: &W,
        now: Instant,
        audio: &mut AudioSession<E>,
    ) -> Option<ImpactSound> {
        let movable = |body| matches!(world.mass(body), Ok(m) if m > 0.0);
        if !movable(contact.body_a) || !movable(contact.body_b) {
            return None;
        }
        let speed = (contact.velocity_a - contact.velocity_b).length();
        if !(speed > IMPACT_SPEED_FLOOR) {
            return None;
        }
        if !self.cooldown.try_fire(now) {
            return None;
        }
        let sound = ImpactSound::from_speed(speed);
        log::debug!(
            "[collision] {} x {} speed={:.2} -> {} @ {:.1}dB",
            contact.body_a,
            contact.body_b,
            speed,
            sound.note,
            sound.volume_db
        );
        audio.attack_release(sound.note, IMPACT_NOTE_DURATION, sound.volume_db);
        Some(sound)
    }
}
