//! Audio collaborator boundary and the session that owns it.
//!
//! Front-ends implement [`AudioEngine`] over their platform (WebAudio,
//! cpal). Everything in the core talks to audio through an explicit
//! [`AudioSession`] value passed by reference; there is no global context.
//!
//! Trigger calls are fire-and-forget. When the output device is not running
//! yet (browser autoplay policy) or the backend fails, the session logs and
//! drops the call so the simulation keeps going.

use crate::constants::MASTER_VOLUME_DB;
use crate::notes::Note;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    #[error("audio output is not active yet")]
    Unavailable,
    #[error("audio session has been disposed")]
    Disposed,
    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Operations the core needs from a polyphonic synthesizer. Volumes are in decibels.
pub trait AudioEngine {
    /// Start the output device (may require a prior user gesture on the web).
    fn resume(&mut self) -> Result<(), AudioError>;
    /// Tear down every voice and the output device.
    fn dispose(&mut self) -> Result<(), AudioError>;
    /// Master output level.
    fn set_volume(&mut self, volume_db: f32) -> Result<(), AudioError>;
    /// Start sustained voices for every note; they sound until `release_all`.
    fn attack(&mut self, notes: &[Note], volume_db: f32) -> Result<(), AudioError>;
    /// Short percussive note that releases itself after `duration`.
    fn attack_release(
        &mut self,
        note: Note,
        duration: Duration,
        volume_db: f32,
    ) -> Result<(), AudioError>;
    /// Release every sustained voice.
    fn release_all(&mut self) -> Result<(), AudioError>;
}

/// Start one voice per note into `held`. Voices started before a failure
/// stay in `held`, so `release_all` can still stop them.
pub fn start_voices<V>(
    notes: &[Note],
    held: &mut Vec<V>,
    mut start: impl FnMut(Note) -> Result<V, AudioError>,
) -> Result<(), AudioError> {
    for &note in notes {
        held.push(start(note)?);
    }
    Ok(())
}

/// Decibels to linear gain.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioState {
    Uninitialized,
    Suspended,
    Running,
    Disposed,
}

pub struct AudioSession<E: AudioEngine> {
    engine: E,
    state: AudioState,
    master_db: f32,
    held_voices: usize,
}

impl<E: AudioEngine> AudioSession<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: AudioState::Uninitialized,
            master_db: MASTER_VOLUME_DB,
            held_voices: 0,
        }
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == AudioState::Running
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn master_volume_db(&self) -> f32 {
        self.master_db
    }

    /// Number of sustained voices started since the last release.
    pub fn held_voices(&self) -> usize {
        self.held_voices
    }

    pub fn init(&mut self) -> Result<(), AudioError> {
        match self.state {
            AudioState::Disposed => Err(AudioError::Disposed),
            AudioState::Uninitialized => {
                self.state = AudioState::Suspended;
                log::info!("[audio] session initialized (suspended)");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Activate output. Must be called from a user gesture on the web.
    pub fn resume(&mut self) -> Result<(), AudioError> {
        self.init()?;
        if self.state == AudioState::Running {
            return Ok(());
        }
        self.engine.resume()?;
        self.state = AudioState::Running;
        log::info!("[audio] session running");
        let master = self.master_db;
        self.deliver("set_volume", |e| e.set_volume(master));
        Ok(())
    }

    pub fn dispose(&mut self) {
        if self.state == AudioState::Disposed {
            return;
        }
        if let Err(e) = self.engine.dispose() {
            log::warn!("[audio] dispose failed: {e}");
        }
        self.state = AudioState::Disposed;
        self.held_voices = 0;
        log::info!("[audio] session disposed");
    }

    /// Change the session (master) volume; it is also what `restore_volume` returns to.
    pub fn set_master_volume(&mut self, volume_db: f32) {
        self.master_db = volume_db;
        self.deliver("set_volume", |e| e.set_volume(volume_db));
    }

    /// Temporarily set the output level without touching the session volume.
    pub fn duck(&mut self, volume_db: f32) {
        self.deliver("set_volume", |e| e.set_volume(volume_db));
    }

    pub fn restore_volume(&mut self) {
        let master = self.master_db;
        self.deliver("set_volume", |e| e.set_volume(master));
    }

    pub fn attack(&mut self, notes: &[Note], volume_db: f32) {
        if notes.is_empty() {
            return;
        }
        if self.deliver("attack", |e| e.attack(notes, volume_db)) {
            self.held_voices += notes.len();
        }
    }

    pub fn attack_release(&mut self, note: Note, duration: Duration, volume_db: f32) {
        self.deliver("attack_release", |e| {
            e.attack_release(note, duration, volume_db)
        });
    }

    /// Release sustained voices. A no-op when nothing is held.
    pub fn release_all(&mut self) {
        if self.held_voices == 0 {
            return;
        }
        self.held_voices = 0;
        self.deliver("release_all", |e| e.release_all());
    }

    /// Forward a call to the engine when running; log and drop otherwise.
    fn deliver(
        &mut self,
        op: &str,
        call: impl FnOnce(&mut E) -> Result<(), AudioError>,
    ) -> bool {
        if self.state != AudioState::Running {
            log::debug!("[audio] {op} dropped: session {:?}", self.state);
            return false;
        }
        match call(&mut self.engine) {
            Ok(()) => true,
            Err(AudioError::Unavailable) => {
                log::debug!("[audio] {op} dropped: output not active");
                false
            }
            Err(e) => {
                log::warn!("[audio] {op} failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::MAJOR;

    #[derive(Default)]
    struct Counting {
        attacks: usize,
        releases: usize,
        volumes: Vec<f32>,
        offline: bool,
    }

    impl AudioEngine for Counting {
        fn resume(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
        fn dispose(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
        fn set_volume(&mut self, volume_db: f32) -> Result<(), AudioError> {
            self.volumes.push(volume_db);
            Ok(())
        }
        fn attack(&mut self, _notes: &[Note], _volume_db: f32) -> Result<(), AudioError> {
            if self.offline {
                return Err(AudioError::Unavailable);
            }
            self.attacks += 1;
            Ok(())
        }
        fn attack_release(&mut self, _: Note, _: Duration, _: f32) -> Result<(), AudioError> {
            Ok(())
        }
        fn release_all(&mut self) -> Result<(), AudioError> {
            self.releases += 1;
            Ok(())
        }
    }

    #[test]
    fn db_conversion() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn partial_chord_failure_keeps_started_voices() {
        let chord = MAJOR.notes(Note::LOWEST);
        let mut held = Vec::new();
        let result = start_voices(&chord, &mut held, |note| {
            if note.index() == 7 {
                Err(AudioError::Backend("oscillator".into()))
            } else {
                Ok(note)
            }
        });
        assert!(matches!(result, Err(AudioError::Backend(_))));
        assert_eq!(held, vec![Note::LOWEST, Note::new(4).unwrap()]);
    }

    #[test]
    fn calls_before_resume_are_dropped() {
        let mut s = AudioSession::new(Counting::default());
        s.attack(&[Note::LOWEST], -20.0);
        assert_eq!(s.engine().attacks, 0);
        assert_eq!(s.held_voices(), 0);
        s.resume().unwrap();
        s.attack(&[Note::LOWEST], -20.0);
        assert_eq!(s.engine().attacks, 1);
        assert_eq!(s.held_voices(), 1);
    }

    #[test]
    fn release_all_without_voices_is_noop() {
        let mut s = AudioSession::new(Counting::default());
        s.resume().unwrap();
        s.release_all();
        s.release_all();
        assert_eq!(s.engine().releases, 0);
    }

    #[test]
    fn backend_unavailable_is_swallowed() {
        let mut s = AudioSession::new(Counting {
            offline: true,
            ..Default::default()
        });
        s.resume().unwrap();
        s.attack(&[Note::LOWEST], -20.0);
        assert_eq!(s.held_voices(), 0);
        s.release_all();
        assert_eq!(s.engine().releases, 0);
    }

    #[test]
    fn duck_and_restore_keep_master() {
        let mut s = AudioSession::new(Counting::default());
        s.resume().unwrap();
        s.duck(-12.0);
        s.restore_volume();
        assert_eq!(s.master_volume_db(), MASTER_VOLUME_DB);
        assert_eq!(
            s.engine().volumes,
            vec![MASTER_VOLUME_DB, -12.0, MASTER_VOLUME_DB]
        );
    }

    #[test]
    fn disposed_session_cannot_resume() {
        let mut s = AudioSession::new(Counting::default());
        s.resume().unwrap();
        s.dispose();
        assert_eq!(s.state(), AudioState::Disposed);
        assert_eq!(s.resume(), Err(AudioError::Disposed));
    }
}
