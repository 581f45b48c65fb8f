//! Polyphonic triangle synth mixed on the audio callback thread.
//!
//! The state lives behind `Arc<Mutex<..>>`; the main thread pushes voices
//! and the cpal callback pulls samples with [`SynthState::next_sample`].

use std::f32::consts::TAU;
use std::time::Duration;

const ATTACK_SEC: f32 = 0.005;
const RELEASE_SEC: f32 = 0.3;
const MASTER_GLIDE_SEC: f32 = 0.02;
const MAX_VOICES: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    Attack,
    Sustain,
    Release { from: f32 },
}

#[derive(Clone, Debug)]
struct Voice {
    phase: f32,
    phase_inc: f32,
    peak: f32,
    stage: Stage,
    /// Samples spent in the current stage.
    n: u32,
    /// Sustained voices stop only on `release_all`; percussive ones after this many samples.
    hold_samples: Option<u32>,
}

impl Voice {
    fn level(&self, attack: u32, release: u32) -> f32 {
        match self.stage {
            Stage::Attack => self.peak * (self.n as f32 / attack.max(1) as f32).min(1.0),
            Stage::Sustain => self.peak,
            Stage::Release { from } => {
                from * (1.0 - self.n as f32 / release.max(1) as f32).max(0.0)
            }
        }
    }
}

#[inline]
fn triangle(phase: f32) -> f32 {
    let t = phase / TAU;
    1.0 - 4.0 * (t - 0.5).abs()
}

pub struct SynthState {
    sample_rate: f32,
    attack_samples: u32,
    release_samples: u32,
    master: f32,
    master_target: f32,
    master_step: f32,
    voices: Vec<Voice>,
}

impl SynthState {
    pub fn new(sample_rate: f32) -> Self {
        let sr = sample_rate.max(1.0);
        Self {
            sample_rate: sr,
            attack_samples: (ATTACK_SEC * sr) as u32,
            release_samples: (RELEASE_SEC * sr) as u32,
            master: 1.0,
            master_target: 1.0,
            master_step: 1.0 / (MASTER_GLIDE_SEC * sr).max(1.0),
            voices: Vec::new(),
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn sustained_count(&self) -> usize {
        self.voices
            .iter()
            .filter(|v| v.hold_samples.is_none() && !matches!(v.stage, Stage::Release { .. }))
            .count()
    }

    pub fn set_master(&mut self, gain: f32) {
        self.master_target = gain.max(0.0);
    }

    fn push(&mut self, frequency_hz: f32, peak: f32, hold_samples: Option<u32>) {
        if self.voices.len() >= MAX_VOICES {
            // steal the quietest-to-be: the oldest releasing voice, else the oldest
            let idx = self
                .voices
                .iter()
                .position(|v| matches!(v.stage, Stage::Release { .. }))
                .unwrap_or(0);
            self.voices.remove(idx);
        }
        self.voices.push(Voice {
            phase: 0.0,
            phase_inc: TAU * frequency_hz / self.sample_rate,
            peak,
            stage: Stage::Attack,
            n: 0,
            hold_samples,
        });
    }

    pub fn attack(&mut self, frequencies_hz: &[f32], peak: f32) {
        for &f in frequencies_hz {
            self.push(f, peak, None);
        }
    }

    pub fn attack_release(&mut self, frequency_hz: f32, duration: Duration, peak: f32) {
        let hold = (duration.as_secs_f32() * self.sample_rate) as u32;
        self.push(frequency_hz, peak, Some(hold.max(1)));
    }

    pub fn release_all(&mut self) {
        let (attack, release) = (self.attack_samples, self.release_samples);
        for v in self.voices.iter_mut().filter(|v| v.hold_samples.is_none()) {
            if !matches!(v.stage, Stage::Release { .. }) {
                let from = v.level(attack, release);
                v.stage = Stage::Release { from };
                v.n = 0;
            }
        }
    }

    pub fn clear(&mut self) {
        self.voices.clear();
    }

    /// One mono sample; finished voices are dropped.
    pub fn next_sample(&mut self) -> f32 {
        let (attack, release) = (self.attack_samples, self.release_samples);
        let mut out = 0.0;
        let mut i = 0;
        while i < self.voices.len() {
            let v = &mut self.voices[i];
            out += triangle(v.phase) * v.level(attack, release);
            v.phase = (v.phase + v.phase_inc) % TAU;
            v.n += 1;

            let percussive_done = match (v.stage, v.hold_samples) {
                (Stage::Release { .. }, _) => false,
                (_, Some(hold)) => {
                    // hold counts from note start, attack included
                    let elapsed = if v.stage == Stage::Attack { v.n } else { v.n + attack };
                    elapsed >= hold
                }
                _ => false,
            };
            match v.stage {
                Stage::Attack if v.n >= attack => {
                    v.stage = Stage::Sustain;
                    v.n = 0;
                }
                Stage::Release { .. } if v.n >= release => {
                    self.voices.swap_remove(i);
                    continue;
                }
                _ => {}
            }
            if percussive_done {
                let from = v.level(attack, release);
                v.stage = Stage::Release { from };
                v.n = 0;
            }
            i += 1;
        }

        if self.master != self.master_target {
            let d = self.master_target - self.master;
            self.master += d.clamp(-self.master_step, self.master_step);
        }
        (out * self.master).tanh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(s: &mut SynthState, samples: usize) -> f32 {
        (0..samples).map(|_| s.next_sample().abs()).fold(0.0, f32::max)
    }

    #[test]
    fn silent_without_voices() {
        let mut s = SynthState::new(48_000.0);
        assert_eq!(run(&mut s, 512), 0.0);
    }

    #[test]
    fn sustained_chord_holds_until_released() {
        let mut s = SynthState::new(48_000.0);
        s.attack(&[261.63, 329.63, 392.0], 0.1);
        assert!(run(&mut s, 48_000) > 0.05);
        assert_eq!(s.voice_count(), 3);
        assert_eq!(s.sustained_count(), 3);

        s.release_all();
        assert_eq!(s.sustained_count(), 0);
        run(&mut s, (RELEASE_SEC * 48_000.0) as usize + 10);
        assert_eq!(s.voice_count(), 0);
    }

    #[test]
    fn percussive_note_ends_by_itself() {
        let mut s = SynthState::new(10_000.0);
        s.attack_release(440.0, Duration::from_millis(200), 0.5);
        assert!(run(&mut s, 1_000) > 0.1);
        // 200 ms hold + 300 ms release
        run(&mut s, 4_100);
        assert_eq!(s.voice_count(), 0);
    }

    #[test]
    fn release_all_leaves_percussion_alone() {
        let mut s = SynthState::new(10_000.0);
        s.attack(&[220.0], 0.1);
        s.attack_release(440.0, Duration::from_secs(1), 0.1);
        s.release_all();
        run(&mut s, 3_100);
        assert_eq!(s.voice_count(), 1);
    }

    #[test]
    fn master_glides_to_target() {
        let mut s = SynthState::new(1_000.0);
        s.attack(&[50.0], 0.5);
        run(&mut s, 100);
        s.set_master(0.0);
        run(&mut s, 100);
        assert_eq!(run(&mut s, 100), 0.0);
    }

    #[test]
    fn voice_count_is_bounded() {
        let mut s = SynthState::new(48_000.0);
        for _ in 0..MAX_VOICES + 10 {
            s.attack(&[440.0], 0.01);
        }
        assert_eq!(s.voice_count(), MAX_VOICES);
    }

    #[test]
    fn triangle_shape() {
        assert!((triangle(0.0) + 1.0).abs() < 1e-6);
        assert!((triangle(TAU * 0.5) - 1.0).abs() < 1e-6);
        assert!(triangle(TAU * 0.25).abs() < 1e-6);
    }
}
