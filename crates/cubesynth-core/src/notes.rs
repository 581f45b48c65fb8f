//! Fixed note space: a two-octave chromatic table and six chord shapes.
//!
//! Both tables are process-wide constants. A [`Note`] is identified purely by
//! its index into [`NOTE_NAMES`]; chord shapes are semitone offsets from a
//! root and wrap around the table when they run past the top.

use crate::constants::{BASE_MIDI, NOTE_COUNT};
use smallvec::SmallVec;
use std::fmt;

/// Scientific pitch names for every entry of the note table (C4..B5).
pub const NOTE_NAMES: [&str; NOTE_COUNT] = [
    "C4", "C#4", "D4", "D#4", "E4", "F4", "F#4", "G4", "G#4", "A4", "A#4", "B4", //
    "C5", "C#5", "D5", "D#5", "E5", "F5", "F#5", "G5", "G#5", "A5", "A#5", "B5",
];

/// An entry of the note table. Always a valid index in `0..NOTE_COUNT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Note(u8);

impl Note {
    pub const LOWEST: Note = Note(0);
    pub const HIGHEST: Note = Note(NOTE_COUNT as u8 - 1);

    /// Returns `None` for indices outside the table.
    pub fn new(index: usize) -> Option<Self> {
        (index < NOTE_COUNT).then_some(Note(index as u8))
    }

    /// Clamp an arbitrary (possibly negative) index into the table.
    pub fn clamped(index: i64) -> Self {
        Note(index.clamp(0, NOTE_COUNT as i64 - 1) as u8)
    }

    /// Wrap an index around the table (used for chord tones past B5).
    pub fn wrapped(index: usize) -> Self {
        Note((index % NOTE_COUNT) as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.index()]
    }

    pub fn midi(self) -> i32 {
        BASE_MIDI + self.0 as i32
    }

    pub fn frequency_hz(self) -> f32 {
        midi_to_hz(self.midi() as f32)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named interval set measured in semitones from the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChordShape {
    pub name: &'static str,
    pub intervals: [usize; 3],
}

pub const MAJOR: ChordShape = ChordShape {
    name: "major",
    intervals: [0, 4, 7],
};
pub const MINOR: ChordShape = ChordShape {
    name: "minor",
    intervals: [0, 3, 7],
};
pub const DIMINISHED: ChordShape = ChordShape {
    name: "diminished",
    intervals: [0, 3, 6],
};
pub const AUGMENTED: ChordShape = ChordShape {
    name: "augmented",
    intervals: [0, 4, 8],
};
pub const SUS4: ChordShape = ChordShape {
    name: "sus4",
    intervals: [0, 5, 7],
};
pub const SUS2: ChordShape = ChordShape {
    name: "sus2",
    intervals: [0, 2, 7],
};

/// Band order used by the chord selector, left to right.
pub const CHORD_SHAPES: [ChordShape; 6] = [MAJOR, MINOR, DIMINISHED, AUGMENTED, SUS4, SUS2];

/// Notes of a chord, root first.
pub type ChordNotes = SmallVec<[Note; 3]>;

impl ChordShape {
    /// Spell the chord on `root`, wrapping tones that fall past the table.
    pub fn notes(&self, root: Note) -> ChordNotes {
        self.intervals
            .iter()
            .map(|interval| Note::wrapped(root.index() + interval))
            .collect()
    }
}

/// Convert a MIDI note number to Hertz (A4=440 Hz).
pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_spans_two_octaves() {
        assert_eq!(Note::LOWEST.name(), "C4");
        assert_eq!(Note::HIGHEST.name(), "B5");
        assert_eq!(Note::new(12).map(Note::name), Some("C5"));
        assert!(Note::new(NOTE_COUNT).is_none());
    }

    #[test]
    fn a4_is_440() {
        let a4 = Note::new(9).unwrap();
        assert_eq!(a4.name(), "A4");
        assert!((a4.frequency_hz() - 440.0).abs() < 1e-3);
        let c4 = Note::LOWEST.frequency_hz();
        assert!((c4 - 261.63).abs() < 0.01);
    }

    #[test]
    fn clamped_saturates_at_both_ends() {
        assert_eq!(Note::clamped(-5), Note::LOWEST);
        assert_eq!(Note::clamped(400), Note::HIGHEST);
        assert_eq!(Note::clamped(7).index(), 7);
    }

    #[test]
    fn chord_tones_wrap_past_the_top() {
        let b5 = Note::HIGHEST;
        let notes = MAJOR.notes(b5);
        let names: Vec<_> = notes.iter().map(|n| n.name()).collect();
        assert_eq!(names, ["B5", "D#4", "F#4"]);
    }

    #[test]
    fn major_on_c4() {
        let names: Vec<_> = MAJOR.notes(Note::LOWEST).iter().map(|n| n.name()).collect();
        assert_eq!(names, ["C4", "E4", "G4"]);
    }
}
