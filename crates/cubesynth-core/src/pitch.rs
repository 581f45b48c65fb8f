use crate::constants::PITCH_STEP_PX;
use crate::notes::Note;

/// Map accumulated vertical drag distance to a note of the table.
///
/// Only the magnitude counts: dragging up or down by the same amount yields
/// the same note, and every 50 px of travel climbs one semitone until B5.
pub fn map_vertical_delta(delta_y: f32) -> Note {
    if !delta_y.is_finite() {
        return if delta_y.is_nan() { Note::LOWEST } else { Note::HIGHEST };
    }
    let raw = (delta_y.abs() / PITCH_STEP_PX).floor() as i64;
    Note::clamped(raw)
}
