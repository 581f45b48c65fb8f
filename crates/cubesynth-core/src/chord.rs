use crate::constants::CHORD_BAND_COUNT;
use crate::notes::{ChordShape, CHORD_SHAPES};

/// Band index (0..6) for a horizontal pointer position relative to the gesture origin.
///
/// The viewport is cut into six equal bands; the gesture origin sits in the
/// middle of band 3. Positions beyond either edge wrap around.
pub fn chord_band(screen_x: f32, gesture_origin_x: f32, viewport_width: f32) -> usize {
    if !(viewport_width > 0.0) || !screen_x.is_finite() || !gesture_origin_x.is_finite() {
        return 0;
    }
    let offset = screen_x - gesture_origin_x + viewport_width / 2.0;
    let band_width = viewport_width / CHORD_BAND_COUNT as f32;
    let band = (offset / band_width).floor() as i64;
    band.rem_euclid(CHORD_BAND_COUNT as i64) as usize
}

/// Pick the chord shape for the current pointer X. Pure and deterministic.
pub fn select_chord(screen_x: f32, gesture_origin_x: f32, viewport_width: f32) -> ChordShape {
    CHORD_SHAPES[chord_band(screen_x, gesture_origin_x, viewport_width)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::{AUGMENTED, MAJOR, SUS2, SUS4};

    #[test]
    fn origin_lands_in_band_three() {
        assert_eq!(chord_band(400.0, 400.0, 1200.0), 3);
        assert_eq!(select_chord(400.0, 400.0, 1200.0), AUGMENTED);
    }

    #[test]
    fn moving_right_walks_the_bands() {
        assert_eq!(select_chord(600.0, 400.0, 1200.0), SUS4);
        assert_eq!(select_chord(800.0, 400.0, 1200.0), SUS2);
        // 1000 - 400 + 600 = 1200 -> band 6 wraps to 0
        assert_eq!(select_chord(1000.0, 400.0, 1200.0), MAJOR);
    }

    #[test]
    fn negative_offsets_wrap() {
        // offset = -700 + 600 = -100 -> floor(-0.5) = -1 -> band 5
        assert_eq!(chord_band(0.0, 700.0, 1200.0), 5);
    }

    #[test]
    fn degenerate_viewport_falls_back_to_first_band() {
        assert_eq!(chord_band(10.0, 0.0, 0.0), 0);
        assert_eq!(chord_band(f32::NAN, 0.0, 800.0), 0);
    }
}
