/// Tempo, in beats per minute, at which note lengths and consonant velocities need no scaling.
pub const REFERENCE_TEMPO: f64 = 125.0;

/// Converts a frequency in Hz to a (fractional) MIDI note value.
pub fn note_from_hz(hz: f64) -> f64 {
    69.0 + 12.0 * (hz / 440.0).log2()
}

/// Scales a note's velocity by the song tempo relative to the reference tempo.
pub fn consonant_velocity(velocity: i32, tempo: f64) -> f64 {
    velocity as f64 * (tempo / REFERENCE_TEMPO)
}

/// Converts a note length at the song tempo into the length requested from the resampler,
/// in ms. The extra millisecond keeps rounding in the resampler from cutting the note short.
pub fn scaled_length(note_length: f64, tempo: f64, start_point: f64) -> f64 {
    note_length * (REFERENCE_TEMPO / tempo) + start_point + 1.0
}

/// Formats a number the way the resampler expects it on the command line, always with a
/// fractional part (`100.0`, `-12.5`).
pub fn format_number(value: f64) -> String {
    format!("{value:?}")
}
