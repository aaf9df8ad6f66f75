use crate::note::Note;
use serde::{Deserialize, Serialize};

/// The song-wide state the resampler needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Song {
    /// Tempo in beats per minute.
    pub tempo: f64,
    /// Resampler flags applied to every note without flags of its own.
    pub flags: String,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            tempo: 125.0,
            flags: String::new(),
        }
    }
}

impl Song {
    pub fn new(tempo: f64, flags: impl Into<String>) -> Self {
        Self {
            tempo,
            flags: flags.into(),
        }
    }

    /// Flags to pass for a note: the note's own flags replace the song's entirely.
    pub fn effective_flags<'a>(&'a self, note: &'a SongNote) -> &'a str {
        if note.flags.is_empty() {
            &self.flags
        } else {
            &note.flags
        }
    }
}

/// A single note of a song, as far as rendering is concerned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongNote {
    #[serde(with = "note_number")]
    pub note: Note,
    pub velocity: i32,
    pub intensity: i32,
    pub modulation: i32,
    /// Per-note resampler flags. Empty means "use the song's flags".
    pub flags: String,
    /// Manual adjustment of where the sample starts, in ms.
    pub start_point: f64,
    /// Start point adjustment computed from the neighbouring notes, in ms.
    pub auto_start_point: f64,
}

impl Default for SongNote {
    fn default() -> Self {
        Self {
            note: Note::middle_c(),
            velocity: 100,
            intensity: 100,
            modulation: 0,
            flags: String::new(),
            start_point: 0.0,
            auto_start_point: 0.0,
        }
    }
}

impl SongNote {
    pub fn new(note_num: u8) -> Self {
        Self {
            note: Note(note_num),
            ..Default::default()
        }
    }

    pub fn total_start_point(&self) -> f64 {
        self.start_point + self.auto_start_point
    }
}

mod note_number {
    use crate::note::Note;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(note: &Note, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(note.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Note, D::Error> {
        u8::deserialize(deserializer).map(Note)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_note_flags_take_precedence() {
        let song = Song::new(125.0, "g10");
        let note = SongNote {
            flags: "B5".to_string(),
            ..SongNote::new(60)
        };
        assert_eq!(song.effective_flags(&note), "B5");
        assert_eq!(song.effective_flags(&SongNote::new(60)), "g10");
    }

    #[test]
    fn test_start_point() {
        let note = SongNote {
            start_point: 10.0,
            auto_start_point: -2.5,
            ..SongNote::new(60)
        };
        assert_eq!(note.total_start_point(), 7.5);
    }

    #[test]
    fn test_deserialize_defaults() {
        let note: SongNote = serde_json::from_str(r#"{"note": 62, "velocity": 80}"#).unwrap();
        assert_eq!(note.note, Note(62));
        assert_eq!(note.velocity, 80);
        assert_eq!(note.intensity, 100);
    }
}
