use std::sync::OnceLock;

use crate::util::note_from_hz;

/// A MIDI-style note number, named the way voicebank samples are (`60` is `C4`).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Note(pub u8);

impl From<u8> for Note {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::fmt::Debug for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Note {
    pub fn middle_c() -> Self {
        Self(60)
    }

    /// The note closest to the given frequency, if it is inside the MIDI range.
    pub fn nearest(hz: f64) -> Option<Self> {
        let note = note_from_hz(hz).round();
        (0.0..=127.0).contains(&note).then(|| Self(note as u8))
    }

    pub fn name(&self) -> &'static str {
        note_name(self.0)
    }
}

impl std::str::FromStr for Note {
    type Err = String;

    /// Parses either a note name such as `C#4` or a plain note number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(num) = s.parse::<u8>() {
            return (num <= 127)
                .then_some(Self(num))
                .ok_or_else(|| format!("note number out of range: {num}"));
        }
        (0..=127u8)
            .map(Note)
            .find(|note| note.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown note: {s}"))
    }
}

fn note_name(note: u8) -> &'static str {
    static NOTE_NAMES: OnceLock<[&str; 128]> = OnceLock::new();

    let names = NOTE_NAMES.get_or_init(|| {
        let octaves = ["-1", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
        let notes = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
        let names: Vec<&'static str> = octaves
            .iter()
            .flat_map(|octave| notes.iter().map(move |note| format!("{note}{octave}")))
            .take(128)
            .map(|name| &*name.leak())
            .collect();
        core::array::from_fn(|i| names[i])
    });

    names[note.min(127) as usize]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_note_names() {
        assert_eq!(Note(60).name(), "C4");
        assert_eq!(Note(61).name(), "C#4");
        assert_eq!(Note(69).name(), "A4");
        assert_eq!(Note(0).name(), "C-1");
        assert_eq!(Note(127).name(), "G9");
        assert_eq!(Note::middle_c().to_string(), "C4");
    }

    #[test]
    fn test_parse() {
        assert_eq!("C4".parse::<Note>(), Ok(Note(60)));
        assert_eq!("a#3".parse::<Note>(), Ok(Note(58)));
        assert_eq!("72".parse::<Note>(), Ok(Note(72)));
        assert!("H4".parse::<Note>().is_err());
        assert!("200".parse::<Note>().is_err());
    }

    #[test]
    fn test_nearest() {
        assert_eq!(Note::nearest(440.0), Some(Note(69)));
        assert_eq!(Note::nearest(261.0), Some(Note(60)));
        assert_eq!(Note::nearest(0.0), None);
    }
}
