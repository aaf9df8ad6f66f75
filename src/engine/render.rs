use super::path_arg;
use crate::song::{Song, SongNote};
use crate::util::{consonant_velocity, format_number, scaled_length};
use crate::voicebank::LyricConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stand-in for an empty flag string; the resampler's flag argument cannot be blank.
pub const NO_FLAGS: &str = "?";

#[derive(Error, Debug, PartialEq)]
pub enum RenderError {
    #[error("Cannot build render job: no {0}")]
    Missing(&'static str),
    #[error("Invalid song tempo: {0}")]
    InvalidTempo(f64),
}

/// The arguments for rendering one note, in the resampler's positional order.
#[derive(Clone, Debug, PartialEq)]
pub struct ResampleParams {
    pub input: PathBuf,
    pub output: PathBuf,
    pub pitch: String,
    pub consonant_velocity: f64,
    pub flags: String,
    pub offset: f64,
    pub length: f64,
    pub consonant_length: f64,
    pub cutoff: f64,
    pub intensity: i32,
    pub modulation: i32,
    pub tempo: f64,
    pub pitch_bends: String,
}

impl ResampleParams {
    pub fn to_args(&self) -> Vec<String> {
        vec![
            path_arg(&self.input),
            path_arg(&self.output),
            self.pitch.clone(),
            format_number(self.consonant_velocity),
            self.flags.clone(),
            format_number(self.offset),
            format_number(self.length),
            format_number(self.consonant_length),
            format_number(self.cutoff),
            self.intensity.to_string(),
            self.modulation.to_string(),
            format!("T{}", format_number(self.tempo)),
            self.pitch_bends.clone(),
        ]
    }
}

/// The arguments for rendering a stretch of silence between notes.
#[derive(Clone, Debug, PartialEq)]
pub struct SilenceParams {
    /// Reference sample that holds nothing but silence.
    pub input: PathBuf,
    pub output: PathBuf,
    /// Requested length in ms, already padded.
    pub length: f64,
}

impl SilenceParams {
    /// Silence of `duration` ms, plus the same extra millisecond notes get.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            length: duration + 1.0,
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        vec![
            path_arg(&self.input),
            path_arg(&self.output),
            "C4".to_string(),
            "100".to_string(),
            NO_FLAGS.to_string(),
            "0".to_string(),
            format_number(self.length),
            "0".to_string(),
            "0".to_string(),
            "100".to_string(),
            "0".to_string(),
        ]
    }
}

/// A single resampler invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderJob {
    Note(ResampleParams),
    Silence(SilenceParams),
}

impl RenderJob {
    pub fn output(&self) -> &Path {
        match self {
            RenderJob::Note(params) => &params.output,
            RenderJob::Silence(params) => &params.output,
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        match self {
            RenderJob::Note(params) => params.to_args(),
            RenderJob::Silence(params) => params.to_args(),
        }
    }
}

/// Collects what is needed to render one note and turns it into [`ResampleParams`].
///
/// Note-level tempo changes are not applied; the song tempo is always used.
pub struct RenderParameterBuilder<'a> {
    song: &'a Song,
    note: &'a SongNote,
    config: Option<&'a LyricConfig>,
    note_length: Option<f64>,
    pitch_bends: Option<&'a str>,
    output: Option<&'a Path>,
}

impl<'a> RenderParameterBuilder<'a> {
    pub fn new(song: &'a Song, note: &'a SongNote) -> Self {
        Self {
            song,
            note,
            config: None,
            note_length: None,
            pitch_bends: None,
            output: None,
        }
    }

    /// The voicebank entry matched to the note's lyric.
    pub fn lyric_config(mut self, config: &'a LyricConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Rendered duration of the note, in ms at the song tempo.
    pub fn note_length(mut self, ms: f64) -> Self {
        self.note_length = Some(ms);
        self
    }

    /// Already encoded pitch bend string; passed through untouched.
    pub fn pitch_bends(mut self, pitch_bends: &'a str) -> Self {
        self.pitch_bends = Some(pitch_bends);
        self
    }

    pub fn output(mut self, output: &'a Path) -> Self {
        self.output = Some(output);
        self
    }

    pub fn build(self) -> Result<ResampleParams, RenderError> {
        let config = self.config.ok_or(RenderError::Missing("lyric config"))?;
        let note_length = self.note_length.ok_or(RenderError::Missing("note length"))?;
        let pitch_bends = self.pitch_bends.ok_or(RenderError::Missing("pitch bends"))?;
        let output = self.output.ok_or(RenderError::Missing("output file"))?;
        let tempo = self.song.tempo;
        if !(tempo.is_finite() && tempo > 0.0) {
            return Err(RenderError::InvalidTempo(tempo));
        }

        let flags = self.song.effective_flags(self.note);
        Ok(ResampleParams {
            input: config.path_to_file().to_path_buf(),
            output: output.to_path_buf(),
            pitch: self.note.note.name().to_string(),
            consonant_velocity: consonant_velocity(self.note.velocity, tempo),
            flags: if flags.is_empty() { NO_FLAGS } else { flags }.to_string(),
            offset: config.offset(),
            length: scaled_length(note_length, tempo, self.note.total_start_point()),
            consonant_length: config.consonant(),
            // The sign carries meaning for the resampler, so it is never normalized
            cutoff: config.cutoff(),
            intensity: self.note.intensity,
            modulation: self.note.modulation,
            tempo,
            pitch_bends: pitch_bends.to_string(),
        })
    }
}
