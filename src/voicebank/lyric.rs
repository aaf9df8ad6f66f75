use super::data::{FrqStatus, LyricConfigData};
use std::cmp::Ordering;
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Category of samples stored directly in the voicebank directory.
pub const MAIN_CATEGORY: &str = "Main";

/// Number of timing values in a configuration entry.
pub const CONFIG_VALUE_COUNT: usize = 5;

/// How a single lyric maps onto a voicebank sample.
#[derive(Clone, Debug)]
pub struct LyricConfig {
    /// Location of the sample, e.g. `/voicebanks/Iona/C3/de.wav`.
    path_to_file: PathBuf,
    /// Sample path relative to the voicebank, e.g. `C3/de.wav`.
    file_name: String,
    /// e.g. `de`
    true_lyric: String,
    /// Time in the sample before the note starts, in ms.
    offset: f64,
    /// Time in the sample before the consonant ends, in ms.
    consonant: f64,
    /// Where playback of the sample ends, in ms. The resampler decides what the sign means.
    cutoff: f64,
    /// Number of ms played before the note officially starts.
    preutterance: f64,
    /// Number of ms shared with the previous note.
    overlap: f64,
}

#[derive(Error, Debug)]
pub enum LyricConfigError {
    #[error("{} is not inside voicebank {}", file.display(), voicebank.display())]
    OutsideVoicebank { file: PathBuf, voicebank: PathBuf },
    #[error("Bad config value {value:?}: {source}")]
    BadValue {
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

impl LyricConfig {
    /// Builds a config from the raw text fields of a configuration file. Blank fields read as 0.
    ///
    /// # Panics
    /// If `fields` does not hold exactly five values.
    pub fn from_fields(
        voicebank: &Path,
        path_to_file: &Path,
        true_lyric: &str,
        fields: &[&str],
    ) -> Result<Self, LyricConfigError> {
        assert_eq!(
            fields.len(),
            CONFIG_VALUE_COUNT,
            "a lyric config needs exactly {CONFIG_VALUE_COUNT} values"
        );
        let file_name = relative_file_name(voicebank, path_to_file)?;
        let values = fields
            .iter()
            .map(|field| parse_value(field))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(voicebank, true_lyric, &file_name, &values))
    }

    /// Builds a config from already-parsed values.
    ///
    /// # Panics
    /// If `values` does not hold exactly five values.
    pub fn new(voicebank: &Path, true_lyric: &str, file_name: &str, values: &[f64]) -> Self {
        assert_eq!(
            values.len(),
            CONFIG_VALUE_COUNT,
            "a lyric config needs exactly {CONFIG_VALUE_COUNT} values"
        );
        let [offset, consonant, cutoff, preutterance, overlap] = [
            values[0], values[1], values[2], values[3], values[4],
        ];
        Self {
            path_to_file: voicebank.join(file_name),
            file_name: file_name.to_string(),
            true_lyric: true_lyric.to_string(),
            offset,
            consonant,
            cutoff,
            preutterance,
            overlap,
        }
    }

    /// Rebuilds a config from its exported form.
    pub fn from_data(voicebank: &Path, data: &LyricConfigData) -> Self {
        Self::new(
            voicebank,
            &data.true_lyric,
            &data.file_name,
            &data.config_values(),
        )
    }

    /// Exports this config along with the current state of its frequency curve.
    pub fn data(&self, frq_status: FrqStatus) -> LyricConfigData {
        LyricConfigData {
            path_to_file: self.path_to_file.clone(),
            category: self.category(),
            true_lyric: self.true_lyric.clone(),
            file_name: self.file_name.clone(),
            frq_status,
            offset: self.offset,
            consonant: self.consonant,
            cutoff: self.cutoff,
            preutterance: self.preutterance,
            overlap: self.overlap,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn consonant(&self) -> f64 {
        self.consonant
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn preutterance(&self) -> f64 {
        self.preutterance
    }

    pub fn overlap(&self) -> f64 {
        self.overlap
    }

    pub fn path_to_file(&self) -> &Path {
        &self.path_to_file
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn true_lyric(&self) -> &str {
        &self.true_lyric
    }

    /// The directory the sample sits in, or [`MAIN_CATEGORY`] for the voicebank root.
    pub fn category(&self) -> String {
        category_of(&self.file_name)
    }

    fn sort_key(&self) -> impl Iterator<Item = u8> + '_ {
        self.file_name.bytes().chain(self.true_lyric.bytes())
    }
}

/// Returns the category of a sample from its path relative to the voicebank.
pub fn category_of(file_name: &str) -> String {
    match file_name.replace('\\', "/").rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => parent.to_string(),
        _ => MAIN_CATEGORY.to_string(),
    }
}

fn relative_file_name(voicebank: &Path, path_to_file: &Path) -> Result<String, LyricConfigError> {
    let relative = path_to_file
        .strip_prefix(voicebank)
        .map_err(|_| LyricConfigError::OutsideVoicebank {
            file: path_to_file.to_path_buf(),
            voicebank: voicebank.to_path_buf(),
        })?;
    let parts: Vec<_> = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect();
    Ok(parts.join("/"))
}

fn parse_value(field: &str) -> Result<f64, LyricConfigError> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(0.0);
    }
    field.parse().map_err(|source| LyricConfigError::BadValue {
        value: field.to_string(),
        source,
    })
}

impl std::fmt::Display for LyricConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.path_to_file.display(),
            self.offset,
            self.consonant,
            self.cutoff,
            self.preutterance,
            self.overlap
        )
    }
}

impl PartialEq for LyricConfig {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LyricConfig {}

impl PartialOrd for LyricConfig {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LyricConfig {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(other.sort_key())
    }
}
