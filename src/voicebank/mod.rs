//! The voicebank model: which sample and timing to use for each lyric.

use crate::audio::{frq_path_for, FrequencyCurve};
use crate::engine::AnalysisJob;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub use data::{FrqStatus, LyricConfigData};
pub use lyric::{category_of, LyricConfig, LyricConfigError, MAIN_CATEGORY};
pub use oto::{parse_oto, OtoError, OtoLine, OTO_FILE_NAMES};

mod data;
mod lyric;
mod oto;

#[derive(Error, Debug)]
pub enum VoicebankError {
    #[error("Voicebank directory not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not scan voicebank: {0}")]
    Walk(#[from] walkdir::Error),
}

/// All lyric configurations of a voicebank, sorted and free of duplicates.
#[derive(Clone, Debug)]
pub struct Voicebank {
    root: PathBuf,
    configs: BTreeSet<LyricConfig>,
}

impl Voicebank {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            configs: BTreeSet::new(),
        }
    }

    /// Loads every configuration file found in the voicebank directory or below it.
    /// Bad lines are logged and skipped.
    ///
    /// Files are read as UTF-8. Bytes that are not valid UTF-8 become U+FFFD, so lyrics of
    /// Shift-JIS configs come out garbled.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, VoicebankError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(VoicebankError::NotFound(root));
        }
        let mut voicebank = Self::new(root);

        let oto_files = WalkDir::new(&voicebank.root)
            .sort_by_file_name()
            .into_iter()
            .filter_ok(|entry| entry.file_type().is_file())
            .filter_ok(|entry| is_oto_file(entry.path()))
            .map_ok(|entry| entry.into_path())
            .collect::<Result<Vec<_>, _>>()?;

        for path in oto_files {
            let bytes = std::fs::read(&path).map_err(|source| VoicebankError::Read {
                path: path.clone(),
                source,
            })?;
            let dir = path.parent().unwrap_or(&voicebank.root).to_path_buf();
            for err in voicebank.add_oto(&dir, &String::from_utf8_lossy(&bytes)) {
                warn!(path = %path.display(), "skipping config line: {err}");
            }
        }
        debug!(root = %voicebank.root.display(), entries = voicebank.len(), "loaded voicebank");
        Ok(voicebank)
    }

    /// Adds the entries of one configuration file located in `dir`, returning the lines that
    /// could not be used.
    pub fn add_oto(&mut self, dir: &Path, text: &str) -> Vec<OtoError> {
        let mut errors = vec![];
        for line in parse_oto(text) {
            let config = line.and_then(|line| {
                let path = dir.join(line.file_name);
                LyricConfig::from_fields(&self.root, &path, &line.lyric, &line.values).map_err(
                    |err| OtoError::BadEntry {
                        line: line.line,
                        message: err.to_string(),
                    },
                )
            });
            match config {
                Ok(config) => {
                    self.insert(config);
                }
                Err(err) => errors.push(err),
            }
        }
        errors
    }

    /// Adds an entry. Returns `false`, keeping the existing one, if an equal entry is present.
    pub fn insert(&mut self, config: LyricConfig) -> bool {
        if self.configs.contains(&config) {
            debug!(
                file = config.file_name(),
                lyric = config.true_lyric(),
                "duplicate lyric config"
            );
            return false;
        }
        self.configs.insert(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LyricConfig> {
        self.configs.iter()
    }

    /// Finds the entry for a lyric. When several samples share a lyric, the first in sort order
    /// wins.
    pub fn get(&self, lyric: &str) -> Option<&LyricConfig> {
        self.configs.iter().find(|config| config.true_lyric() == lyric)
    }

    /// Sorted names of all categories in use.
    pub fn categories(&self) -> Vec<String> {
        self.configs
            .iter()
            .map(|config| config.category())
            .sorted()
            .dedup()
            .collect()
    }

    /// Exports every entry, checking the frq file of each against the disk as it is now.
    pub fn lyric_data(&self) -> Vec<LyricConfigData> {
        self.configs
            .iter()
            .map(|config| config.data(frq_status(config)))
            .collect()
    }

    /// One analysis job for every sample whose frq file is missing or unreadable.
    pub fn missing_frq_jobs(&self, samples_per_frq: i32) -> Vec<AnalysisJob> {
        self.configs
            .iter()
            .map(|config| config.path_to_file())
            .unique()
            .filter(|wav| !has_frq(wav))
            .map(|wav| AnalysisJob::new(wav, frq_path_for(wav), samples_per_frq))
            .collect()
    }
}

/// Checks whether a config's sample currently has a usable frq file.
pub fn frq_status(config: &LyricConfig) -> FrqStatus {
    has_frq(config.path_to_file()).into()
}

fn has_frq(wav: &Path) -> bool {
    FrequencyCurve::read_file(&frq_path_for(wav)).is_ok()
}

fn is_oto_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    match OTO_FILE_NAMES.iter().position(|candidate| candidate.eq_ignore_ascii_case(name)) {
        // Only fall back to a later name when no earlier one sits next to it
        Some(i) => OTO_FILE_NAMES[..i]
            .iter()
            .all(|earlier| !path.with_file_name(earlier).is_file()),
        None => false,
    }
}
