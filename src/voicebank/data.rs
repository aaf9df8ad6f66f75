use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether a sample has a usable frequency curve next to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrqStatus {
    Valid,
    Invalid,
}

impl FrqStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrqStatus::Valid => "VALID",
            FrqStatus::Invalid => "INVALID",
        }
    }
}

impl From<bool> for FrqStatus {
    fn from(has_frq: bool) -> Self {
        if has_frq {
            FrqStatus::Valid
        } else {
            FrqStatus::Invalid
        }
    }
}

impl std::fmt::Display for FrqStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain, serializable view of a lyric configuration, as handed to editors and exported to disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricConfigData {
    pub path_to_file: PathBuf,
    pub category: String,
    pub true_lyric: String,
    pub file_name: String,
    pub frq_status: FrqStatus,
    pub offset: f64,
    pub consonant: f64,
    pub cutoff: f64,
    pub preutterance: f64,
    pub overlap: f64,
}

impl LyricConfigData {
    /// The five timing values in configuration order.
    pub fn config_values(&self) -> [f64; 5] {
        [
            self.offset,
            self.consonant,
            self.cutoff,
            self.preutterance,
            self.overlap,
        ]
    }
}
