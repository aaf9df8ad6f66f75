//! Decoders for the two binary formats a voicebank ships with: frequency curves (`.frq`) and
//! 16-bit PCM wav samples.

use std::path::PathBuf;
use thiserror::Error;

pub mod frq;
pub mod wav;

pub use frq::{frq_path_for, FrequencyBlock, FrequencyCurve};
pub use wav::WaveformData;

/// A successfully decoded value, plus anything odd noticed along the way that did not stop
/// decoding.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub warnings: Vec<DecodeWarning>,
}

impl<T> Decoded<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: vec![],
        }
    }

    pub fn with_warning(mut self, warning: DecodeWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Returns `true` if nothing was left over after decoding.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DecodeWarning {
    #[error("{bytes} trailing bytes were left unread")]
    TrailingBytes { bytes: usize },
    #[error("{samples} samples of wav data were left unread")]
    TrailingSamples { samples: usize },
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Could not read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Not a frq file: expected magic {expected:?}")]
    BadMagic { expected: &'static str },
    #[error("Unsupported sample size: {0} bits (only 16 bit is supported)")]
    UnsupportedBitDepth(u16),
    #[error("Unsupported encoding: {0} (only signed PCM is supported)")]
    UnsupportedEncoding(&'static str),
    #[error("Short read: expected {expected} bytes, found {available}")]
    Truncated { expected: u64, available: u64 },
    #[error("Format error: {0}")]
    BadFormat(&'static str),
}

impl From<hound::Error> for DecodeError {
    fn from(err: hound::Error) -> Self {
        use hound::Error as A;
        use DecodeError as B;
        match err {
            A::IoError(inner) => B::IoError(inner),
            A::FormatError(inner) => B::BadFormat(inner),
            A::Unsupported => B::UnsupportedEncoding("unsupported wav format tag"),
            A::InvalidSampleFormat => B::UnsupportedEncoding("invalid sample format"),
            A::UnfinishedSample => B::BadFormat("data chunk ends in the middle of a sample"),
            _ => B::BadFormat("unexpected wav decoding error"),
        }
    }
}
