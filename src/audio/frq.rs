use super::{DecodeError, DecodeWarning, Decoded};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Magic identifier at the start of every frq file. Doubles as the format version.
pub const FRQ_MAGIC: &[u8; 8] = b"FREQ0003";

/// Size of the fixed header, up to and including the block count.
pub const FRQ_HEADER_SIZE: usize = 40;

/// Size of one (frequency, amplitude) pair.
const BLOCK_SIZE: usize = 16;

const RESERVED: [u8; 16] = [0; 16];

/// One analysis block: the estimated fundamental frequency and its amplitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyBlock {
    pub frequency: f64,
    pub amplitude: f64,
}

/// The frequency curve of a single voicebank sample.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyCurve {
    /// Number of wav samples summarized by each block.
    samples_per_block: i32,
    /// Average fundamental frequency of the whole sample, in Hz.
    average_pitch: f64,
    blocks: Vec<FrequencyBlock>,
}

impl FrequencyCurve {
    pub fn new(samples_per_block: i32, average_pitch: f64, blocks: Vec<FrequencyBlock>) -> Self {
        Self {
            samples_per_block,
            average_pitch,
            blocks,
        }
    }

    /// Reads and decodes a frq file. The file is closed before this returns, whatever the outcome.
    pub fn read_file(path: &Path) -> Result<Decoded<Self>, DecodeError> {
        let bytes = std::fs::read(path).map_err(|source| DecodeError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = Self::decode(&bytes)?;
        for warning in &decoded.warnings {
            warn!(path = %path.display(), "{warning}");
        }
        Ok(decoded)
    }

    /// Decodes a frq file held in memory.
    pub fn decode(bytes: &[u8]) -> Result<Decoded<Self>, DecodeError> {
        if bytes.get(..FRQ_MAGIC.len()) != Some(&FRQ_MAGIC[..]) {
            return Err(DecodeError::BadMagic {
                expected: "FREQ0003",
            });
        }
        if bytes.len() < FRQ_HEADER_SIZE {
            return Err(DecodeError::Truncated {
                expected: FRQ_HEADER_SIZE as u64,
                available: bytes.len() as u64,
            });
        }

        let mut cursor = Cursor::new(&bytes[FRQ_MAGIC.len()..]);
        let samples_per_block = cursor.read_i32::<LittleEndian>()?;
        let average_pitch = cursor.read_f64::<LittleEndian>()?;
        cursor.set_position(cursor.position() + RESERVED.len() as u64);
        let num_blocks = cursor.read_i32::<LittleEndian>()?;
        let num_blocks = usize::try_from(num_blocks)
            .map_err(|_| DecodeError::BadFormat("negative block count"))?;

        // Check the declared size up front so a corrupt count never turns into a huge allocation
        let expected = FRQ_HEADER_SIZE as u64 + num_blocks as u64 * BLOCK_SIZE as u64;
        if (bytes.len() as u64) < expected {
            return Err(DecodeError::Truncated {
                expected,
                available: bytes.len() as u64,
            });
        }

        let blocks = (0..num_blocks)
            .map(|_| -> io::Result<FrequencyBlock> {
                Ok(FrequencyBlock {
                    frequency: cursor.read_f64::<LittleEndian>()?,
                    amplitude: cursor.read_f64::<LittleEndian>()?,
                })
            })
            .collect::<io::Result<Vec<_>>>()?;

        let decoded = Decoded::new(Self {
            samples_per_block,
            average_pitch,
            blocks,
        });
        let trailing = bytes.len() - expected as usize;
        if trailing > 0 {
            return Ok(decoded.with_warning(DecodeWarning::TrailingBytes { bytes: trailing }));
        }
        Ok(decoded)
    }

    /// Writes the curve in the `FREQ0003` layout.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let num_blocks = i32::try_from(self.blocks.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many frq blocks"))?;
        writer.write_all(FRQ_MAGIC)?;
        writer.write_i32::<LittleEndian>(self.samples_per_block)?;
        writer.write_f64::<LittleEndian>(self.average_pitch)?;
        writer.write_all(&RESERVED)?;
        writer.write_i32::<LittleEndian>(num_blocks)?;
        for block in &self.blocks {
            writer.write_f64::<LittleEndian>(block.frequency)?;
            writer.write_f64::<LittleEndian>(block.amplitude)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(FRQ_HEADER_SIZE + BLOCK_SIZE * self.blocks.len());
        self.write(&mut bytes)
            .expect("writing to a Vec<u8> cannot fail");
        bytes
    }

    pub fn samples_per_block(&self) -> i32 {
        self.samples_per_block
    }

    pub fn average_pitch(&self) -> f64 {
        self.average_pitch
    }

    pub fn blocks(&self) -> &[FrequencyBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Returns where the frequency curve of a wav sample is stored: `dir/ka.wav` maps to
/// `dir/ka_wav.frq`.
pub fn frq_path_for(wav_path: &Path) -> PathBuf {
    let file_name = wav_path
        .file_name()
        .map(|name| name.to_string_lossy().replace('.', "_"))
        .unwrap_or_default();
    wav_path.with_file_name(format!("{file_name}.frq"))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn curve() -> FrequencyCurve {
        FrequencyCurve::new(
            256,
            261.63,
            vec![
                FrequencyBlock {
                    frequency: 260.5,
                    amplitude: 0.25,
                },
                FrequencyBlock {
                    frequency: 262.0,
                    amplitude: 1200.75,
                },
                FrequencyBlock {
                    frequency: 0.0,
                    amplitude: 0.0,
                },
            ],
        )
    }

    #[test]
    fn test_header_layout() {
        let bytes = curve().to_bytes();
        assert_eq!(bytes.len(), FRQ_HEADER_SIZE + 3 * BLOCK_SIZE);
        assert_eq!(&bytes[0..8], b"FREQ0003");
        assert_eq!(&bytes[8..12], &256i32.to_le_bytes());
        assert_eq!(&bytes[12..20], &261.63f64.to_le_bytes());
        assert_eq!(&bytes[20..36], &[0u8; 16]);
        assert_eq!(&bytes[36..40], &3i32.to_le_bytes());
        assert_eq!(&bytes[40..48], &260.5f64.to_le_bytes());
        assert_eq!(&bytes[48..56], &0.25f64.to_le_bytes());
    }

    #[test]
    fn test_decode() {
        let decoded = FrequencyCurve::decode(&curve().to_bytes()).unwrap();
        assert!(decoded.is_clean());
        assert_eq!(decoded.value, curve());
        assert_eq!(decoded.value.samples_per_block(), 256);
        assert_eq!(decoded.value.average_pitch(), 261.63);
    }

    #[test]
    fn test_reserved_bytes_are_ignored() {
        let mut bytes = curve().to_bytes();
        bytes[20..36].copy_from_slice(&[0xab; 16]);
        let decoded = FrequencyCurve::decode(&bytes).unwrap();
        assert_eq!(decoded.value, curve());
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = curve().to_bytes();
        bytes[7] = b'2';
        assert!(matches!(
            FrequencyCurve::decode(&bytes),
            Err(DecodeError::BadMagic { .. })
        ));
        assert!(matches!(
            FrequencyCurve::decode(b"FREQ"),
            Err(DecodeError::BadMagic { .. })
        ));
        assert!(matches!(
            FrequencyCurve::decode(&[]),
            Err(DecodeError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_are_a_warning() {
        let mut bytes = curve().to_bytes();
        bytes.extend_from_slice(&[1, 2, 3]);
        let decoded = FrequencyCurve::decode(&bytes).unwrap();
        assert_eq!(decoded.warnings, vec![DecodeWarning::TrailingBytes { bytes: 3 }]);
        assert_eq!(decoded.value, curve());
    }

    #[test]
    fn test_truncated_blocks() {
        let bytes = curve().to_bytes();
        let short = &bytes[..bytes.len() - 1];
        assert!(matches!(
            FrequencyCurve::decode(short),
            Err(DecodeError::Truncated {
                expected: 88,
                available: 87
            })
        ));
        assert!(matches!(
            FrequencyCurve::decode(&bytes[..20]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_negative_block_count() {
        let mut bytes = curve().to_bytes();
        bytes[36..40].copy_from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(
            FrequencyCurve::decode(&bytes),
            Err(DecodeError::BadFormat(_))
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FrequencyCurve::read_file(&dir.path().join("missing_wav.frq"));
        assert!(matches!(result, Err(DecodeError::Unreadable { .. })));
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_wav.frq");
        std::fs::write(&path, curve().to_bytes()).unwrap();
        assert_eq!(FrequencyCurve::read_file(&path).unwrap().value, curve());
    }

    #[test]
    fn test_frq_path_for() {
        assert_eq!(
            frq_path_for(Path::new("/vb/C3/de.wav")),
            PathBuf::from("/vb/C3/de_wav.frq")
        );
        assert_eq!(frq_path_for(Path::new("a.wav")), PathBuf::from("a_wav.frq"));
    }
}
