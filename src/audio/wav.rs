use super::{DecodeError, DecodeWarning, Decoded};
use byteorder::{ByteOrder, LittleEndian};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use tracing::warn;

/// Size in bytes of one 16-bit sample.
const SAMPLE_SIZE: u64 = 2;

/// A decoded voicebank sample: the first channel as 16-bit integers.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveformData {
    length_ms: f64,
    sample_rate: u32,
    samples: Vec<i16>,
}

impl WaveformData {
    /// Reads and decodes a wav file. The file handle is dropped on every return path.
    pub fn read_file(path: &Path) -> Result<Decoded<Self>, DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = Self::read(BufReader::new(file))?;
        for warning in &decoded.warnings {
            warn!(path = %path.display(), "{warning}");
        }
        Ok(decoded)
    }

    pub fn read(mut reader: impl Read) -> Result<Decoded<Self>, DecodeError> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes)?;
        let trailing_bytes = trim_data_chunk(&mut bytes);
        let available_samples = bytes.len() / SAMPLE_SIZE as usize;
        let wav = hound::WavReader::new(Cursor::new(bytes))?;

        // Extract information from the file header
        let spec = wav.spec();
        if spec.bits_per_sample != 16 {
            return Err(DecodeError::UnsupportedBitDepth(spec.bits_per_sample));
        }
        if spec.sample_format != hound::SampleFormat::Int {
            return Err(DecodeError::UnsupportedEncoding("floating point"));
        }
        let channels = spec.channels.max(1) as usize;
        let frames = wav.duration() as usize;
        let length_ms = frames as f64 / spec.sample_rate as f64 * 1000.0;
        let expected_bytes = (frames * channels) as u64 * SAMPLE_SIZE;

        // Keep only the first channel of every frame
        let mut samples = Vec::with_capacity(frames.min(available_samples / channels));
        let mut interleaved = wav.into_samples::<i16>();
        let mut read = 0u64;
        for _ in 0..frames {
            for channel in 0..channels {
                let sample = match interleaved.next() {
                    Some(Ok(sample)) => sample,
                    // hound reports running out of data as a plain IO error
                    Some(Err(hound::Error::IoError(_))) | None => {
                        return Err(short_read(expected_bytes, read));
                    }
                    Some(Err(err)) => return Err(err.into()),
                };
                read += SAMPLE_SIZE;
                if channel == 0 {
                    samples.push(sample);
                }
            }
        }

        let decoded = Decoded::new(Self {
            length_ms,
            sample_rate: spec.sample_rate,
            samples,
        });
        let warning = match trailing_bytes {
            0 => return Ok(decoded),
            bytes if bytes % SAMPLE_SIZE as usize == 0 => DecodeWarning::TrailingSamples {
                samples: bytes / SAMPLE_SIZE as usize,
            },
            bytes => DecodeWarning::TrailingBytes { bytes },
        };
        Ok(decoded.with_warning(warning))
    }

    pub fn length_ms(&self) -> f64 {
        self.length_ms
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Shortens the declared length of the `data` chunk to a whole number of frames, returning the
/// number of bytes cut off. hound refuses chunks that end partway through a frame.
fn trim_data_chunk(bytes: &mut [u8]) -> usize {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return 0;
    }
    let mut block_align = 0usize;
    let mut pos = 12usize;
    while let Some(header) = bytes.get(pos..pos + 8) {
        let id = [header[0], header[1], header[2], header[3]];
        let size = LittleEndian::read_u32(&header[4..8]) as usize;
        let body = pos + 8;
        match &id {
            b"fmt " if size >= 14 => {
                if let Some(align) = bytes.get(body + 12..body + 14) {
                    block_align = LittleEndian::read_u16(align) as usize;
                }
            }
            b"data" => {
                if block_align == 0 {
                    return 0;
                }
                let trailing = size % block_align;
                if trailing > 0 {
                    LittleEndian::write_u32(&mut bytes[pos + 4..body], (size - trailing) as u32);
                }
                return trailing;
            }
            _ => {}
        }
        match body.checked_add(size) {
            Some(next) => pos = next,
            None => return 0,
        }
    }
    0
}

fn short_read(expected: u64, available: u64) -> DecodeError {
    DecodeError::Truncated {
        expected,
        available,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use byteorder::WriteBytesExt;
    use pretty_assertions::assert_eq;

    fn wav_bytes(spec: hound::WavSpec, frames: usize) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for frame in 0..frames as i32 {
                for channel in 0..spec.channels as i32 {
                    match (spec.sample_format, spec.bits_per_sample) {
                        (hound::SampleFormat::Float, _) => writer.write_sample(0.5f32).unwrap(),
                        (_, 8) => writer.write_sample(frame as i8).unwrap(),
                        (_, 16) => writer.write_sample((frame * 10 - channel) as i16).unwrap(),
                        _ => writer.write_sample(frame * 1000).unwrap(),
                    }
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    /// A PCM16 wav whose `data` chunk declares `data_len` bytes but holds only `samples`.
    fn raw_wav(channels: u16, data_len: u32, samples: &[i16]) -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend_from_slice(b"RIFF");
        bytes.write_u32::<LittleEndian>(data_len.saturating_add(36)).unwrap();
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.write_u32::<LittleEndian>(16).unwrap();
        bytes.write_u16::<LittleEndian>(1).unwrap();
        bytes.write_u16::<LittleEndian>(channels).unwrap();
        bytes.write_u32::<LittleEndian>(44100).unwrap();
        bytes.write_u32::<LittleEndian>(44100 * 2 * channels as u32).unwrap();
        bytes.write_u16::<LittleEndian>(2 * channels).unwrap();
        bytes.write_u16::<LittleEndian>(16).unwrap();
        bytes.extend_from_slice(b"data");
        bytes.write_u32::<LittleEndian>(data_len).unwrap();
        for &sample in samples {
            bytes.write_i16::<LittleEndian>(sample).unwrap();
        }
        bytes
    }

    fn pcm16(channels: u16) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_read_mono() {
        let bytes = wav_bytes(pcm16(1), 441);
        let decoded = WaveformData::read(Cursor::new(bytes)).unwrap();
        assert!(decoded.is_clean());
        let wav = decoded.value;
        assert_eq!(wav.len(), 441);
        assert_eq!(wav.sample_rate(), 44100);
        assert!((wav.length_ms() - 10.0).abs() < 1e-9);
        assert_eq!(&wav.samples()[..3], &[0i16, 10, 20]);
    }

    #[test]
    fn test_read_stereo_keeps_first_channel() {
        let bytes = wav_bytes(pcm16(2), 100);
        let wav = WaveformData::read(Cursor::new(bytes)).unwrap().value;
        assert_eq!(wav.len(), 100);
        let expected: Vec<i16> = (0..100).map(|frame| frame * 10).collect();
        assert_eq!(wav.samples(), &expected[..]);
    }

    #[test]
    fn test_reject_other_bit_depths() {
        for bits in [8, 24] {
            let spec = hound::WavSpec {
                bits_per_sample: bits,
                ..pcm16(1)
            };
            let result = WaveformData::read(Cursor::new(wav_bytes(spec, 16)));
            assert!(matches!(result, Err(DecodeError::UnsupportedBitDepth(b)) if b == bits));
        }
    }

    #[test]
    fn test_reject_float() {
        let spec = hound::WavSpec {
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
            ..pcm16(1)
        };
        let result = WaveformData::read(Cursor::new(wav_bytes(spec, 16)));
        assert!(result.is_err());
    }

    #[test]
    fn test_reject_garbage() {
        let result = WaveformData::read(Cursor::new(b"FREQ0003 definitely not a wav".to_vec()));
        assert!(result.is_err());
    }

    #[test]
    fn test_short_read_returns_nothing() {
        let mut bytes = wav_bytes(pcm16(1), 100);
        bytes.truncate(bytes.len() - 21);
        let result = WaveformData::read(Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(DecodeError::Truncated {
                expected: 200,
                available: 178
            })
        ));
    }

    #[test]
    fn test_huge_declared_length_is_a_short_read() {
        let bytes = raw_wav(1, 0xFFFF_FFF0, &[1, 2, 3, 4]);
        assert_eq!(bytes.len(), 52);
        let result = WaveformData::read(Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(DecodeError::Truncated {
                expected: 0xFFFF_FFF0,
                available: 8
            })
        ));
    }

    #[test]
    fn test_trailing_samples_warn() {
        // Two stereo frames and the left half of a third
        let bytes = raw_wav(2, 10, &[100, -1, 200, -2, 300]);
        let decoded = WaveformData::read(Cursor::new(bytes)).unwrap();
        assert_eq!(
            decoded.warnings,
            vec![DecodeWarning::TrailingSamples { samples: 1 }]
        );
        assert_eq!(decoded.value.samples(), &[100i16, 200]);
    }

    #[test]
    fn test_trailing_byte_warns() {
        let mut bytes = raw_wav(1, 5, &[7, 8]);
        bytes.push(0);
        let decoded = WaveformData::read(Cursor::new(bytes)).unwrap();
        assert_eq!(decoded.warnings, vec![DecodeWarning::TrailingBytes { bytes: 1 }]);
        assert_eq!(decoded.value.samples(), &[7i16, 8]);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = WaveformData::read_file(&dir.path().join("nope.wav"));
        assert!(matches!(result, Err(DecodeError::Unreadable { .. })));
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        std::fs::write(&path, wav_bytes(pcm16(1), 32)).unwrap();
        let wav = WaveformData::read_file(&path).unwrap().value;
        assert_eq!(wav.len(), 32);
    }
}
