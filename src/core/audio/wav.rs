//! In-memory WAV container handling.
//!
//! Raw PCM coming from the host is wrapped in a canonical 44-byte RIFF
//! header, decoded with `hound` into normalized samples, and re-encoded
//! after processing. Nothing here touches the file system.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::error::{AudioError, AudioResult};

/// Size of the canonical PCM WAV header written by [`create_wav`].
pub const HEADER_SIZE: usize = 44;

/// Sample widths (in bytes) accepted for integer PCM.
const SUPPORTED_SAMPLE_WIDTHS: [u16; 4] = [1, 2, 3, 4];

// =============================================================================
// PCM Format
// =============================================================================

/// Layout of a raw PCM byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
    /// Bytes per sample (2 for 16-bit audio)
    pub sample_width: u16,
}

impl Default for PcmFormat {
    /// 16 kHz, mono, 16-bit: the only format the Vosk provider advertises.
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            sample_width: 2,
        }
    }
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16, sample_width: u16) -> Self {
        Self {
            sample_rate,
            channels,
            sample_width,
        }
    }

    /// Bytes occupied by one frame (one sample for every channel).
    #[inline]
    pub fn frame_size(&self) -> usize {
        usize::from(self.channels) * usize::from(self.sample_width)
    }

    #[inline]
    pub fn bits_per_sample(&self) -> u16 {
        self.sample_width * 8
    }

    /// Check the format itself and that `byte_len` holds a whole number of frames.
    pub fn validate(&self, byte_len: usize) -> AudioResult<()> {
        if self.sample_rate == 0 {
            return Err(AudioError::Encoding("sample rate must be positive".into()));
        }
        if self.channels == 0 {
            return Err(AudioError::Encoding(
                "channel count must be at least 1".into(),
            ));
        }
        if !SUPPORTED_SAMPLE_WIDTHS.contains(&self.sample_width) {
            return Err(AudioError::Encoding(format!(
                "unsupported sample width: {} bytes",
                self.sample_width
            )));
        }
        let frame_size = self.frame_size();
        if byte_len % frame_size != 0 {
            return Err(AudioError::Encoding(format!(
                "PCM length {byte_len} is not a multiple of the frame size {frame_size}"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Wrap raw PCM bytes in a minimal WAV container.
///
/// The bytes are copied verbatim after the header, so they must already be
/// in WAV sample encoding (little-endian, unsigned for 8-bit).
pub fn create_wav(pcm_data: &[u8], format: PcmFormat) -> AudioResult<Vec<u8>> {
    format.validate(pcm_data.len())?;

    let bits_per_sample = format.bits_per_sample();
    let block_align = format.channels * format.sample_width;
    let byte_rate = format.sample_rate * u32::from(block_align);
    let data_size = u32::try_from(pcm_data.len())
        .map_err(|_| AudioError::Encoding("PCM buffer exceeds the WAV size limit".into()))?;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(HEADER_SIZE + pcm_data.len());

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt subchunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // Subchunk1Size (16 for PCM)
    wav.extend_from_slice(&1u16.to_le_bytes()); // AudioFormat (1 = PCM)
    wav.extend_from_slice(&format.channels.to_le_bytes());
    wav.extend_from_slice(&format.sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data subchunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.extend_from_slice(pcm_data);

    Ok(wav)
}

/// Encode normalized mono samples as a WAV file at the given width.
///
/// Samples outside `[-1.0, 1.0)` saturate at the integer range (clipping).
pub fn encode_mono(samples: &[f32], sample_rate: u32, sample_width: u16) -> AudioResult<Vec<u8>> {
    PcmFormat::new(sample_rate, 1, sample_width).validate(0)?;

    let bits = sample_width * 8;
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: bits,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(
        HEADER_SIZE + samples.len() * usize::from(sample_width),
    ));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(quantize(sample, bits))?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Convert a normalized sample to a signed integer of `bits` width.
#[inline]
fn quantize(sample: f32, bits: u16) -> i32 {
    let scale = (1i64 << (bits - 1)) as f64;
    let max = scale - 1.0;
    let value = (f64::from(sample) * scale).round();
    value.clamp(-scale, max) as i32
}

// =============================================================================
// Decoding
// =============================================================================

/// Normalized single-channel audio decoded from a WAV container.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    /// Bytes per sample of the source container
    pub sample_width: u16,
    /// Samples in `[-1.0, 1.0)`, one per frame
    pub samples: Vec<f32>,
}

/// Decode a WAV container into normalized mono samples.
///
/// Multi-channel input is averaged frame by frame, so the output always
/// has exactly one sample per input frame.
pub fn decode_mono(wav: &[u8]) -> AudioResult<DecodedAudio> {
    let mut reader = WavReader::new(Cursor::new(wav))?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int {
        return Err(AudioError::Encoding(
            "only integer PCM WAV data is supported".into(),
        ));
    }

    let channels = usize::from(spec.channels.max(1));
    let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;

    let interleaved = reader
        .samples::<i32>()
        .map(|s| s.map(|v| v as f32 * scale))
        .collect::<Result<Vec<f32>, _>>()?;

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(DecodedAudio {
        sample_rate: spec.sample_rate,
        sample_width: spec.bits_per_sample.div_ceil(8),
        samples,
    })
}

/// Borrowed view of the sample data inside a WAV container.
#[derive(Debug, Clone, Copy)]
pub struct WavPayload<'a> {
    pub sample_rate: u32,
    pub channels: u16,
    /// Bytes per frame
    pub block_align: usize,
    /// Raw sample bytes following the header
    pub data: &'a [u8],
}

impl WavPayload<'_> {
    /// Number of whole frames in the payload.
    pub fn frame_count(&self) -> usize {
        self.data.len() / self.block_align.max(1)
    }
}

/// Parse the WAV header and return the sample rate plus the raw data bytes.
pub fn wav_payload(wav: &[u8]) -> AudioResult<WavPayload<'_>> {
    let reader = WavReader::new(Cursor::new(wav))?;
    let spec = reader.spec();
    let bytes_per_sample = usize::from(spec.bits_per_sample.div_ceil(8));
    let data_len = reader.len() as usize * bytes_per_sample;

    // The reader stops at the start of the data chunk
    let start = reader.into_inner().position() as usize;
    let end = start.saturating_add(data_len).min(wav.len());

    Ok(WavPayload {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        block_align: usize::from(spec.channels) * bytes_per_sample,
        data: &wav[start.min(end)..end],
    })
}
