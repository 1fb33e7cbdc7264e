//! Sound decoding.
//!
//! Every decoder shares the same read-only metadata held by
//! [`SoundDecoderBase`]: the sample layout, the sample rate and the total
//! number of samples. A concrete decoder fills that metadata once, after it has
//! parsed the header of its stream, and then produces samples on demand through
//! the [`SoundDecoder`] trait.

mod wav;

pub use wav::WavDecoder;

use thiserror::Error;

/// Layout of one decoded sample frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleType {
    Mono8,
    Mono16,
    Stereo8,
    Stereo16,
}

impl SampleType {
    /// Picks the layout matching a channel count and bit depth.
    pub fn from_layout(channels: u16, bits: u16) -> Option<Self> {
        match (channels, bits) {
            (1, 8) => Some(SampleType::Mono8),
            (1, 16) => Some(SampleType::Mono16),
            (2, 8) => Some(SampleType::Stereo8),
            (2, 16) => Some(SampleType::Stereo16),
            _ => None,
        }
    }

    pub fn channels(self) -> u16 {
        match self {
            SampleType::Mono8 | SampleType::Mono16 => 1,
            SampleType::Stereo8 | SampleType::Stereo16 => 2,
        }
    }

    /// Size of one frame (all channels) in bytes.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleType::Mono8 => 1,
            SampleType::Mono16 | SampleType::Stereo8 => 2,
            SampleType::Stereo16 => 4,
        }
    }
}

/// Errors produced while parsing or decoding a sound stream.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stream is not a RIFF/WAVE file")]
    NotWave,

    #[error("Missing '{0}' chunk")]
    MissingChunk(&'static str),

    #[error("'{chunk}' chunk is {size} bytes, expected at least {min}")]
    ShortChunk {
        chunk: &'static str,
        size: u32,
        min: u32,
    },

    #[error("Unsupported WAVE encoding {0} (only PCM is supported)")]
    UnsupportedEncoding(u16),

    #[error("Unsupported sample layout: {channels} channel(s), {bits} bits")]
    UnsupportedLayout { channels: u16, bits: u16 },

    #[error("Output buffer too small: need {needed} bytes, got {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Metadata shared by all decoders. Set once at construction, read-only afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoundDecoderBase {
    sample_type: SampleType,
    frequency: u32,
    samples: u32,
}

impl SoundDecoderBase {
    pub fn new(sample_type: SampleType, frequency: u32, samples: u32) -> Self {
        Self {
            sample_type,
            frequency,
            samples,
        }
    }

    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// Samples per second.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Total number of sample frames in the stream.
    pub fn samples_amount(&self) -> u32 {
        self.samples
    }
}

/// A decoder producing raw PCM frames from some encoded stream.
pub trait SoundDecoder {
    /// The metadata parsed from the stream header.
    fn base(&self) -> &SoundDecoderBase;

    fn sample_type(&self) -> SampleType {
        self.base().sample_type()
    }

    fn frequency(&self) -> u32 {
        self.base().frequency()
    }

    fn samples_amount(&self) -> u32 {
        self.base().samples_amount()
    }

    /// Decodes up to `samples` frames into `buf`, returning how many frames were
    /// written. Returns `Ok(0)` at the end of the stream.
    fn read_samples(&mut self, samples: u32, buf: &mut [u8]) -> Result<u32, DecodeError>;

    /// Rewinds to the first sample.
    fn reset(&mut self) -> Result<(), DecodeError>;
}
