use std::io::{Read, Seek, SeekFrom};

use super::{DecodeError, SampleType, SoundDecoder, SoundDecoderBase};

const WAVE_FORMAT_PCM: u16 = 1;
const PCM_FMT_SIZE: u32 = 16;

/// Decoder for uncompressed RIFF/WAVE (PCM) streams.
pub struct WavDecoder<R> {
    stream: R,
    base: SoundDecoderBase,
    data_start: u64,
    position: u32,
}

struct FmtChunk {
    encoding: u16,
    channels: u16,
    sample_rate: u32,
    bits: u16,
}

fn read_u16<R: Read>(r: &mut R) -> std::io::Result<u16> {
    let mut bytes = [0; 2];
    r.read_exact(&mut bytes)?;
    Ok(u16::from_le_bytes(bytes))
}

fn read_u32<R: Read>(r: &mut R) -> std::io::Result<u32> {
    let mut bytes = [0; 4];
    r.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_tag<R: Read>(r: &mut R) -> std::io::Result<[u8; 4]> {
    let mut tag = [0; 4];
    r.read_exact(&mut tag)?;
    Ok(tag)
}

impl<R: Read + Seek> WavDecoder<R> {
    /// Parses the RIFF header and positions the stream at the first sample.
    pub fn new(mut stream: R) -> Result<Self, DecodeError> {
        if &read_tag(&mut stream)? != b"RIFF" {
            return Err(DecodeError::NotWave);
        }
        let _riff_size = read_u32(&mut stream)?;
        if &read_tag(&mut stream)? != b"WAVE" {
            return Err(DecodeError::NotWave);
        }

        let mut fmt: Option<FmtChunk> = None;
        let data_size = loop {
            let tag = match read_tag(&mut stream) {
                Ok(tag) => tag,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Err(DecodeError::MissingChunk("data"));
                }
                Err(e) => return Err(e.into()),
            };
            let size = read_u32(&mut stream)?;
            match &tag {
                b"fmt " => {
                    if size < PCM_FMT_SIZE {
                        return Err(DecodeError::ShortChunk {
                            chunk: "fmt ",
                            size,
                            min: PCM_FMT_SIZE,
                        });
                    }
                    let encoding = read_u16(&mut stream)?;
                    let channels = read_u16(&mut stream)?;
                    let sample_rate = read_u32(&mut stream)?;
                    let _byte_rate = read_u32(&mut stream)?;
                    let _block_align = read_u16(&mut stream)?;
                    let bits = read_u16(&mut stream)?;
                    fmt = Some(FmtChunk {
                        encoding,
                        channels,
                        sample_rate,
                        bits,
                    });
                    // extension bytes after the PCM fields, plus pad byte
                    let rest = i64::from(size - PCM_FMT_SIZE) + i64::from(size & 1);
                    if rest > 0 {
                        stream.seek(SeekFrom::Current(rest))?;
                    }
                }
                b"data" => break size,
                _ => {
                    stream.seek(SeekFrom::Current(i64::from(size) + i64::from(size & 1)))?;
                }
            }
        };

        let fmt = fmt.ok_or(DecodeError::MissingChunk("fmt "))?;
        if fmt.encoding != WAVE_FORMAT_PCM {
            return Err(DecodeError::UnsupportedEncoding(fmt.encoding));
        }
        let sample_type =
            SampleType::from_layout(fmt.channels, fmt.bits).ok_or(DecodeError::UnsupportedLayout {
                channels: fmt.channels,
                bits: fmt.bits,
            })?;

        // Streamed or truncated files announce more data than they carry.
        let data_start = stream.stream_position()?;
        let stream_end = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(data_start))?;
        let available = u32::try_from(stream_end.saturating_sub(data_start)).unwrap_or(u32::MAX);
        let samples = data_size.min(available) / sample_type.bytes_per_sample() as u32;
        crate::ghl_debug!(
            "WAV",
            "stream: {:?} @ {} Hz, {} samples",
            sample_type,
            fmt.sample_rate,
            samples
        );

        Ok(Self {
            stream,
            base: SoundDecoderBase::new(sample_type, fmt.sample_rate, samples),
            data_start,
            position: 0,
        })
    }

    /// Gives the underlying stream back.
    pub fn into_inner(self) -> R {
        self.stream
    }
}

impl<R: Read + Seek> SoundDecoder for WavDecoder<R> {
    fn base(&self) -> &SoundDecoderBase {
        &self.base
    }

    fn read_samples(&mut self, samples: u32, buf: &mut [u8]) -> Result<u32, DecodeError> {
        let count = samples.min(self.base.samples_amount() - self.position);
        let needed = count as usize * self.base.sample_type().bytes_per_sample();
        if buf.len() < needed {
            return Err(DecodeError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        self.stream.read_exact(&mut buf[..needed])?;
        self.position += count;
        Ok(count)
    }

    fn reset(&mut self) -> Result<(), DecodeError> {
        self.stream.seek(SeekFrom::Start(self.data_start))?;
        self.position = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn wav_bytes(channels: u16, bits: u16, rate: u32, data: &[u8], extra_chunk: bool) -> Vec<u8> {
        let block_align = channels * bits / 8;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&rate.to_le_bytes());
        out.extend_from_slice(&(rate * u32::from(block_align)).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        if extra_chunk {
            out.extend_from_slice(b"LIST");
            out.extend_from_slice(&3u32.to_le_bytes());
            out.extend_from_slice(&[1, 2, 3, 0]);
        }
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_header_fills_metadata() {
        let data = [0u8; 40];
        let decoder = WavDecoder::new(Cursor::new(wav_bytes(2, 16, 44100, &data, false))).unwrap();
        assert_eq!(decoder.sample_type(), SampleType::Stereo16);
        assert_eq!(decoder.frequency(), 44100);
        assert_eq!(decoder.samples_amount(), 10);
    }

    #[test]
    fn test_skips_unknown_chunks() {
        let data = [7u8, 8, 9];
        let mut decoder = WavDecoder::new(Cursor::new(wav_bytes(1, 8, 8000, &data, true))).unwrap();
        assert_eq!(decoder.sample_type(), SampleType::Mono8);
        assert_eq!(decoder.samples_amount(), 3);

        let mut buf = [0u8; 3];
        assert_eq!(decoder.read_samples(3, &mut buf).unwrap(), 3);
        assert_eq!(buf, [7, 8, 9]);
    }

    #[test]
    fn test_read_and_reset() {
        let data: Vec<u8> = (0..8).collect();
        let mut decoder = WavDecoder::new(Cursor::new(wav_bytes(1, 16, 11025, &data, false))).unwrap();

        let mut buf = [0u8; 6];
        assert_eq!(decoder.read_samples(3, &mut buf).unwrap(), 3);
        assert_eq!(buf, [0, 1, 2, 3, 4, 5]);
        assert_eq!(decoder.read_samples(3, &mut buf).unwrap(), 1);
        assert_eq!(&buf[..2], &[6, 7]);
        assert_eq!(decoder.read_samples(3, &mut buf).unwrap(), 0);

        decoder.reset().unwrap();
        assert_eq!(decoder.read_samples(1, &mut buf).unwrap(), 1);
        assert_eq!(&buf[..2], &[0, 1]);
    }

    #[test]
    fn test_small_buffer_is_rejected() {
        let data = [0u8; 16];
        let mut decoder = WavDecoder::new(Cursor::new(wav_bytes(2, 16, 44100, &data, false))).unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(
            decoder.read_samples(2, &mut buf),
            Err(DecodeError::BufferTooSmall { needed: 8, available: 4 })
        ));
    }

    #[test]
    fn test_truncated_stream_is_clamped() {
        let mut bytes = wav_bytes(1, 8, 8000, &[1, 2, 3, 4, 5], false);
        let size_at = bytes.len() - 9;
        bytes[size_at..size_at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        let mut decoder = WavDecoder::new(Cursor::new(bytes)).unwrap();
        assert_eq!(decoder.samples_amount(), 5);

        let mut buf = [0u8; 64];
        assert_eq!(decoder.read_samples(64, &mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], &[1, 2, 3, 4, 5]);
        assert_eq!(decoder.read_samples(64, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_partial_trailing_frame_is_dropped() {
        let mut bytes = wav_bytes(2, 16, 22050, &[0; 8], false);
        bytes.truncate(bytes.len() - 3);
        let mut decoder = WavDecoder::new(Cursor::new(bytes)).unwrap();
        assert_eq!(decoder.samples_amount(), 1);

        let mut buf = [0u8; 8];
        assert_eq!(decoder.read_samples(2, &mut buf).unwrap(), 1);
        assert_eq!(decoder.read_samples(2, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_short_fmt_chunk_is_rejected() {
        let mut bytes = wav_bytes(1, 8, 8000, &[0; 4], false);
        bytes[16..20].copy_from_slice(&14u32.to_le_bytes());
        assert!(matches!(
            WavDecoder::new(Cursor::new(bytes)),
            Err(DecodeError::ShortChunk {
                chunk: "fmt ",
                size: 14,
                min: 16
            })
        ));
    }

    #[test]
    fn test_rejects_bad_streams() {
        assert!(matches!(
            WavDecoder::new(Cursor::new(b"OggS\0\0\0\0".to_vec())),
            Err(DecodeError::NotWave)
        ));

        let mut no_data = wav_bytes(1, 8, 8000, &[], false);
        no_data.truncate(no_data.len() - 8);
        assert!(matches!(
            WavDecoder::new(Cursor::new(no_data)),
            Err(DecodeError::MissingChunk("data"))
        ));

        assert!(matches!(
            WavDecoder::new(Cursor::new(wav_bytes(1, 24, 8000, &[0; 6], false))),
            Err(DecodeError::UnsupportedLayout { channels: 1, bits: 24 })
        ));
    }
}
