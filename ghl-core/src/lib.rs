//! The core of the Game Helpers Library. This crate contains the pieces
//! that do not need a graphics context, namely the scoped logger and the
//! sound decoder base.

pub mod logger;
pub mod sound;

pub use logger::{LogLevel, LogSink, Logger};
pub use sound::{DecodeError, SampleType, SoundDecoder, SoundDecoderBase, WavDecoder};
