//! Strobe-framed serial bus decoder
//!
//! This library reconstructs 24-bit data words from a stream of sampled
//! digital-logic-line states, as captured from a clocked serial bus with a
//! frame-strobe line, a bit-clock line, and a data line packed into one
//! byte per sample.
//!
//! # Architecture
//!
//! - **Decoder**: edge-triggered state machine driven by a declarative
//!   transition table; consumes one [`Sample`] at a time
//! - **OutputEncoder**: renders completed words as signed decimal text or
//!   little-endian binary triplets
//! - **Capture**: headerless byte-for-byte persistence and replay of raw
//!   sample streams
//! - **Devices**: live acquisition behind the [`StreamingDevice`] trait,
//!   delivering sample chunks over crossbeam channels
//!
//! # Example
//!
//! ```
//! use strobebus::{decode_stream, Decoder, MemorySource, OutputEncoder, OutputMode};
//!
//! let capture = strobebus::synthesize_capture(&[0x12_34_56]);
//! let mut source = MemorySource::new(capture);
//! let mut decoder = Decoder::new();
//! let mut encoder = OutputEncoder::new(Vec::new(), OutputMode::Binary);
//! let words = decode_stream(&mut source, &mut decoder, &mut encoder)?;
//! assert_eq!(words, 1);
//! # Ok::<(), strobebus::AnalyzerError>(())
//! ```

use thiserror::Error;

pub mod capture;
pub mod decoder;
pub mod device;
pub mod output;
pub mod sample;
pub mod session;
pub mod source;

pub use capture::{CaptureReader, CaptureWriter};
pub use decoder::{
    CompletedWord, DecodeError, DecodeEvent, Decoder, DecoderConfig, DecoderContext, DecoderState,
    MAX_CHANNELS, WORD_BITS,
};
pub use device::{synthesize_capture, SimulatedDevice, StreamingDevice, DEFAULT_SAMPLE_RATE_HZ};
pub use output::{OutputEncoder, OutputMode};
pub use sample::Sample;
pub use session::{decode_stream, replay_file};
pub use source::{ChannelSource, MemorySource, SampleSource, StreamMessage};

/// Top-level error type.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] decoder::DecodeError),

    #[error("device error: {0}")]
    Device(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
