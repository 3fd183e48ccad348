//! Decode sessions
//!
//! The decode loop: pull samples from a [`SampleSource`], push each one
//! through the [`Decoder`], hand every event to the [`OutputEncoder`].
//! Synchronous throughout — the loop (and therefore one thread) owns the
//! decoder context for the whole session.

use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::capture::CaptureReader;
use crate::decoder::{DecodeError, DecodeEvent, Decoder};
use crate::output::OutputEncoder;
use crate::source::SampleSource;
use crate::Result;

/// Run a source to exhaustion through `decoder`, rendering every event.
///
/// Channel-overflow faults are logged and decoding continues (the decoder
/// re-anchors itself); sink failures abort the session. Returns the number
/// of completed words emitted.
pub fn decode_stream<S, W>(
    source: &mut S,
    decoder: &mut Decoder,
    encoder: &mut OutputEncoder<W>,
) -> Result<u64>
where
    S: SampleSource,
    W: Write,
{
    let mut words_emitted: u64 = 0;

    while let Some(sample) = source.next_sample()? {
        match decoder.feed(sample) {
            Ok(Some(event)) => {
                if let DecodeEvent::FrameEnd(words) = &event {
                    words_emitted += words.len() as u64;
                }
                encoder.handle(&event)?;
            }
            Ok(None) => {}
            Err(e @ DecodeError::ChannelOverflow { .. }) => {
                warn!("{e}; continuing");
            }
            Err(e) => return Err(e.into()),
        }
    }
    encoder.flush()?;

    info!(
        "source exhausted: {} frame(s), {} word(s)",
        decoder.frames_decoded(),
        words_emitted
    );
    Ok(words_emitted)
}

/// Decode a saved capture file.
pub fn replay_file<P, W>(
    path: P,
    decoder: &mut Decoder,
    encoder: &mut OutputEncoder<W>,
) -> Result<u64>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut source = CaptureReader::open(path)?;
    decode_stream(&mut source, decoder, encoder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureWriter;
    use crate::decoder::{MAX_CHANNELS, WORD_BITS};
    use crate::device::synthesize_capture;
    use crate::output::OutputMode;
    use crate::source::MemorySource;

    #[test]
    fn test_empty_source_emits_nothing() {
        let mut source = MemorySource::new(Vec::new());
        let mut decoder = Decoder::new();
        let mut encoder = OutputEncoder::new(Vec::new(), OutputMode::Binary);
        let words = decode_stream(&mut source, &mut decoder, &mut encoder).unwrap();
        assert_eq!(words, 0);
        assert!(encoder.into_inner().is_empty());
    }

    #[test]
    fn test_stream_of_frames_to_binary() {
        let capture = synthesize_capture(&[0x00_0001, 0xFF_FFFF]);
        let mut source = MemorySource::new(capture);
        let mut decoder = Decoder::new();
        let mut encoder = OutputEncoder::new(Vec::new(), OutputMode::Binary);
        let words = decode_stream(&mut source, &mut decoder, &mut encoder).unwrap();
        assert_eq!(words, 2);
        assert_eq!(
            encoder.into_inner(),
            [0x01, 0x00, 0x00, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_save_then_replay_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.raw");

        let capture = synthesize_capture(&[42, 0x80_0000]);
        {
            let mut writer = CaptureWriter::create(&path).unwrap();
            writer.append(&capture).unwrap();
        }

        let mut decoder = Decoder::new();
        let mut encoder = OutputEncoder::new(Vec::new(), OutputMode::Ascii);
        let words = replay_file(&path, &mut decoder, &mut encoder).unwrap();
        assert_eq!(words, 2);

        let text = String::from_utf8(encoder.into_inner()).unwrap();
        assert_eq!(text, format!("[ {:15} ]\n[ {:15} ]\n[ ", 42, -8_388_608));
    }

    #[test]
    fn test_overflow_mid_frame_does_not_abort_stream() {
        // One frame clocking a word more than the context has slots for.
        // The fault is absorbed mid-stream; the word assembled after the
        // re-anchor is what frame end finalizes.
        let mut capture = vec![0x01, 0x00];
        for _ in 0..((MAX_CHANNELS as u32 + 1) * WORD_BITS) {
            capture.push(0x06);
            capture.push(0x04);
        }
        capture.push(0x01);

        let mut source = MemorySource::new(capture);
        let mut decoder = Decoder::new();
        let mut encoder = OutputEncoder::new(Vec::new(), OutputMode::Binary);
        let words = decode_stream(&mut source, &mut decoder, &mut encoder).unwrap();
        assert_eq!(words, 1);
        assert_eq!(decoder.frames_decoded(), 1);
        assert_eq!(encoder.into_inner(), [0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_noise_between_frames_is_tolerated() {
        // Undriven clock/data toggles while idle are skipped silently.
        let mut capture = vec![0x02, 0x04, 0x06, 0x00];
        capture.extend(synthesize_capture(&[7]));
        let mut source = MemorySource::new(capture);
        let mut decoder = Decoder::new();
        let mut encoder = OutputEncoder::new(Vec::new(), OutputMode::Binary);
        let words = decode_stream(&mut source, &mut decoder, &mut encoder).unwrap();
        assert_eq!(words, 1);
        assert_eq!(encoder.into_inner(), [7, 0, 0]);
    }
}
