//! Output encodings for completed words
//!
//! Two renderings, selected once per run: raw little-endian byte triplets
//! for piping into other tools, or signed decimals grouped per frame in
//! brackets for reading by eye. Write failures surface to the caller as
//! `io::Error`; the decoder feeding this encoder is unaffected and may
//! continue or stop at the caller's discretion.

use std::io::{self, Write};

use crate::decoder::{CompletedWord, DecodeEvent};

/// Rendering selected for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Three bytes per word, least-significant first. No separators, no
    /// framing metadata.
    Binary,
    /// Fixed-width signed decimal per word, frames delimited by brackets.
    Ascii,
}

/// Width of the decimal field in [`OutputMode::Ascii`].
const ASCII_FIELD_WIDTH: usize = 15;

/// Renders decode events to a byte or text sink.
pub struct OutputEncoder<W: Write> {
    writer: W,
    mode: OutputMode,
}

impl<W: Write> OutputEncoder<W> {
    pub fn new(writer: W, mode: OutputMode) -> Self {
        Self { writer, mode }
    }

    /// Render one decode event.
    pub fn handle(&mut self, event: &DecodeEvent) -> io::Result<()> {
        match event {
            DecodeEvent::FrameStart => self.frame_open(),
            DecodeEvent::FrameEnd(words) => {
                for word in words {
                    self.word(word)?;
                }
                self.frame_close()
            }
        }
    }

    /// Open a frame group. Only the very first frame arrives here: the
    /// frame-end rule re-enters the started state directly, so subsequent
    /// groups are opened by [`frame_close`](Self::frame_close).
    fn frame_open(&mut self) -> io::Result<()> {
        match self.mode {
            OutputMode::Binary => Ok(()),
            OutputMode::Ascii => write!(self.writer, "[ "),
        }
    }

    fn word(&mut self, word: &CompletedWord) -> io::Result<()> {
        match self.mode {
            OutputMode::Binary => self.writer.write_all(&word.to_le_bytes()),
            OutputMode::Ascii => {
                write!(self.writer, "{:width$} ", word.as_signed(), width = ASCII_FIELD_WIDTH)
            }
        }
    }

    /// Close the current frame group and open the next.
    fn frame_close(&mut self) -> io::Result<()> {
        match self.mode {
            OutputMode::Binary => Ok(()),
            OutputMode::Ascii => write!(self.writer, "]\n[ "),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end(words: &[u32]) -> DecodeEvent {
        DecodeEvent::FrameEnd(
            words
                .iter()
                .enumerate()
                .map(|(i, &raw)| CompletedWord::new(i, raw))
                .collect(),
        )
    }

    #[test]
    fn test_binary_is_le_triplets_only() {
        let mut enc = OutputEncoder::new(Vec::new(), OutputMode::Binary);
        enc.handle(&DecodeEvent::FrameStart).unwrap();
        enc.handle(&end(&[0x12_34_56])).unwrap();
        enc.handle(&end(&[0xFF_FFFF])).unwrap();
        let out = enc.into_inner();
        assert_eq!(out, [0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_ascii_sign_rendering() {
        for (raw, rendered) in [
            (0xFF_FFFFu32, -1i32),
            (0x00_0001, 1),
            (0x80_0000, -8_388_608),
        ] {
            let mut enc = OutputEncoder::new(Vec::new(), OutputMode::Ascii);
            enc.handle(&end(&[raw])).unwrap();
            let out = String::from_utf8(enc.into_inner()).unwrap();
            assert_eq!(out, format!("{:15} ]\n[ ", rendered));
        }
    }

    #[test]
    fn test_ascii_frames_are_bracket_grouped() {
        let mut enc = OutputEncoder::new(Vec::new(), OutputMode::Ascii);
        enc.handle(&DecodeEvent::FrameStart).unwrap();
        enc.handle(&end(&[1, 2])).unwrap();
        enc.handle(&end(&[3])).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(
            out,
            format!("[ {:15} {:15} ]\n[ {:15} ]\n[ ", 1, 2, 3)
        );
    }

    #[test]
    fn test_sink_failure_surfaces() {
        struct FailingSink;
        impl Write for FailingSink {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut enc = OutputEncoder::new(FailingSink, OutputMode::Binary);
        let err = enc.handle(&end(&[0])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
