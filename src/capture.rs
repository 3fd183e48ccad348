//! Capture persistence
//!
//! A capture is a flat sequence of raw line-state bytes in arrival order —
//! no header, no length prefix, no checksum. [`CaptureWriter`] persists a
//! live stream verbatim; [`CaptureReader`] plays one back as a
//! [`SampleSource`].

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::sample::Sample;
use crate::source::SampleSource;
use crate::Result;

/// Writes incoming sample bytes verbatim to a capture file.
pub struct CaptureWriter {
    writer: BufWriter<File>,
    bytes_written: u64,
}

impl CaptureWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(&path)?;
        info!("saving capture to {}", path.as_ref().display());
        Ok(Self {
            writer: BufWriter::new(file),
            bytes_written: 0,
        })
    }

    /// Append a chunk of raw samples in arrival order.
    pub fn append(&mut self, samples: &[u8]) -> Result<()> {
        self.writer.write_all(samples)?;
        self.bytes_written += samples.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for CaptureWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Replays a capture file byte-for-byte as a [`SampleSource`].
pub struct CaptureReader {
    reader: BufReader<File>,
}

impl CaptureReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        debug!("replaying capture from {}", path.as_ref().display());
        Ok(Self {
            reader: BufReader::new(file),
        })
    }
}

impl SampleSource for CaptureReader {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        // Exhaustion comes from the read result itself, never from a
        // separate end-of-file probe: a zero-length read is the end, and
        // the terminal byte is handed out exactly once.
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(Sample::new(byte[0]))),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
