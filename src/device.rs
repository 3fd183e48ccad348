//! Acquisition device boundary
//!
//! [`StreamingDevice`] is the seam between the decoder and whatever
//! produces line-state samples: a hardware driver, or the bundled
//! [`SimulatedDevice`] that synthesizes valid bus traffic for development
//! and tests. Read streams deliver sample chunks over a crossbeam channel;
//! exactly one decode thread drains the other end.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use tracing::{debug, info};

use crate::decoder::WORD_BITS;
use crate::sample::{BIT_CLOCK, DATA_LINE, FRAME_STROBE};
use crate::source::StreamMessage;
use crate::{AnalyzerError, Result};

/// Sample rate devices are configured with unless told otherwise.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 24_000_000;

/// A streaming acquisition device.
///
/// Recovery policy (reconnect, capture restart after device errors) lives
/// behind this trait, not in the decoder.
pub trait StreamingDevice: Send {
    /// Stable identifier, as reported on connect.
    fn device_id(&self) -> u64;

    fn sample_rate_hz(&self) -> u32;

    fn set_sample_rate_hz(&mut self, hz: u32) -> Result<()>;

    fn is_streaming(&self) -> bool;

    /// Start delivering sample chunks to `sink` until [`stop`](Self::stop).
    fn start_read(&mut self, sink: Sender<StreamMessage>) -> Result<()>;

    /// Start the write stream: the device emits its output test pattern.
    fn start_write(&mut self) -> Result<()>;

    /// Stop whichever stream is running.
    fn stop(&mut self) -> Result<()>;

    /// Read the current input value (one line-state byte).
    fn input_value(&mut self) -> Result<u8>;

    /// Drive the output lines to `value`.
    fn set_output_value(&mut self, value: u8) -> Result<()>;
}

/// Samples for one frame of the bus protocol carrying `words` in channel
/// order: a single strobe rising/falling pair, then every word's bits
/// clocked high and low MSB-first.
///
/// The frame is closed by the next frame's leading strobe edge; append a
/// final strobe-high byte to close the last frame of a capture.
pub fn frame_body(words: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + 2 * WORD_BITS as usize * words.len());
    out.push(FRAME_STROBE);
    out.push(0);
    for &word in words {
        for i in (0..WORD_BITS).rev() {
            let data = if word >> i & 1 == 1 { DATA_LINE } else { 0 };
            out.push(BIT_CLOCK | data);
            out.push(data);
        }
    }
    out
}

/// A complete single-channel capture: one frame per word, with the closing
/// strobe edge.
pub fn synthesize_capture(words: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &word in words {
        out.extend(frame_body(&[word]));
    }
    out.push(FRAME_STROBE);
    out
}

/// Software device that synthesizes bus frames with incrementing word
/// values. Stands in for acquisition hardware in the live modes and in
/// tests.
pub struct SimulatedDevice {
    device_id: u64,
    sample_rate_hz: u32,
    words_per_frame: usize,
    output_value: Arc<AtomicU8>,
    streaming: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SimulatedDevice {
    pub fn new(device_id: u64, words_per_frame: usize) -> Self {
        Self {
            device_id,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            words_per_frame,
            output_value: Arc::new(AtomicU8::new(0)),
            streaming: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    fn reap_worker(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        self.shutdown.store(false, Ordering::Relaxed);
        self.streaming.store(false, Ordering::Relaxed);
    }

    fn reader_loop(
        sink: Sender<StreamMessage>,
        words_per_frame: usize,
        shutdown: Arc<AtomicBool>,
        streaming: Arc<AtomicBool>,
    ) {
        let mut next_word: u32 = 0;
        let mut frames_sent: u64 = 0;
        let mut words = Vec::with_capacity(words_per_frame);

        while !shutdown.load(Ordering::Relaxed) {
            words.clear();
            for _ in 0..words_per_frame {
                words.push(next_word);
                next_word = next_word.wrapping_add(1);
            }
            let chunk = frame_body(&words);
            if sink.send(StreamMessage::Samples(chunk)).is_err() {
                debug!("read sink disconnected after {} frames", frames_sent);
                break;
            }
            frames_sent += 1;
            // Paced so interactive sessions stay readable.
            thread::sleep(Duration::from_millis(50));
        }

        // Close the last open frame, then the stream.
        let _ = sink.send(StreamMessage::Samples(vec![FRAME_STROBE]));
        let _ = sink.send(StreamMessage::EndOfStream);
        streaming.store(false, Ordering::Relaxed);
        info!("simulated read stream stopped after {} frames", frames_sent);
    }
}

impl StreamingDevice for SimulatedDevice {
    fn device_id(&self) -> u64 {
        self.device_id
    }

    fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    fn set_sample_rate_hz(&mut self, hz: u32) -> Result<()> {
        if hz == 0 {
            return Err(AnalyzerError::Device("sample rate must be non-zero".into()));
        }
        self.sample_rate_hz = hz;
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Relaxed)
    }

    fn start_read(&mut self, sink: Sender<StreamMessage>) -> Result<()> {
        if self.is_streaming() {
            return Err(AnalyzerError::Device("device is already streaming".into()));
        }
        self.reap_worker();
        self.streaming.store(true, Ordering::Relaxed);

        let words_per_frame = self.words_per_frame;
        let shutdown = Arc::clone(&self.shutdown);
        let streaming = Arc::clone(&self.streaming);
        let handle = thread::Builder::new()
            .name(format!("sim{}_read", self.device_id))
            .spawn(move || Self::reader_loop(sink, words_per_frame, shutdown, streaming))
            .map_err(|e| AnalyzerError::Device(format!("failed to spawn reader: {e}")))?;
        self.worker = Some(handle);

        info!("device 0x{:x}: read stream started", self.device_id);
        Ok(())
    }

    fn start_write(&mut self) -> Result<()> {
        if self.is_streaming() {
            return Err(AnalyzerError::Device("device is already streaming".into()));
        }
        self.reap_worker();
        self.streaming.store(true, Ordering::Relaxed);

        let output = Arc::clone(&self.output_value);
        let shutdown = Arc::clone(&self.shutdown);
        let streaming = Arc::clone(&self.streaming);
        let handle = thread::Builder::new()
            .name(format!("sim{}_write", self.device_id))
            .spawn(move || {
                // Counting pattern on the output lines, one step per tick.
                let mut written: u64 = 0;
                while !shutdown.load(Ordering::Relaxed) {
                    output.fetch_add(1, Ordering::Relaxed);
                    written += 1;
                    thread::sleep(Duration::from_millis(10));
                }
                streaming.store(false, Ordering::Relaxed);
                info!("simulated write stream stopped after {} bytes", written);
            })
            .map_err(|e| AnalyzerError::Device(format!("failed to spawn writer: {e}")))?;
        self.worker = Some(handle);

        info!("device 0x{:x}: write stream started", self.device_id);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.is_streaming() {
            return Err(AnalyzerError::Device("device is not streaming".into()));
        }
        self.reap_worker();
        Ok(())
    }

    fn input_value(&mut self) -> Result<u8> {
        // Loopback: the simulator's input lines mirror its output lines.
        Ok(self.output_value.load(Ordering::Relaxed))
    }

    fn set_output_value(&mut self, value: u8) -> Result<()> {
        self.output_value.store(value, Ordering::Relaxed);
        Ok(())
    }
}

impl Drop for SimulatedDevice {
    fn drop(&mut self) {
        self.reap_worker();
    }
}
