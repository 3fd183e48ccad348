//! Sample sources
//!
//! Anything that yields an ordered sequence of line-state samples: a
//! capture file in replay mode, or a channel fed by a live acquisition
//! thread. Exhaustion is always reported through the per-read result —
//! `Ok(None)` means the source has ended — so the terminal sample is
//! processed exactly once and a stale buffer is never re-read.

use std::collections::VecDeque;

use crossbeam_channel::Receiver;
use tracing::debug;

use crate::sample::Sample;
use crate::Result;

/// An ordered sequence of raw line-state samples.
pub trait SampleSource {
    /// The next sample, or `Ok(None)` once the source is exhausted.
    fn next_sample(&mut self) -> Result<Option<Sample>>;
}

/// Message carried on the acquisition channel.
///
/// Samples travel in chunks, as the hardware delivers them; the explicit
/// end-of-stream variant lets the producer close the stream even while
/// other clones of the sender are still alive.
#[derive(Clone, Debug)]
pub enum StreamMessage {
    /// A chunk of raw line-state bytes in arrival order.
    Samples(Vec<u8>),
    /// No more data will be sent.
    EndOfStream,
}

/// Live source draining chunked samples from a crossbeam channel.
///
/// Exactly one decode thread should own this (and the decoder it feeds);
/// the channel is the hand-off point from the acquisition thread.
pub struct ChannelSource {
    receiver: Receiver<StreamMessage>,
    pending: VecDeque<u8>,
    ended: bool,
}

impl ChannelSource {
    pub fn new(receiver: Receiver<StreamMessage>) -> Self {
        Self {
            receiver,
            pending: VecDeque::new(),
            ended: false,
        }
    }
}

impl SampleSource for ChannelSource {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        loop {
            if let Some(raw) = self.pending.pop_front() {
                return Ok(Some(Sample::new(raw)));
            }
            if self.ended {
                return Ok(None);
            }
            match self.receiver.recv() {
                Ok(StreamMessage::Samples(chunk)) => self.pending.extend(chunk),
                Ok(StreamMessage::EndOfStream) => {
                    debug!("acquisition channel signalled end of stream");
                    self.ended = true;
                }
                Err(_) => {
                    // Producer dropped without an end-of-stream marker;
                    // treat disconnection the same way.
                    debug!("acquisition channel disconnected");
                    self.ended = true;
                }
            }
        }
    }
}

/// In-memory source, for tests and synthetic captures.
pub struct MemorySource {
    samples: VecDeque<u8>,
}

impl MemorySource {
    pub fn new(samples: impl Into<VecDeque<u8>>) -> Self {
        Self {
            samples: samples.into(),
        }
    }
}

impl SampleSource for MemorySource {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        Ok(self.samples.pop_front().map(Sample::new))
    }
}
