//! Bus protocol decoder
//!
//! The decoder is a pure, synchronous, per-sample state transformer: each
//! call to [`Decoder::feed`] evaluates the transition table against one
//! line-state sample, runs the matched rule's action against the owned
//! [`DecoderContext`], and applies the state change. It never blocks, never
//! retries, and has no internal concurrency — callers that stream samples
//! from a background thread must designate a single decode thread to own
//! the instance.

mod context;
mod table;
mod word;

pub use context::{DecoderContext, MAX_CHANNELS, WORD_BITS};
pub use table::{lookup, Action, DecoderState, Rule, TRANSITIONS};
pub use word::{CompletedWord, WORD_MASK};

use thiserror::Error;
use tracing::{debug, trace};

use crate::sample::Sample;

/// Decode faults. Protocol desync is deliberately not here: a sample that
/// matches no rule is a defined no-op, not an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// More channel words were assembled than the context has slots for.
    /// The context has re-anchored to slot 0; decoding may continue.
    #[error("channel overflow: all {capacity} channel slots filled before frame end")]
    ChannelOverflow { capacity: usize },

    /// Session configuration requested more channels per frame than exist.
    #[error("channels per frame must be 1-{max}, got {requested}")]
    InvalidChannelCount { requested: usize, max: usize },
}

/// Per-session decoder configuration.
#[derive(Clone, Copy, Debug)]
pub struct DecoderConfig {
    /// How many channel words a frame-end finalizes. The bus variant this
    /// decoder was written for carries a single word per frame.
    pub channels_per_frame: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            channels_per_frame: 1,
        }
    }
}

/// Event produced by [`Decoder::feed`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeEvent {
    /// A frame opened (strobe rising from idle).
    FrameStart,
    /// A frame ended; carries the finalized channel words in channel order.
    FrameEnd(Vec<CompletedWord>),
}

/// Edge-triggered decode state machine.
pub struct Decoder {
    config: DecoderConfig,
    context: DecoderContext,
    frames_decoded: u64,
}

impl Decoder {
    /// Create a decoder with the default single-channel configuration.
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default()).expect("default config is valid")
    }

    /// Create a decoder with an explicit configuration.
    pub fn with_config(config: DecoderConfig) -> Result<Self, DecodeError> {
        if config.channels_per_frame == 0 || config.channels_per_frame > MAX_CHANNELS {
            return Err(DecodeError::InvalidChannelCount {
                requested: config.channels_per_frame,
                max: MAX_CHANNELS,
            });
        }
        Ok(Self {
            config,
            context: DecoderContext::new(),
            frames_decoded: 0,
        })
    }

    /// The owned decode context (state, cursors, accumulators).
    pub fn context(&self) -> &DecoderContext {
        &self.context
    }

    /// Number of complete frames decoded so far.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Consume one line-state sample.
    ///
    /// Returns `Ok(None)` for samples that cause no observable output —
    /// including out-of-protocol samples, which leave the context entirely
    /// untouched. The state change of a matched rule is applied even when
    /// its action faults, so a caller that chooses to continue after a
    /// [`DecodeError::ChannelOverflow`] sees a consistent machine.
    pub fn feed(&mut self, sample: Sample) -> Result<Option<DecodeEvent>, DecodeError> {
        let Some(rule) = lookup(self.context.state(), sample) else {
            return Ok(None);
        };
        trace!(
            "{} in {:?}: -> {:?} ({:?})",
            sample,
            rule.from,
            rule.to,
            rule.action
        );

        let result = match rule.action {
            Action::None => Ok(None),
            Action::FrameStart => Ok(Some(DecodeEvent::FrameStart)),
            Action::DataBit => self.context.shift_in(sample.data_line()).map(|()| None),
            Action::FrameEnd => {
                let words = self.context.finalize_frame(self.config.channels_per_frame);
                self.frames_decoded += 1;
                debug!(
                    "frame #{} complete: {} word(s)",
                    self.frames_decoded,
                    words.len()
                );
                Ok(Some(DecodeEvent::FrameEnd(words)))
            }
        };

        self.context.state = rule.to;
        result
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
