//! Decoder context and word assembly
//!
//! All mutable decode state lives in one owned [`DecoderContext`]: the
//! current protocol state, the per-channel word accumulators, and the
//! channel/bit cursors. One decoder owns one context; there is no sharing
//! and no internal synchronization.

use tracing::debug;

use super::table::DecoderState;
use super::word::CompletedWord;
use super::DecodeError;

/// Width of one channel word in bits.
pub const WORD_BITS: u32 = 24;

/// Number of channel accumulator slots.
pub const MAX_CHANNELS: usize = 4;

/// Owned decode state: protocol state, accumulators, cursors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderContext {
    pub(crate) state: DecoderState,
    channels: [u32; MAX_CHANNELS],
    current_channel: usize,
    current_bit: u32,
}

impl DecoderContext {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Idle,
            channels: [0; MAX_CHANNELS],
            current_channel: 0,
            current_bit: 0,
        }
    }

    /// Current protocol state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Shift one captured bit into the current channel word, MSB-first:
    /// the new bit becomes the new LSB, prior bits move left.
    ///
    /// When the word reaches [`WORD_BITS`] bits the bit cursor resets and
    /// the channel cursor advances to a freshly zeroed slot. Advancing past
    /// the last slot is a reported fault: the context re-anchors to slot 0
    /// so decoding can continue deterministically, and
    /// [`DecodeError::ChannelOverflow`] is returned.
    pub fn shift_in(&mut self, bit: bool) -> Result<(), DecodeError> {
        let slot = &mut self.channels[self.current_channel];
        *slot <<= 1;
        if bit {
            *slot |= 1;
        }

        self.current_bit += 1;
        if self.current_bit == WORD_BITS {
            self.current_bit = 0;
            self.current_channel += 1;
            if self.current_channel == MAX_CHANNELS {
                debug!(
                    "channel overflow: all {} slots filled before frame end, re-anchoring",
                    MAX_CHANNELS
                );
                self.current_channel = 0;
                self.channels[0] = 0;
                return Err(DecodeError::ChannelOverflow {
                    capacity: MAX_CHANNELS,
                });
            }
            self.channels[self.current_channel] = 0;
        }
        Ok(())
    }

    /// Finalize the frame: emit the first `channels_per_frame` channel
    /// words, then reset the cursors and zero the first slot for the next
    /// frame.
    pub fn finalize_frame(&mut self, channels_per_frame: usize) -> Vec<CompletedWord> {
        let words = (0..channels_per_frame)
            .map(|i| CompletedWord::new(i, self.channels[i]))
            .collect();

        self.current_channel = 0;
        self.current_bit = 0;
        self.channels[0] = 0;

        words
    }
}

impl Default for DecoderContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_in_is_msb_first() {
        let mut ctx = DecoderContext::new();
        // 1 then 23 zeros: the first bit ends up at bit 23.
        ctx.shift_in(true).unwrap();
        for _ in 0..(WORD_BITS - 1) {
            ctx.shift_in(false).unwrap();
        }
        let words = ctx.finalize_frame(1);
        assert_eq!(words[0].raw(), 0x80_0000);
    }

    #[test]
    fn test_word_boundary_advances_channel() {
        let mut ctx = DecoderContext::new();
        for _ in 0..WORD_BITS {
            ctx.shift_in(true).unwrap();
        }
        // Slot 0 holds all ones; the cursor moved to a zeroed slot 1.
        ctx.shift_in(true).unwrap();
        let words = ctx.finalize_frame(2);
        assert_eq!(words[0].raw(), 0xFF_FFFF);
        assert_eq!(words[1].raw(), 0x00_0001);
    }

    #[test]
    fn test_overflow_is_reported_and_reanchors() {
        let mut ctx = DecoderContext::new();
        let total = MAX_CHANNELS as u32 * WORD_BITS;
        let mut faults = 0;
        for i in 0..total {
            match ctx.shift_in(true) {
                // Only filling the last slot faults.
                Ok(()) => assert_ne!(i, total - 1),
                Err(DecodeError::ChannelOverflow { capacity }) => {
                    assert_eq!(capacity, MAX_CHANNELS);
                    assert_eq!(i, total - 1);
                    faults += 1;
                }
                Err(e) => panic!("unexpected fault: {e}"),
            }
        }
        assert_eq!(faults, 1);
        assert_eq!(ctx.current_channel, 0);
        assert_eq!(ctx.current_bit, 0);
        assert_eq!(ctx.channels[0], 0);
    }

    #[test]
    fn test_finalize_resets_cursors() {
        let mut ctx = DecoderContext::new();
        for _ in 0..10 {
            ctx.shift_in(true).unwrap();
        }
        ctx.finalize_frame(1);
        assert_eq!(ctx.current_channel, 0);
        assert_eq!(ctx.current_bit, 0);
        assert_eq!(ctx.channels[0], 0);
    }
}
