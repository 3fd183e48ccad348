//! Protocol transition table
//!
//! The bus protocol is defined declaratively: an ordered list of rules, each
//! mapping (current state, masked sample pattern) to (next state, action).
//! Lookup is first-match-wins in declaration order. A sample matching no
//! rule for the current state is a silent self-loop — out-of-protocol
//! samples never raise errors, the decoder simply holds state.

use crate::sample::{BIT_CLOCK, FRAME_STROBE, Sample};

/// Decoder state.
///
/// `FrameFirstBit`, `FrameEnd` and `DataBitStart` are part of the protocol's
/// state vocabulary but no rule targets them; they exist so the table can
/// name every state the protocol defines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    Idle,
    FrameStart,
    FrameFirstBit,
    FrameActive,
    FrameEnd,
    DataBitStart,
    DataBitActive,
}

/// Action attached to a transition rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// State change only.
    None,
    /// Signal that a frame has opened.
    FrameStart,
    /// Capture the data line into the current channel word.
    DataBit,
    /// Finalize the frame's channel words.
    FrameEnd,
}

/// One transition rule: matches when the decoder is in `from` and
/// `sample & mask == value`.
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    pub from: DecoderState,
    pub mask: u8,
    pub value: u8,
    pub to: DecoderState,
    pub action: Action,
}

/// The canonical rule set.
///
/// Strobe rising opens a frame; strobe falling confirms it active; each
/// data bit is captured on the falling edge of the bit clock; strobe rising
/// while a frame is active ends it and immediately begins the next.
pub const TRANSITIONS: [Rule; 5] = [
    Rule {
        from: DecoderState::Idle,
        mask: FRAME_STROBE,
        value: FRAME_STROBE,
        to: DecoderState::FrameStart,
        action: Action::FrameStart,
    },
    Rule {
        from: DecoderState::FrameStart,
        mask: FRAME_STROBE,
        value: 0,
        to: DecoderState::FrameActive,
        action: Action::None,
    },
    Rule {
        from: DecoderState::FrameActive,
        mask: BIT_CLOCK,
        value: BIT_CLOCK,
        to: DecoderState::DataBitActive,
        action: Action::None,
    },
    Rule {
        from: DecoderState::DataBitActive,
        mask: BIT_CLOCK,
        value: 0,
        to: DecoderState::FrameActive,
        action: Action::DataBit,
    },
    Rule {
        from: DecoderState::FrameActive,
        mask: FRAME_STROBE,
        value: FRAME_STROBE,
        to: DecoderState::FrameStart,
        action: Action::FrameEnd,
    },
];

/// Find the first rule matching the current state and sample, if any.
pub fn lookup(state: DecoderState, sample: Sample) -> Option<&'static Rule> {
    TRANSITIONS
        .iter()
        .find(|rule| rule.from == state && sample.matches(rule.mask, rule.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strobe_rising_opens_frame() {
        let rule = lookup(DecoderState::Idle, Sample::new(0x01)).unwrap();
        assert_eq!(rule.to, DecoderState::FrameStart);
        assert_eq!(rule.action, Action::FrameStart);
    }

    #[test]
    fn test_no_match_for_out_of_protocol_sample() {
        // Bit clock toggling while idle matches nothing.
        assert!(lookup(DecoderState::Idle, Sample::new(0x02)).is_none());
        assert!(lookup(DecoderState::FrameStart, Sample::new(0x01)).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        // From FrameActive a sample with both clock and strobe set matches
        // rule 3 (clock rising) before rule 5 (frame end): declaration
        // order is the tie-break.
        let rule = lookup(DecoderState::FrameActive, Sample::new(0x03)).unwrap();
        assert_eq!(rule.to, DecoderState::DataBitActive);
        assert_eq!(rule.action, Action::None);
    }

    #[test]
    fn test_data_bit_captured_on_clock_falling() {
        let rule = lookup(DecoderState::DataBitActive, Sample::new(0x00)).unwrap();
        assert_eq!(rule.to, DecoderState::FrameActive);
        assert_eq!(rule.action, Action::DataBit);

        // Clock still high: no transition.
        assert!(lookup(DecoderState::DataBitActive, Sample::new(0x02)).is_none());
    }

    #[test]
    fn test_frame_end_reenters_frame_start() {
        let rule = lookup(DecoderState::FrameActive, Sample::new(0x01)).unwrap();
        assert_eq!(rule.to, DecoderState::FrameStart);
        assert_eq!(rule.action, Action::FrameEnd);
    }

    #[test]
    fn test_unreachable_states_have_no_rules() {
        for state in [
            DecoderState::FrameFirstBit,
            DecoderState::FrameEnd,
            DecoderState::DataBitStart,
        ] {
            for raw in 0..=7u8 {
                assert!(lookup(state, Sample::new(raw)).is_none());
            }
        }
    }
}
