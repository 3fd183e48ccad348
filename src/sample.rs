//! Line-state samples
//!
//! A [`Sample`] is one byte-wide snapshot of the monitored signal lines,
//! as delivered by the acquisition hardware or read back from a capture
//! file. Three bits carry meaning; the rest are ignored by the decoder.

use std::fmt;

/// Bit mask for the frame-strobe line (frame boundaries).
pub const FRAME_STROBE: u8 = 0b0000_0001;
/// Bit mask for the bit-clock line (data bit capture points).
pub const BIT_CLOCK: u8 = 0b0000_0010;
/// Bit mask for the data line (the bit value itself).
pub const DATA_LINE: u8 = 0b0000_0100;

/// One snapshot of the monitored digital lines.
///
/// Samples are immutable and consumed one at a time; the decoder never
/// retains them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample(u8);

impl Sample {
    /// Create a sample from a raw line-state byte.
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// The raw line-state byte.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Frame-strobe line level.
    pub const fn frame_strobe(self) -> bool {
        self.0 & FRAME_STROBE != 0
    }

    /// Bit-clock line level.
    pub const fn bit_clock(self) -> bool {
        self.0 & BIT_CLOCK != 0
    }

    /// Data line level.
    pub const fn data_line(self) -> bool {
        self.0 & DATA_LINE != 0
    }

    /// Masked comparison used by transition-table rules.
    pub const fn matches(self, mask: u8, value: u8) -> bool {
        self.0 & mask == value
    }
}

impl From<u8> for Sample {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Sample[strobe={} clk={} data={}]",
            u8::from(self.frame_strobe()),
            u8::from(self.bit_clock()),
            u8::from(self.data_line()),
        )
    }
}
