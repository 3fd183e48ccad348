//! Completed channel words

/// Mask covering the 24 significant bits of a channel word.
pub const WORD_MASK: u32 = 0x00FF_FFFF;

/// Sign bit of a 24-bit two's-complement word.
const SIGN_BIT: u32 = 0x0080_0000;

/// One finished channel word, produced at frame end.
///
/// Carries the raw 24-bit value together with its interpretation rules:
/// unsigned little-endian bytes for binary output, 24-bit two's-complement
/// for human-readable output. Output-only — it does not persist in the
/// decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletedWord {
    channel: usize,
    raw: u32,
}

impl CompletedWord {
    pub fn new(channel: usize, raw: u32) -> Self {
        Self {
            channel,
            raw: raw & WORD_MASK,
        }
    }

    /// Channel slot this word was assembled in.
    pub fn channel(self) -> usize {
        self.channel
    }

    /// The raw 24-bit value, unsigned.
    pub fn raw(self) -> u32 {
        self.raw
    }

    /// The value interpreted as 24-bit two's-complement.
    pub fn as_signed(self) -> i32 {
        if self.raw & SIGN_BIT != 0 {
            self.raw as i32 - (1 << 24)
        } else {
            self.raw as i32
        }
    }

    /// The value as three bytes, least-significant byte first.
    pub fn to_le_bytes(self) -> [u8; 3] {
        [
            (self.raw & 0xFF) as u8,
            ((self.raw >> 8) & 0xFF) as u8,
            ((self.raw >> 16) & 0xFF) as u8,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_interpretation() {
        assert_eq!(CompletedWord::new(0, 0xFF_FFFF).as_signed(), -1);
        assert_eq!(CompletedWord::new(0, 0x00_0001).as_signed(), 1);
        assert_eq!(CompletedWord::new(0, 0x80_0000).as_signed(), -8_388_608);
        assert_eq!(CompletedWord::new(0, 0x7F_FFFF).as_signed(), 8_388_607);
        assert_eq!(CompletedWord::new(0, 0).as_signed(), 0);
    }

    #[test]
    fn test_le_bytes() {
        let w = CompletedWord::new(0, 0x12_34_56);
        assert_eq!(w.to_le_bytes(), [0x56, 0x34, 0x12]);
    }

    #[test]
    fn test_le_bytes_round_trip() {
        let value = 0xAB_CD_EF;
        let [b0, b1, b2] = CompletedWord::new(0, value).to_le_bytes();
        let rebuilt = b0 as u32 | (b1 as u32) << 8 | (b2 as u32) << 16;
        assert_eq!(rebuilt, value);
    }

    #[test]
    fn test_excess_bits_masked() {
        assert_eq!(CompletedWord::new(0, 0xFF00_0001).raw(), 0x00_0001);
    }
}
