//! Bit extraction primitives over 64-bit words
//!
//! Bit 0 is the least significant bit. Out-of-range arguments are caller
//! defects and panic.

/// Extract the `length`-bit unsigned field starting at bit `start` of `word`.
#[inline]
pub fn extract_uint(word: u64, start: u32, length: u32) -> u32 {
    assert!(length > 0 && length < 32, "invalid field width {}", length);
    assert!(start + length <= 64, "field {}+{} exceeds word", start, length);
    ((word >> start) & ((1u64 << length) - 1)) as u32
}

/// Wide variant of [`extract_uint`] for fields up to 63 bits.
#[inline]
pub fn extract_u64(word: u64, start: u32, length: u32) -> u64 {
    assert!(length > 0 && length < 64, "invalid field width {}", length);
    assert!(start + length <= 64, "field {}+{} exceeds word", start, length);
    (word >> start) & ((1u64 << length) - 1)
}

/// Test bit `index` of `word`.
#[inline]
pub fn test_bit(word: u64, index: u32) -> bool {
    assert!(index < 64, "bit index {} out of range", index);
    (word >> index) & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORD: u64 = 0x58C3_82D6_90C8_AC28;

    #[test]
    fn test_extract_matches_shift_and_mask() {
        for start in 0..64u32 {
            for length in 1..=(64 - start).min(63) {
                let expected = (WORD >> start) & ((1u64 << length) - 1);
                assert_eq!(extract_u64(WORD, start, length), expected);
                assert!(expected < (1u64 << length));
                if length < 32 {
                    assert_eq!(extract_uint(WORD, start, length) as u64, expected);
                }
            }
        }
    }

    #[test]
    fn test_extract_known_fields() {
        // ME field of an airborne position message
        let me: u64 = 0x58_C382_D690_C8AC;
        assert_eq!(extract_uint(me, 51, 5), 11);
        assert_eq!(extract_uint(me, 36, 12), 0xC38);
        assert_eq!(extract_uint(me, 17, 17), 93000);
        assert_eq!(extract_uint(me, 0, 17), 51372);
    }

    #[test]
    fn test_single_bit() {
        assert!(test_bit(0b100, 2));
        assert!(!test_bit(0b100, 1));
        assert!(test_bit(u64::MAX, 63));
    }

    #[test]
    #[should_panic]
    fn test_extract_rejects_full_width() {
        extract_u64(WORD, 0, 64);
    }

    #[test]
    #[should_panic]
    fn test_extract_rejects_overrun() {
        extract_uint(WORD, 60, 8);
    }
}
