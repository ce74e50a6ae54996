//! CRC-24 checksum validation for Mode S messages

/// CRC-24 generator used in Mode S (0x1FFF409 without the implicit top bit)
pub const GENERATOR: u32 = 0xFFF409;

const CRC_MASK: u32 = 0xFF_FFFF;

/// Table-driven CRC-24
///
/// The remainder over a complete frame (parity field included) is zero for
/// an authentic message.
#[derive(Debug, Clone)]
pub struct Crc24 {
    table: [u32; 256],
}

impl Crc24 {
    pub fn new(generator: u32) -> Self {
        assert!(generator <= CRC_MASK, "generator {:#x} wider than 24 bits", generator);
        Self {
            table: build_table(generator),
        }
    }

    /// Compute the CRC-24 remainder of `bytes`
    pub fn crc(&self, bytes: &[u8]) -> u32 {
        bytes.iter().fold(0u32, |crc, &b| {
            let index = ((crc >> 16) as u8 ^ b) as usize;
            ((crc << 8) ^ self.table[index]) & CRC_MASK
        })
    }
}

impl Default for Crc24 {
    fn default() -> Self {
        Self::new(GENERATOR)
    }
}

/// Residue for each possible leading byte, computed bit by bit
fn build_table(generator: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    for (byte, entry) in table.iter_mut().enumerate() {
        let mut crc = (byte as u32) << 16;
        for _ in 0..8 {
            if crc & 0x800000 != 0 {
                crc = (crc << 1) ^ generator;
            } else {
                crc <<= 1;
            }
        }
        *entry = crc & CRC_MASK;
    }
    table
}
