//! CRC-8 checksum for report frames.
//!
//! The device firmware validates frames with avr-libc's `_crc8_ccitt_update`:
//! polynomial 0x07, initial value 0, MSB-first, no final XOR. That is the
//! CRC-8/SMBUS parameter set, so the table-driven engine from the `crc` crate
//! produces bit-identical results.

use crc::{Crc, CRC_8_SMBUS};

/// Table-driven engine shared by the batch and running checksums.
const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// Calculate the 8-bit checksum of a byte slice.
///
/// # Example
///
/// ```
/// use pad_proto::checksum8;
///
/// // Checksum of the neutral report payload
/// assert_eq!(checksum8(&[0x00, 0x00, 0x08, 0x80, 0x80, 0x80, 0x80, 0x00]), 0x54);
/// ```
#[inline]
#[must_use]
pub fn checksum8(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}

/// Running checksum, fed one received byte at a time the way the device
/// accumulates it.
pub struct Crc8Digest {
    digest: crc::Digest<'static, u8>,
}

impl Crc8Digest {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            digest: CRC8.digest(),
        }
    }

    /// Fold in one byte.
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.digest.update(&[byte]);
    }

    #[inline]
    pub fn update_slice(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Checksum of everything folded in so far.
    #[inline]
    #[must_use]
    pub fn finalize(self) -> u8 {
        self.digest.finalize()
    }
}

impl Default for Crc8Digest {
    fn default() -> Self {
        Self::new()
    }
}
