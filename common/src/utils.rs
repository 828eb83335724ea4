//! Common Utilities
//!
//! Hex dumps and bit vector conversions

use bytes::{BufMut, Bytes, BytesMut};

/// Space separated lowercase hex, for log lines
pub fn bytes_to_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// MSB-first bits to bytes, zero-padding the last byte
pub fn pack_bits(bits: &[bool]) -> Bytes {
    let mut bytes = BytesMut::with_capacity(bits.len().div_ceil(8));
    for chunk in bits.chunks(8) {
        let byte = chunk
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &bit)| acc | ((bit as u8) << (7 - i)));
        bytes.put_u8(byte);
    }
    bytes.freeze()
}

/// Bytes to MSB-first bits
pub fn unpack_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
        .collect()
}

/// Read `nbytes` (at most 8) as a big-endian unsigned integer
pub fn be_uint(data: &[u8], nbytes: usize) -> Option<u64> {
    if nbytes > 8 || data.len() < nbytes {
        return None;
    }
    Some(data[..nbytes].iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_dump() {
        assert_eq!(bytes_to_hex(&[0x00, 0x78]), "00 78");
        assert_eq!(bytes_to_hex(&[]), "");
    }

    #[test]
    fn test_bits_msb_first() {
        let bits = unpack_bits(&[0x80, 0x01]);
        assert_eq!(bits.len(), 16);
        assert!(bits[0]);
        assert!(bits[15]);
        assert_eq!(bits.iter().filter(|b| **b).count(), 2);
        assert_eq!(&pack_bits(&bits)[..], &[0x80, 0x01]);
    }

    #[test]
    fn test_partial_byte_is_zero_padded() {
        let packed = pack_bits(&[true, true, true]);
        assert_eq!(&packed[..], &[0xE0]);
    }

    #[test]
    fn test_be_uint() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert_eq!(be_uint(&data, 6), Some(0x0102_0304_0506));
        assert_eq!(be_uint(&data[..5], 6), None);
    }
}
