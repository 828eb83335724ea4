//! Bit-level views over byte buffers
//!
//! `BitReader` and `BitWriter` provide MSB-first access for bit-packed
//! wire formats. `BitMessage` is the unpacked one-bit-per-element form that
//! the RRC message codec consumes and produces.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::utils::{pack_bits, unpack_bits};

/// Bit access errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    #[error("read of {requested} bits at bit offset {position} overruns {available} available bits")]
    Overrun {
        position: usize,
        requested: usize,
        available: usize,
    },

    #[error("field width {0} exceeds 32 bits")]
    FieldTooWide(usize),
}

/// MSB-first bit reader bounded by the slice length
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Bits left before the end of the slice
    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.position
    }

    /// Read a single bit
    pub fn read_bit(&mut self) -> Result<bool, BitError> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Read `nbits` (at most 32) as an unsigned value
    ///
    /// On error the position is left unchanged.
    pub fn read_bits(&mut self, nbits: usize) -> Result<u32, BitError> {
        if nbits > 32 {
            return Err(BitError::FieldTooWide(nbits));
        }
        if nbits > self.remaining() {
            return Err(BitError::Overrun {
                position: self.position,
                requested: nbits,
                available: self.remaining(),
            });
        }

        let mut value = 0u32;
        for _ in 0..nbits {
            let byte = self.data[self.position / 8];
            let bit = (byte >> (7 - self.position % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.position += 1;
        }
        Ok(value)
    }
}

/// MSB-first bit writer producing a zero-padded byte buffer
#[derive(Debug, Default)]
pub struct BitWriter {
    buf: BytesMut,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of meaningful bits written so far
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_len % 8 == 0 {
            self.buf.put_u8(0);
        }
        if bit {
            let idx = self.bit_len / 8;
            self.buf[idx] |= 1 << (7 - self.bit_len % 8);
        }
        self.bit_len += 1;
    }

    /// Write the low `nbits` (at most 32) of `value`
    pub fn write_bits(&mut self, value: u32, nbits: usize) -> Result<(), BitError> {
        if nbits > 32 {
            return Err(BitError::FieldTooWide(nbits));
        }
        for i in (0..nbits).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Byte-aligned output; the final partial byte is already zero-padded
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Unpacked bit sequence with an explicit bit length
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitMessage {
    bits: Vec<bool>,
}

impl BitMessage {
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Unpack every bit of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bits: unpack_bits(bytes),
        }
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Zero-pad up to the next byte boundary
    pub fn byte_align(&mut self) {
        let rem = self.bits.len() % 8;
        if rem != 0 {
            self.bits.extend(std::iter::repeat(false).take(8 - rem));
        }
    }

    /// Packed form, zero-padding the last byte if needed
    pub fn to_bytes(&self) -> Bytes {
        pack_bits(&self.bits)
    }
}
