//! RLC AM status PDU codec
//!
//! ```text
//! D/C(1)=0 | CPT(3)=000 | ACK_SN(10) | E1(1)
//! per NACK: NACK_SN(10) | E1(1) | E2(1) | [SOstart(15) | SOend(15)]
//! zero padding to the next byte boundary
//! ```

use bytes::Bytes;
use common::{BitError, BitReader, BitWriter, BufferError, ByteBuffer};
use thiserror::Error;

use super::{RLC_AM_SN_BITS, RLC_AM_WINDOW_SIZE};

const SO_BITS: usize = 15;
const SN_MAX: u16 = (1 << RLC_AM_SN_BITS) - 1;
const SO_MAX: u16 = (1 << SO_BITS) - 1;

/// Status PDU codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusPduError {
    #[error("not a status PDU (D/C={dc}, CPT={cpt})")]
    NotStatusPdu { dc: bool, cpt: u8 },

    #[error("status PDU truncated at bit {position}")]
    Truncated { position: usize },

    #[error("more than {} NACKs", RLC_AM_WINDOW_SIZE)]
    TooManyNacks,

    #[error("{field} value {value} out of range")]
    FieldOutOfRange { field: &'static str, value: u32 },

    #[error("output buffer: {0}")]
    Buffer(#[from] BufferError),
}

impl From<BitError> for StatusPduError {
    fn from(err: BitError) -> Self {
        match err {
            BitError::Overrun { position, .. } => Self::Truncated { position },
            BitError::FieldTooWide(width) => Self::FieldOutOfRange {
                field: "bit field width",
                value: width as u32,
            },
        }
    }
}

/// Byte range of a missing AM PDU segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOffset {
    pub start: u16,
    /// 0x7fff means "up to the end of the PDU"
    pub end: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RlcStatusNack {
    pub nack_sn: u16,
    pub so: Option<SegmentOffset>,
}

impl RlcStatusNack {
    /// NACK for a whole PDU
    pub fn sn(nack_sn: u16) -> Self {
        Self { nack_sn, so: None }
    }
}

/// Decoded status PDU
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RlcStatusPdu {
    pub ack_sn: u16,
    pub nacks: Vec<RlcStatusNack>,
}

impl RlcStatusPdu {
    /// Pure acknowledgement
    pub fn ack(ack_sn: u16) -> Self {
        Self { ack_sn, nacks: Vec::new() }
    }

    pub fn n_nack(&self) -> usize {
        self.nacks.len()
    }

    /// Decode from exactly `data`; never reads past its end
    pub fn read_from(data: &[u8]) -> Result<Self, StatusPduError> {
        let mut reader = BitReader::new(data);

        let dc = reader.read_bit()?;
        let cpt = reader.read_bits(3)? as u8;
        if dc || cpt != 0 {
            return Err(StatusPduError::NotStatusPdu { dc, cpt });
        }

        let ack_sn = reader.read_bits(RLC_AM_SN_BITS)? as u16;
        let mut ext1 = reader.read_bit()?;

        let mut nacks = Vec::new();
        while ext1 {
            if nacks.len() == RLC_AM_WINDOW_SIZE {
                return Err(StatusPduError::TooManyNacks);
            }
            let nack_sn = reader.read_bits(RLC_AM_SN_BITS)? as u16;
            ext1 = reader.read_bit()?;
            let ext2 = reader.read_bit()?;
            let so = if ext2 {
                Some(SegmentOffset {
                    start: reader.read_bits(SO_BITS)? as u16,
                    end: reader.read_bits(SO_BITS)? as u16,
                })
            } else {
                None
            };
            nacks.push(RlcStatusNack { nack_sn, so });
        }

        Ok(Self { ack_sn, nacks })
    }

    /// Encode into `buf`, replacing its contents
    pub fn write_to(&self, buf: &mut ByteBuffer) -> Result<(), StatusPduError> {
        let bytes = self.encode()?;
        buf.clear();
        buf.append(&bytes)?;
        Ok(())
    }

    /// Encode into a fresh byte-aligned buffer
    pub fn encode(&self) -> Result<Bytes, StatusPduError> {
        self.validate()?;

        let mut writer = BitWriter::new();
        writer.write_bit(false);
        writer.write_bits(0, 3)?;
        writer.write_bits(self.ack_sn as u32, RLC_AM_SN_BITS)?;
        writer.write_bit(!self.nacks.is_empty());

        let last = self.nacks.len().saturating_sub(1);
        for (i, nack) in self.nacks.iter().enumerate() {
            writer.write_bits(nack.nack_sn as u32, RLC_AM_SN_BITS)?;
            writer.write_bit(i < last);
            writer.write_bit(nack.so.is_some());
            if let Some(so) = nack.so {
                writer.write_bits(so.start as u32, SO_BITS)?;
                writer.write_bits(so.end as u32, SO_BITS)?;
            }
        }

        Ok(writer.finish())
    }

    fn validate(&self) -> Result<(), StatusPduError> {
        if self.nacks.len() > RLC_AM_WINDOW_SIZE {
            return Err(StatusPduError::TooManyNacks);
        }
        check_range("ACK_SN", self.ack_sn, SN_MAX)?;
        for nack in &self.nacks {
            check_range("NACK_SN", nack.nack_sn, SN_MAX)?;
            if let Some(so) = nack.so {
                check_range("SOstart", so.start, SO_MAX)?;
                check_range("SOend", so.end, SO_MAX)?;
            }
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: u16, max: u16) -> Result<(), StatusPduError> {
    if value > max {
        return Err(StatusPduError::FieldOutOfRange { field, value: value as u32 });
    }
    Ok(())
}
