//! Radio Link Control (RLC) helpers
//!
//! The RLC entities themselves are external. This module owns the parts of
//! the acknowledged-mode wire format the upper layers need: PDU
//! classification and the status PDU codec (3GPP TS 36.322 section 6.2.1).

pub mod am_status;

pub use am_status::{RlcStatusNack, RlcStatusPdu, SegmentOffset, StatusPduError};

/// Receive window size of an AM entity, which bounds the NACK list
pub const RLC_AM_WINDOW_SIZE: usize = 512;

/// AM sequence numbers are 10 bits
pub const RLC_AM_SN_BITS: usize = 10;

/// Kind of an AM PDU, from its first byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmPduKind {
    /// D/C = 1
    Data,
    /// D/C = 0, CPT = 000
    Status,
    /// D/C = 0 with a reserved control PDU type
    ReservedControl(u8),
}

/// Classify an AM PDU by its D/C bit and control PDU type
///
/// Returns `None` for an empty PDU.
pub fn classify_am_pdu(pdu: &[u8]) -> Option<AmPduKind> {
    let first = *pdu.first()?;
    if first & 0x80 != 0 {
        return Some(AmPduKind::Data);
    }
    match (first >> 4) & 0x07 {
        0 => Some(AmPduKind::Status),
        cpt => Some(AmPduKind::ReservedControl(cpt)),
    }
}
