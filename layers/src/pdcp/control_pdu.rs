//! PDCP control-plane data PDU (SRB) framing
//!
//! ```text
//! R R R SN(5) | payload | MAC-I(32)
//! ```

use bytes::Bytes;
use common::ByteBuffer;

use crate::LayerError;

/// SRBs carry a 5-bit sequence number
pub const SRB_SN_MASK: u32 = 0x1f;

pub const HEADER_LEN: usize = 1;
pub const MAC_I_LEN: usize = 4;

/// Unpacked control PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPdu {
    /// Low 5 bits of COUNT as carried in the header
    pub sn: u8,
    pub payload: Bytes,
    pub mac_i: [u8; MAC_I_LEN],
}

/// Frame `payload` into `pdu`, replacing its contents
pub fn pack(count: u32, payload: &[u8], mac_i: [u8; MAC_I_LEN], pdu: &mut ByteBuffer) -> Result<(), LayerError> {
    pdu.clear();
    pdu.append(&[(count & SRB_SN_MASK) as u8])?;
    pdu.append(payload)?;
    pdu.append(&mac_i)?;
    Ok(())
}

pub fn unpack(pdu: &[u8]) -> Result<ControlPdu, LayerError> {
    if pdu.len() < HEADER_LEN + MAC_I_LEN {
        return Err(LayerError::InvalidPdu(format!(
            "PDCP control PDU of {} bytes is shorter than header and MAC-I",
            pdu.len()
        )));
    }

    let (body, tail) = pdu.split_at(pdu.len() - MAC_I_LEN);
    let mut mac_i = [0u8; MAC_I_LEN];
    mac_i.copy_from_slice(tail);

    Ok(ControlPdu {
        sn: body[0] & SRB_SN_MASK as u8,
        payload: Bytes::copy_from_slice(&body[HEADER_LEN..]),
        mac_i,
    })
}
