//! RRC message codec contract
//!
//! The ASN.1 PER encoder/decoder lives outside this workspace. RRC calls
//! into it through [`RrcCodec`], exchanging bit-addressed messages.

use common::BitMessage;

use crate::rrc_msg::{BcchDlschMessage, DlCcchMessage, Mib, UlCcchMessage};
use crate::InterfaceError;

/// Pack/unpack of the RRC logical channel messages handled by the UE
pub trait RrcCodec: Send + Sync {
    /// Decode a BCCH-BCH message (MIB)
    fn unpack_bcch_bch(&self, msg: &BitMessage) -> Result<Mib, InterfaceError>;

    /// Decode a BCCH-DL-SCH message (SIB1 or SI)
    fn unpack_bcch_dlsch(&self, msg: &BitMessage) -> Result<BcchDlschMessage, InterfaceError>;

    /// Decode a DL-CCCH message
    fn unpack_dl_ccch(&self, msg: &BitMessage) -> Result<DlCcchMessage, InterfaceError>;

    /// Encode an UL-CCCH message; the result is not byte aligned
    fn pack_ul_ccch(&self, msg: &UlCcchMessage) -> Result<BitMessage, InterfaceError>;
}
