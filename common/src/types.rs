//! Common Types for the LTE UE stack
//!
//! Defines fundamental types used throughout the protocol stack

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of subframe ticks (TTIs) in one hyper-frame cycle (1024 frames x 10 subframes)
pub const TTI_HYPERFRAME: u32 = 10240;

/// Number of TTIs per radio frame
pub const TTIS_PER_FRAME: u32 = 10;

/// Highest data radio bearer index supported by the stack
pub const MAX_DRB_ID: u8 = 8;

/// Radio bearer identifier
///
/// Every PDCP, RLC and MAC operation is indexed by this id. The logical
/// channel id is 0 for SRB0, 1 and 2 for SRB1/SRB2 and `2 + n` for DRBn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RadioBearerId {
    /// Common control signalling (CCCH), no PDCP header
    Srb0,
    /// Dedicated control signalling (DCCH)
    Srb1,
    /// Dedicated control signalling, lower priority (DCCH)
    Srb2,
    /// Data radio bearer 1..=8
    Drb(u8),
}

impl RadioBearerId {
    /// Map a logical channel id to a bearer id
    pub fn from_lcid(lcid: u32) -> Option<Self> {
        match lcid {
            0 => Some(Self::Srb0),
            1 => Some(Self::Srb1),
            2 => Some(Self::Srb2),
            n if n >= 3 && n <= 2 + MAX_DRB_ID as u32 => Some(Self::Drb((n - 2) as u8)),
            _ => None,
        }
    }

    /// Build a DRB id, validating the range
    pub fn drb(id: u8) -> Option<Self> {
        if (1..=MAX_DRB_ID).contains(&id) {
            Some(Self::Drb(id))
        } else {
            None
        }
    }

    /// Logical channel id of this bearer
    pub fn lcid(&self) -> u32 {
        match self {
            Self::Srb0 => 0,
            Self::Srb1 => 1,
            Self::Srb2 => 2,
            Self::Drb(n) => 2 + *n as u32,
        }
    }

    /// True for SRB0, SRB1 and SRB2
    pub fn is_srb(&self) -> bool {
        !self.is_drb()
    }

    pub fn is_drb(&self) -> bool {
        matches!(self, Self::Drb(_))
    }
}

impl fmt::Display for RadioBearerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Srb0 => write!(f, "SRB0"),
            Self::Srb1 => write!(f, "SRB1"),
            Self::Srb2 => write!(f, "SRB2"),
            Self::Drb(n) => write!(f, "DRB{}", n),
        }
    }
}

/// Physical cell identity as broadcast in SIB1 (28-bit cell identity)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl CellId {
    /// eNB-local part of the cell identity (lower 12 bits)
    pub fn local_id(&self) -> u32 {
        self.0 & 0xfff
    }
}

/// Security key material direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Uplink = 0,
    Downlink = 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_lcid_mapping() {
        assert_eq!(RadioBearerId::from_lcid(0), Some(RadioBearerId::Srb0));
        assert_eq!(RadioBearerId::from_lcid(2), Some(RadioBearerId::Srb2));
        assert_eq!(RadioBearerId::from_lcid(3), Some(RadioBearerId::Drb(1)));
        assert_eq!(RadioBearerId::from_lcid(10), Some(RadioBearerId::Drb(8)));
        assert_eq!(RadioBearerId::from_lcid(11), None);

        for lcid in 0..=10 {
            assert_eq!(RadioBearerId::from_lcid(lcid).unwrap().lcid(), lcid);
        }
    }

    #[test]
    fn test_drb_range() {
        assert!(RadioBearerId::drb(0).is_none());
        assert!(RadioBearerId::drb(9).is_none());
        assert!(RadioBearerId::drb(1).unwrap().is_drb());
        assert!(RadioBearerId::Srb1.is_srb());
    }

    #[test]
    fn test_bearer_display() {
        assert_eq!(RadioBearerId::Srb0.to_string(), "SRB0");
        assert_eq!(RadioBearerId::Drb(3).to_string(), "DRB3");
    }

    #[test]
    fn test_cell_id_local_part() {
        assert_eq!(CellId(0x1a2b3c4).local_id(), 0x3c4);
    }
}
