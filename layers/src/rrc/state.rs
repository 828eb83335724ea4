//! RRC connection state

use std::fmt;

/// Acquisition and connection progress, totally ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RrcState {
    #[default]
    Idle,
    Sib1Search,
    Sib2Search,
    WaitForConnSetup,
    Connected,
}

impl RrcState {
    /// States in which the SI acquisition task keeps running
    pub fn is_searching(&self) -> bool {
        matches!(self, Self::Sib1Search | Self::Sib2Search)
    }
}

impl fmt::Display for RrcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Sib1Search => "SIB1_SEARCH",
            Self::Sib2Search => "SIB2_SEARCH",
            Self::WaitForConnSetup => "WAIT_FOR_CON_SETUP",
            Self::Connected => "RRC_CONNECTED",
        };
        f.write_str(name)
    }
}
