//! Lower-layer and gateway interfaces consumed by PDCP and RRC
//!
//! MAC, PHY, RLC and the user-plane gateway are external to this
//! workspace. The upper layers only see them through these traits.

use async_trait::async_trait;
use common::{ByteBuffer, RadioBearerId};

use crate::params::{LogicalChannelParams, MacParam, PhyParam};
use crate::rrc_msg::RlcConfig;
use crate::InterfaceError;

/// MAC services used by RRC
#[async_trait]
pub trait MacInterfaceRrc: Send + Sync {
    /// Push one configuration knob
    async fn set_param(&self, param: MacParam);

    /// Current subframe tick, 0..10240
    async fn current_tti(&self) -> u32;

    /// Configure the logical channel of a bearer
    async fn setup_lcid(&self, bearer: RadioBearerId, params: LogicalChannelParams);

    /// Drop all RA/HARQ state and return to the SIB2 defaults
    async fn reset(&self);
}

/// PHY services used by RRC
#[async_trait]
pub trait PhyInterfaceRrc: Send + Sync {
    async fn set_param(&self, param: PhyParam);

    /// Commit the uplink parameters pushed since the last call
    async fn configure_ul_params(&self);

    /// Resolves once the PHY is synchronised to the cell
    async fn wait_for_sync(&self);
}

/// RLC services used by PDCP
#[async_trait]
pub trait RlcInterfacePdcp: Send + Sync {
    /// Hand a PDCP PDU to the RLC entity of `bearer`
    async fn write_sdu(&self, bearer: RadioBearerId, sdu: ByteBuffer)
        -> Result<(), InterfaceError>;
}

/// RLC services used by RRC
#[async_trait]
pub trait RlcInterfaceRrc: Send + Sync {
    /// Create the RLC entity of `bearer`; `None` selects the default configuration
    async fn add_bearer(
        &self,
        bearer: RadioBearerId,
        config: Option<RlcConfig>,
    ) -> Result<(), InterfaceError>;
}

/// User-plane gateway fed by PDCP for data bearers
#[async_trait]
pub trait GwInterfacePdcp: Send + Sync {
    async fn write_pdu(&self, bearer: RadioBearerId, pdu: ByteBuffer)
        -> Result<(), InterfaceError>;
}
