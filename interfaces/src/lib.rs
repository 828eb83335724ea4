//! Inter-layer Interfaces Library
//!
//! This crate defines the contracts between the UE upper layers and their
//! external collaborators: the MAC/PHY parameter catalog, the lower-layer
//! traits, the decoded RRC message model and the RRC message codec.

pub mod codec;
pub mod lower_layers;
pub mod params;
pub mod rrc_msg;

pub use codec::RrcCodec;
pub use lower_layers::{
    GwInterfacePdcp, MacInterfaceRrc, PhyInterfaceRrc, RlcInterfacePdcp, RlcInterfaceRrc,
};
pub use params::{LogicalChannelParams, MacParam, PhyParam};

use common::BitError;
use thiserror::Error;

/// Interface errors
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("Message decode failed: {0}")]
    Decode(String),

    #[error("Message encode failed: {0}")]
    Encode(String),

    #[error("Bit buffer error: {0}")]
    Bits(#[from] BitError),

    #[error("Interface not initialized")]
    NotInitialized,
}
