//! Protocol Stack Layers Library
//!
//! This crate implements the LTE UE upper layers: the RRC state machine,
//! the PDCP entities of the signalling bearers and the RLC AM status PDU
//! codec.

pub mod config;
pub mod pdcp;
pub mod rlc;
pub mod rrc;
pub mod stack;

use async_trait::async_trait;
use common::{BufferError, RadioBearerId};
use interfaces::InterfaceError;
use thiserror::Error;

pub use config::StackConfig;
pub use stack::UeStack;

/// Common errors for protocol layers
#[derive(Error, Debug)]
pub enum LayerError {
    #[error("Invalid protocol data unit: {0}")]
    InvalidPdu(String),

    #[error("Layer not initialized")]
    NotInitialized,

    #[error("Bearer {0} not active")]
    BearerNotActive(RadioBearerId),

    #[error("Bearer {0} not valid for this message")]
    InvalidBearer(RadioBearerId),

    #[error("Invalid index {index} for table {table}")]
    InvalidTableIndex { table: &'static str, index: u32 },

    #[error("Not supported: {0}")]
    NotSupported(&'static str),

    #[error("COUNT exhausted on bearer {0}")]
    CountExhausted(RadioBearerId),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Interface error: {0}")]
    Interface(#[from] InterfaceError),

    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),
}

impl LayerError {
    /// Programming-contract errors, as opposed to bad input from the network
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::NotInitialized | Self::BearerNotActive(_))
    }

    /// Paths that exist but are not implemented
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }
}

/// Common trait for all protocol layers
#[async_trait]
pub trait ProtocolLayer: Send + Sync {
    /// Initialize the layer
    async fn initialize(&self) -> Result<(), LayerError>;

    /// Shutdown the layer
    async fn shutdown(&self) -> Result<(), LayerError>;
}
