//! UE upper-layer stack assembly
//!
//! Wires RRC and PDCP to each other and to the external MAC, PHY, RLC,
//! gateway and message codec.

use std::sync::{Arc, Weak};

use common::BufferPool;
use interfaces::{
    GwInterfacePdcp, MacInterfaceRrc, PhyInterfaceRrc, RlcInterfacePdcp, RlcInterfaceRrc, RrcCodec,
};
use tracing::info;

use crate::config::StackConfig;
use crate::pdcp::{Pdcp, PdcpBindings};
use crate::rrc::{Rrc, RrcBindings, RrcInterfacePdcp};
use crate::{LayerError, ProtocolLayer};

/// Running RRC + PDCP pair with its buffer pool
pub struct UeStack {
    config: StackConfig,
    pool: BufferPool,
    rrc: Arc<Rrc>,
    pdcp: Arc<Pdcp>,
}

impl UeStack {
    pub fn builder(config: StackConfig) -> UeStackBuilder {
        UeStackBuilder {
            config,
            pool: None,
            mac: None,
            phy: None,
            rlc_pdcp: None,
            rlc_rrc: None,
            gw: None,
            codec: None,
        }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// RRC, which MAC and RLC feed through `RrcInterfaceMac`/`RrcInterfaceRlc`
    pub fn rrc(&self) -> &Arc<Rrc> {
        &self.rrc
    }

    /// PDCP, which RLC feeds through `PdcpInterfaceRlc`
    pub fn pdcp(&self) -> &Arc<Pdcp> {
        &self.pdcp
    }

    pub async fn start(&self) -> Result<(), LayerError> {
        self.pdcp.initialize().await?;
        self.rrc.initialize().await?;
        info!("UE stack started");
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), LayerError> {
        self.rrc.shutdown().await?;
        self.pdcp.shutdown().await?;
        info!("UE stack stopped");
        Ok(())
    }
}

/// Collects the external layers before the stack is built
pub struct UeStackBuilder {
    config: StackConfig,
    pool: Option<BufferPool>,
    mac: Option<Arc<dyn MacInterfaceRrc>>,
    phy: Option<Arc<dyn PhyInterfaceRrc>>,
    rlc_pdcp: Option<Arc<dyn RlcInterfacePdcp>>,
    rlc_rrc: Option<Arc<dyn RlcInterfaceRrc>>,
    gw: Option<Arc<dyn GwInterfacePdcp>>,
    codec: Option<Arc<dyn RrcCodec>>,
}

impl UeStackBuilder {
    /// Share an existing pool instead of creating one from the config
    pub fn pool(mut self, pool: BufferPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn mac(mut self, mac: Arc<dyn MacInterfaceRrc>) -> Self {
        self.mac = Some(mac);
        self
    }

    pub fn phy(mut self, phy: Arc<dyn PhyInterfaceRrc>) -> Self {
        self.phy = Some(phy);
        self
    }

    pub fn rlc<R>(mut self, rlc: Arc<R>) -> Self
    where
        R: RlcInterfacePdcp + RlcInterfaceRrc + 'static,
    {
        self.rlc_pdcp = Some(rlc.clone());
        self.rlc_rrc = Some(rlc);
        self
    }

    /// Needed only once data bearers are set up
    pub fn gw(mut self, gw: Arc<dyn GwInterfacePdcp>) -> Self {
        self.gw = Some(gw);
        self
    }

    pub fn codec(mut self, codec: Arc<dyn RrcCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn build(self) -> Result<UeStack, LayerError> {
        let missing = |name: &str| LayerError::ConfigurationError(format!("{} not bound", name));
        let mac = self.mac.ok_or_else(|| missing("MAC"))?;
        let phy = self.phy.ok_or_else(|| missing("PHY"))?;
        let rlc_pdcp = self.rlc_pdcp.ok_or_else(|| missing("RLC"))?;
        let rlc_rrc = self.rlc_rrc.ok_or_else(|| missing("RLC"))?;
        let codec = self.codec.ok_or_else(|| missing("RRC codec"))?;

        let config = self.config;
        config
            .validate()
            .map_err(|e| LayerError::ConfigurationError(e.to_string()))?;
        let pool = self
            .pool
            .unwrap_or_else(|| BufferPool::new(config.pool.capacity, config.pool.buffer_size));
        let gw = self.gw;

        // PDCP reaches RRC through a weak handle, RRC owns PDCP
        let mut pdcp_handle: Option<Arc<Pdcp>> = None;
        let rrc = Arc::new_cyclic(|rrc: &Weak<Rrc>| {
            let rrc_pdcp: Weak<dyn RrcInterfacePdcp> = rrc.clone();
            let pdcp = Arc::new(Pdcp::new(
                PdcpBindings {
                    rlc: rlc_pdcp,
                    rrc: rrc_pdcp,
                    pool: pool.clone(),
                },
                gw,
                config.pdcp.clone(),
            ));
            pdcp_handle = Some(pdcp.clone());

            Rrc::new(
                RrcBindings {
                    mac,
                    phy,
                    rlc: rlc_rrc,
                    pdcp,
                    codec,
                },
                pool.clone(),
                config.rrc.clone(),
            )
        });
        let pdcp = pdcp_handle.ok_or(LayerError::NotInitialized)?;

        Ok(UeStack { config, pool, rrc, pdcp })
    }
}
