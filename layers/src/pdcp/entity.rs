//! PDCP entity of one radio bearer

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use common::{BufferPool, ByteBuffer, Direction, RadioBearerId};
use interfaces::RlcInterfacePdcp;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::control_pdu::{self, MAC_I_LEN};
use crate::rrc::RrcInterfacePdcp;
use crate::LayerError;

/// 256-bit RRC integrity key
pub type IntegrityKey = [u8; 32];

/// Collaborators an entity is bound to at `init`
#[derive(Clone)]
pub struct PdcpBindings {
    pub rlc: Arc<dyn RlcInterfacePdcp>,
    pub rrc: Weak<dyn RrcInterfacePdcp>,
    pub pool: BufferPool,
}

/// PDCP entity
///
/// Only [`PdcpEntity::init`] builds one, so an entity that was never
/// initialised cannot exist. It stays active until its owner deactivates
/// it on reset.
pub struct PdcpEntity {
    bearer: RadioBearerId,
    lcid: u32,
    bindings: PdcpBindings,
    /// Uplink COUNT of the next control PDU
    tx_sn: Mutex<u32>,
    /// Downlink COUNT, unused until header removal exists
    rx_sn: AtomicU32,
    active: AtomicBool,
    integrity_key: RwLock<Option<IntegrityKey>>,
    max_count: u32,
}

impl PdcpEntity {
    pub fn init(bearer: RadioBearerId, bindings: PdcpBindings, max_count: u32) -> Self {
        debug!("PDCP entity {} initialized (lcid={})", bearer, bearer.lcid());
        Self {
            bearer,
            lcid: bearer.lcid(),
            bindings,
            tx_sn: Mutex::new(0),
            rx_sn: AtomicU32::new(0),
            active: AtomicBool::new(true),
            integrity_key: RwLock::new(None),
            max_count,
        }
    }

    pub fn bearer(&self) -> RadioBearerId {
        self.bearer
    }

    pub fn lcid(&self) -> u32 {
        self.lcid
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// COUNT the next uplink control PDU will carry
    pub async fn tx_count(&self) -> u32 {
        *self.tx_sn.lock().await
    }

    pub fn rx_count(&self) -> u32 {
        self.rx_sn.load(Ordering::Relaxed)
    }

    pub async fn security_enabled(&self) -> bool {
        self.integrity_key.read().await.is_some()
    }

    /// Store the integrity key and protect subsequent control PDUs
    pub async fn enable_security(&self, k_rrc_int: IntegrityKey) {
        *self.integrity_key.write().await = Some(k_rrc_int);
        debug!("PDCP {} security enabled", self.bearer);
    }

    /// Uplink: frame an SDU from RRC and pass it to RLC
    pub async fn write_sdu(&self, sdu: ByteBuffer) -> Result<(), LayerError> {
        if !self.is_active() {
            return Err(LayerError::BearerNotActive(self.bearer));
        }

        match self.bearer {
            RadioBearerId::Srb0 => {
                debug!("PDCP {} TX SDU ({} bytes), no header", self.bearer, sdu.len());
                self.bindings.rlc.write_sdu(self.bearer, sdu).await?;
                Ok(())
            }
            RadioBearerId::Srb1 | RadioBearerId::Srb2 => self.write_control_sdu(sdu).await,
            RadioBearerId::Drb(_) => {
                warn!("PDCP {} TX SDU dropped: DRB data path not implemented", self.bearer);
                sdu.release();
                Err(LayerError::NotSupported("DRB PDCP data path"))
            }
        }
    }

    async fn write_control_sdu(&self, sdu: ByteBuffer) -> Result<(), LayerError> {
        if self.security_enabled().await {
            warn!(
                "PDCP {} integrity protection not implemented (direction={:?}, bearer index={})",
                self.bearer,
                Direction::Uplink,
                self.lcid - 1
            );
            sdu.release();
            return Err(LayerError::NotSupported("integrity protection"));
        }

        // Held until RLC has the PDU so COUNT order matches delivery order
        let mut tx_sn = self.tx_sn.lock().await;
        if *tx_sn >= self.max_count {
            sdu.release();
            return Err(LayerError::CountExhausted(self.bearer));
        }

        let mut pdu = self.bindings.pool.allocate()?;
        control_pdu::pack(*tx_sn, &sdu, [0; MAC_I_LEN], &mut pdu)?;
        sdu.release();

        debug!("PDCP {} TX PDU COUNT={}: {}", self.bearer, *tx_sn, pdu.hex());
        *tx_sn += 1;

        self.bindings.rlc.write_sdu(self.bearer, pdu).await?;
        Ok(())
    }

    /// Downlink: hand a PDU from RLC to the upper layer
    pub async fn write_pdu(&self, pdu: ByteBuffer) -> Result<(), LayerError> {
        if !self.is_active() {
            return Err(LayerError::BearerNotActive(self.bearer));
        }

        match self.bearer {
            RadioBearerId::Srb0 => {
                let rrc = self.bindings.rrc.upgrade().ok_or(LayerError::NotInitialized)?;
                rrc.write_pdu(self.bearer, pdu).await
            }
            RadioBearerId::Srb1 | RadioBearerId::Srb2 => {
                warn!(
                    "PDCP {} RX PDU dropped: header removal not implemented (direction={:?})",
                    self.bearer,
                    Direction::Downlink
                );
                pdu.release();
                Err(LayerError::NotSupported("PDCP header removal"))
            }
            RadioBearerId::Drb(_) => {
                warn!("PDCP {} RX PDU dropped: DRB data path not implemented", self.bearer);
                pdu.release();
                Err(LayerError::NotSupported("DRB PDCP data path"))
            }
        }
    }
}

impl std::fmt::Debug for PdcpEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdcpEntity")
            .field("bearer", &self.bearer)
            .field("lcid", &self.lcid)
            .field("active", &self.is_active())
            .finish()
    }
}
