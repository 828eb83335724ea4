//! Packet Data Convergence Protocol (PDCP) Layer Implementation
//!
//! One [`PdcpEntity`] per radio bearer, owned by the per-UE [`Pdcp`]
//! manager. Only the signalling bearers are framed; the DRB data path is
//! reported as not supported.

pub mod control_pdu;
pub mod entity;

pub use entity::{IntegrityKey, PdcpBindings, PdcpEntity};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{ByteBuffer, RadioBearerId};
use interfaces::GwInterfacePdcp;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::PdcpConfig;
use crate::{LayerError, ProtocolLayer};

/// PDCP services used by RRC
#[async_trait]
pub trait PdcpInterfaceRrc: Send + Sync {
    /// Create and activate the entity of `bearer`; re-adding is ignored
    async fn add_bearer(&self, bearer: RadioBearerId) -> Result<(), LayerError>;

    async fn write_sdu(&self, bearer: RadioBearerId, sdu: ByteBuffer) -> Result<(), LayerError>;

    /// Remove every bearer except SRB0
    async fn reset(&self);
}

/// PDCP services used by RLC
#[async_trait]
pub trait PdcpInterfaceRlc: Send + Sync {
    async fn write_pdu(&self, bearer: RadioBearerId, pdu: ByteBuffer) -> Result<(), LayerError>;
}

/// Per-UE PDCP
pub struct Pdcp {
    bindings: PdcpBindings,
    /// Data-plane sink, only checked at DRB setup until DRB PDUs are forwarded
    gw: Option<Arc<dyn GwInterfacePdcp>>,
    config: PdcpConfig,
    entities: RwLock<HashMap<RadioBearerId, Arc<PdcpEntity>>>,
}

impl Pdcp {
    /// Create the PDCP with its SRB0 entity already active
    pub fn new(bindings: PdcpBindings, gw: Option<Arc<dyn GwInterfacePdcp>>, config: PdcpConfig) -> Self {
        let srb0 = Arc::new(PdcpEntity::init(RadioBearerId::Srb0, bindings.clone(), config.max_count));
        let entities = HashMap::from([(RadioBearerId::Srb0, srb0)]);
        Self {
            bindings,
            gw,
            config,
            entities: RwLock::new(entities),
        }
    }

    /// Entity of an active bearer
    pub async fn entity(&self, bearer: RadioBearerId) -> Result<Arc<PdcpEntity>, LayerError> {
        self.entities
            .read()
            .await
            .get(&bearer)
            .filter(|entity| entity.is_active())
            .cloned()
            .ok_or(LayerError::BearerNotActive(bearer))
    }

    pub async fn is_active(&self, bearer: RadioBearerId) -> bool {
        self.entity(bearer).await.is_ok()
    }

    /// Active bearers in ascending order
    pub async fn bearers(&self) -> Vec<RadioBearerId> {
        let mut bearers: Vec<_> = self.entities.read().await.keys().copied().collect();
        bearers.sort();
        bearers
    }

    pub async fn enable_security(&self, bearer: RadioBearerId, k_rrc_int: IntegrityKey) -> Result<(), LayerError> {
        self.entity(bearer).await?.enable_security(k_rrc_int).await;
        Ok(())
    }
}

#[async_trait]
impl PdcpInterfaceRrc for Pdcp {
    async fn add_bearer(&self, bearer: RadioBearerId) -> Result<(), LayerError> {
        if bearer.is_drb() && self.gw.is_none() {
            return Err(LayerError::ConfigurationError(format!(
                "no gateway bound for {}",
                bearer
            )));
        }

        let mut entities = self.entities.write().await;
        if entities.contains_key(&bearer) {
            warn!("PDCP bearer {} already active, ignoring add", bearer);
            return Ok(());
        }

        let entity = PdcpEntity::init(bearer, self.bindings.clone(), self.config.max_count);
        entities.insert(bearer, Arc::new(entity));
        info!("Added PDCP bearer {} (lcid={})", bearer, bearer.lcid());
        Ok(())
    }

    async fn write_sdu(&self, bearer: RadioBearerId, sdu: ByteBuffer) -> Result<(), LayerError> {
        let entity = self.entity(bearer).await?;
        entity.write_sdu(sdu).await
    }

    async fn reset(&self) {
        let mut entities = self.entities.write().await;
        entities.retain(|bearer, entity| {
            if *bearer == RadioBearerId::Srb0 {
                return true;
            }
            entity.deactivate();
            false
        });
        debug!("PDCP reset, {} bearer(s) left", entities.len());
    }
}

#[async_trait]
impl PdcpInterfaceRlc for Pdcp {
    async fn write_pdu(&self, bearer: RadioBearerId, pdu: ByteBuffer) -> Result<(), LayerError> {
        let entity = self.entity(bearer).await?;
        entity.write_pdu(pdu).await
    }
}

#[async_trait]
impl ProtocolLayer for Pdcp {
    async fn initialize(&self) -> Result<(), LayerError> {
        info!("Initializing PDCP layer");
        debug!("PDCP config: max_count={}", self.config.max_count);
        if self.config.max_count == 0 {
            return Err(LayerError::ConfigurationError(
                "PDCP max_count must be at least 1".to_string(),
            ));
        }

        self.entities
            .write()
            .await
            .entry(RadioBearerId::Srb0)
            .or_insert_with(|| {
                Arc::new(PdcpEntity::init(RadioBearerId::Srb0, self.bindings.clone(), self.config.max_count))
            });
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), LayerError> {
        info!("Shutting down PDCP layer");
        let mut entities = self.entities.write().await;
        for entity in entities.values() {
            entity.deactivate();
        }
        entities.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rrc::RrcInterfacePdcp;
    use common::BufferPool;
    use interfaces::{InterfaceError, RlcInterfacePdcp};

    struct NullRlc;

    #[async_trait]
    impl RlcInterfacePdcp for NullRlc {
        async fn write_sdu(&self, _bearer: RadioBearerId, sdu: ByteBuffer) -> Result<(), InterfaceError> {
            sdu.release();
            Ok(())
        }
    }

    struct NullGw;

    #[async_trait]
    impl GwInterfacePdcp for NullGw {
        async fn write_pdu(&self, _bearer: RadioBearerId, pdu: ByteBuffer) -> Result<(), InterfaceError> {
            pdu.release();
            Ok(())
        }
    }

    struct NullRrc;

    #[async_trait]
    impl RrcInterfacePdcp for NullRrc {
        async fn write_pdu(&self, _bearer: RadioBearerId, pdu: ByteBuffer) -> Result<(), LayerError> {
            pdu.release();
            Ok(())
        }
    }

    fn make_pdcp(gw: Option<Arc<dyn GwInterfacePdcp>>) -> (Pdcp, BufferPool, Arc<dyn RrcInterfacePdcp>) {
        let pool = BufferPool::new(8, 64);
        let rrc: Arc<dyn RrcInterfacePdcp> = Arc::new(NullRrc);
        let bindings = PdcpBindings {
            rlc: Arc::new(NullRlc),
            rrc: Arc::downgrade(&rrc),
            pool: pool.clone(),
        };
        (Pdcp::new(bindings, gw, PdcpConfig::default()), pool, rrc)
    }

    #[tokio::test]
    async fn test_srb0_active_after_new() {
        let (pdcp, _pool, _rrc) = make_pdcp(None);
        assert!(pdcp.is_active(RadioBearerId::Srb0).await);
        assert!(!pdcp.is_active(RadioBearerId::Srb1).await);
    }

    #[tokio::test]
    async fn test_unknown_bearer_is_precondition_violation() {
        let (pdcp, pool, _rrc) = make_pdcp(None);
        let err = pdcp
            .write_sdu(RadioBearerId::Srb2, pool.allocate_from(&[1]).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_precondition_violation());
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_add_bearer_idempotent() {
        let (pdcp, pool, _rrc) = make_pdcp(None);
        pdcp.add_bearer(RadioBearerId::Srb1).await.unwrap();
        pdcp.write_sdu(RadioBearerId::Srb1, pool.allocate_from(&[1]).unwrap()).await.unwrap();

        // Re-adding must not reset COUNT
        pdcp.add_bearer(RadioBearerId::Srb1).await.unwrap();
        let entity = pdcp.entity(RadioBearerId::Srb1).await.unwrap();
        assert_eq!(entity.tx_count().await, 1);
        assert_eq!(pdcp.bearers().await, vec![RadioBearerId::Srb0, RadioBearerId::Srb1]);
    }

    #[tokio::test]
    async fn test_drb_requires_gateway() {
        let (pdcp, _pool, _rrc) = make_pdcp(None);
        let err = pdcp.add_bearer(RadioBearerId::Drb(1)).await.unwrap_err();
        assert!(matches!(err, LayerError::ConfigurationError(_)));

        let (pdcp, _pool, _rrc) = make_pdcp(Some(Arc::new(NullGw)));
        pdcp.add_bearer(RadioBearerId::Drb(1)).await.unwrap();
        assert!(pdcp.is_active(RadioBearerId::Drb(1)).await);
    }

    #[tokio::test]
    async fn test_reset_keeps_srb0() {
        let (pdcp, _pool, _rrc) = make_pdcp(None);
        pdcp.add_bearer(RadioBearerId::Srb1).await.unwrap();
        pdcp.add_bearer(RadioBearerId::Srb2).await.unwrap();
        let srb1 = pdcp.entity(RadioBearerId::Srb1).await.unwrap();

        pdcp.reset().await;
        assert_eq!(pdcp.bearers().await, vec![RadioBearerId::Srb0]);
        assert!(!srb1.is_active());
    }

    #[tokio::test]
    async fn test_shutdown_and_initialize() {
        let (pdcp, _pool, _rrc) = make_pdcp(None);
        pdcp.shutdown().await.unwrap();
        assert!(pdcp.bearers().await.is_empty());

        pdcp.initialize().await.unwrap();
        assert!(pdcp.is_active(RadioBearerId::Srb0).await);
    }
}
